//! Body checking.
//!
//! Walks every statement the program contains and types its expressions,
//! resolving each call, method call, constructor and operator through the
//! resolution engine. Order:
//!
//! 1. top-level statements of every file, in load order (these define the
//!    globals function bodies may capture)
//! 2. bodies of non-generic functions, methods and operators
//! 3. bodies of generic declarations, in template mode: calls whose
//!    arguments still mention type parameters are skipped
//! 4. bodies of instantiations, as they are created, until none are left

mod expr;

use std::cell::RefCell;
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use brine_diagnostic::{type_mismatch, Diagnostic, DiagnosticSink, ErrorCode};
use brine_ir::{FileUri, Stmt, StmtKind, TypeExpr};
use brine_types::{substitute, Type, TypeFlags};

use crate::builtins::Builtins;
use crate::collect::Declarations;
use crate::frame::{CompiledFrame, FrameFlags};
use crate::function::Function;
use crate::template::{CompliableTemplate, TemplateCache};

/// Upper bound on instantiated bodies per compilation; a template that
/// instantiates itself with ever larger types would otherwise never stop.
const INSTANTIATION_LIMIT: usize = 1024;

/// What checking learned beyond diagnostics.
#[derive(Debug, Default)]
pub struct CheckReport {
    /// Globals each function body reads, for bodies that read any.
    pub captures: Vec<(Arc<Function>, BTreeSet<String>)>,
    /// Number of instantiated bodies checked.
    pub instances_checked: usize,
}

struct Checker<'a> {
    decls: &'a Declarations,
    function_pool: Vec<Arc<Function>>,
    operator_pool: Vec<Arc<Function>>,
    templates: &'a mut TemplateCache,
    diagnostics: &'a mut DiagnosticSink,
    globals: FxHashMap<String, Type>,
    /// Instantiations created but not yet checked.
    queue: RefCell<VecDeque<Arc<CompliableTemplate>>>,
    /// File of the body being checked.
    file: FileUri,
    report: CheckReport,
}

/// Check every body in `decls`.
#[tracing::instrument(level = "debug", skip_all)]
pub fn check_program(
    decls: &Declarations,
    builtins: &Builtins,
    templates: &mut TemplateCache,
    diagnostics: &mut DiagnosticSink,
) -> CheckReport {
    let mut checker = Checker::new(decls, builtins, templates, diagnostics);
    checker.run();
    checker.report
}

impl<'a> Checker<'a> {
    fn new(
        decls: &'a Declarations,
        builtins: &Builtins,
        templates: &'a mut TemplateCache,
        diagnostics: &'a mut DiagnosticSink,
    ) -> Self {
        let pool = |user: &[Arc<Function>], builtin: &[Arc<Function>]| {
            user.iter().chain(builtin).cloned().collect::<Vec<_>>()
        };
        Checker {
            decls,
            function_pool: pool(&decls.functions, &builtins.functions),
            operator_pool: pool(&decls.operators, &builtins.operators),
            templates,
            diagnostics,
            globals: FxHashMap::default(),
            queue: RefCell::new(VecDeque::new()),
            file: FileUri::new("<none>"),
            report: CheckReport::default(),
        }
    }

    fn run(&mut self) {
        let decls = self.decls;
        for (file, stmts) in &decls.statements {
            self.check_top_level(file, stmts);
        }

        let declared = || {
            decls
                .functions
                .iter()
                .chain(&decls.general_functions)
                .chain(&decls.operators)
        };
        for function in declared().filter(|f| !f.is_generic()) {
            self.check_function(function, None);
        }
        for function in declared().filter(|f| f.is_generic()) {
            self.check_function(function, None);
        }

        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(entry) = next else { break };
            if self.report.instances_checked == INSTANTIATION_LIMIT {
                self.diagnostics.push(
                    Diagnostic::internal(ErrorCode::E9001)
                        .with_message(format!(
                            "more than {INSTANTIATION_LIMIT} instantiations; stopped at `{}`",
                            entry.instance
                        ))
                        .or_file(entry.original.file.as_ref()),
                );
                break;
            }
            if entry.instance.body.is_some() {
                self.report.instances_checked += 1;
                self.check_function(&entry.instance, Some(&*entry));
            }
        }
        tracing::debug!(
            instances = self.report.instances_checked,
            globals = self.globals.len(),
            "bodies checked"
        );
    }

    fn check_top_level(&mut self, file: &FileUri, stmts: &[Stmt]) {
        self.file = file.clone();
        let mut frame = CompiledFrame::top_level();
        for stmt in stmts {
            self.check_stmt(&mut frame, stmt);
        }
        for (name, ty) in frame.globals() {
            self.globals.insert(name.to_string(), ty.clone());
        }
    }

    /// Check one body. `template` is set for instantiations.
    fn check_function(
        &mut self,
        function: &Arc<Function>,
        template: Option<&CompliableTemplate>,
    ) {
        let (Some(body), Some(file)) = (&function.body, &function.file) else {
            return;
        };
        let mut flags = FrameFlags::empty();
        if function.is_generic() {
            flags |= FrameFlags::GENERIC_TEMPLATE;
        }
        if function.is_extern {
            flags |= FrameFlags::INTEROP_RESTRICTED;
        }
        let mut frame = CompiledFrame::for_function(function, flags);
        if let Some(template) = template {
            frame.type_params.clone_from(&template.original.type_params);
        }
        tracing::trace!(function = %function, ?flags, "checking body");

        self.file = file.clone();
        self.check_block(&mut frame, &body.stmts);

        if !frame.captures.is_empty() {
            self.report
                .captures
                .push((Arc::clone(function), std::mem::take(&mut frame.captures)));
        }
    }

    fn check_block(&mut self, frame: &mut CompiledFrame, stmts: &[Stmt]) {
        frame.push_scope();
        for stmt in stmts {
            self.check_stmt(frame, stmt);
        }
        frame.pop_scope();
    }

    fn check_stmt(&mut self, frame: &mut CompiledFrame, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Let { name, ty, value } => {
                let declared = ty.as_ref().map(|ty| self.annotation(frame, ty));
                let ty = self.check_expr(frame, value, declared.as_ref(), "initializer");
                frame.declare(name.name.clone(), ty);
            }
            StmtKind::Return(value) => {
                let expected = frame.expected_return.clone();
                match value {
                    Some(value) if expected == Type::Void => {
                        self.infer(frame, value, None);
                        self.push(
                            Diagnostic::error(ErrorCode::E2001)
                                .with_message("this function does not return a value")
                                .with_label(value.span, "unexpected return value"),
                        );
                    }
                    Some(value) => {
                        self.check_expr(frame, value, Some(&expected), "returned value");
                    }
                    None if expected != Type::Void && !expected.is_error() => {
                        self.push(type_mismatch(
                            stmt.span,
                            &expected.to_string(),
                            "void",
                            "missing return value",
                        ));
                    }
                    None => {}
                }
            }
            StmtKind::While { label, cond, body } => {
                self.check_expr(frame, cond, Some(&Type::Bool), "loop condition");
                frame.push_loop(label.as_ref().map(|l| l.name.clone()));
                self.check_block(frame, &body.stmts);
                frame.pop_loop();
            }
            StmtKind::Break(label) => {
                if !frame.in_loop() {
                    self.push(
                        Diagnostic::error(ErrorCode::E2017)
                            .with_message("`break` outside of a loop")
                            .with_label(stmt.span, "cannot break here"),
                    );
                } else if let Some(label) = label {
                    if !frame.has_label(&label.name) {
                        let known: Vec<String> = frame.labels().map(|l| format!("'{l}")).collect();
                        let note = if known.is_empty() {
                            "no enclosing loop has a label".to_string()
                        } else {
                            format!("enclosing loop labels: {}", known.join(", "))
                        };
                        self.push(
                            Diagnostic::error(ErrorCode::E2017)
                                .with_message(format!("unknown loop label `'{}`", label.name))
                                .with_label(label.span, "no enclosing loop has this label")
                                .with_note(note),
                        );
                    }
                }
            }
            StmtKind::Expr(expr) => {
                self.infer(frame, expr, None);
            }
        }
    }

    /// Resolve a `let` annotation in the frame's type parameter scope.
    fn annotation(&mut self, frame: &CompiledFrame, ty: &TypeExpr) -> Type {
        match self.decls.resolve_type(ty, &frame.type_params) {
            Ok(ty) => match &frame.type_args {
                Some(args) if ty.has_params() => substitute(&ty, args),
                _ => ty,
            },
            Err(diag) => {
                self.push(diag);
                Type::Error
            }
        }
    }

    /// Attach the current file and record.
    fn push(&mut self, diag: Diagnostic) {
        self.diagnostics.push(diag.with_file(self.file.clone()));
    }
}

fn is_poisoned(ty: &Type) -> bool {
    ty.flags().contains(TypeFlags::HAS_ERROR)
}
