//! Expression typing and call resolution.

use std::sync::Arc;

use brine_diagnostic::{type_mismatch, unknown_identifier, Diagnostic, ErrorCode};
use brine_ir::{BinaryOp, Expr, ExprKind, Ident, Span};
use brine_types::{Type, TypeMatch};

use super::{is_poisoned, Checker};
use crate::engine::resolve;
use crate::frame::{CompiledFrame, FrameFlags};
use crate::function::{Function, FunctionKind};
use crate::query::{Converter, FunctionQuery, Identifier};
use crate::template::CompliableTemplate;

/// A call argument: the expression and its type without any hint.
/// `ty` is `None` for expressions that need a hint (`[]`).
pub(crate) struct Argument<'e> {
    pub expr: &'e Expr,
    pub ty: Option<Type>,
}

/// Converter handed to the resolution engine.
fn convert(arg: &Argument<'_>, hint: Option<&Type>) -> Option<Type> {
    match hint {
        Some(hint) => promote_literal(arg.expr, hint).or_else(|| arg.ty.clone()),
        None => arg.ty.clone(),
    }
}

/// Type of a literal expression read with `hint` as its type, when the
/// literal can be read that way: `1` as `float`, `[1, 2]` as `[float]`,
/// `[]` as any array.
pub(crate) fn promote_literal(expr: &Expr, hint: &Type) -> Option<Type> {
    let target = hint.resolve_aliases();
    let fits = match (&expr.kind, &target) {
        (ExprKind::Int(_), Type::Int | Type::Float)
        | (ExprKind::Float(_), Type::Float)
        | (ExprKind::Str(_), Type::Str)
        | (ExprKind::Bool(_), Type::Bool) => true,
        (ExprKind::Array(items), Type::Array(elem)) => items
            .iter()
            .all(|item| promote_literal(item, elem).is_some()),
        _ => false,
    };
    fits.then_some(target)
}

impl Checker<'_> {
    /// Type of `expr`, or `None` when it cannot be typed without a hint.
    /// `hint` only guides call resolution (return-type inference).
    pub(super) fn infer(
        &mut self,
        frame: &mut CompiledFrame,
        expr: &Expr,
        hint: Option<&Type>,
    ) -> Option<Type> {
        let ty = match &expr.kind {
            ExprKind::Int(_) => Type::Int,
            ExprKind::Float(_) => Type::Float,
            ExprKind::Str(_) => Type::Str,
            ExprKind::Bool(_) => Type::Bool,
            ExprKind::Name(ident) => self.name(frame, ident),
            ExprKind::Array(items) => return self.array(frame, items),
            ExprKind::Call { callee, args } => {
                let args = self.arguments(frame, None, args);
                match self.decls.struct_named(&callee.name) {
                    Some(_) => self.call(
                        frame,
                        FunctionKind::Constructor,
                        &callee.name,
                        &args,
                        hint,
                        callee.span,
                    ),
                    None => self.call(
                        frame,
                        FunctionKind::Function,
                        &callee.name,
                        &args,
                        hint,
                        callee.span,
                    ),
                }
            }
            ExprKind::MethodCall {
                receiver,
                method,
                args,
            } => {
                let args = self.arguments(frame, Some(&**receiver), args);
                self.call(
                    frame,
                    FunctionKind::Method,
                    &method.name,
                    &args,
                    hint,
                    method.span,
                )
            }
            ExprKind::Field { base, field } => self.field(frame, base, field),
            ExprKind::Binary {
                op,
                op_span,
                lhs,
                rhs,
            } => self.binary(frame, *op, *op_span, lhs, rhs),
        };
        Some(ty)
    }

    /// Type `expr` where a value of type `expected` is required. Returns the
    /// type the binding gets: `expected` when given, else the inferred type.
    pub(super) fn check_expr(
        &mut self,
        frame: &mut CompiledFrame,
        expr: &Expr,
        expected: Option<&Type>,
        context: &str,
    ) -> Type {
        let hint = expected.filter(|ty| !is_poisoned(ty) && !ty.has_params());
        let actual = self.infer(frame, expr, hint);
        let Some(expected) = expected else {
            return actual.unwrap_or_else(|| {
                self.push(
                    Diagnostic::error(ErrorCode::E2001)
                        .with_message("cannot infer the type of an empty array")
                        .with_label(expr.span, "add a type annotation"),
                );
                Type::Error
            });
        };
        if is_poisoned(expected) {
            return expected.clone();
        }
        let deferred = frame.flags.contains(FrameFlags::GENERIC_TEMPLATE);
        match actual {
            Some(actual) if is_poisoned(&actual) => {}
            Some(actual) if TypeMatch::of(&actual, expected).is_match() => {}
            Some(actual) if deferred && (actual.has_params() || expected.has_params()) => {}
            actual => {
                if promote_literal(expr, expected).is_none() {
                    let found = actual.map_or_else(|| "[_]".to_string(), |ty| ty.to_string());
                    self.push(type_mismatch(
                        expr.span,
                        &expected.to_string(),
                        &found,
                        context,
                    ));
                }
            }
        }
        expected.clone()
    }

    fn name(&mut self, frame: &mut CompiledFrame, ident: &Ident) -> Type {
        if let Some(local) = frame.lookup(&ident.name) {
            return local.ty.clone();
        }
        if let Some(ty) = self.globals.get(&ident.name) {
            if !frame.is_top_level() {
                frame.captures.insert(ident.name.clone());
            }
            return ty.clone();
        }
        self.push(unknown_identifier(ident.span, &ident.name));
        Type::Error
    }

    fn array(&mut self, frame: &mut CompiledFrame, items: &[Expr]) -> Option<Type> {
        let mut elem: Option<Type> = None;
        for item in items {
            let ty = self.infer(frame, item, None)?;
            if is_poisoned(&ty) {
                return Some(Type::Error);
            }
            elem = Some(match elem {
                None => ty,
                Some(current) if TypeMatch::of(&ty, &current).is_match() => current,
                // Widen: `[1, 2.5]` is `[float]`.
                Some(current) if TypeMatch::of(&current, &ty).is_match() => ty,
                Some(current) => {
                    self.push(type_mismatch(
                        item.span,
                        &current.to_string(),
                        &ty.to_string(),
                        "array elements must share one type",
                    ));
                    return Some(Type::Error);
                }
            });
        }
        elem.map(Type::array)
    }

    fn arguments<'e>(
        &mut self,
        frame: &mut CompiledFrame,
        receiver: Option<&'e Expr>,
        args: &'e [Expr],
    ) -> Vec<Argument<'e>> {
        receiver
            .into_iter()
            .chain(args)
            .map(|expr| Argument {
                expr,
                ty: self.infer(frame, expr, None),
            })
            .collect()
    }

    fn field(&mut self, frame: &mut CompiledFrame, base: &Expr, field: &Ident) -> Type {
        let Some(base_ty) = self.infer(frame, base, None) else {
            return Type::Error;
        };
        if is_poisoned(&base_ty)
            || (frame.flags.contains(FrameFlags::GENERIC_TEMPLATE) && base_ty.has_params())
        {
            return Type::Error;
        }
        let found = match base_ty.resolve_aliases() {
            Type::Named { name, args } => self
                .decls
                .struct_named(&name)
                .and_then(|def| def.field_type(&field.name, &args)),
            _ => None,
        };
        found.unwrap_or_else(|| {
            self.push(
                Diagnostic::error(ErrorCode::E2018)
                    .with_message(format!("no field `{}` on type `{base_ty}`", field.name))
                    .with_label(field.span, "unknown field"),
            );
            Type::Error
        })
    }

    fn binary(
        &mut self,
        frame: &mut CompiledFrame,
        op: BinaryOp,
        op_span: Span,
        lhs: &Expr,
        rhs: &Expr,
    ) -> Type {
        let args = [
            Argument {
                expr: lhs,
                ty: self.infer(frame, lhs, None),
            },
            Argument {
                expr: rhs,
                ty: self.infer(frame, rhs, None),
            },
        ];
        self.call(
            frame,
            FunctionKind::Operator,
            op.symbol(),
            &args,
            None,
            op_span,
        )
    }

    /// Resolve a call and return its result type.
    fn call(
        &mut self,
        frame: &CompiledFrame,
        kind: FunctionKind,
        name: &str,
        args: &[Argument<'_>],
        expected: Option<&Type>,
        span: Span,
    ) -> Type {
        let typed = || args.iter().filter_map(|arg| arg.ty.as_ref());
        if typed().any(is_poisoned) {
            return Type::Error;
        }
        if frame.flags.contains(FrameFlags::GENERIC_TEMPLATE) && typed().any(Type::has_params) {
            // Checked again once instantiated.
            return Type::Error;
        }

        let pool: &[Arc<Function>] = match kind {
            FunctionKind::Function => &self.function_pool,
            FunctionKind::Operator => &self.operator_pool,
            FunctionKind::Method => &self.decls.general_functions,
            FunctionKind::Constructor => &self.decls.constructors,
        };
        let queue = &self.queue;
        let on_instantiate = |entry: &Arc<CompliableTemplate>| {
            queue.borrow_mut().push_back(Arc::clone(entry));
        };
        let converter: Converter<'_, Argument<'_>> = &convert;
        let mut query = FunctionQuery::with_converter(Identifier::Name(name), converter)
            .with_arguments(args)
            .prefer_file(&self.file)
            .on_instantiate(&on_instantiate);
        if let Some(expected) = expected {
            query = query.returning(expected);
        }

        match resolve(pool, kind.label(), &query, self.templates) {
            Ok(resolved) => {
                if resolved.template.is_some()
                    && frame.flags.contains(FrameFlags::INTEROP_RESTRICTED)
                {
                    self.push(
                        Diagnostic::error(ErrorCode::E2019)
                            .with_message(format!(
                                "extern function cannot call the generic {} `{}`",
                                kind.label(),
                                resolved.function
                            ))
                            .with_label(span, "generic call"),
                    );
                }
                resolved.function.ret.clone()
            }
            Err(diag) => {
                self.push(diag.with_label(span, format!("in this {} call", kind.label())));
                Type::Error
            }
        }
    }
}
