//! Declaration collection.
//!
//! Turns parsed files into symbol tables: functions, methods, operators,
//! struct constructors, aliases, extern functions, structs and the
//! top-level statements of each file. Written types are resolved to
//! [`Type`]s here; unknown names become `Type::Error` after a diagnostic so
//! later phases stay quiet about them.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use brine_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode};
use brine_ir::{
    AliasDecl, DeclKind, FileUri, FunctionDecl, Ident, Item, Span, Stmt, StructDecl, TypeExpr,
};
use brine_source::SourceCollection;
use brine_types::Type;

use crate::function::{AliasDef, Field, Function, FunctionKind, Parameter, StructDef};

/// Everything declared across the loaded files.
#[derive(Clone, Debug, Default)]
pub struct Declarations {
    pub functions: Vec<Arc<Function>>,
    pub general_functions: Vec<Arc<Function>>,
    pub operators: Vec<Arc<Function>>,
    pub constructors: Vec<Arc<Function>>,
    /// `extern` functions; each is also in its kind's pool.
    pub externals: Vec<Arc<Function>>,
    pub structs: Vec<Arc<StructDef>>,
    pub aliases: Vec<AliasDef>,
    /// Top-level statements per file, in load order.
    pub statements: Vec<(FileUri, Vec<Stmt>)>,
}

impl Declarations {
    pub fn struct_named(&self, name: &str) -> Option<&Arc<StructDef>> {
        self.structs.iter().find(|s| s.name == name)
    }

    pub fn alias_named(&self, name: &str) -> Option<&AliasDef> {
        self.aliases.iter().find(|a| a.name == name)
    }

    pub fn statements_of(&self, file: &FileUri) -> &[Stmt] {
        self.statements
            .iter()
            .find(|(f, _)| f == file)
            .map_or(&[], |(_, stmts)| stmts.as_slice())
    }

    /// Resolve a written type once collection is complete. Diagnostics come
    /// back without a file.
    pub fn resolve_type(
        &self,
        expr: &TypeExpr,
        type_params: &[String],
    ) -> Result<Type, Diagnostic> {
        let (name, args) = match expr {
            TypeExpr::Array { elem, .. } => {
                return Ok(Type::array(self.resolve_type(elem, type_params)?));
            }
            TypeExpr::Named { name, args } => (name, args),
        };
        let args = args
            .iter()
            .map(|arg| self.resolve_type(arg, type_params))
            .collect::<Result<Vec<_>, _>>()?;
        let text = name.name.as_str();
        let found = args.len();
        let arity_error = |expected: usize| {
            Diagnostic::error(ErrorCode::E2002)
                .with_message(format!(
                    "`{text}` takes {expected} type argument(s), found {found}"
                ))
                .with_label(expr.span(), "wrong number of type arguments")
        };

        let simple = if type_params.iter().any(|p| p == text) {
            Some(Type::param(text))
        } else if let Some(primitive) = Type::primitive(text) {
            Some(primitive)
        } else {
            self.alias_named(text).map(|alias| alias.ty.clone())
        };
        if let Some(ty) = simple {
            return if args.is_empty() {
                Ok(ty)
            } else {
                Err(arity_error(0))
            };
        }
        match self.struct_named(text) {
            Some(def) if def.type_params.len() == args.len() => Ok(Type::named(text, args)),
            Some(def) => Err(arity_error(def.type_params.len())),
            None => Err(Diagnostic::error(ErrorCode::E2002)
                .with_message(format!("unknown type `{text}`"))
                .with_label(name.span, "not found")),
        }
    }

    /// The pool for `kind`.
    pub fn pool(&self, kind: FunctionKind) -> &[Arc<Function>] {
        match kind {
            FunctionKind::Function => &self.functions,
            FunctionKind::Method => &self.general_functions,
            FunctionKind::Operator => &self.operators,
            FunctionKind::Constructor => &self.constructors,
        }
    }
}

/// Where a name was first declared.
#[derive(Clone)]
struct FirstSeen {
    file: FileUri,
    span: Span,
}

struct Collector<'a, 'd> {
    diagnostics: &'d mut DiagnosticSink,
    /// Struct name to number of type parameters.
    struct_arity: FxHashMap<&'a str, usize>,
    alias_decls: FxHashMap<&'a str, (&'a FileUri, &'a AliasDecl)>,
    alias_types: FxHashMap<&'a str, Type>,
    resolving: FxHashSet<&'a str>,
    signatures: FxHashMap<(FunctionKind, String, Vec<Type>), FirstSeen>,
    decls: Declarations,
}

/// Build the symbol tables for every file in `sources`.
#[tracing::instrument(level = "debug", skip_all, fields(files = sources.len()))]
pub fn collect_declarations(
    sources: &SourceCollection,
    diagnostics: &mut DiagnosticSink,
) -> Declarations {
    let mut collector = Collector {
        diagnostics,
        struct_arity: FxHashMap::default(),
        alias_decls: FxHashMap::default(),
        alias_types: FxHashMap::default(),
        resolving: FxHashSet::default(),
        signatures: FxHashMap::default(),
        decls: Declarations::default(),
    };

    collector.register_type_names(sources);

    for file in sources.iter() {
        for item in &file.ast.items {
            match item {
                Item::Alias(alias) => {
                    collector.resolve_alias(&alias.name.name);
                }
                Item::Struct(decl) => collector.collect_struct(&file.uri, decl),
                Item::Function(_) => {}
            }
        }
    }
    for file in sources.iter() {
        for item in &file.ast.items {
            if let Item::Function(decl) = item {
                collector.collect_function(&file.uri, decl);
            }
        }
        collector
            .decls
            .statements
            .push((file.uri.clone(), file.ast.statements.clone()));
    }

    let decls = collector.decls;
    tracing::debug!(
        functions = decls.functions.len(),
        methods = decls.general_functions.len(),
        operators = decls.operators.len(),
        structs = decls.structs.len(),
        "declarations collected"
    );
    decls
}

impl<'a> Collector<'a, '_> {
    /// First pass: every struct and alias name, so types may be used before
    /// they are declared.
    fn register_type_names(&mut self, sources: &'a SourceCollection) {
        let mut seen: FxHashMap<&'a str, FirstSeen> = FxHashMap::default();
        for file in sources.iter() {
            for item in &file.ast.items {
                let name = match item {
                    Item::Struct(decl) => &decl.name,
                    Item::Alias(decl) => &decl.name,
                    Item::Function(_) => continue,
                };
                if Type::primitive(&name.name).is_some() {
                    self.error(
                        ErrorCode::E2006,
                        &file.uri,
                        name.span,
                        format!("`{}` is a builtin type and cannot be redefined", name.name),
                        "redefined here",
                    );
                    continue;
                }
                if let Some(first) = seen.get(name.name.as_str()) {
                    let first = first.clone();
                    self.duplicate(&file.uri, name, "type", &first);
                    continue;
                }
                seen.insert(
                    &name.name,
                    FirstSeen {
                        file: file.uri.clone(),
                        span: name.span,
                    },
                );
                match item {
                    Item::Struct(decl) => {
                        self.struct_arity.insert(&decl.name.name, decl.type_params.len());
                    }
                    Item::Alias(decl) => {
                        self.alias_decls.insert(&decl.name.name, (&file.uri, decl));
                    }
                    Item::Function(_) => {}
                }
            }
        }
    }

    /// Resolve an alias target once, detecting cycles.
    fn resolve_alias(&mut self, name: &str) -> Type {
        if let Some(ty) = self.alias_types.get(name) {
            return ty.clone();
        }
        let Some(&(file, decl)) = self.alias_decls.get(name) else {
            return Type::Error;
        };
        let key = decl.name.name.as_str();
        if !self.resolving.insert(key) {
            self.error(
                ErrorCode::E2002,
                file,
                decl.name.span,
                format!("alias `{key}` refers to itself"),
                "cyclic alias",
            );
            return Type::Error;
        }

        let target = self.resolve_type(&decl.ty, &[], file);
        self.resolving.remove(key);
        let ty = if target.is_error() {
            Type::Error
        } else {
            Type::alias(key, target)
        };
        self.alias_types.insert(key, ty.clone());
        self.decls.aliases.push(AliasDef {
            name: key.to_string(),
            file: file.clone(),
            name_span: decl.name.span,
            ty: ty.clone(),
        });
        ty
    }

    fn resolve_type(&mut self, expr: &TypeExpr, type_params: &[String], file: &FileUri) -> Type {
        let (name, args) = match expr {
            TypeExpr::Array { elem, .. } => {
                return Type::array(self.resolve_type(elem, type_params, file));
            }
            TypeExpr::Named { name, args } => (name, args),
        };
        let args: Vec<Type> = args
            .iter()
            .map(|arg| self.resolve_type(arg, type_params, file))
            .collect();
        let text = name.name.as_str();

        let expected_args = if type_params.iter().any(|p| p == text) {
            0
        } else if Type::primitive(text).is_some() {
            0
        } else if let Some(&arity) = self.struct_arity.get(text) {
            arity
        } else if self.alias_decls.contains_key(text) {
            0
        } else {
            self.error(
                ErrorCode::E2002,
                file,
                name.span,
                format!("unknown type `{text}`"),
                "not found",
            );
            return Type::Error;
        };
        if args.len() != expected_args {
            self.error(
                ErrorCode::E2002,
                file,
                expr.span(),
                format!(
                    "`{text}` takes {expected_args} type argument(s), found {}",
                    args.len()
                ),
                "wrong number of type arguments",
            );
            return Type::Error;
        }

        if type_params.iter().any(|p| p == text) {
            Type::param(text)
        } else if let Some(primitive) = Type::primitive(text) {
            primitive
        } else if self.struct_arity.contains_key(text) {
            Type::named(text, args)
        } else {
            self.resolve_alias(text)
        }
    }

    fn collect_struct(&mut self, file: &FileUri, decl: &StructDecl) {
        if self.struct_arity.get(decl.name.name.as_str()) != Some(&decl.type_params.len())
            || self.decls.struct_named(&decl.name.name).is_some()
        {
            // Rejected as a duplicate when names were registered.
            return;
        }
        let type_params = names(&decl.type_params);
        let mut fields: Vec<Field> = Vec::with_capacity(decl.fields.len());
        for field in &decl.fields {
            if let Some(first) = fields.iter().find(|f| f.name == field.name.name) {
                let first = FirstSeen {
                    file: file.clone(),
                    span: first.span,
                };
                self.duplicate(file, &field.name, "field", &first);
                continue;
            }
            let ty = self.resolve_type(&field.ty, &type_params, file);
            fields.push(Field {
                name: field.name.name.clone(),
                span: field.name.span,
                ty,
            });
        }

        let def = StructDef {
            name: decl.name.name.clone(),
            file: file.clone(),
            name_span: decl.name.span,
            span: decl.span,
            type_params: type_params.clone(),
            fields,
        };

        let constructor = Function {
            name: def.name.clone(),
            kind: FunctionKind::Constructor,
            file: Some(file.clone()),
            name_span: def.name_span,
            span: def.span,
            type_params,
            params: def
                .fields
                .iter()
                .map(|f| Parameter::new(f.name.clone(), f.ty.clone()))
                .collect(),
            ret: def.self_type(),
            body: None,
            is_extern: false,
            type_args: None,
        };
        self.decls.constructors.push(Arc::new(constructor));
        self.decls.structs.push(Arc::new(def));
    }

    fn collect_function(&mut self, file: &FileUri, decl: &FunctionDecl) {
        let type_params = names(&decl.type_params);
        let mut params: Vec<Parameter> = Vec::with_capacity(decl.params.len());
        for param in &decl.params {
            if let Some(first) = decl.params.iter().find(|p| p.name.name == param.name.name) {
                if first.name.span != param.name.span {
                    let first = FirstSeen {
                        file: file.clone(),
                        span: first.name.span,
                    };
                    self.duplicate(file, &param.name, "parameter", &first);
                    continue;
                }
            }
            let ty = self.resolve_type(&param.ty, &type_params, file);
            params.push(Parameter {
                name: param.name.name.clone(),
                ty: crate::function::ParamType::Declared(ty),
                default: param.default.clone(),
            });
        }
        let ret = match &decl.ret {
            Some(ty) => self.resolve_type(ty, &type_params, file),
            None => Type::Void,
        };
        let kind = match decl.kind {
            DeclKind::Function => FunctionKind::Function,
            DeclKind::Method => FunctionKind::Method,
            DeclKind::Operator => FunctionKind::Operator,
        };

        let key = (
            kind,
            decl.name.name.clone(),
            params
                .iter()
                .filter_map(|p| p.ty.declared().cloned())
                .collect::<Vec<_>>(),
        );
        if let Some(first) = self.signatures.get(&key) {
            let first = first.clone();
            self.duplicate(file, &decl.name, kind.label(), &first);
            return;
        }
        self.signatures.insert(
            key,
            FirstSeen {
                file: file.clone(),
                span: decl.name.span,
            },
        );

        let function = Arc::new(Function {
            name: decl.name.name.clone(),
            kind,
            file: Some(file.clone()),
            name_span: decl.name.span,
            span: decl.span,
            type_params,
            params,
            ret,
            body: decl.body.clone(),
            is_extern: decl.is_extern,
            type_args: None,
        });
        if function.is_extern {
            self.decls.externals.push(Arc::clone(&function));
        }
        match kind {
            FunctionKind::Function => self.decls.functions.push(function),
            FunctionKind::Method => self.decls.general_functions.push(function),
            FunctionKind::Operator => self.decls.operators.push(function),
            FunctionKind::Constructor => {}
        }
    }

    fn error(
        &mut self,
        code: ErrorCode,
        file: &FileUri,
        span: Span,
        message: String,
        label: &str,
    ) {
        self.diagnostics.push(
            Diagnostic::error(code)
                .with_message(message)
                .with_file(file.clone())
                .with_label(span, label),
        );
    }

    #[cold]
    fn duplicate(&mut self, file: &FileUri, name: &Ident, what: &str, first: &FirstSeen) {
        let diag = Diagnostic::error(ErrorCode::E2006)
            .with_message(format!("{what} `{}` is defined more than once", name.name))
            .with_file(file.clone())
            .with_label(name.span, "redefined here");
        let diag = if &first.file == file {
            diag.with_secondary_label(first.span, "first defined here")
        } else {
            diag.with_cross_file_label(first.file.clone(), first.span, "first defined here")
        };
        self.diagnostics.push(diag);
    }
}

fn names(idents: &[Ident]) -> Vec<String> {
    idents.iter().map(|i| i.name.clone()).collect()
}

#[cfg(test)]
mod tests;
