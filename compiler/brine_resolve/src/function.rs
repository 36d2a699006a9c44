//! Resolved declarations: functions, parameters, structs and aliases.

use std::fmt;
use std::sync::Arc;

use brine_ir::{Block, Expr, FileUri, Span};
use brine_types::{substitute, Type, TypeArgs};

/// Which pool a callable lives in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Function,
    /// A general function, called with method syntax `recv.name(...)`.
    Method,
    Operator,
    /// The implicit constructor of a struct.
    Constructor,
}

impl FunctionKind {
    /// Noun used in diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            FunctionKind::Function => "function",
            FunctionKind::Method => "method",
            FunctionKind::Operator => "operator",
            FunctionKind::Constructor => "constructor",
        }
    }
}

/// Predicate standing in for a declared type on builtin parameters.
#[derive(Clone)]
pub struct Acceptor {
    /// Shown in diagnostics where a type name would be.
    pub description: &'static str,
    accepts: Arc<dyn Fn(&Type) -> bool + Send + Sync>,
}

impl Acceptor {
    pub fn new(
        description: &'static str,
        accepts: impl Fn(&Type) -> bool + Send + Sync + 'static,
    ) -> Self {
        Acceptor {
            description,
            accepts: Arc::new(accepts),
        }
    }

    pub fn accepts(&self, ty: &Type) -> bool {
        (self.accepts)(ty)
    }
}

impl fmt::Debug for Acceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Acceptor({})", self.description)
    }
}

/// Type of a parameter slot.
#[derive(Clone, Debug)]
pub enum ParamType {
    Declared(Type),
    /// Any argument the predicate accepts (builtins only).
    Accepts(Acceptor),
}

impl ParamType {
    pub fn declared(&self) -> Option<&Type> {
        match self {
            ParamType::Declared(ty) => Some(ty),
            ParamType::Accepts(_) => None,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Declared(ty) => write!(f, "{ty}"),
            ParamType::Accepts(acceptor) => f.write_str(acceptor.description),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Parameter {
    pub name: String,
    pub ty: ParamType,
    pub default: Option<Expr>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Parameter {
            name: name.into(),
            ty: ParamType::Declared(ty),
            default: None,
        }
    }

    pub fn accepting(name: impl Into<String>, acceptor: Acceptor) -> Self {
        Parameter {
            name: name.into(),
            ty: ParamType::Accepts(acceptor),
            default: None,
        }
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// A callable candidate: user function, method, operator, constructor or
/// builtin.
///
/// Candidates are shared as `Arc<Function>`; the template cache keys
/// instantiations on the identity of that allocation.
#[derive(Clone, Debug)]
pub struct Function {
    pub name: String,
    pub kind: FunctionKind,
    /// Declaring file; `None` for builtins.
    pub file: Option<FileUri>,
    /// Span of the name token.
    pub name_span: Span,
    /// Span of the whole declaration.
    pub span: Span,
    pub type_params: Vec<String>,
    pub params: Vec<Parameter>,
    pub ret: Type,
    pub body: Option<Block>,
    pub is_extern: bool,
    /// For instantiations: the arguments substituted into the template.
    pub type_args: Option<TypeArgs>,
}

impl Function {
    /// A body-less builtin.
    pub fn builtin(
        name: impl Into<String>,
        kind: FunctionKind,
        params: Vec<Parameter>,
        ret: Type,
    ) -> Self {
        Function {
            name: name.into(),
            kind,
            file: None,
            name_span: Span::DUMMY,
            span: Span::DUMMY,
            type_params: Vec::new(),
            params,
            ret,
            body: None,
            is_extern: false,
            type_args: None,
        }
    }

    /// Whether this is a template still waiting for type arguments.
    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    pub fn is_builtin(&self) -> bool {
        self.file.is_none()
    }

    /// Number of leading parameters without a default value.
    pub fn required_params(&self) -> usize {
        self.params.iter().take_while(|p| !p.has_default()).count()
    }

    /// `name<T>(int, T) -> T`
    pub fn signature(&self) -> String {
        let mut out = self.name.clone();
        if !self.type_params.is_empty() {
            out.push('<');
            out.push_str(&self.type_params.join(", "));
            out.push('>');
        }
        out.push('(');
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&param.ty.to_string());
            if param.has_default() {
                out.push_str(" = ..");
            }
        }
        out.push(')');
        if self.ret != Type::Void {
            out.push_str(" -> ");
            out.push_str(&self.ret.to_string());
        }
        out
    }

    /// Ordering key independent of pool order.
    pub(crate) fn stable_key(&self) -> (Option<&str>, u32, String) {
        (
            self.file.as_ref().map(FileUri::as_str),
            self.name_span.start,
            self.signature(),
        )
    }

    /// Concrete copy with `args` substituted for every type parameter.
    pub fn instantiate(&self, args: &TypeArgs) -> Function {
        let params = self
            .params
            .iter()
            .map(|param| Parameter {
                name: param.name.clone(),
                ty: match &param.ty {
                    ParamType::Declared(ty) => ParamType::Declared(substitute(ty, args)),
                    accepts @ ParamType::Accepts(_) => accepts.clone(),
                },
                default: param.default.clone(),
            })
            .collect();
        Function {
            name: self.name.clone(),
            kind: self.kind,
            file: self.file.clone(),
            name_span: self.name_span,
            span: self.span,
            type_params: Vec::new(),
            params,
            ret: substitute(&self.ret, args),
            body: self.body.clone(),
            is_extern: self.is_extern,
            type_args: Some(args.clone()),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())?;
        if let Some(args) = &self.type_args {
            write!(f, " with {args}")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: String,
    pub span: Span,
    pub ty: Type,
}

/// A struct declaration with its resolved field types.
#[derive(Clone, Debug, PartialEq)]
pub struct StructDef {
    pub name: String,
    pub file: FileUri,
    pub name_span: Span,
    pub span: Span,
    pub type_params: Vec<String>,
    pub fields: Vec<Field>,
}

impl StructDef {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Type of field `name` on a value of type `Name<args>`.
    pub fn field_type(&self, name: &str, args: &[Type]) -> Option<Type> {
        let field = self.field(name)?;
        if self.type_params.is_empty() {
            return Some(field.ty.clone());
        }
        let bindings: TypeArgs = self
            .type_params
            .iter()
            .cloned()
            .zip(args.iter().cloned())
            .collect();
        Some(substitute(&field.ty, &bindings))
    }

    /// The type this struct names, with its own parameters as arguments.
    pub fn self_type(&self) -> Type {
        Type::named(
            self.name.clone(),
            self.type_params.iter().map(Type::param).collect(),
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AliasDef {
    pub name: String,
    pub file: FileUri,
    pub name_span: Span,
    /// `Type::Alias` wrapping the target.
    pub ty: Type,
}
