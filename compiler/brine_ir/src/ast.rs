//! Syntax tree produced by the parser.
//!
//! The tree is deliberately small: declarations (functions, methods,
//! operators, structs, aliases), statements and expressions. The only part
//! the source loader looks at is [`SourceAst::usings`].

use std::fmt;

use crate::{FileUri, Span};

/// A name together with where it was written.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Ident {
            name: name.into(),
            span,
        }
    }
}

/// `using "path";`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UsingDirective {
    /// The path string exactly as written.
    pub path: String,
    /// Location of the whole directive.
    pub span: Span,
    /// Filled in by the source loader once the path resolves to a file.
    pub resolved: Option<FileUri>,
}

impl UsingDirective {
    pub fn new(path: impl Into<String>, span: Span) -> Self {
        UsingDirective {
            path: path.into(),
            span,
            resolved: None,
        }
    }
}

/// Parsed contents of one file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceAst {
    pub usings: Vec<UsingDirective>,
    pub items: Vec<Item>,
    /// Top-level statements, in source order.
    pub statements: Vec<Stmt>,
}

/// Top-level declaration.
#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    Function(FunctionDecl),
    Struct(StructDecl),
    Alias(AliasDecl),
}

/// Which keyword introduced a callable declaration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeclKind {
    /// `fn name(...)`
    Function,
    /// `method name(self: T, ...)`: the first parameter is the receiver.
    Method,
    /// `operator + (a: T, b: T)`
    Operator,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDecl {
    pub kind: DeclKind,
    /// Name, or the operator symbol for operators.
    pub name: Ident,
    pub type_params: Vec<Ident>,
    pub params: Vec<ParamDecl>,
    pub ret: Option<TypeExpr>,
    /// `None` for `extern` declarations that end in `;`.
    pub body: Option<Block>,
    pub is_extern: bool,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParamDecl {
    pub name: Ident,
    pub ty: TypeExpr,
    pub default: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructDecl {
    pub name: Ident,
    pub type_params: Vec<Ident>,
    pub fields: Vec<FieldDecl>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: Ident,
    pub ty: TypeExpr,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AliasDecl {
    pub name: Ident,
    pub ty: TypeExpr,
    pub span: Span,
}

/// Written type: `int`, `Pair<int, T>`, `[float]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    Named { name: Ident, args: Vec<TypeExpr> },
    Array { elem: Box<TypeExpr>, span: Span },
}

impl TypeExpr {
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Named { name, args } => args
                .last()
                .map_or(name.span, |last| name.span.merge(last.span())),
            TypeExpr::Array { span, .. } => *span,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named { name, args } => {
                f.write_str(&name.name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            TypeExpr::Array { elem, .. } => write!(f, "[{elem}]"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    Let {
        name: Ident,
        ty: Option<TypeExpr>,
        value: Expr,
    },
    Return(Option<Expr>),
    While {
        label: Option<Ident>,
        cond: Expr,
        body: Block,
    },
    Break(Option<Ident>),
    Expr(Expr),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Name(Ident),
    Array(Vec<Expr>),
    Call {
        callee: Ident,
        args: Vec<Expr>,
    },
    MethodCall {
        receiver: Box<Expr>,
        method: Ident,
        args: Vec<Expr>,
    },
    Field {
        base: Box<Expr>,
        field: Ident,
    },
    Binary {
        op: BinaryOp,
        op_span: Span,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
}

impl BinaryOp {
    /// The symbol an `operator` declaration uses for this operation.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::LtEq => "<=",
            BinaryOp::GtEq => ">=",
        }
    }

    /// Binding power, higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Eq | BinaryOp::NotEq => 1,
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::LtEq | BinaryOp::GtEq => 2,
            BinaryOp::Add | BinaryOp::Sub => 3,
            BinaryOp::Mul | BinaryOp::Div => 4,
        }
    }
}
