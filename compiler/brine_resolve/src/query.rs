//! Resolution requests.

use std::fmt;
use std::sync::Arc;

use brine_ir::FileUri;
use brine_types::Type;

use crate::template::CompliableTemplate;

/// Turns one argument into a type, optionally guided by the type of the
/// parameter it is passed to. `None` means the argument cannot be typed
/// (without a hint).
pub type Converter<'q, A> = &'q dyn Fn(&A, Option<&Type>) -> Option<Type>;

/// How candidate names are matched.
#[derive(Clone, Copy)]
pub enum Identifier<'q> {
    /// Exact match, or case-insensitive match with badness 1.
    Name(&'q str),
    /// Custom matcher returning the badness of a name, `None` for no match.
    Matcher {
        description: &'q str,
        matches: &'q dyn Fn(&str) -> Option<u8>,
    },
}

impl Identifier<'_> {
    /// Badness of `candidate`: 0 exact, 1 near miss, 2 no match.
    pub fn badness(&self, candidate: &str) -> u8 {
        match self {
            Identifier::Name(name) if *name == candidate => 0,
            Identifier::Name(name) if name.eq_ignore_ascii_case(candidate) => 1,
            Identifier::Name(_) => 2,
            Identifier::Matcher { matches, .. } => matches(candidate).unwrap_or(2).min(2),
        }
    }
}

impl fmt::Display for Identifier<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Name(name) => f.write_str(name),
            Identifier::Matcher { description, .. } => f.write_str(description),
        }
    }
}

fn identity(ty: &Type, _hint: Option<&Type>) -> Option<Type> {
    Some(ty.clone())
}

/// One immutable resolution request.
///
/// `A` is the argument representation: plain types, or unresolved
/// expressions together with a converter that types them.
pub struct FunctionQuery<'q, A = Type> {
    pub identifier: Identifier<'q>,
    pub arguments: Option<&'q [A]>,
    /// Known arity when the arguments themselves are not available.
    pub argument_count: Option<usize>,
    pub expected_return: Option<&'q Type>,
    /// Prefer candidates declared in this file.
    pub prefer_file: Option<&'q FileUri>,
    pub converter: Converter<'q, A>,
    /// Called once for every instantiation the query creates (not for
    /// cache hits).
    pub on_instantiate: Option<&'q dyn Fn(&Arc<CompliableTemplate>)>,
}

impl<'q> FunctionQuery<'q, Type> {
    /// Query by name with already known argument types.
    pub fn new(name: &'q str) -> Self {
        FunctionQuery::with_converter(Identifier::Name(name), &identity)
    }

    #[must_use]
    pub fn with_types(self, types: &'q [Type]) -> Self {
        self.with_arguments(types)
    }
}

impl<'q, A> FunctionQuery<'q, A> {
    pub fn with_converter(identifier: Identifier<'q>, converter: Converter<'q, A>) -> Self {
        FunctionQuery {
            identifier,
            arguments: None,
            argument_count: None,
            expected_return: None,
            prefer_file: None,
            converter,
            on_instantiate: None,
        }
    }

    #[must_use]
    pub fn with_arguments(mut self, arguments: &'q [A]) -> Self {
        self.arguments = Some(arguments);
        self
    }

    #[must_use]
    pub fn with_argument_count(mut self, count: usize) -> Self {
        self.argument_count = Some(count);
        self
    }

    #[must_use]
    pub fn returning(mut self, ty: &'q Type) -> Self {
        self.expected_return = Some(ty);
        self
    }

    #[must_use]
    pub fn prefer_file(mut self, file: &'q FileUri) -> Self {
        self.prefer_file = Some(file);
        self
    }

    #[must_use]
    pub fn on_instantiate(mut self, callback: &'q dyn Fn(&Arc<CompliableTemplate>)) -> Self {
        self.on_instantiate = Some(callback);
        self
    }

    /// Number of arguments, from the arguments themselves or the explicit
    /// count.
    pub fn arity(&self) -> Option<usize> {
        self.arguments.map(<[A]>::len).or(self.argument_count)
    }

    pub(crate) fn convert(&self, arg: &A, hint: Option<&Type>) -> Option<Type> {
        (self.converter)(arg, hint)
    }

    /// Unhinted argument types, for messages.
    pub(crate) fn describe_arguments(&self) -> String {
        let Some(args) = self.arguments else {
            return match self.argument_count {
                Some(n) => format!("{n} argument(s)"),
                None => "any arguments".to_string(),
            };
        };
        let types: Vec<String> = args
            .iter()
            .map(|arg| match self.convert(arg, None) {
                Some(ty) => ty.to_string(),
                None => "_".to_string(),
            })
            .collect();
        format!("({})", types.join(", "))
    }
}
