//! Error codes for all compiler diagnostics.
//!
//! Each error code is a unique identifier (e.g., `E2012`) with the first digit
//! indicating the compiler phase.

use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: E#### where first digit indicates phase:
/// - E0xxx: Lexer errors
/// - E1xxx: Parser errors
/// - E2xxx: Resolution errors
/// - E3xxx: Source loading errors
/// - E9xxx: Internal compiler errors
///
/// Warnings use the `W` prefix with the same phase digit.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lexer Errors (E0xxx)
    /// Unterminated string literal
    E0001,
    /// Invalid character in source
    E0002,
    /// Invalid number literal
    E0003,
    /// Unbalanced preprocessor directive
    E0004,

    // Parser Errors (E1xxx)
    /// Unexpected token
    E1001,
    /// Expected expression
    E1002,
    /// Expected identifier
    E1004,
    /// Expected type
    E1005,
    /// Missing function body
    E1007,

    // Resolution Errors (E2xxx)
    /// Type mismatch
    E2001,
    /// Unknown type
    E2002,
    /// Unknown identifier
    E2003,
    /// Argument count mismatch
    E2004,
    /// Duplicate definition
    E2006,
    /// No candidate functions available
    E2010,
    /// Function not found
    E2011,
    /// No overload accepts the argument types
    E2012,
    /// Return type mismatch
    E2013,
    /// Ambiguous call
    E2014,
    /// Template type arguments could not be resolved
    E2015,
    /// Template argument inference failed
    E2016,
    /// Unknown loop label
    E2017,
    /// Unknown field
    E2018,
    /// Generic call inside an interop-restricted function
    E2019,

    // Source Loading Errors (E3xxx)
    /// File not found
    E3001,
    /// No source backend handles the path
    E3002,
    /// Source backend reported an error
    E3003,

    // Internal Errors (E9xxx)
    /// Internal compiler error
    E9001,
    /// Too many errors
    E9002,
    /// Backend reported success without content
    E9003,

    // Source Loading Warnings (W3xxx)
    /// Duplicate import
    W3001,
}

impl ErrorCode {
    /// All error code variants, for exhaustive testing.
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::E0001,
        ErrorCode::E0002,
        ErrorCode::E0003,
        ErrorCode::E0004,
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E1007,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2006,
        ErrorCode::E2010,
        ErrorCode::E2011,
        ErrorCode::E2012,
        ErrorCode::E2013,
        ErrorCode::E2014,
        ErrorCode::E2015,
        ErrorCode::E2016,
        ErrorCode::E2017,
        ErrorCode::E2018,
        ErrorCode::E2019,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        ErrorCode::E9001,
        ErrorCode::E9002,
        ErrorCode::E9003,
        ErrorCode::W3001,
    ];

    /// Get the code as a string (e.g., "E1001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
            ErrorCode::E2013 => "E2013",
            ErrorCode::E2014 => "E2014",
            ErrorCode::E2015 => "E2015",
            ErrorCode::E2016 => "E2016",
            ErrorCode::E2017 => "E2017",
            ErrorCode::E2018 => "E2018",
            ErrorCode::E2019 => "E2019",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
            ErrorCode::E9003 => "E9003",
            ErrorCode::W3001 => "W3001",
        }
    }

    /// Check if this is a lexer error (E0xxx range).
    pub fn is_lexer_error(&self) -> bool {
        self.as_str().starts_with("E0")
    }

    /// Check if this is a parser/syntax error (E1xxx range).
    pub fn is_parser_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    /// Check if this is a resolution error (E2xxx range).
    pub fn is_resolution_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    /// Check if this is a source loading error (E3xxx range).
    pub fn is_load_error(&self) -> bool {
        self.as_str().starts_with("E3")
    }

    /// Check if this is an internal compiler error (E9xxx range).
    pub fn is_internal_error(&self) -> bool {
        self.as_str().starts_with("E9")
    }

    /// Check if this is a warning code (W prefix).
    pub fn is_warning(&self) -> bool {
        self.as_str().starts_with('W')
    }

    /// One-line explanation, used by `brinec --explain`.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "unterminated string literal",
            ErrorCode::E0002 => "invalid character in source",
            ErrorCode::E0003 => "invalid number literal",
            ErrorCode::E0004 => "unbalanced `#if`/`#else`/`#endif` directive",
            ErrorCode::E1001 => "unexpected token",
            ErrorCode::E1002 => "expected an expression",
            ErrorCode::E1004 => "expected an identifier",
            ErrorCode::E1005 => "expected a type",
            ErrorCode::E1007 => "function declaration without a body",
            ErrorCode::E2001 => "type mismatch",
            ErrorCode::E2002 => "unknown type name",
            ErrorCode::E2003 => "unknown identifier",
            ErrorCode::E2004 => "wrong number of arguments",
            ErrorCode::E2006 => "duplicate definition",
            ErrorCode::E2010 => "no functions of the requested kind exist",
            ErrorCode::E2011 => "no function with this name exists",
            ErrorCode::E2012 => "no overload accepts the argument types",
            ErrorCode::E2013 => "no overload returns the expected type",
            ErrorCode::E2014 => "several overloads match equally well",
            ErrorCode::E2015 => "template type arguments could not be resolved",
            ErrorCode::E2016 => "template type argument inference failed",
            ErrorCode::E2017 => "unknown loop label",
            ErrorCode::E2018 => "unknown field",
            ErrorCode::E2019 => "generic functions cannot be called from extern functions",
            ErrorCode::E3001 => "imported file not found",
            ErrorCode::E3002 => "no source backend recognizes the import path",
            ErrorCode::E3003 => "source backend failed to read the file",
            ErrorCode::E9001 => "internal compiler error",
            ErrorCode::E9002 => "too many errors",
            ErrorCode::E9003 => "source backend reported success without content",
            ErrorCode::W3001 => "file imported more than once",
        }
    }

    /// Parse an error code string (e.g., "E2012") back into an `ErrorCode`.
    pub fn from_code_str(s: &str) -> Option<ErrorCode> {
        ErrorCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
