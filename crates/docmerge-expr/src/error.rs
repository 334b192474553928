use std::fmt;

pub type ExprResult<T> = Result<T, ExprError>;
pub type EvalResult<T> = Result<T, EvalError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SyntaxErrorKind {
    UnexpectedCharacter,
    UnterminatedString,
    InvalidEscape,
    UnterminatedPlaceholder,
    EmptyPlaceholder,
    InvalidNumber,
    UnexpectedToken,
    UnexpectedEnd,
    UnmatchedParen,
    TrailingInput,
    UnknownFunction,
    UnknownIdentifier,
    MissingArguments,
    ExpressionTooLong,
    NestingTooDeep,
}

impl SyntaxErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SyntaxErrorKind::UnexpectedCharacter => "unexpected character",
            SyntaxErrorKind::UnterminatedString => "unterminated string",
            SyntaxErrorKind::InvalidEscape => "invalid escape",
            SyntaxErrorKind::UnterminatedPlaceholder => "unterminated placeholder",
            SyntaxErrorKind::EmptyPlaceholder => "empty placeholder",
            SyntaxErrorKind::InvalidNumber => "invalid number",
            SyntaxErrorKind::UnexpectedToken => "unexpected token",
            SyntaxErrorKind::UnexpectedEnd => "unexpected end of expression",
            SyntaxErrorKind::UnmatchedParen => "unmatched parenthesis",
            SyntaxErrorKind::TrailingInput => "trailing input",
            SyntaxErrorKind::UnknownFunction => "unknown function",
            SyntaxErrorKind::UnknownIdentifier => "unknown identifier",
            SyntaxErrorKind::MissingArguments => "missing arguments",
            SyntaxErrorKind::ExpressionTooLong => "expression too long",
            SyntaxErrorKind::NestingTooDeep => "nesting too deep",
        }
    }
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A malformed expression. `offset` is the byte offset into the source where the problem was
/// detected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("syntax error at offset {offset}: {message}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub offset: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, offset: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            offset,
            message: message.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EvalErrorKind {
    TypeMismatch,
    DivisionByZero,
    UnknownFunction,
    ArityMismatch,
    ArgumentOutOfRange,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("{function}() expects {}, got {got}", describe_arity(.min, .max))]
    ArityMismatch {
        function: String,
        min: usize,
        max: usize,
        got: usize,
    },

    #[error("{function}(): argument out of range: {message}")]
    ArgumentOutOfRange { function: String, message: String },
}

impl EvalError {
    pub fn kind(&self) -> EvalErrorKind {
        match self {
            EvalError::TypeMismatch(_) => EvalErrorKind::TypeMismatch,
            EvalError::DivisionByZero => EvalErrorKind::DivisionByZero,
            EvalError::UnknownFunction(_) => EvalErrorKind::UnknownFunction,
            EvalError::ArityMismatch { .. } => EvalErrorKind::ArityMismatch,
            EvalError::ArgumentOutOfRange { .. } => EvalErrorKind::ArgumentOutOfRange,
        }
    }

    pub(crate) fn out_of_range(function: &str, message: impl Into<String>) -> Self {
        EvalError::ArgumentOutOfRange {
            function: function.to_string(),
            message: message.into(),
        }
    }
}

fn describe_arity(min: &usize, max: &usize) -> String {
    let (min, max) = (*min, *max);
    let plural = |n: usize| if n == 1 { "argument" } else { "arguments" };
    if min == max {
        format!("{min} {}", plural(min))
    } else if max == usize::MAX {
        format!("at least {min} {}", plural(min))
    } else {
        format!("{min} to {max} arguments")
    }
}

/// Any failure while turning an expression string into a value.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl ExprError {
    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match self {
            ExprError::Syntax(err) => Some(err),
            ExprError::Eval(_) => None,
        }
    }

    pub fn as_eval(&self) -> Option<&EvalError> {
        match self {
            ExprError::Syntax(_) => None,
            ExprError::Eval(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn arity_messages() {
        let err = EvalError::ArityMismatch {
            function: "round".into(),
            min: 2,
            max: 2,
            got: 1,
        };
        assert_eq!(err.to_string(), "round() expects 2 arguments, got 1");

        let err = EvalError::ArityMismatch {
            function: "sum".into(),
            min: 1,
            max: usize::MAX,
            got: 0,
        };
        assert_eq!(err.to_string(), "sum() expects at least 1 argument, got 0");
    }
}
