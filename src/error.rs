use thiserror::Error;

pub type Result<T> = std::result::Result<T, MagnitudeError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MagnitudeError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("malformed magnitude text `{text}`: {reason}")]
    MalformedText { text: String, reason: String },

    #[error("parse error at position {position}: {message}")]
    Parse { message: String, position: usize },

    #[error("unknown function `{name}`")]
    UnknownFunction { name: String },

    #[error("`{name}` expects {expected}, got {actual} argument(s)")]
    Arity {
        name: String,
        expected: &'static str,
        actual: usize,
    },

    #[error("factorial of a negative number")]
    NegativeFactorial,
}

impl MagnitudeError {
    pub fn malformed(text: &str, reason: &str) -> Self {
        MagnitudeError::MalformedText {
            text: text.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True for errors produced while reading text input, as opposed to
    /// errors produced by arithmetic itself.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            MagnitudeError::MalformedText { .. } | MagnitudeError::Parse { .. }
        )
    }
}
