use thiserror::Error;

use crate::models::ErrorCode;

/// Errors that stop a single file from producing any theme
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    Unreadable(String),

    #[error("Unrecognized theme file format")]
    UnknownFormat,

    #[error("Malformed theme file: {0}")]
    Malformed(String),

    #[error("Unsupported theme source: {0}")]
    Unsupported(String),

    #[error("File contains no themes")]
    Empty,
}

impl ParseError {
    /// Error code the synthetic failing result carries
    pub fn code(&self) -> ErrorCode {
        match self {
            ParseError::UnknownFormat | ParseError::Unsupported(_) => ErrorCode::UnsupportedFormat,
            ParseError::Unreadable(_) | ParseError::Malformed(_) | ParseError::Empty => {
                ErrorCode::ParseError
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ParseError::UnknownFormat.code(), ErrorCode::UnsupportedFormat);
        assert_eq!(
            ParseError::Unsupported("spread".to_string()).code(),
            ErrorCode::UnsupportedFormat
        );
        assert_eq!(ParseError::Malformed("x".to_string()).code(), ErrorCode::ParseError);
        assert_eq!(ParseError::Empty.code(), ErrorCode::ParseError);
        assert_eq!(ParseError::Unreadable("x".to_string()).code(), ErrorCode::ParseError);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ParseError::Malformed("unexpected end".to_string()).to_string(),
            "Malformed theme file: unexpected end"
        );
    }
}
