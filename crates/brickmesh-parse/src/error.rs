//! Error types for parsing model and palette files.

use thiserror::Error;

/// A malformed field inside one line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The line ended before a required field.
    #[error("missing {0}")]
    Missing(&'static str),

    /// A field that should be a number is not one.
    #[error("invalid number for {field}: `{token}`")]
    InvalidNumber {
        /// Field being read.
        field: &'static str,
        /// The offending token.
        token: String,
    },

    /// A colour code that is neither decimal nor `0x` hex.
    #[error("invalid colour code: `{0}`")]
    InvalidColor(String),

    /// A `#rrggbb` value that does not decode.
    #[error("invalid colour value: `{0}`")]
    InvalidRgb(String),
}

/// Errors that can occur while parsing a file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A line could not be decoded.
    #[error("{file}:{line}: {source} in `{text}`")]
    Line {
        /// File (part name) being parsed.
        file: String,
        /// Line number (1-indexed).
        line: usize,
        /// The offending line.
        text: String,
        /// What was wrong with it.
        #[source]
        source: FieldError,
    },

    /// A sub-part reference without a file name.
    #[error("{file}:{line}: sub-part reference has no file name")]
    MissingFileName {
        /// File (part name) being parsed.
        file: String,
        /// Line number (1-indexed).
        line: usize,
    },
}

impl ParseError {
    /// Create a line error.
    pub fn line(
        file: impl Into<String>,
        line: usize,
        text: impl Into<String>,
        source: FieldError,
    ) -> Self {
        Self::Line {
            file: file.into(),
            line,
            text: text.into(),
            source,
        }
    }

    /// Line number of the failure.
    pub fn line_number(&self) -> usize {
        match self {
            Self::Line { line, .. } | Self::MissingFileName { line, .. } => *line,
        }
    }
}

/// Result alias for parse operations.
pub type Result<T> = std::result::Result<T, ParseError>;
