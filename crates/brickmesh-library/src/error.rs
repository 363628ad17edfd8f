//! Error types for part resolution and file loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while locating or reading files.
#[derive(Error, Debug)]
pub enum LibraryError {
    /// A candidate file exists but could not be read.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// No candidate path for the name could be read.
    #[error("part not found: {0}")]
    MissingPart(String),

    /// A path table line is not `name path`.
    #[error("path table line {line}: expected `name<TAB>path`, got `{text}`")]
    PathTable {
        /// Line number (1-indexed).
        line: usize,
        /// The offending line.
        text: String,
    },
}

impl LibraryError {
    /// Create an I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for library operations.
pub type Result<T> = std::result::Result<T, LibraryError>;
