//! Error types for building model trees.

use brickmesh_library::LibraryError;
use brickmesh_parse::ParseError;
use thiserror::Error;

/// Errors that abort a model build.
#[derive(Error, Debug)]
pub enum ModelError {
    /// A referenced file could not be found or read.
    #[error(transparent)]
    Library(#[from] LibraryError),

    /// A file contains a malformed line.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A part references itself, directly or through other parts.
    #[error("cyclic reference to {name}: {}", chain.join(" -> "))]
    CyclicReference {
        /// The part referenced again.
        name: String,
        /// Parts being built, outermost first.
        chain: Vec<String>,
    },

    /// References nest deeper than the configured limit.
    #[error("reference depth {depth} exceeded while resolving {name}")]
    DepthExceeded {
        /// The part at which the limit was hit.
        name: String,
        /// The limit.
        depth: usize,
    },
}

impl ModelError {
    /// Name of the part or file the failure is about, when known.
    pub fn part_name(&self) -> Option<&str> {
        match self {
            Self::Library(LibraryError::MissingPart(name)) => Some(name),
            Self::Library(_) => None,
            Self::Parse(ParseError::Line { file, .. })
            | Self::Parse(ParseError::MissingFileName { file, .. }) => Some(file),
            Self::CyclicReference { name, .. } | Self::DepthExceeded { name, .. } => Some(name),
        }
    }
}

/// Result alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
