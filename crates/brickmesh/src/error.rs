//! Error types for brickmesh sessions.

use std::path::PathBuf;

use brickmesh_library::LibraryError;
use brickmesh_model::ModelError;
use brickmesh_parse::ParseError;
use thiserror::Error;

/// Errors returned by [`Session`](crate::Session) and [`Config`](crate::Config).
#[derive(Error, Debug)]
pub enum Error {
    /// A configuration or side file could not be read.
    #[error("failed to read {}", path.display())]
    Io {
        /// The file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML for [`Config`](crate::Config).
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The configuration holds a nonsensical value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Part lookup or reading failed.
    #[error(transparent)]
    Library(#[from] LibraryError),

    /// A colour file has a malformed line.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Building a model tree failed.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;
