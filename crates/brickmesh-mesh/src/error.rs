//! Error types for mesh buffer validation.

use thiserror::Error;

/// Invariant violations detected by [`crate::MeshBuffers::validate`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// Positions and colour codes have different lengths.
    #[error("{vertices} vertices but {colors} colour codes")]
    LengthMismatch {
        /// Number of positions.
        vertices: usize,
        /// Number of colour codes.
        colors: usize,
    },

    /// The index list does not hold whole triangles.
    #[error("index count {0} is not a multiple of 3")]
    IncompleteTriangle(usize),

    /// A triangle refers to a vertex that does not exist.
    #[error("triangle {triangle} refers to vertex {index}, but only {len} exist")]
    IndexOutOfRange {
        /// Triangle number.
        triangle: usize,
        /// Offending index.
        index: u32,
        /// Vertex count.
        len: usize,
    },

    /// A triangle uses the same vertex twice.
    #[error("triangle {triangle} repeats vertex {index}")]
    RepeatedIndex {
        /// Triangle number.
        triangle: usize,
        /// Repeated index.
        index: u32,
    },
}
