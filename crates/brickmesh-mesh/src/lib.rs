#![warn(missing_docs)]

//! Flat triangle buffers for brickmesh.
//!
//! A part's geometry lives in a [`MeshBuffers`]: positions, one colour code
//! per vertex, and a flat triangle index list. This crate provides
//!
//! - [`MeshBuffers::merge_from`] to fold a child part into its parent under a
//!   transform, colour inheritance and winding parity
//! - [`weld`] to collapse coincident, smoothly connected vertices of the same
//!   colour before a part template is cached
//! - the colour-code inheritance rule shared by parser, builder and renderer

mod buffers;
pub mod color;
mod error;
mod weld;

pub use buffers::MeshBuffers;
pub use color::{effective_color, ColorCode, EDGE_COLOR, MAIN_COLOR};
pub use error::MeshError;
pub use weld::{weld, weld_with_stats, SpatialKey, WeldOptions, WeldStats};
