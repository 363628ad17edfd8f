#![warn(missing_docs)]

//! brickmesh: load brick-CAD models, weld them, bound them and pick them.
//!
//! A [`Session`] owns the part library, the colour palette and the template
//! cache. [`Session::load_model`] prefetches a model's whole reference
//! closure, then builds its tree of [`MeshNode`]s with each distinct part
//! parsed and welded once. Loaded models can be placed as
//! [`SceneObject`]s, bounded, flattened into render buffers, or indexed for
//! ray picking.
//!
//! # Example
//!
//! ```
//! use brickmesh::{Config, MemorySource, ObjectId, Ray, Session};
//! use brickmesh::math::{Point3, Vec3};
//!
//! let source = MemorySource::new()
//!     .with("models/tile.ldr", "1 4 0 0 0 1 0 0 0 1 0 0 0 1 tile.dat\n")
//!     .with("parts/tile.dat", "0 BFC CERTIFY CCW\n3 16 0 0 0 1 0 0 0 0 1\n");
//!
//! let mut session = Session::new(Config::default(), source)?;
//! let model = session.load_model("tile.ldr")?;
//! assert_eq!(model.root.children.len(), 1);
//!
//! let object = session.scene_object(&model, ObjectId(1));
//! let picking = session.picking([&object]);
//! let ray = Ray::new(Point3::new(0.2, 5.0, 0.2), Vec3::new(0.0, -1.0, 0.0));
//! assert_eq!(picking.pick_object(&ray), Some(ObjectId(1)));
//! # Ok::<(), brickmesh::Error>(())
//! ```

mod config;
mod error;
mod session;

pub use config::{
    BoundsConfig, BoundsSourceName, Config, LibraryConfig, MergeMode, ModelConfig,
    PickingConfig, StudConfig, WeldConfig,
};
pub use error::{Error, Result};
pub use session::{LoadStats, LoadedModel, Session, LIBRARY_PALETTE};

pub use brickmesh_library::{FileSource, FsSource, MemorySource, PathTable, PrefetchStep};
pub use brickmesh_mesh::{effective_color, ColorCode, MeshBuffers, WeldOptions};
pub use brickmesh_model::{
    BoundsSource, MeshNode, ObjectBounds, ObjectId, OrientedBox, RenderMesh, RenderVertex,
    SceneObject,
};
pub use brickmesh_parse::{ColorEntry, ColorPalette, Rgba};
pub use brickmesh_raytrace::{PickOptions, PickingSession, Ray, RaycastHit};

/// Math types.
pub mod math {
    pub use brickmesh_math::{Aabb3, Dir3, Point3, Rotation, Transform, Vec3};
}
