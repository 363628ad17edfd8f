#![warn(missing_docs)]

//! Model trees for brickmesh.
//!
//! The [`TreeBuilder`] turns a part name into a [`MeshNode`] tree: each
//! distinct part is parsed and welded once into a cached template, and every
//! reference instances that template with its own placement, colour and
//! winding parity. A [`MergePolicy`] decides which references stay separate
//! nodes and which are folded into their parent; stud primitives always go
//! to the parent's stud buffer.
//!
//! Finished trees can be flattened into a colour-resolved [`RenderMesh`] or
//! placed in the world as a [`SceneObject`] for bounding volumes.

mod builder;
mod error;
mod node;
mod policy;
mod render;
mod scene;
mod template;

pub use builder::{is_stud, BuildOptions, BuildStats, TreeBuilder};
pub use error::{ModelError, Result};
pub use node::{InstanceState, MeshNode};
pub use policy::{FlattenAll, KeepAll, KeepParts, MergePolicy, ReferenceInfo};
pub use render::{world_buffers, RenderMesh, RenderOptions, RenderVertex};
pub use scene::{
    compute_bounds, BoundsSource, ObjectBounds, ObjectId, OrientedBox, SceneObject, BOX_EDGES,
    DEFAULT_BOUNDS_SOURCES,
};
pub use template::{TemplateCache, TemplateId};
