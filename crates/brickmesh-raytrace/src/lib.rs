#![warn(missing_docs)]

//! Ray picking for brickmesh.
//!
//! A [`PickingSession`] flattens a set of placed [`SceneObject`]s into
//! world-space triangles, indexes them in a fixed-depth [`Octree`], and
//! answers ray casts with every front-facing hit sorted by distance.
//!
//! # Example
//!
//! ```
//! use brickmesh_math::{Point3, Vec3};
//! use brickmesh_raytrace::{intersect_triangle, ObjectId, Ray, Triangle};
//!
//! let tri = Triangle::new(
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     ObjectId(0),
//! );
//! let ray = Ray::new(Point3::new(0.25, 0.25, 1.0), Vec3::new(0.0, 0.0, -1.0));
//! let hit = intersect_triangle(&tri, &ray).unwrap();
//! assert!((hit.distance - 1.0).abs() < 1e-12);
//! ```
//!
//! [`SceneObject`]: brickmesh_model::SceneObject

mod octree;
mod picking;
mod ray;
mod triangle;

pub use brickmesh_model::ObjectId;
pub use octree::{Octree, OctreeNode};
pub use picking::{PickOptions, PickingSession};
pub use ray::Ray;
pub use triangle::{intersect_triangle, RaycastHit, Triangle, DET_EPSILON};
