//! Flat vertex/colour/index buffers.

use brickmesh_math::{Aabb3, Point3, Transform};

use crate::color::{effective_color, ColorCode};
use crate::error::MeshError;

/// Triangle geometry of one part: positions, per-vertex colour codes and a
/// flat index list where every 3 consecutive indices form a triangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Colour code per vertex. Same length as `vertices`.
    pub colors: Vec<ColorCode>,
    /// Triangle indices into `vertices`.
    pub triangles: Vec<u32>,
}

impl MeshBuffers {
    /// Create empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.triangles.len() / 3
    }

    /// True if there is no vertex.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Append a vertex and return its index.
    pub fn push_vertex(&mut self, position: Point3, color: ColorCode) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        self.colors.push(color);
        index
    }

    /// Append a triangle by vertex indices.
    pub fn push_triangle(&mut self, tri: [u32; 3]) {
        self.triangles.extend_from_slice(&tri);
    }

    /// Indices of triangle `i`.
    pub fn triangle(&self, i: usize) -> [u32; 3] {
        [
            self.triangles[3 * i],
            self.triangles[3 * i + 1],
            self.triangles[3 * i + 2],
        ]
    }

    /// Corner positions of triangle `i`.
    pub fn triangle_points(&self, i: usize) -> [Point3; 3] {
        self.triangle(i).map(|v| self.vertices[v as usize])
    }

    /// Sum of triangle areas.
    pub fn surface_area(&self) -> f64 {
        (0..self.num_triangles())
            .map(|i| {
                let [a, b, c] = self.triangle_points(i);
                (b - a).cross(&(c - a)).norm() * 0.5
            })
            .sum()
    }

    /// Bounds of the vertex positions, `None` when empty.
    pub fn bounds(&self) -> Option<Aabb3> {
        Aabb3::from_points(&self.vertices)
    }

    /// Check the buffer invariants.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.vertices.len() != self.colors.len() {
            return Err(MeshError::LengthMismatch {
                vertices: self.vertices.len(),
                colors: self.colors.len(),
            });
        }
        if self.triangles.len() % 3 != 0 {
            return Err(MeshError::IncompleteTriangle(self.triangles.len()));
        }
        let len = self.vertices.len();
        if let Some((pos, &index)) = self
            .triangles
            .iter()
            .enumerate()
            .find(|&(_, &i)| i as usize >= len)
        {
            return Err(MeshError::IndexOutOfRange {
                triangle: pos / 3,
                index,
                len,
            });
        }
        for (triangle, tri) in self.triangles.chunks_exact(3).enumerate() {
            let index = if tri[0] == tri[1] || tri[0] == tri[2] {
                tri[0]
            } else if tri[1] == tri[2] {
                tri[1]
            } else {
                continue;
            };
            return Err(MeshError::RepeatedIndex { triangle, index });
        }
        Ok(())
    }

    /// Fold `other` into these buffers.
    ///
    /// Positions are mapped through `transform`, colour codes resolved
    /// against `parent_color`, indices offset by the current vertex count.
    /// With `invert` every triangle `(a, b, c)` is stored as `(a, c, b)`.
    pub fn merge_from(
        &mut self,
        other: &MeshBuffers,
        transform: &Transform,
        invert: bool,
        parent_color: ColorCode,
    ) {
        let offset = self.vertices.len() as u32;
        self.vertices.reserve(other.vertices.len());
        self.vertices
            .extend(other.vertices.iter().map(|p| transform.apply_point(p)));
        self.colors.extend(
            other
                .colors
                .iter()
                .map(|&c| effective_color(c, parent_color)),
        );
        self.triangles.reserve(other.triangles.len());
        for tri in other.triangles.chunks_exact(3) {
            let (a, b, c) = (tri[0] + offset, tri[1] + offset, tri[2] + offset);
            if invert {
                self.triangles.extend_from_slice(&[a, c, b]);
            } else {
                self.triangles.extend_from_slice(&[a, b, c]);
            }
        }
    }
}
