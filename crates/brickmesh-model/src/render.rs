//! World-space render buffers.
//!
//! A model tree is flattened by walking every node with its accumulated
//! transform, colour and winding parity. Colour codes are then resolved
//! through a [`ColorPalette`] and triangles are split by translucency.

use std::collections::HashSet;

use brickmesh_mesh::{ColorCode, MeshBuffers, MAIN_COLOR};
use brickmesh_parse::{ColorPalette, Rgba};
use bytemuck::{Pod, Zeroable};
use tracing::debug;

use crate::node::{InstanceState, MeshNode};

/// What to emit when flattening a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit stud buffers.
    pub include_studs: bool,
    /// Stop emitting stud buffers once this many stud vertices were emitted.
    /// A stud buffer that does not fit the remaining budget is skipped whole.
    pub stud_vertex_budget: Option<usize>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_studs: true,
            stud_vertex_budget: None,
        }
    }
}

/// Interleaved vertex for GPU upload.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct RenderVertex {
    /// World position.
    pub position: [f32; 3],
    /// Linear RGBA.
    pub color: [f32; 4],
}

/// Flattened, colour-resolved triangles of a whole tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderMesh {
    /// World positions.
    pub positions: Vec<[f32; 3]>,
    /// RGBA per vertex.
    pub colors: Vec<[f32; 4]>,
    /// Indices of fully opaque triangles.
    pub opaque: Vec<u32>,
    /// Indices of triangles with at least one translucent vertex.
    pub transparent: Vec<u32>,
}

/// Flatten `node` (placed under `parent`) into one world-space buffer set,
/// colour codes resolved but not yet mapped to RGBA.
pub fn world_buffers(
    node: &MeshNode,
    parent: &InstanceState,
    options: &RenderOptions,
) -> MeshBuffers {
    let mut out = MeshBuffers::new();
    let mut stud_budget = options.stud_vertex_budget.unwrap_or(usize::MAX);
    node.walk(parent, &mut |node, state| {
        out.merge_from(&node.geometry, &state.transform, state.invert, state.color);
        if options.include_studs && !node.studs.is_empty() {
            let n = node.studs.num_vertices();
            if n <= stud_budget {
                stud_budget -= n;
                out.merge_from(&node.studs, &state.transform, state.invert, state.color);
            }
        }
    });
    out
}

impl RenderMesh {
    /// Flatten `node` with the root at its own local placement.
    pub fn from_node(node: &MeshNode, palette: &ColorPalette, options: &RenderOptions) -> Self {
        let world = world_buffers(node, &InstanceState::default(), options);
        Self::from_buffers(&world, palette)
    }

    /// Resolve the colour codes of already flattened buffers.
    pub fn from_buffers(buffers: &MeshBuffers, palette: &ColorPalette) -> Self {
        let fallback = palette
            .rgba(MAIN_COLOR)
            .unwrap_or(Rgba::from_rgb24(0x7F7F7F))
            .to_f32();
        let mut unknown: HashSet<ColorCode> = HashSet::new();
        let colors: Vec<[f32; 4]> = buffers
            .colors
            .iter()
            .map(|&code| match palette.rgba(code) {
                Some(rgba) => rgba.to_f32(),
                None => {
                    if unknown.insert(code) {
                        debug!(code, "unknown colour code, using main colour");
                    }
                    fallback
                }
            })
            .collect();

        let mut opaque = Vec::new();
        let mut transparent = Vec::new();
        for tri in buffers.triangles.chunks_exact(3) {
            let translucent = tri.iter().any(|&i| colors[i as usize][3] < 1.0);
            if translucent {
                transparent.extend_from_slice(tri);
            } else {
                opaque.extend_from_slice(tri);
            }
        }

        Self {
            positions: buffers
                .vertices
                .iter()
                .map(|p| [p.x as f32, p.y as f32, p.z as f32])
                .collect(),
            colors,
            opaque,
            transparent,
        }
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles, opaque and transparent.
    pub fn num_triangles(&self) -> usize {
        (self.opaque.len() + self.transparent.len()) / 3
    }

    /// Interleaved vertices.
    pub fn vertices(&self) -> Vec<RenderVertex> {
        self.positions
            .iter()
            .zip(&self.colors)
            .map(|(&position, &color)| RenderVertex { position, color })
            .collect()
    }

    /// Raw bytes of an interleaved vertex slice.
    pub fn as_bytes(vertices: &[RenderVertex]) -> &[u8] {
        bytemuck::cast_slice(vertices)
    }
}
