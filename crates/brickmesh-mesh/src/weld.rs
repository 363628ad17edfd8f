//! Vertex welding.
//!
//! Collapses vertices that sit on the same quantized grid cell, carry the
//! same colour code and belong to triangles whose normals differ by no more
//! than a smoothing angle. Parts arrive from the parser with one vertex per
//! triangle corner, so welding is what makes smooth shading and compact
//! buffers possible.
//!
//! Comparison is scoped to one grid cell at a time; vertices in different
//! cells are never compared.

use std::collections::HashMap;

use brickmesh_math::{Point3, Vec3};
use tracing::{debug, debug_span};

use crate::buffers::MeshBuffers;

/// Welding parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeldOptions {
    /// Maximum angle between adjacent face normals, in degrees.
    pub smoothing_angle_deg: f64,
    /// Grid scale: coordinates are multiplied by this and rounded.
    pub quantization_scale: f64,
}

impl Default for WeldOptions {
    fn default() -> Self {
        Self {
            smoothing_angle_deg: 60.0,
            quantization_scale: 100_000.0,
        }
    }
}

/// Vertex counts before and after welding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeldStats {
    /// Vertex count of the input.
    pub vertices_before: usize,
    /// Vertex count of the output.
    pub vertices_after: usize,
    /// Triangle count (unchanged by welding).
    pub triangles: usize,
}

/// Quantized position used to bucket near-identical vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpatialKey {
    x: i64,
    y: i64,
    z: i64,
}

impl SpatialKey {
    /// Quantize a point with the given grid scale.
    pub fn from_point(p: &Point3, scale: f64) -> Self {
        Self {
            x: (p.x * scale).round() as i64,
            y: (p.y * scale).round() as i64,
            z: (p.z * scale).round() as i64,
        }
    }
}

/// One use of a vertex by a triangle.
#[derive(Debug, Clone, Copy)]
struct Occurrence {
    vertex: u32,
    triangle: u32,
}

/// Weld `mesh`, returning the reduced buffers.
pub fn weld(mesh: &MeshBuffers, options: &WeldOptions) -> MeshBuffers {
    weld_with_stats(mesh, options).0
}

/// Weld `mesh`, returning the reduced buffers and vertex counts.
pub fn weld_with_stats(mesh: &MeshBuffers, options: &WeldOptions) -> (MeshBuffers, WeldStats) {
    let _span = debug_span!("weld", vertices = mesh.num_vertices()).entered();
    let mut stats = WeldStats {
        vertices_before: mesh.num_vertices(),
        vertices_after: mesh.num_vertices(),
        triangles: mesh.num_triangles(),
    };

    if mesh.is_empty() {
        return (mesh.clone(), stats);
    }

    let keys: Vec<SpatialKey> = mesh
        .vertices
        .iter()
        .map(|p| SpatialKey::from_point(p, options.quantization_scale))
        .collect();

    // Cheap exit: no two distinct vertices share a cell.
    if !has_shared_cell(&keys) {
        return (mesh.clone(), stats);
    }

    let normals = face_normals(mesh);
    let max_angle = options.smoothing_angle_deg.to_radians();

    let mut groups: HashMap<SpatialKey, Vec<Occurrence>> = HashMap::new();
    for (t, tri) in mesh.triangles.chunks_exact(3).enumerate() {
        for &v in tri {
            groups.entry(keys[v as usize]).or_default().push(Occurrence {
                vertex: v,
                triangle: t as u32,
            });
        }
    }

    // Triangles using each chain, tracked at the chain's head
    let mut uses: Vec<Vec<u32>> = vec![Vec::new(); mesh.num_vertices()];
    for (t, tri) in mesh.triangles.chunks_exact(3).enumerate() {
        for &v in tri {
            uses[v as usize].push(t as u32);
        }
    }

    let mut replace: Vec<Option<u32>> = vec![None; mesh.num_vertices()];
    let mut any = false;
    for occurrences in groups.values() {
        if occurrences.len() < 2 {
            continue;
        }
        for (i, a) in occurrences.iter().enumerate() {
            for b in &occurrences[i + 1..] {
                if a.vertex == b.vertex || a.triangle == b.triangle {
                    continue;
                }
                if mesh.colors[a.vertex as usize] != mesh.colors[b.vertex as usize] {
                    continue;
                }
                let na = &normals[a.triangle as usize];
                let nb = &normals[b.triangle as usize];
                let angle = na.dot(nb).clamp(-0.99999, 0.99999).acos();
                if angle <= max_angle {
                    any |= link(&mut replace, &mut uses, a.vertex, b.vertex);
                }
            }
        }
    }

    if !any {
        return (mesh.clone(), stats);
    }

    let representative = resolve_chains(&mut replace);
    let out = rebuild(mesh, &representative);
    stats.vertices_after = out.num_vertices();
    debug!(
        before = stats.vertices_before,
        after = stats.vertices_after,
        triangles = stats.triangles,
        "welded vertices"
    );
    (out, stats)
}

fn has_shared_cell(keys: &[SpatialKey]) -> bool {
    let mut first: HashMap<SpatialKey, usize> = HashMap::with_capacity(keys.len());
    keys.iter()
        .enumerate()
        .any(|(i, key)| *first.entry(*key).or_insert(i) != i)
}

fn face_normals(mesh: &MeshBuffers) -> Vec<Vec3> {
    (0..mesh.num_triangles())
        .map(|i| {
            let [a, b, c] = mesh.triangle_points(i);
            let n = (b - a).cross(&(c - a));
            let len = n.norm();
            if len > 0.0 {
                n / len
            } else {
                Vec3::zeros()
            }
        })
        .collect()
}

/// Follow replacement links to the current head of `v`'s chain.
fn head(replace: &[Option<u32>], mut v: u32) -> u32 {
    let mut steps = 0;
    while let Some(next) = replace[v as usize] {
        v = next;
        steps += 1;
        if steps > replace.len() {
            break;
        }
    }
    v
}

/// Join the chains of `a` and `b`: the later head is replaced by the earlier
/// one. Chains that share a triangle are left apart, since joining them would
/// collapse that triangle. Returns whether anything changed.
fn link(replace: &mut [Option<u32>], uses: &mut [Vec<u32>], a: u32, b: u32) -> bool {
    let ha = head(replace, a);
    let hb = head(replace, b);
    if ha == hb {
        return false;
    }
    let (keep, drop) = if ha < hb { (ha, hb) } else { (hb, ha) };
    let (keep, drop) = (keep as usize, drop as usize);
    if uses[keep].iter().any(|t| uses[drop].contains(t)) {
        return false;
    }
    let moved = std::mem::take(&mut uses[drop]);
    uses[keep].extend(moved);
    replace[drop] = Some(keep as u32);
    true
}

/// Resolve every vertex to the end of its replacement chain.
///
/// A chain that loops back on itself has the link that would close the loop
/// cancelled, so the vertex at that point stays a representative.
fn resolve_chains(replace: &mut [Option<u32>]) -> Vec<u32> {
    let mut representative = vec![0u32; replace.len()];
    let mut path: Vec<u32> = Vec::new();
    for v in 0..replace.len() as u32 {
        path.clear();
        path.push(v);
        let mut current = v;
        while let Some(next) = replace[current as usize] {
            if path.contains(&next) {
                replace[current as usize] = None;
                break;
            }
            path.push(next);
            current = next;
        }
        representative[v as usize] = current;
    }
    representative
}

fn rebuild(mesh: &MeshBuffers, representative: &[u32]) -> MeshBuffers {
    let mut new_index = vec![u32::MAX; mesh.num_vertices()];
    let mut out = MeshBuffers::new();
    for (v, &rep) in representative.iter().enumerate() {
        if rep as usize == v {
            new_index[v] = out.push_vertex(mesh.vertices[v], mesh.colors[v]);
        }
    }
    out.triangles = mesh
        .triangles
        .iter()
        .map(|&v| new_index[representative[v as usize] as usize])
        .collect();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAIN_COLOR;

    /// Two triangles forming a flat unit square, one vertex per corner per
    /// triangle (6 vertices, as the parser produces them).
    fn split_square(color_b: u32) -> MeshBuffers {
        let mut m = MeshBuffers::new();
        let p = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let a0 = m.push_vertex(p[0], MAIN_COLOR);
        let a1 = m.push_vertex(p[1], MAIN_COLOR);
        let a2 = m.push_vertex(p[2], MAIN_COLOR);
        m.push_triangle([a0, a1, a2]);
        let b0 = m.push_vertex(p[0], color_b);
        let b2 = m.push_vertex(p[2], color_b);
        let b3 = m.push_vertex(p[3], color_b);
        m.push_triangle([b0, b2, b3]);
        m
    }

    /// Two triangles meeting at a 90 degree crease along the x axis.
    fn creased() -> MeshBuffers {
        let mut m = MeshBuffers::new();
        let a0 = m.push_vertex(Point3::new(0.0, 0.0, 0.0), 1);
        let a1 = m.push_vertex(Point3::new(1.0, 0.0, 0.0), 1);
        let a2 = m.push_vertex(Point3::new(0.0, 1.0, 0.0), 1);
        m.push_triangle([a0, a1, a2]);
        let b0 = m.push_vertex(Point3::new(0.0, 0.0, 0.0), 1);
        let b1 = m.push_vertex(Point3::new(0.0, 0.0, 1.0), 1);
        let b2 = m.push_vertex(Point3::new(1.0, 0.0, 0.0), 1);
        m.push_triangle([b0, b1, b2]);
        m
    }

    #[test]
    fn test_weld_flat_square() {
        let mesh = split_square(MAIN_COLOR);
        let (out, stats) = weld_with_stats(&mesh, &WeldOptions::default());
        assert_eq!(stats.vertices_before, 6);
        assert_eq!(out.num_vertices(), 4);
        assert_eq!(out.num_triangles(), 2);
        assert_eq!(out.triangle(0), [0, 1, 2]);
        assert_eq!(out.triangle(1), [0, 2, 3]);
        assert!(out.validate().is_ok());
    }

    #[test]
    fn test_weld_respects_color() {
        let mesh = split_square(4);
        let out = weld(&mesh, &WeldOptions::default());
        assert_eq!(out.num_vertices(), 6);
        assert_eq!(out, mesh);
    }

    #[test]
    fn test_weld_respects_angle() {
        let mesh = creased();
        let out = weld(&mesh, &WeldOptions::default());
        assert_eq!(out.num_vertices(), 6);

        let wide = WeldOptions {
            smoothing_angle_deg: 95.0,
            ..WeldOptions::default()
        };
        let out = weld(&mesh, &wide);
        assert_eq!(out.num_vertices(), 4);
    }

    #[test]
    fn test_weld_quantization_tolerance() {
        let mut mesh = split_square(MAIN_COLOR);
        mesh.vertices[3].x += 2e-6;
        let out = weld(&mesh, &WeldOptions::default());
        assert_eq!(out.num_vertices(), 4);

        let mut far = split_square(MAIN_COLOR);
        far.vertices[3].x += 1e-3;
        let out = weld(&far, &WeldOptions::default());
        assert_eq!(out.num_vertices(), 5);
    }

    #[test]
    fn test_weld_empty_is_noop() {
        let mesh = MeshBuffers::new();
        let (out, stats) = weld_with_stats(&mesh, &WeldOptions::default());
        assert!(out.is_empty());
        assert_eq!(stats.vertices_after, 0);
    }

    #[test]
    fn test_weld_idempotent() {
        // A fan of four triangles around a shared centre, mixed with a crease
        let mut mesh = MeshBuffers::new();
        let center = Point3::new(0.0, 0.0, 0.0);
        let ring = [
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
        ];
        for i in 0..4 {
            let c = mesh.push_vertex(center, 7);
            let a = mesh.push_vertex(ring[i], 7);
            let b = mesh.push_vertex(ring[(i + 1) % 4], 7);
            mesh.push_triangle([c, a, b]);
        }
        let top = mesh.push_vertex(Point3::new(0.0, 0.0, 1.0), 7);
        let r0 = mesh.push_vertex(ring[0], 7);
        let c = mesh.push_vertex(center, 7);
        mesh.push_triangle([c, r0, top]);

        let once = weld(&mesh, &WeldOptions::default());
        let twice = weld(&once, &WeldOptions::default());
        assert!(once.num_vertices() < mesh.num_vertices());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_weld_preserves_triangles_and_area() {
        let mesh = split_square(MAIN_COLOR);
        let out = weld(&mesh, &WeldOptions::default());
        assert_eq!(out.num_triangles(), mesh.num_triangles());
        approx::assert_relative_eq!(out.surface_area(), mesh.surface_area(), epsilon = 1e-9);
        for i in 0..out.num_triangles() {
            let [a, b, c] = out.triangle(i);
            assert!(a != b && b != c && a != c);
        }
    }

    #[test]
    fn test_weld_keeps_sliver_corners_apart() {
        // Two corners of one triangle share a grid cell
        let mut sliver = MeshBuffers::new();
        let a = sliver.push_vertex(Point3::new(0.0, 0.0, 0.0), MAIN_COLOR);
        let b = sliver.push_vertex(Point3::new(2e-6, 0.0, 0.0), MAIN_COLOR);
        let c = sliver.push_vertex(Point3::new(0.0, 1.0, 0.0), MAIN_COLOR);
        sliver.push_triangle([a, b, c]);
        let out = weld(&sliver, &WeldOptions::default());
        assert_eq!(out.num_vertices(), 3);
        assert_eq!(out.triangle(0), [0, 1, 2]);

        // Coincident corners give a zero normal; a wide angle must not weld them
        let mut flat = MeshBuffers::new();
        let a = flat.push_vertex(Point3::new(0.0, 0.0, 0.0), MAIN_COLOR);
        let b = flat.push_vertex(Point3::new(0.0, 0.0, 0.0), MAIN_COLOR);
        let c = flat.push_vertex(Point3::new(0.0, 1.0, 0.0), MAIN_COLOR);
        flat.push_triangle([a, b, c]);
        let wide = WeldOptions {
            smoothing_angle_deg: 120.0,
            ..WeldOptions::default()
        };
        assert!(weld(&flat, &wide).validate().is_ok());
    }

    #[test]
    fn test_weld_neighbour_does_not_bridge_sliver() {
        // The second triangle's corner sits in the sliver's shared cell and
        // may join one sliver corner, never both
        let mut mesh = MeshBuffers::new();
        let a = mesh.push_vertex(Point3::new(0.0, 0.0, 0.0), MAIN_COLOR);
        let b = mesh.push_vertex(Point3::new(2e-6, 0.0, 0.0), MAIN_COLOR);
        let c = mesh.push_vertex(Point3::new(0.0, 1.0, 0.0), MAIN_COLOR);
        mesh.push_triangle([a, b, c]);
        let d = mesh.push_vertex(Point3::new(0.0, 0.0, 0.0), MAIN_COLOR);
        let e = mesh.push_vertex(Point3::new(0.0, -1.0, 0.0), MAIN_COLOR);
        let f = mesh.push_vertex(Point3::new(1.0, 0.0, 0.0), MAIN_COLOR);
        mesh.push_triangle([d, e, f]);

        let out = weld(&mesh, &WeldOptions::default());
        assert_eq!(out.num_triangles(), 2);
        assert_eq!(out.num_vertices(), 5);
        assert!(out.validate().is_ok());
    }

    #[test]
    fn test_resolve_chains_breaks_cycle() {
        // 0 -> 1 -> 2 -> 0 is not produced by `link`, but must not hang
        let mut replace = vec![Some(1), Some(2), Some(0), None];
        let reps = resolve_chains(&mut replace);
        assert_eq!(reps[3], 3);
        // The link closing the loop was cancelled, leaving vertex 2 as head
        assert_eq!(replace[2], None);
        assert_eq!(reps, vec![2, 2, 2, 3]);
    }
}
