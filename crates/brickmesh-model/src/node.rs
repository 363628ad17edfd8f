//! The model tree node.

use std::sync::Arc;

use brickmesh_library::PartKind;
use brickmesh_math::{Aabb3, Transform};
use brickmesh_mesh::{effective_color, ColorCode, MeshBuffers, MAIN_COLOR};

/// One logical part in a model tree.
///
/// Geometry is shared through `Arc` so that instancing a cached template is
/// a cheap structural clone. Mutating an instance's geometry copies it first.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshNode {
    /// Canonical name of the source part or document.
    pub name: String,
    /// Where the source file was found.
    pub kind: PartKind,
    /// Main triangle buffers.
    pub geometry: Arc<MeshBuffers>,
    /// Stud geometry, kept apart so it can be dropped or budgeted at render time.
    pub studs: Arc<MeshBuffers>,
    /// Whether the part declared a certified winding.
    pub bfc_enabled: bool,
    /// Winding flip relative to the parent.
    pub invert_next: bool,
    /// Colour code; 16 inherits the parent's colour.
    pub brick_color: ColorCode,
    /// Placement in the parent's frame.
    pub local_transform: Transform,
    /// Child parts kept as separate nodes.
    pub children: Vec<MeshNode>,
}

/// Accumulated placement, colour and parity of a node within a tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceState {
    /// Local-to-world transform.
    pub transform: Transform,
    /// Resolved colour the sentinel 16 maps to.
    pub color: ColorCode,
    /// Accumulated winding parity.
    pub invert: bool,
}

impl Default for InstanceState {
    fn default() -> Self {
        Self {
            transform: Transform::identity(),
            color: MAIN_COLOR,
            invert: false,
        }
    }
}

impl InstanceState {
    /// State of `node` placed under this state.
    pub fn child(&self, node: &MeshNode) -> InstanceState {
        InstanceState {
            transform: self.transform.then(&node.local_transform),
            color: effective_color(node.brick_color, self.color),
            invert: self.invert ^ node.invert_next,
        }
    }
}

impl MeshNode {
    /// Empty node.
    pub fn new(name: impl Into<String>, kind: PartKind) -> Self {
        Self {
            name: name.into(),
            kind,
            geometry: Arc::new(MeshBuffers::new()),
            studs: Arc::new(MeshBuffers::new()),
            bfc_enabled: false,
            invert_next: false,
            brick_color: MAIN_COLOR,
            local_transform: Transform::identity(),
            children: Vec::new(),
        }
    }

    /// Vertex positions of the main buffers.
    pub fn vertices(&self) -> &[brickmesh_math::Point3] {
        &self.geometry.vertices
    }

    /// Per-vertex colour codes of the main buffers.
    pub fn color_indices(&self) -> &[ColorCode] {
        &self.geometry.colors
    }

    /// Flat triangle indices of the main buffers.
    pub fn triangles(&self) -> &[u32] {
        &self.geometry.triangles
    }

    /// Mutable main buffers, copied first if shared.
    pub fn geometry_mut(&mut self) -> &mut MeshBuffers {
        Arc::make_mut(&mut self.geometry)
    }

    /// Mutable stud buffers, copied first if shared.
    pub fn studs_mut(&mut self) -> &mut MeshBuffers {
        Arc::make_mut(&mut self.studs)
    }

    /// Clone this template and stamp per-reference placement on the copy.
    pub fn instance(&self, transform: Transform, color: ColorCode, invert: bool) -> MeshNode {
        MeshNode {
            local_transform: transform,
            brick_color: color,
            invert_next: invert,
            ..self.clone()
        }
    }

    /// Fold `child` into this node.
    ///
    /// The child's main and stud buffers are appended under its local
    /// transform, colour and parity; its own children are re-parented onto
    /// this node with composed placement.
    pub fn merge_child(&mut self, child: MeshNode) {
        let MeshNode {
            geometry,
            studs,
            bfc_enabled,
            invert_next,
            brick_color,
            local_transform,
            children,
            ..
        } = child;

        if !geometry.is_empty() {
            self.geometry_mut()
                .merge_from(&geometry, &local_transform, invert_next, brick_color);
            self.bfc_enabled &= bfc_enabled;
        }
        if !studs.is_empty() {
            self.studs_mut()
                .merge_from(&studs, &local_transform, invert_next, brick_color);
        }
        for mut grandchild in children {
            grandchild.local_transform = local_transform.then(&grandchild.local_transform);
            grandchild.brick_color = effective_color(grandchild.brick_color, brick_color);
            grandchild.invert_next ^= invert_next;
            self.children.push(grandchild);
        }
    }

    /// Fold the whole of `child` (geometry, studs and subtree) into this
    /// node's stud buffers.
    pub fn merge_as_studs(&mut self, child: &MeshNode) {
        let studs = self.studs_mut();
        child.walk(&InstanceState::default(), &mut |node, state| {
            for buffers in [&node.geometry, &node.studs] {
                if !buffers.is_empty() {
                    studs.merge_from(buffers, &state.transform, state.invert, state.color);
                }
            }
        });
    }

    /// Visit this node and every descendant with its accumulated state.
    ///
    /// `parent` is the state of this node's parent; the callback receives
    /// each node's own accumulated state.
    pub fn walk<F>(&self, parent: &InstanceState, f: &mut F)
    where
        F: FnMut(&MeshNode, &InstanceState),
    {
        let state = parent.child(self);
        f(self, &state);
        for child in &self.children {
            child.walk(&state, f);
        }
    }

    /// Bounds of this node's own main and stud geometry in its local frame.
    pub fn local_bounds(&self) -> Option<Aabb3> {
        let points = self.geometry.vertices.iter().chain(&self.studs.vertices);
        Aabb3::from_points(points)
    }

    /// Number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(MeshNode::node_count).sum::<usize>()
    }

    /// Main-buffer vertex count of this subtree.
    pub fn total_vertices(&self) -> usize {
        self.geometry.num_vertices()
            + self.children.iter().map(MeshNode::total_vertices).sum::<usize>()
    }

    /// Main-buffer triangle count of this subtree.
    pub fn total_triangles(&self) -> usize {
        self.geometry.num_triangles()
            + self.children.iter().map(MeshNode::total_triangles).sum::<usize>()
    }

    /// Stud vertex count of this subtree.
    pub fn total_stud_vertices(&self) -> usize {
        self.studs.num_vertices()
            + self
                .children
                .iter()
                .map(MeshNode::total_stud_vertices)
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brickmesh_math::Point3;

    fn tri(color: ColorCode, z: f64) -> MeshBuffers {
        let mut m = MeshBuffers::new();
        let a = m.push_vertex(Point3::new(0.0, 0.0, z), color);
        let b = m.push_vertex(Point3::new(1.0, 0.0, z), color);
        let c = m.push_vertex(Point3::new(0.0, 1.0, z), color);
        m.push_triangle([a, b, c]);
        m
    }

    fn leaf(name: &str, color: ColorCode) -> MeshNode {
        let mut n = MeshNode::new(name, PartKind::Primitive);
        n.geometry = Arc::new(tri(color, 0.0));
        n.bfc_enabled = true;
        n
    }

    #[test]
    fn test_instance_shares_geometry() {
        let template = leaf("a.dat", MAIN_COLOR);
        let inst = template.instance(Transform::translation(1.0, 0.0, 0.0), 4, true);
        assert!(Arc::ptr_eq(&template.geometry, &inst.geometry));
        assert_eq!(inst.brick_color, 4);
        assert!(inst.invert_next);
        assert_eq!(template.brick_color, MAIN_COLOR);

        let mut inst = inst;
        inst.geometry_mut().vertices[0].x = 5.0;
        assert!(!Arc::ptr_eq(&template.geometry, &inst.geometry));
        assert_eq!(template.vertices()[0].x, 0.0);
    }

    #[test]
    fn test_merge_child_applies_placement() {
        let mut parent = MeshNode::new("p.dat", PartKind::Part);
        parent.bfc_enabled = true;
        let child = leaf("c.dat", MAIN_COLOR).instance(Transform::translation(0.0, 0.0, 2.0), 4, true);
        parent.merge_child(child);

        assert_eq!(parent.vertices().len(), 3);
        assert_eq!(parent.vertices()[1], Point3::new(1.0, 0.0, 2.0));
        assert_eq!(parent.color_indices(), &[4, 4, 4]);
        assert_eq!(parent.triangles(), &[0, 2, 1]);
        assert!(parent.bfc_enabled);
    }

    #[test]
    fn test_merge_child_reparents_grandchildren() {
        let mut middle = MeshNode::new("m.dat", PartKind::Part);
        middle.children.push(leaf("g.dat", MAIN_COLOR).instance(
            Transform::translation(1.0, 0.0, 0.0),
            MAIN_COLOR,
            true,
        ));
        let middle = middle.instance(Transform::translation(0.0, 5.0, 0.0), 2, true);

        let mut root = MeshNode::new("r.ldr", PartKind::Model);
        root.merge_child(middle);
        assert_eq!(root.children.len(), 1);
        let g = &root.children[0];
        assert_eq!(
            g.local_transform.apply_point(&Point3::origin()),
            Point3::new(1.0, 5.0, 0.0)
        );
        assert_eq!(g.brick_color, 2);
        assert!(!g.invert_next);
    }

    #[test]
    fn test_merge_clears_bfc_for_uncertified_child() {
        let mut parent = leaf("p.dat", 1);
        let mut child = leaf("c.dat", 1);
        child.bfc_enabled = false;
        parent.merge_child(child);
        assert!(!parent.bfc_enabled);
    }

    #[test]
    fn test_merge_as_studs() {
        let mut stud = leaf("stud.dat", MAIN_COLOR);
        stud.children.push(leaf("inner.dat", 7));
        let inst = stud.instance(Transform::translation(0.0, 1.0, 0.0), 4, false);

        let mut part = leaf("3001.dat", 1);
        part.merge_as_studs(&inst);
        assert_eq!(part.vertices().len(), 3);
        assert_eq!(part.studs.num_vertices(), 6);
        assert_eq!(part.studs.colors, vec![4, 4, 4, 7, 7, 7]);
        assert_eq!(part.studs.vertices[0], Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_walk_accumulates_state() {
        let mut root = MeshNode::new("r", PartKind::Model);
        let mut mid = leaf("m", MAIN_COLOR).instance(Transform::translation(1.0, 0.0, 0.0), 4, true);
        mid.children
            .push(leaf("l", MAIN_COLOR).instance(Transform::translation(0.0, 1.0, 0.0), MAIN_COLOR, true));
        root.children.push(mid);

        let mut seen = Vec::new();
        root.walk(&InstanceState::default(), &mut |node, state| {
            seen.push((
                node.name.clone(),
                state.transform.apply_point(&Point3::origin()),
                state.color,
                state.invert,
            ));
        });
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[1], ("m".into(), Point3::new(1.0, 0.0, 0.0), 4, true));
        assert_eq!(seen[2], ("l".into(), Point3::new(1.0, 1.0, 0.0), 4, false));
        assert_eq!(root.node_count(), 3);
        assert_eq!(root.total_vertices(), 6);
        assert_eq!(root.total_triangles(), 2);
    }
}
