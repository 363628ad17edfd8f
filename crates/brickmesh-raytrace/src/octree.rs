//! Fixed-depth triangle octree.
//!
//! The tree is fully subdivided up front. A triangle is stored at the first
//! node, walking down from the root, whose centre planes it straddles, or at
//! a leaf. Queries visit only nodes whose bounds the ray enters.

use brickmesh_math::{Aabb3, Point3, Vec3};

use crate::ray::Ray;
use crate::triangle::{intersect_triangle, RaycastHit, Triangle};

/// One octree cell.
#[derive(Debug, Clone)]
pub struct OctreeNode {
    /// Cell centre.
    pub center: Point3,
    /// Cell half-size.
    pub extents: Vec3,
    /// Children in octant order: bit 0 selects +x, bit 1 +y, bit 2 +z.
    pub children: Option<Box<[OctreeNode; 8]>>,
    /// Triangles stored at this cell.
    pub triangles: Vec<Triangle>,
}

impl OctreeNode {
    fn build(center: Point3, extents: Vec3, depth: u32) -> Self {
        let children = (depth > 0).then(|| {
            let half = extents / 2.0;
            Box::new(std::array::from_fn(|octant| {
                let offset = Vec3::new(
                    if octant & 1 == 0 { -half.x } else { half.x },
                    if octant & 2 == 0 { -half.y } else { half.y },
                    if octant & 4 == 0 { -half.z } else { half.z },
                );
                OctreeNode::build(center + offset, half, depth - 1)
            }))
        });
        Self {
            center,
            extents,
            children,
            triangles: Vec::new(),
        }
    }

    /// Cell bounds.
    pub fn bounds(&self) -> Aabb3 {
        Aabb3::from_center_extents(self.center, self.extents)
    }

    /// Whether this cell has children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    fn insert(&mut self, tri: Triangle, aabb: &Aabb3) {
        if let Some(index) = octant(&self.center, aabb) {
            if let Some(children) = self.children.as_deref_mut() {
                children[index].insert(tri, aabb);
                return;
            }
        }
        self.triangles.push(tri);
    }

    fn query(&self, ray: &Ray, whole_line: bool, hits: &mut Vec<RaycastHit>) {
        hits.extend(
            self.triangles
                .iter()
                .filter_map(|tri| intersect_triangle(tri, ray)),
        );
        if let Some(children) = &self.children {
            for child in children.iter() {
                if enters(ray, &child.bounds(), whole_line) {
                    child.query(ray, whole_line, hits);
                }
            }
        }
    }

    fn count(&self, depth: usize, out: &mut Vec<usize>) {
        if out.len() <= depth {
            out.resize(depth + 1, 0);
        }
        out[depth] += self.triangles.len();
        if let Some(children) = &self.children {
            for child in children.iter() {
                child.count(depth + 1, out);
            }
        }
    }
}

fn enters(ray: &Ray, bounds: &Aabb3, whole_line: bool) -> bool {
    if whole_line {
        ray.intersect_line_aabb(bounds).is_some()
    } else {
        ray.intersect_aabb(bounds).is_some()
    }
}

/// Octant of `aabb` within a cell centred at `center`, or `None` when the
/// box straddles one of the centre planes.
fn octant(center: &Point3, aabb: &Aabb3) -> Option<usize> {
    let mut index = 0;
    for axis in 0..3 {
        let (min, max, c) = (aabb.min[axis], aabb.max[axis], center[axis]);
        if min < c && max >= c {
            return None;
        }
        if min >= c {
            index |= 1 << axis;
        }
    }
    Some(index)
}

/// A triangle octree over a fixed volume.
#[derive(Debug, Clone)]
pub struct Octree {
    root: OctreeNode,
    depth: u32,
    len: usize,
}

impl Octree {
    /// Fully subdivided tree over `bounds`, `depth` levels below the root.
    pub fn build(bounds: &Aabb3, depth: u32) -> Self {
        Self {
            root: OctreeNode::build(bounds.center(), bounds.extents(), depth),
            depth,
            len: 0,
        }
    }

    /// Root cell.
    pub fn root(&self) -> &OctreeNode {
        &self.root
    }

    /// Subdivision depth.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Number of stored triangles.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no triangle was inserted.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Store `tri` at the first cell whose centre planes it straddles, or at
    /// the leaf of the octants it falls into.
    pub fn insert(&mut self, tri: Triangle) {
        let aabb = tri.aabb();
        self.root.insert(tri, &aabb);
        self.len += 1;
    }

    /// Hits in the cells `ray` enters ahead of its origin, nearest first.
    /// Empty if the root is missed.
    ///
    /// Triangles stored in a visited cell are tested in full, so a hit
    /// behind the origin may still be reported.
    pub fn query(&self, ray: &Ray) -> Vec<RaycastHit> {
        self.query_cells(ray, false)
    }

    /// Every hit along the whole line through `ray`, including those
    /// behind its origin, sorted by signed distance.
    pub fn query_line(&self, ray: &Ray) -> Vec<RaycastHit> {
        self.query_cells(ray, true)
    }

    fn query_cells(&self, ray: &Ray, whole_line: bool) -> Vec<RaycastHit> {
        let mut hits = Vec::new();
        if !enters(ray, &self.root.bounds(), whole_line) {
            return hits;
        }
        self.root.query(ray, whole_line, &mut hits);
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Triangles stored per depth level, root first.
    pub fn triangles_per_level(&self) -> Vec<usize> {
        let mut out = Vec::new();
        self.root.count(0, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brickmesh_model::ObjectId;

    fn bounds() -> Aabb3 {
        Aabb3::new(Point3::new(-8.0, -8.0, -8.0), Point3::new(8.0, 8.0, 8.0))
    }

    fn small_tri(x: f64, y: f64, z: f64, id: u32) -> Triangle {
        Triangle::new(
            Point3::new(x, y, z),
            Point3::new(x + 0.5, y, z),
            Point3::new(x, y + 0.5, z),
            ObjectId(id),
        )
    }

    #[test]
    fn test_build_structure() {
        let tree = Octree::build(&bounds(), 2);
        let root = tree.root();
        let children = root.children.as_ref().unwrap();
        // octant 5: +x, -y, +z
        assert_eq!(children[5].center, Point3::new(4.0, -4.0, 4.0));
        assert_eq!(children[5].extents, Vec3::new(4.0, 4.0, 4.0));
        let grand = children[0].children.as_ref().unwrap();
        assert!(grand[7].is_leaf());
        assert_eq!(grand[7].center, Point3::new(-2.0, -2.0, -2.0));
    }

    #[test]
    fn test_contained_triangle_goes_deep() {
        let mut tree = Octree::build(&bounds(), 3);
        tree.insert(small_tri(5.0, 5.0, 5.0, 1));
        assert_eq!(tree.triangles_per_level(), vec![0, 0, 0, 1]);
        let leaf = &tree.root().children.as_ref().unwrap()[7];
        assert!(leaf.triangles.is_empty());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_straddling_triangle_stays_at_root() {
        let mut tree = Octree::build(&bounds(), 3);
        tree.insert(small_tri(-0.25, 3.0, 3.0, 1));
        assert_eq!(tree.root().triangles.len(), 1);

        // Straddles a level-1 centre plane (x = 4) only
        tree.insert(small_tri(3.75, 1.0, 1.0, 2));
        assert_eq!(tree.triangles_per_level()[..2], [1, 1]);
    }

    #[test]
    fn test_plane_touching_min_side_goes_positive() {
        assert_eq!(
            octant(
                &Point3::origin(),
                &Aabb3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0))
            ),
            Some(7)
        );
        // max == center with min below straddles
        assert_eq!(
            octant(
                &Point3::origin(),
                &Aabb3::new(Point3::new(-1.0, 1.0, 1.0), Point3::new(0.0, 2.0, 2.0))
            ),
            None
        );
    }

    #[test]
    fn test_query_sorted_and_filtered() {
        let mut tree = Octree::build(&bounds(), 3);
        tree.insert(small_tri(5.0, 5.0, 6.0, 1));
        tree.insert(small_tri(5.0, 5.0, 2.0, 2));
        tree.insert(small_tri(-5.0, -5.0, 2.0, 3));
        let ray = Ray::new(Point3::new(5.1, 5.1, 7.5), Vec3::new(0.0, 0.0, -1.0));
        let hits = tree.query(&ray);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].object, ObjectId(1));
        assert_eq!(hits[1].object, ObjectId(2));
        assert!(hits[0].distance < hits[1].distance);

        let away = Ray::new(Point3::new(20.0, 20.0, 20.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(tree.query(&away).is_empty());
        assert!(tree.query_line(&away).is_empty());
    }

    #[test]
    fn test_query_line_reaches_cells_behind_origin() {
        let mut tree = Octree::build(&bounds(), 3);
        tree.insert(small_tri(5.0, 5.0, 6.0, 1));
        tree.insert(small_tri(5.0, 5.0, 2.0, 2));
        assert_eq!(tree.triangles_per_level(), vec![0, 0, 0, 2]);

        // Origin below both leaves, looking away from them
        let ray = Ray::new(Point3::new(5.1, 5.1, 1.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(tree.query(&ray).is_empty());

        let hits = tree.query_line(&ray);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].object, ObjectId(1));
        assert!((hits[0].distance + 5.0).abs() < 1e-9);
        assert_eq!(hits[1].object, ObjectId(2));
        assert!((hits[1].distance + 1.0).abs() < 1e-9);
    }
}
