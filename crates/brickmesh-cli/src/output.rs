//! Text and JSON rendering of command results.

use std::collections::BTreeMap;

use anyhow::Result;
use brickmesh::math::{Aabb3, Point3};
use brickmesh::{BoundsSource, ColorEntry, LoadedModel, MeshNode, ObjectBounds, RaycastHit, Rgba};
use serde::Serialize;

/// A command result printable as text or JSON.
pub trait Report: Serialize {
    /// Human-readable form.
    fn text(&self) -> String;
}

/// Print `report` to stdout in the chosen format.
pub fn emit<R: Report>(json: bool, report: &R) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", report.text());
    }
    Ok(())
}

#[derive(Serialize)]
pub struct BoxReport {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl From<&Aabb3> for BoxReport {
    fn from(aabb: &Aabb3) -> Self {
        Self {
            min: xyz(&aabb.min),
            max: xyz(&aabb.max),
        }
    }
}

#[derive(Serialize)]
pub struct InfoReport {
    pub name: String,
    pub bfc_enabled: bool,
    pub nodes: usize,
    /// Kept child nodes by part name.
    pub parts: BTreeMap<String, usize>,
    pub files_loaded: usize,
    pub templates_built: usize,
    pub template_hits: usize,
    pub vertices_before_weld: usize,
    pub vertices_after_weld: usize,
    pub vertices: usize,
    pub triangles: usize,
    pub stud_vertices: usize,
    pub bounds: Option<BoxReport>,
}

impl InfoReport {
    pub fn new(model: &LoadedModel, bounds: Option<ObjectBounds>) -> Self {
        let mut parts = BTreeMap::new();
        count_parts(&model.root, &mut parts);
        let root = &model.root;
        let build = model.stats.build;
        Self {
            name: model.name.clone(),
            bfc_enabled: root.bfc_enabled,
            nodes: root.node_count(),
            parts,
            files_loaded: model.stats.prefetch.files_loaded,
            templates_built: build.templates_built,
            template_hits: build.template_hits,
            vertices_before_weld: build.vertices_before_weld,
            vertices_after_weld: build.vertices_after_weld,
            vertices: root.total_vertices(),
            triangles: root.total_triangles(),
            stud_vertices: root.total_stud_vertices(),
            bounds: bounds.map(|b| BoxReport::from(&b.aabb)),
        }
    }
}

fn count_parts(node: &MeshNode, parts: &mut BTreeMap<String, usize>) {
    for child in &node.children {
        *parts.entry(child.name.clone()).or_default() += 1;
        count_parts(child, parts);
    }
}

impl Report for InfoReport {
    fn text(&self) -> String {
        let mut out = format!(
            "{}\n  nodes: {}\n  vertices: {} ({} studs)\n  triangles: {}\n  \
             welding: {} -> {} template vertices\n  templates: {} built, {} reused\n  \
             files read: {}\n  certified winding: {}\n",
            self.name,
            self.nodes,
            self.vertices,
            self.stud_vertices,
            self.triangles,
            self.vertices_before_weld,
            self.vertices_after_weld,
            self.templates_built,
            self.template_hits,
            self.files_loaded,
            if self.bfc_enabled { "yes" } else { "no" },
        );
        match &self.bounds {
            Some(b) => out.push_str(&format!(
                "  bounds: {} .. {}\n",
                fmt_xyz(b.min),
                fmt_xyz(b.max)
            )),
            None => out.push_str("  bounds: none\n"),
        }
        if !self.parts.is_empty() {
            out.push_str("  parts:\n");
            for (name, count) in &self.parts {
                out.push_str(&format!("    {count:>5}  {name}\n"));
            }
        }
        out.trim_end().to_string()
    }
}

#[derive(Serialize)]
pub struct BoundsReport {
    #[serde(flatten)]
    pub aabb: BoxReport,
    pub source: String,
    pub corners: Vec<[f64; 3]>,
}

impl BoundsReport {
    pub fn new(bounds: &ObjectBounds) -> Self {
        Self {
            aabb: BoxReport::from(&bounds.aabb),
            source: source_name(bounds.source).to_string(),
            corners: bounds.oriented().corners().iter().map(xyz).collect(),
        }
    }
}

impl Report for BoundsReport {
    fn text(&self) -> String {
        let mut out = format!(
            "min: {}\nmax: {}\nsource: {}\ncorners:",
            fmt_xyz(self.aabb.min),
            fmt_xyz(self.aabb.max),
            self.source
        );
        for c in &self.corners {
            out.push_str(&format!("\n  {}", fmt_xyz(*c)));
        }
        out
    }
}

#[derive(Serialize)]
pub struct HitReport {
    pub object: u32,
    pub distance: f64,
    pub point: [f64; 3],
    pub barycentric: [f64; 2],
}

impl From<RaycastHit> for HitReport {
    fn from(hit: RaycastHit) -> Self {
        Self {
            object: hit.object.0,
            distance: hit.distance,
            point: xyz(&hit.point),
            barycentric: [hit.barycentric.0, hit.barycentric.1],
        }
    }
}

impl Report for Option<HitReport> {
    fn text(&self) -> String {
        match self {
            Some(hit) => format!(
                "hit at {} (distance {:.4}, barycentric {:.4}, {:.4})",
                fmt_xyz(hit.point),
                hit.distance,
                hit.barycentric[0],
                hit.barycentric[1]
            ),
            None => "no hit".to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct PaletteEntry {
    pub code: u32,
    pub name: String,
    pub value: String,
    pub edge: String,
    pub alpha: u8,
}

impl From<&ColorEntry> for PaletteEntry {
    fn from(entry: &ColorEntry) -> Self {
        Self {
            code: entry.code,
            name: entry.name.clone(),
            value: hex(entry.value),
            edge: hex(entry.edge),
            alpha: entry.value.a,
        }
    }
}

impl Report for Vec<PaletteEntry> {
    fn text(&self) -> String {
        self.iter()
            .map(|e| {
                let alpha = if e.alpha < 255 {
                    format!(" alpha {}", e.alpha)
                } else {
                    String::new()
                };
                format!("{:>5}  {:<24} {} edge {}{alpha}", e.code, e.name, e.value, e.edge)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn source_name(source: BoundsSource) -> &'static str {
    match source {
        BoundsSource::Collider => "collider",
        BoundsSource::StaticBatch => "static_batch",
        BoundsSource::Mesh => "mesh",
    }
}

fn xyz(p: &Point3) -> [f64; 3] {
    [p.x, p.y, p.z]
}

fn fmt_xyz(v: [f64; 3]) -> String {
    format!("({:.3}, {:.3}, {:.3})", v[0], v[1], v[2])
}

fn hex(c: Rgba) -> String {
    format!("#{:02X}{:02X}{:02X}", c.r, c.g, c.b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miss_text() {
        let none: Option<HitReport> = None;
        assert_eq!(none.text(), "no hit");
        assert_eq!(serde_json::to_string(&none).unwrap(), "null");
    }

    #[test]
    fn test_palette_text() {
        let entries = vec![PaletteEntry {
            code: 47,
            name: "Trans_Clear".into(),
            value: hex(Rgba::from_rgb24(0xFCFCFC)),
            edge: hex(Rgba::from_rgb24(0xC3C3C3)),
            alpha: 128,
        }];
        let text = entries.text();
        assert!(text.contains("#FCFCFC"));
        assert!(text.ends_with("alpha 128"));
    }
}
