//! Recursive model tree builder.
//!
//! Resolves a named model into a tree of [`MeshNode`]s. Every distinct part
//! is parsed, resolved and welded once into a template; each reference then
//! instances the template and either keeps it as a child or folds it into
//! the referencing part, as the [`MergePolicy`] decides.

use std::sync::Arc;

use brickmesh_library::{canonical_name, PartKind, PartLibrary};
use brickmesh_mesh::{weld_with_stats, WeldOptions};
use brickmesh_parse::parse_part;
use tracing::{debug, info_span, trace};

use crate::error::{ModelError, Result};
use crate::node::MeshNode;
use crate::policy::{MergePolicy, ReferenceInfo};
use crate::template::TemplateCache;

/// Tree builder settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildOptions {
    /// Weld template buffers before caching them. `None` skips welding.
    pub weld: Option<WeldOptions>,
    /// Deepest reference nesting accepted.
    pub max_depth: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            weld: Some(WeldOptions::default()),
            max_depth: 64,
        }
    }
}

/// Counters collected while building.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Templates parsed and built.
    pub templates_built: usize,
    /// References served from the template cache.
    pub template_hits: usize,
    /// Template vertices before welding.
    pub vertices_before_weld: usize,
    /// Template vertices after welding.
    pub vertices_after_weld: usize,
}

/// Whether a canonical name is a stud primitive (`stud*.dat` in `p/`).
pub fn is_stud(name: &str, kind: PartKind) -> bool {
    let file = name.rsplit('/').next().unwrap_or(name);
    kind == PartKind::Primitive && file.starts_with("stud") && file.ends_with(".dat")
}

/// Builds model trees from a part library into a template cache.
pub struct TreeBuilder<'a> {
    library: &'a mut PartLibrary,
    templates: &'a mut TemplateCache,
    policy: &'a dyn MergePolicy,
    options: BuildOptions,
    in_progress: Vec<String>,
    stats: BuildStats,
}

impl<'a> TreeBuilder<'a> {
    /// New builder over `library`, caching into `templates`.
    pub fn new(
        library: &'a mut PartLibrary,
        templates: &'a mut TemplateCache,
        policy: &'a dyn MergePolicy,
        options: BuildOptions,
    ) -> Self {
        Self {
            library,
            templates,
            policy,
            options,
            in_progress: Vec::new(),
            stats: BuildStats::default(),
        }
    }

    /// Counters so far.
    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// Resolve `name` into an instanced tree with identity placement,
    /// inherited colour and no inversion.
    pub fn build(&mut self, name: &str) -> Result<MeshNode> {
        let canonical = canonical_name(name);
        let _span = info_span!("build_model", name = %canonical).entered();
        self.in_progress.clear();
        let template = self.template(&canonical, 0)?;
        Ok(MeshNode::clone(&template))
    }

    fn template(&mut self, name: &str, depth: usize) -> Result<Arc<MeshNode>> {
        if let Some(template) = self.templates.get(name) {
            trace!(name, "template cache hit");
            self.stats.template_hits += 1;
            return Ok(Arc::clone(template));
        }
        if self.in_progress.iter().any(|n| n == name) {
            let mut chain = self.in_progress.clone();
            chain.push(name.to_string());
            return Err(ModelError::CyclicReference {
                name: name.to_string(),
                chain,
            });
        }
        if depth > self.options.max_depth {
            return Err(ModelError::DepthExceeded {
                name: name.to_string(),
                depth: self.options.max_depth,
            });
        }

        self.in_progress.push(name.to_string());
        let built = self.build_template(name, depth);
        self.in_progress.pop();
        let node = Arc::new(built?);
        self.templates.insert(name, Arc::clone(&node));
        Ok(node)
    }

    fn build_template(&mut self, name: &str, depth: usize) -> Result<MeshNode> {
        let file = self.library.load(name)?;
        let (lines, kind) = (Arc::clone(&file.lines), file.kind);
        let parsed = parse_part(name, &lines)?;

        let mut node = MeshNode::new(name, kind);
        node.bfc_enabled = parsed.bfc_enabled();
        node.geometry = Arc::new(parsed.buffers);

        for reference in &parsed.references {
            let child_name = canonical_name(&reference.name);
            let template = self.template(&child_name, depth + 1)?;
            let instance =
                template.instance(reference.transform, reference.color, reference.invert);

            if is_stud(&child_name, template.kind) {
                node.merge_as_studs(&instance);
                continue;
            }
            let info = ReferenceInfo {
                name: &child_name,
                kind: template.kind,
                parent: name,
                parent_kind: kind,
            };
            if self.policy.keep_as_child(&info) {
                node.children.push(instance);
            } else {
                node.merge_child(instance);
            }
        }

        let before = node.geometry.num_vertices() + node.studs.num_vertices();
        if let Some(options) = &self.options.weld {
            if !node.geometry.is_empty() {
                let (welded, _) = weld_with_stats(&node.geometry, options);
                node.geometry = Arc::new(welded);
            }
            if !node.studs.is_empty() {
                let (welded, _) = weld_with_stats(&node.studs, options);
                node.studs = Arc::new(welded);
            }
        }
        let after = node.geometry.num_vertices() + node.studs.num_vertices();

        self.stats.templates_built += 1;
        self.stats.vertices_before_weld += before;
        self.stats.vertices_after_weld += after;
        debug!(
            name,
            kind = ?kind,
            vertices_before = before,
            vertices_after = after,
            triangles = node.geometry.num_triangles(),
            children = node.children.len(),
            "built template"
        );
        Ok(node)
    }
}
