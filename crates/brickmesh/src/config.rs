//! Session configuration.
//!
//! Loaded from TOML; every section and field is optional and falls back to
//! its default:
//!
//! ```toml
//! [library]
//! roots = ["/usr/share/ldraw"]
//! path_table = "parts.lst"
//!
//! [weld]
//! smoothing_angle_deg = 45.0
//!
//! [model]
//! merge = "flatten_all"
//! studs = { include = true, vertex_budget = 200000 }
//!
//! [picking]
//! octree_depth = 4
//!
//! [bounds]
//! sources = ["mesh"]
//! ```

use std::path::{Path, PathBuf};

use brickmesh_mesh::WeldOptions;
use brickmesh_model::{
    BoundsSource, BuildOptions, FlattenAll, KeepAll, KeepParts, MergePolicy, RenderOptions,
};
use brickmesh_raytrace::PickOptions;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Everything a [`Session`](crate::Session) can be tuned with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where parts come from.
    pub library: LibraryConfig,
    /// Template welding.
    pub weld: WeldConfig,
    /// Tree building.
    pub model: ModelConfig,
    /// Ray picking.
    pub picking: PickingConfig,
    /// Bounding volumes.
    pub bounds: BoundsConfig,
}

/// Library locations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Search directories, in priority order.
    pub roots: Vec<PathBuf>,
    /// Optional name-to-path lookup table.
    pub path_table: Option<PathBuf>,
    /// Optional colour definition file. Without one, `ldconfig.ldr` is
    /// looked up in the library.
    pub palette: Option<PathBuf>,
}

/// Welding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeldConfig {
    /// Weld templates before caching them.
    pub enabled: bool,
    /// Maximum angle between face normals sharing a vertex (degrees).
    pub smoothing_angle_deg: f64,
    /// Position quantization factor.
    pub quantization_scale: f64,
}

impl Default for WeldConfig {
    fn default() -> Self {
        let options = WeldOptions::default();
        Self {
            enabled: true,
            smoothing_angle_deg: options.smoothing_angle_deg,
            quantization_scale: options.quantization_scale,
        }
    }
}

impl WeldConfig {
    /// Weld options, or `None` when welding is disabled.
    pub fn options(&self) -> Option<WeldOptions> {
        self.enabled.then_some(WeldOptions {
            smoothing_angle_deg: self.smoothing_angle_deg,
            quantization_scale: self.quantization_scale,
        })
    }
}

/// Which references stay separate nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    /// Fold everything into the root.
    FlattenAll,
    /// Keep parts and sub-models, fold subparts and primitives.
    #[default]
    KeepParts,
    /// Keep every reference.
    KeepAll,
}

impl MergeMode {
    /// The matching built-in policy.
    pub fn policy(self) -> &'static dyn MergePolicy {
        match self {
            Self::FlattenAll => &FlattenAll,
            Self::KeepParts => &KeepParts,
            Self::KeepAll => &KeepAll,
        }
    }
}

/// Stud buffer handling at render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudConfig {
    /// Emit studs at all.
    pub include: bool,
    /// Cap on emitted stud vertices.
    pub vertex_budget: Option<usize>,
}

impl Default for StudConfig {
    fn default() -> Self {
        Self {
            include: true,
            vertex_budget: None,
        }
    }
}

/// Tree building settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Deepest reference nesting accepted.
    pub max_reference_depth: usize,
    /// Merge policy.
    pub merge: MergeMode,
    /// Stud handling.
    pub studs: StudConfig,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            max_reference_depth: BuildOptions::default().max_depth,
            merge: MergeMode::default(),
            studs: StudConfig::default(),
        }
    }
}

/// Picking settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickingConfig {
    /// Octree subdivision depth.
    pub octree_depth: u32,
    /// Drop hits behind the ray origin.
    pub cull_behind_origin: bool,
}

impl Default for PickingConfig {
    fn default() -> Self {
        let options = PickOptions::default();
        Self {
            octree_depth: options.octree_depth,
            cull_behind_origin: options.cull_behind_origin,
        }
    }
}

/// A bounding box source as named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsSourceName {
    /// Local collider box.
    Collider,
    /// World static-batch box.
    StaticBatch,
    /// Mesh geometry.
    Mesh,
}

impl From<BoundsSourceName> for BoundsSource {
    fn from(name: BoundsSourceName) -> Self {
        match name {
            BoundsSourceName::Collider => BoundsSource::Collider,
            BoundsSourceName::StaticBatch => BoundsSource::StaticBatch,
            BoundsSourceName::Mesh => BoundsSource::Mesh,
        }
    }
}

/// Bounding volume settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundsConfig {
    /// Sources to try, in order.
    pub sources: Vec<BoundsSourceName>,
}

impl Default for BoundsConfig {
    fn default() -> Self {
        Self {
            sources: vec![
                BoundsSourceName::Collider,
                BoundsSourceName::StaticBatch,
                BoundsSourceName::Mesh,
            ],
        }
    }
}

/// Deepest octree accepted; each level multiplies the node count by 8.
const MAX_OCTREE_DEPTH: u32 = 8;

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        let weld = &self.weld;
        if !(weld.smoothing_angle_deg > 0.0 && weld.smoothing_angle_deg <= 180.0) {
            return Err(Error::InvalidConfig(
                "weld.smoothing_angle_deg must be in (0, 180]".into(),
            ));
        }
        if !(weld.quantization_scale > 0.0 && weld.quantization_scale.is_finite()) {
            return Err(Error::InvalidConfig(
                "weld.quantization_scale must be positive".into(),
            ));
        }
        if self.model.max_reference_depth == 0 {
            return Err(Error::InvalidConfig(
                "model.max_reference_depth must be at least 1".into(),
            ));
        }
        if self.picking.octree_depth > MAX_OCTREE_DEPTH {
            return Err(Error::InvalidConfig(format!(
                "picking.octree_depth must be at most {MAX_OCTREE_DEPTH}"
            )));
        }
        if self.bounds.sources.is_empty() {
            return Err(Error::InvalidConfig(
                "bounds.sources must name at least one source".into(),
            ));
        }
        Ok(())
    }

    /// Options for the tree builder.
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            weld: self.weld.options(),
            max_depth: self.model.max_reference_depth,
        }
    }

    /// Options for render output.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            include_studs: self.model.studs.include,
            stud_vertex_budget: self.model.studs.vertex_budget,
        }
    }

    /// Options for picking sessions.
    pub fn pick_options(&self) -> PickOptions {
        PickOptions {
            octree_depth: self.picking.octree_depth,
            cull_behind_origin: self.picking.cull_behind_origin,
        }
    }

    /// Bounds sources in preference order.
    pub fn bounds_sources(&self) -> Vec<BoundsSource> {
        self.bounds.sources.iter().map(|&s| s.into()).collect()
    }
}
