//! A loading session: library, palette and template cache in one place.

use std::io;
use std::path::Path;

use brickmesh_library::{
    canonical_name, FileSource, FsSource, PartLibrary, PathTable, PrefetchStats, Prefetcher,
};
use brickmesh_model::{
    compute_bounds, BuildStats, MeshNode, ObjectBounds, ObjectId, RenderMesh, SceneObject,
    TemplateCache, TreeBuilder,
};
use brickmesh_parse::ColorPalette;
use brickmesh_raytrace::PickingSession;
use tracing::{debug, info, info_span};

use crate::config::Config;
use crate::error::{Error, Result};

/// Colour definitions looked up in the library when no palette file is
/// configured.
pub const LIBRARY_PALETTE: &str = "ldconfig.ldr";

/// Counters for one model load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Reference-closure prefetch.
    pub prefetch: PrefetchStats,
    /// Tree building.
    pub build: BuildStats,
}

/// A fully built model tree.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    /// Canonical name the model was loaded under.
    pub name: String,
    /// Root of the tree.
    pub root: MeshNode,
    /// Load counters.
    pub stats: LoadStats,
}

/// Owns everything a load needs; nothing is global.
#[derive(Debug)]
pub struct Session {
    config: Config,
    palette: ColorPalette,
    library: PartLibrary,
    templates: TemplateCache,
}

impl Session {
    /// Session over the library roots named in `config`.
    pub fn open(config: Config) -> Result<Self> {
        let source = FsSource::new(config.library.roots.iter().cloned());
        Self::new(config, source)
    }

    /// Session over `source`.
    ///
    /// The lookup table and palette files named in `config` are read from
    /// disk. Without a palette file, [`LIBRARY_PALETTE`] is read from
    /// `source` if present; otherwise only the fallback colours are known.
    pub fn new(config: Config, source: impl FileSource + 'static) -> Result<Self> {
        config.validate()?;

        let table = match &config.library.path_table {
            Some(path) => PathTable::parse(&read_file(path)?)?,
            None => PathTable::new(),
        };

        let palette = match &config.library.palette {
            Some(path) => {
                let text = read_file(path)?;
                let lines: Vec<&str> = text.lines().collect();
                ColorPalette::parse(&path.display().to_string(), &lines)?
            }
            None => match source.read_lines(LIBRARY_PALETTE) {
                Ok(lines) => ColorPalette::parse(LIBRARY_PALETTE, &lines)?,
                Err(e) if e.kind() == io::ErrorKind::NotFound => ColorPalette::default(),
                Err(source_err) => {
                    return Err(Error::Io {
                        path: source.display_path(LIBRARY_PALETTE),
                        source: source_err,
                    })
                }
            },
        };
        debug!(
            colours = palette.len(),
            table_entries = table.len(),
            "session ready"
        );

        Ok(Self::with_parts(config, PartLibrary::with_table(source, table), palette))
    }

    /// Session over an already assembled library and palette.
    pub fn with_parts(config: Config, library: PartLibrary, palette: ColorPalette) -> Self {
        Self {
            config,
            palette,
            library,
            templates: TemplateCache::new(),
        }
    }

    /// The configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The colour palette.
    pub fn palette(&self) -> &ColorPalette {
        &self.palette
    }

    /// The part library and its file cache.
    pub fn library(&self) -> &PartLibrary {
        &self.library
    }

    /// Built part templates.
    pub fn templates(&self) -> &TemplateCache {
        &self.templates
    }

    /// A prefetcher over `name`'s reference closure, for callers that want
    /// to interleave file reads with other work before calling
    /// [`load_model`](Self::load_model).
    pub fn prefetcher(&mut self, name: &str) -> Prefetcher<'_> {
        Prefetcher::new(&mut self.library, name)
    }

    /// Read every file `name` needs, then build its tree.
    ///
    /// On failure the caches keep whatever completed: files read so far and
    /// templates of fully built parts. Nothing is cached for the part that
    /// failed.
    pub fn load_model(&mut self, name: &str) -> Result<LoadedModel> {
        let name = canonical_name(name);
        let _span = info_span!("load_model", name = %name).entered();

        let prefetch = Prefetcher::new(&mut self.library, &name).run()?;
        let mut builder = TreeBuilder::new(
            &mut self.library,
            &mut self.templates,
            self.config.model.merge.policy(),
            self.config.build_options(),
        );
        let root = builder.build(&name)?;
        let build = builder.stats();

        info!(
            files = prefetch.files_loaded,
            templates = build.templates_built,
            nodes = root.node_count(),
            vertices = root.total_vertices(),
            triangles = root.total_triangles(),
            stud_vertices = root.total_stud_vertices(),
            "loaded model"
        );
        Ok(LoadedModel {
            name,
            root,
            stats: LoadStats { prefetch, build },
        })
    }

    /// Place a loaded model in the world at the origin.
    pub fn scene_object(&self, model: &LoadedModel, id: ObjectId) -> SceneObject {
        SceneObject::new(id, model.name.clone(), model.root.clone())
    }

    /// Bounds of `object` using the configured source preference.
    pub fn bounds(&self, object: &SceneObject) -> Option<ObjectBounds> {
        compute_bounds(object, &self.config.bounds_sources(), true)
    }

    /// Colour-resolved render buffers of a tree.
    pub fn render(&self, node: &MeshNode) -> RenderMesh {
        RenderMesh::from_node(node, &self.palette, &self.config.render_options())
    }

    /// Picking index over `objects`.
    pub fn picking<'a>(&self, objects: impl IntoIterator<Item = &'a SceneObject>) -> PickingSession {
        PickingSession::new(objects, self.config.pick_options())
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use brickmesh_library::MemorySource;

    #[test]
    fn test_palette_from_library() {
        let src = MemorySource::new().with(
            "ldconfig.ldr",
            "0 !COLOUR Red CODE 4 VALUE #C91A09 EDGE #333333\n",
        );
        let session = Session::new(Config::default(), src).unwrap();
        assert!(session.palette().get(4).is_some());
        assert!(session.palette().get(16).is_some());
    }

    #[test]
    fn test_fallback_palette() {
        let session = Session::new(Config::default(), MemorySource::new()).unwrap();
        assert_eq!(session.palette().len(), 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.bounds.sources.clear();
        let err = Session::new(config, MemorySource::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_missing_side_file() {
        let mut config = Config::default();
        config.library.path_table = Some("/nonexistent/parts.lst".into());
        let err = Session::new(config, MemorySource::new()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
