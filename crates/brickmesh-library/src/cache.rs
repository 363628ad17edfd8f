//! Raw file cache keyed by canonical name.

use std::collections::HashMap;
use std::sync::Arc;

/// Where a file was found, which decides how the tree builder treats it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartKind {
    /// A model file (`models/`, a library root, or a container's main model).
    Model,
    /// A complete part (`parts/`).
    Part,
    /// A part fragment (`parts/s/`).
    Subpart,
    /// A geometric primitive (`p/`).
    Primitive,
    /// A sub-model embedded in a container file.
    Embedded,
}

impl PartKind {
    /// Infer the kind from a relative library path.
    pub fn from_path(path: &str) -> Self {
        let p = path.replace('\\', "/").to_lowercase();
        let p = p.trim_start_matches("./");
        let in_dir = |dir: &str| p.starts_with(dir) || p.contains(&format!("/{dir}"));
        if in_dir("parts/s/") {
            Self::Subpart
        } else if in_dir("parts/") {
            Self::Part
        } else if in_dir("p/") {
            Self::Primitive
        } else {
            Self::Model
        }
    }

    /// Whether references to this kind usually stand for a whole brick.
    pub fn is_part_or_model(self) -> bool {
        matches!(self, Self::Part | Self::Model | Self::Embedded)
    }
}

/// One cached file.
#[derive(Debug, Clone)]
pub struct CachedFile {
    /// Raw lines, shared with every reader.
    pub lines: Arc<[String]>,
    /// Kind inferred from where the file was found.
    pub kind: PartKind,
    /// Set once every file this one references has been queued for loading.
    pub expanded: bool,
}

impl CachedFile {
    /// New, unexpanded entry.
    pub fn new(lines: impl Into<Arc<[String]>>, kind: PartKind) -> Self {
        Self {
            lines: lines.into(),
            kind,
            expanded: false,
        }
    }
}

/// Canonical name to cached file.
#[derive(Debug, Clone, Default)]
pub struct FileCache {
    files: HashMap<String, CachedFile>,
}

impl FileCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a canonical name.
    pub fn get(&self, name: &str) -> Option<&CachedFile> {
        self.files.get(name)
    }

    /// Whether `name` is cached.
    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    /// Insert unless already present. Returns whether it was inserted.
    pub fn insert(&mut self, name: String, file: CachedFile) -> bool {
        use std::collections::hash_map::Entry;
        match self.files.entry(name) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(file);
                true
            }
        }
    }

    /// Flag `name` as expanded. Returns false if it is not cached.
    pub fn mark_expanded(&mut self, name: &str) -> bool {
        match self.files.get_mut(name) {
            Some(file) => {
                file.expanded = true;
                true
            }
            None => false,
        }
    }

    /// Drop one entry.
    pub fn remove(&mut self, name: &str) -> Option<CachedFile> {
        self.files.remove(name)
    }

    /// Number of cached files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
