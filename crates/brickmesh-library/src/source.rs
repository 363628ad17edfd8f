//! Where file contents come from.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use brickmesh_parse::canonical_name;

/// A readable store of library files addressed by relative path.
pub trait FileSource {
    /// Read the whole file at `path` (relative, `/`-separated).
    ///
    /// A file that does not exist must be reported as
    /// [`io::ErrorKind::NotFound`] so resolution can try the next candidate.
    fn read_text(&self, path: &str) -> io::Result<String>;

    /// Read the file as lines.
    fn read_lines(&self, path: &str) -> io::Result<Vec<String>> {
        Ok(self
            .read_text(path)?
            .lines()
            .map(str::to_string)
            .collect())
    }

    /// Location of `path` for error messages.
    fn display_path(&self, path: &str) -> PathBuf {
        PathBuf::from(path)
    }
}

/// Files on disk under one or more library roots, searched in order.
#[derive(Debug, Clone, Default)]
pub struct FsSource {
    roots: Vec<PathBuf>,
}

impl FsSource {
    /// Source over `roots`, highest priority first.
    pub fn new(roots: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// The search roots.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn read_under(root: &Path, path: &str) -> io::Result<String> {
        let exact = root.join(path);
        match std::fs::read_to_string(&exact) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                // Library files are often stored upper-case on case-sensitive disks.
                let lower = root.join(path.to_lowercase());
                let upper = root.join(path.to_uppercase());
                std::fs::read_to_string(lower).or_else(|_| std::fs::read_to_string(upper))
            }
            other => other,
        }
    }
}

impl FileSource for FsSource {
    fn read_text(&self, path: &str) -> io::Result<String> {
        let relative = path.replace('\\', "/");
        let mut last = io::Error::new(io::ErrorKind::NotFound, path.to_string());
        for root in &self.roots {
            match Self::read_under(root, &relative) {
                Ok(text) => return Ok(text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => last = e,
                Err(e) => return Err(e),
            }
        }
        Err(last)
    }

    fn display_path(&self, path: &str) -> PathBuf {
        self.roots
            .first()
            .map(|r| r.join(path))
            .unwrap_or_else(|| PathBuf::from(path))
    }
}

/// In-memory files keyed by canonical path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, String>,
}

impl MemorySource {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&mut self, path: &str, text: impl Into<String>) {
        self.files.insert(canonical_name(path), text.into());
    }

    /// Builder form of [`MemorySource::insert`].
    pub fn with(mut self, path: &str, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether there are no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FileSource for MemorySource {
    fn read_text(&self, path: &str) -> io::Result<String> {
        self.files
            .get(&canonical_name(path))
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.to_string()))
    }
}
