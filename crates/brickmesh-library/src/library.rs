//! Part resolution: name to candidate paths to cached lines.

use std::io;
use std::sync::Arc;

use brickmesh_parse::{canonical_name, split_documents};
use tracing::{debug, trace};

use crate::cache::{CachedFile, FileCache, PartKind};
use crate::error::{LibraryError, Result};
use crate::path_table::PathTable;
use crate::source::FileSource;

/// Folders searched when the path table has no entry, in priority order.
pub const SEARCH_FOLDERS: [&str; 3] = ["parts/", "p/", "models/"];

/// A part library: a file source, an optional lookup table and the cache of
/// files read so far.
pub struct PartLibrary {
    source: Box<dyn FileSource>,
    table: PathTable,
    cache: FileCache,
}

impl std::fmt::Debug for PartLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartLibrary")
            .field("table", &self.table)
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl PartLibrary {
    /// Library over `source` with an empty path table.
    pub fn new(source: impl FileSource + 'static) -> Self {
        Self::with_table(source, PathTable::new())
    }

    /// Library over `source` using `table` for lookups.
    pub fn with_table(source: impl FileSource + 'static, table: PathTable) -> Self {
        Self {
            source: Box::new(source),
            table,
            cache: FileCache::new(),
        }
    }

    /// The lookup table.
    pub fn table(&self) -> &PathTable {
        &self.table
    }

    /// The file cache.
    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    /// Mutable access to the file cache.
    pub fn cache_mut(&mut self) -> &mut FileCache {
        &mut self.cache
    }

    /// Candidate paths for `name`: table entries first, then the
    /// conventional folders, then the name itself.
    pub fn candidate_paths(&self, name: &str) -> Vec<String> {
        let canonical = canonical_name(name);
        let mut paths: Vec<String> = self.table.candidates(&canonical).to_vec();
        paths.extend(SEARCH_FOLDERS.iter().map(|dir| format!("{dir}{canonical}")));
        paths.push(canonical);
        paths
    }

    /// Cached entry for `name`, if loaded.
    pub fn get(&self, name: &str) -> Option<&CachedFile> {
        self.cache.get(&canonical_name(name))
    }

    /// Load `name` into the cache (if needed) and return its entry.
    ///
    /// Containers register every embedded document under its own name; the
    /// first document is also registered under `name`.
    pub fn load(&mut self, name: &str) -> Result<&CachedFile> {
        let canonical = canonical_name(name);
        if self.cache.contains(&canonical) {
            trace!(name = %canonical, "file cache hit");
        } else {
            self.read_into_cache(&canonical)?;
        }
        self.cache
            .get(&canonical)
            .ok_or(LibraryError::MissingPart(canonical))
    }

    fn read_into_cache(&mut self, canonical: &str) -> Result<()> {
        for path in self.candidate_paths(canonical) {
            let text = match self.source.read_text(&path) {
                Ok(text) => text,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(LibraryError::io(self.source.display_path(&path), e)),
            };
            let kind = PartKind::from_path(&path);
            let documents = split_documents(canonical, &text);
            debug!(
                name = canonical,
                path = %path,
                kind = ?kind,
                documents = documents.len(),
                "loaded file"
            );

            let is_container =
                documents.len() > 1 || documents.first().is_some_and(|d| d.name != canonical);
            for (i, doc) in documents.into_iter().enumerate() {
                let lines: Arc<[String]> = doc.lines.into();
                if i == 0 && doc.name != canonical {
                    self.cache
                        .insert(canonical.to_string(), CachedFile::new(lines.clone(), kind));
                }
                let doc_kind = if is_container && i > 0 {
                    PartKind::Embedded
                } else {
                    kind
                };
                self.cache.insert(doc.name, CachedFile::new(lines, doc_kind));
            }
            return Ok(());
        }
        Err(LibraryError::MissingPart(canonical.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn source() -> MemorySource {
        MemorySource::new()
            .with("parts/3001.dat", "0 Brick 2 x 4\n1 16 0 0 0 1 0 0 0 1 0 0 0 1 s/3001s01.dat\n")
            .with("parts/s/3001s01.dat", "0 ~Brick 2 x 4 - shell\n")
            .with("p/stud.dat", "0 Stud\n")
            .with("models/car.ldr", "0 Car\n")
            .with(
                "house.mpd",
                "0 FILE main.ldr\n1 16 0 0 0 1 0 0 0 1 0 0 0 1 wall.ldr\n0 FILE wall.ldr\n0 Wall\n",
            )
    }

    #[test]
    fn test_folder_fallback_and_kind() {
        let mut lib = PartLibrary::new(source());
        assert_eq!(lib.load("3001.dat").unwrap().kind, PartKind::Part);
        assert_eq!(lib.load("S\\3001s01.dat").unwrap().kind, PartKind::Subpart);
        assert_eq!(lib.load("stud.dat").unwrap().kind, PartKind::Primitive);
        assert_eq!(lib.load("car.ldr").unwrap().kind, PartKind::Model);
        assert_eq!(lib.cache().len(), 4);
    }

    #[test]
    fn test_table_takes_priority() {
        let mut table = PathTable::new();
        table.insert("3001.dat", "models/car.ldr");
        let mut lib = PartLibrary::with_table(source(), table);
        let file = lib.load("3001.dat").unwrap();
        assert_eq!(&*file.lines, ["0 Car".to_string()]);
        assert_eq!(lib.candidate_paths("3001.dat")[0], "models/car.ldr");
    }

    #[test]
    fn test_container_registers_documents() {
        let mut lib = PartLibrary::new(source());
        let main = lib.load("house.mpd").unwrap();
        assert_eq!(main.kind, PartKind::Model);
        assert_eq!(main.lines.len(), 1);
        assert_eq!(lib.get("main.ldr").unwrap().kind, PartKind::Model);
        assert_eq!(lib.get("wall.ldr").unwrap().kind, PartKind::Embedded);
        assert_eq!(lib.cache().len(), 3);
    }

    #[test]
    fn test_missing_part() {
        let mut lib = PartLibrary::new(source());
        let err = lib.load("9999.dat").unwrap_err();
        assert!(matches!(err, LibraryError::MissingPart(ref n) if n == "9999.dat"));
        assert!(lib.cache().is_empty());
    }
}
