//! Part name to file path lookup table.
//!
//! One mapping per line, `name<TAB>path` (or two whitespace-separated
//! tokens when neither contains spaces). `#` starts a comment line. A name
//! listed more than once gets several candidate paths in listed order.

use std::collections::HashMap;

use brickmesh_parse::canonical_name;

use crate::error::{LibraryError, Result};

/// Canonical part name to candidate relative paths.
#[derive(Debug, Clone, Default)]
pub struct PathTable {
    entries: HashMap<String, Vec<String>>,
}

impl PathTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a lookup side file.
    pub fn parse(text: &str) -> Result<Self> {
        let mut table = Self::new();
        for (i, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (name, path) = split_entry(line).ok_or_else(|| LibraryError::PathTable {
                line: i + 1,
                text: raw.to_string(),
            })?;
            table.insert(name, path);
        }
        Ok(table)
    }

    /// Append a candidate path for `name`.
    pub fn insert(&mut self, name: &str, path: &str) {
        self.entries
            .entry(canonical_name(name))
            .or_default()
            .push(path.trim().replace('\\', "/"));
    }

    /// Candidate paths for `name`, highest priority first.
    pub fn candidates(&self, name: &str) -> &[String] {
        self.entries
            .get(&canonical_name(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn split_entry(line: &str) -> Option<(&str, &str)> {
    if let Some((name, path)) = line.split_once('\t') {
        let (name, path) = (name.trim(), path.trim());
        return (!name.is_empty() && !path.is_empty()).then_some((name, path));
    }
    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(name), Some(path), None) => Some((name, path)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table() {
        let text = "\
# part lookup
3001.dat\tparts/3001.dat
3001.dat\tunofficial/parts/3001.dat
S\\3001s01.dat   parts/s/3001s01.dat
my model.ldr\tmodels/my model.ldr
";
        let table = PathTable::parse(text).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.candidates("3001.DAT"),
            ["parts/3001.dat", "unofficial/parts/3001.dat"]
        );
        assert_eq!(table.candidates("s/3001s01.dat"), ["parts/s/3001s01.dat"]);
        assert_eq!(table.candidates("My Model.ldr"), ["models/my model.ldr"]);
        assert!(table.candidates("unknown.dat").is_empty());
    }

    #[test]
    fn test_malformed_line() {
        let err = PathTable::parse("ok.dat parts/ok.dat\njust-a-name\n").unwrap_err();
        assert!(matches!(err, LibraryError::PathTable { line: 2, .. }));
    }
}
