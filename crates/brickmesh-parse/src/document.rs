//! Multi-document container files and canonical part names.
//!
//! A container (`.mpd`) holds several models, each introduced by
//! `0 FILE <name>` and optionally closed by `0 NOFILE`. Containers are split
//! into named documents before any geometry is parsed.

/// One named document of a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Canonical name of the document.
    pub name: String,
    /// Lines after the `0 FILE` declaration.
    pub lines: Vec<String>,
}

/// Canonical form of a part name: trimmed, `/`-separated, lower-case,
/// without `.` segments or repeated slashes.
pub fn canonical_name(name: &str) -> String {
    name.trim()
        .replace('\\', "/")
        .to_lowercase()
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

enum Marker<'a> {
    File(&'a str),
    NoFile,
}

fn marker(line: &str) -> Option<Marker<'_>> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != "0" {
        return None;
    }
    let keyword = tokens.next()?;
    if keyword.eq_ignore_ascii_case("FILE") {
        let rest = line.trim_start();
        // Keep spacing inside the name: skip "0", then "FILE".
        let after_zero = rest[1..].trim_start();
        let name = after_zero[keyword.len()..].trim();
        Some(Marker::File(name))
    } else if keyword.eq_ignore_ascii_case("NOFILE") {
        Some(Marker::NoFile)
    } else {
        None
    }
}

/// Split `text` into named documents.
///
/// Without any `0 FILE` line the whole text is one document named after
/// `container_name`. Otherwise lines before the first declaration, and
/// lines between a `0 NOFILE` and the next declaration, are discarded. The
/// first document is the container's main model.
pub fn split_documents(container_name: &str, text: &str) -> Vec<Document> {
    let mut documents: Vec<Document> = Vec::new();
    let mut open = false;
    let mut preamble = Vec::new();

    for line in text.trim_start_matches('\u{feff}').lines() {
        match marker(line) {
            Some(Marker::File(name)) => {
                documents.push(Document {
                    name: canonical_name(name),
                    lines: Vec::new(),
                });
                open = true;
            }
            Some(Marker::NoFile) => open = false,
            None if open => {
                if let Some(doc) = documents.last_mut() {
                    doc.lines.push(line.to_string());
                }
            }
            None if documents.is_empty() => preamble.push(line.to_string()),
            None => {}
        }
    }

    if documents.is_empty() {
        documents.push(Document {
            name: canonical_name(container_name),
            lines: preamble,
        });
    }
    documents
}
