#![warn(missing_docs)]

//! Part library access for brickmesh.
//!
//! Maps logical part names to candidate file paths (a lookup table first,
//! then the conventional `parts/`, `p/` and `models/` folders), reads them
//! through a [`FileSource`], and caches their raw lines under canonical
//! names. A [`Prefetcher`] walks a model's whole reference closure in small
//! steps before parsing begins.

mod cache;
mod error;
mod library;
mod path_table;
mod prefetch;
mod source;

pub use brickmesh_parse::canonical_name;
pub use cache::{CachedFile, FileCache, PartKind};
pub use error::{LibraryError, Result};
pub use library::{PartLibrary, SEARCH_FOLDERS};
pub use path_table::PathTable;
pub use prefetch::{reference_names, PrefetchStats, PrefetchStep, Prefetcher};
pub use source::{FileSource, FsSource, MemorySource};
