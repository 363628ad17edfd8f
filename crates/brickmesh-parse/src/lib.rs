#![warn(missing_docs)]

//! Parser for the brick-CAD line format.
//!
//! Decodes one file's worth of lines into triangle buffers and sub-part
//! references, tracking BFC winding directives and converting coordinates
//! from the right-handed source convention to the left-handed target one.
//! Also splits multi-document containers and reads colour palettes.
//!
//! # Example
//!
//! ```
//! use brickmesh_parse::parse_part;
//!
//! let part = parse_part("tri.dat", &["0 BFC CERTIFY CCW", "3 16 0 0 0 1 0 0 0 1 0"]).unwrap();
//! assert!(part.bfc_enabled());
//! assert_eq!(part.buffers.triangle(0), [0, 2, 1]);
//! ```

mod directive;
mod document;
mod error;
mod palette;
mod parser;
mod tokenizer;

pub use directive::{parse_bfc, BfcKeyword, BfcState, Certification, Winding};
pub use document::{canonical_name, split_documents, Document};
pub use error::{FieldError, ParseError, Result};
pub use palette::{ColorEntry, ColorPalette, Rgba};
pub use parser::{
    parse_part, parse_part_with, render_winding, ParseContext, ParsedPart, PartHeader,
    PartReference,
};
pub use tokenizer::{parse_color_code, LineKind, Tokens};
