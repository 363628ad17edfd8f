//! Single-file primitive parser.
//!
//! Turns the lines of one part into flat triangle buffers, the list of
//! sub-part references it makes, and its final BFC certification. Each
//! triangle or quad corner becomes its own vertex; welding happens later.

use brickmesh_math::{convert_reference_matrix, Point3, Transform};
use brickmesh_mesh::{effective_color, ColorCode, MeshBuffers, MAIN_COLOR};
use tracing::trace;

use crate::directive::{parse_bfc, BfcState, Certification, Winding};
use crate::error::{FieldError, ParseError, Result};
use crate::tokenizer::{LineKind, Tokens};

/// A `1` line: include another part under a transform and colour.
#[derive(Debug, Clone, PartialEq)]
pub struct PartReference {
    /// Line number (1-indexed) of the reference.
    pub line: usize,
    /// Colour code the child is drawn with (16 inherits).
    pub color: ColorCode,
    /// Child placement, already in the target convention.
    pub transform: Transform,
    /// Referenced file name as written, tokens re-joined by single spaces.
    pub name: String,
    /// Winding parity of the child relative to this part:
    /// pending `INVERTNEXT` XOR mirroring transform.
    pub invert: bool,
}

/// Descriptive meta lines found in a part header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartHeader {
    /// Free text of the first line, when it is a plain comment.
    pub description: Option<String>,
    /// `0 Name:` value.
    pub name: Option<String>,
    /// `0 Author:` value.
    pub author: Option<String>,
    /// First word of `0 !LDRAW_ORG`, e.g. `Part`, `Subpart`, `Primitive`.
    pub part_type: Option<String>,
}

/// Result of parsing one file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPart {
    /// Name the part was parsed under.
    pub name: String,
    /// Triangles from `3` and `4` lines.
    pub buffers: MeshBuffers,
    /// Final certification state.
    pub certification: Certification,
    /// Sub-part references, in file order.
    pub references: Vec<PartReference>,
    /// Header meta values.
    pub header: PartHeader,
}

impl ParsedPart {
    /// Whether the part is BFC certified.
    pub fn bfc_enabled(&self) -> bool {
        self.certification.is_certified()
    }
}

/// State inherited from the referencing parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseContext {
    /// Winding parity accumulated down the reference chain.
    pub accumulated_invert: bool,
    /// Colour that the sentinel code 16 resolves to.
    pub parent_color: ColorCode,
}

impl Default for ParseContext {
    fn default() -> Self {
        Self {
            accumulated_invert: false,
            parent_color: MAIN_COLOR,
        }
    }
}

/// Stored triangle order for a primitive.
///
/// `true` keeps `(0, 1, 2)`, `false` stores `(0, 2, 1)`.
pub fn render_winding(winding: Winding, accumulated_invert: bool) -> bool {
    (winding ^ accumulated_invert) == Winding::Cw
}

/// Parse one part as a template: no inherited parity, colour codes kept.
pub fn parse_part<S: AsRef<str>>(name: &str, lines: &[S]) -> Result<ParsedPart> {
    parse_part_with(name, lines, &ParseContext::default())
}

/// Parse one part under an inherited parity and parent colour.
pub fn parse_part_with<S: AsRef<str>>(
    name: &str,
    lines: &[S],
    ctx: &ParseContext,
) -> Result<ParsedPart> {
    let mut parser = PartParser {
        file: name,
        ctx,
        bfc: BfcState::new(),
        buffers: MeshBuffers::new(),
        references: Vec::new(),
        header: PartHeader::default(),
        seen_content: false,
    };
    for (i, line) in lines.iter().enumerate() {
        parser.line(i + 1, line.as_ref())?;
    }
    Ok(ParsedPart {
        name: name.to_string(),
        buffers: parser.buffers,
        certification: parser.bfc.certification(),
        references: parser.references,
        header: parser.header,
    })
}

struct PartParser<'a> {
    file: &'a str,
    ctx: &'a ParseContext,
    bfc: BfcState,
    buffers: MeshBuffers,
    references: Vec<PartReference>,
    header: PartHeader,
    seen_content: bool,
}

impl PartParser<'_> {
    fn line(&mut self, number: usize, text: &str) -> Result<()> {
        let mut tokens = Tokens::new(text);
        let kind = match tokens.line_kind() {
            None => return Ok(()),
            Some(kind) => kind.map_err(|e| self.error(number, text, e))?,
        };
        let first = !self.seen_content;
        self.seen_content = true;

        match kind {
            LineKind::Meta => {
                self.meta(number, tokens, first);
                Ok(())
            }
            LineKind::Reference => {
                let parsed = self
                    .reference(number, tokens)
                    .map_err(|e| self.error(number, text, e))?;
                match parsed {
                    Some(r) => {
                        self.references.push(r);
                        Ok(())
                    }
                    None => Err(ParseError::MissingFileName {
                        file: self.file.to_string(),
                        line: number,
                    }),
                }
            }
            LineKind::Triangle => self
                .primitive::<3>(tokens)
                .map_err(|e| self.error(number, text, e)),
            LineKind::Quad => self
                .primitive::<4>(tokens)
                .map_err(|e| self.error(number, text, e)),
            LineKind::Other => Ok(()),
        }
    }

    fn error(&self, number: usize, text: &str, source: FieldError) -> ParseError {
        ParseError::line(self.file, number, text.trim(), source)
    }

    fn meta(&mut self, number: usize, tokens: Tokens<'_>, first: bool) {
        if let Some(keywords) = parse_bfc(tokens.clone()) {
            self.bfc.apply(&keywords, self.file, number);
            return;
        }

        let text = tokens.raw_remainder();
        let mut t = tokens;
        let Some(keyword) = t.next_token() else {
            return;
        };
        if keyword.eq_ignore_ascii_case("Name:") {
            self.header.name = Some(t.raw_remainder().to_string());
        } else if keyword.eq_ignore_ascii_case("Author:") {
            self.header.author = Some(t.raw_remainder().to_string());
        } else if keyword.eq_ignore_ascii_case("!LDRAW_ORG") {
            self.header.part_type = t.next_token().map(str::to_string);
        } else if first && !keyword.starts_with('!') && !keyword.starts_with("//") {
            self.header.description = Some(text.to_string());
        } else {
            trace!(file = self.file, line = number, keyword, "skipping meta line");
        }
    }

    /// `Ok(None)` when the line is well formed up to a missing file name.
    fn reference(
        &mut self,
        number: usize,
        mut tokens: Tokens<'_>,
    ) -> std::result::Result<Option<PartReference>, FieldError> {
        let color = tokens.next_color()?;
        let fields = tokens.next_f64s::<12>("transform")?;
        let name = tokens.remainder();
        let invert_next = self.bfc.take_invert_next();
        if name.is_empty() {
            return Ok(None);
        }
        let transform = convert_reference_matrix(&fields);
        let invert = invert_next ^ transform.is_mirroring();
        Ok(Some(PartReference {
            line: number,
            color,
            transform,
            name,
            invert,
        }))
    }

    fn primitive<const N: usize>(
        &mut self,
        mut tokens: Tokens<'_>,
    ) -> std::result::Result<(), FieldError> {
        let local = tokens.next_color()?;
        let mut points = [Point3::origin(); N];
        for p in &mut points {
            *p = tokens.next_point()?;
        }
        let color = effective_color(local, self.ctx.parent_color);
        let keep = render_winding(self.bfc.winding(), self.ctx.accumulated_invert);

        let base = self.buffers.num_vertices() as u32;
        for p in points {
            self.buffers.push_vertex(p, color);
        }
        let mut emit = |a: u32, b: u32, c: u32| {
            if keep {
                self.buffers.push_triangle([base + a, base + b, base + c]);
            } else {
                self.buffers.push_triangle([base + a, base + c, base + b]);
            }
        };
        emit(0, 1, 2);
        if N == 4 {
            emit(0, 2, 3);
        }
        Ok(())
    }
}
