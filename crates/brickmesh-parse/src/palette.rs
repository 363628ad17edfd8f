//! Colour palette (`LDConfig.ldr` style) parsing.
//!
//! Only `0 !COLOUR` lines matter:
//!
//! ```text
//! 0 !COLOUR name CODE n VALUE #rrggbb EDGE #rrggbb [ALPHA a] [LUMINANCE l] [finish...]
//! ```
//!
//! Finish modifiers (`CHROME`, `PEARLESCENT`, `MATERIAL ...`) are skipped.

use std::collections::{BTreeMap, HashMap};

use brickmesh_mesh::{ColorCode, EDGE_COLOR, MAIN_COLOR};

use crate::error::{FieldError, ParseError, Result};
use crate::tokenizer::{parse_color_code, LineKind, Tokens};

/// An 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha, 255 is opaque.
    pub a: u8,
}

impl Rgba {
    /// Opaque colour from a `0xRRGGBB` value.
    pub fn from_rgb24(rgb: u32) -> Self {
        Self {
            r: (rgb >> 16) as u8,
            g: (rgb >> 8) as u8,
            b: rgb as u8,
            a: 255,
        }
    }

    /// Parse `#rrggbb` (or `0xrrggbb`).
    pub fn parse_hex(token: &str) -> std::result::Result<Self, FieldError> {
        let hex = token
            .strip_prefix('#')
            .or_else(|| token.strip_prefix("0x"))
            .filter(|h| h.len() == 6)
            .ok_or_else(|| FieldError::InvalidRgb(token.to_string()))?;
        u32::from_str_radix(hex, 16)
            .map(Self::from_rgb24)
            .map_err(|_| FieldError::InvalidRgb(token.to_string()))
    }

    /// Components scaled to `0.0..=1.0`.
    pub fn to_f32(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a].map(|c| f32::from(c) / 255.0)
    }

    /// Whether the colour is not fully opaque.
    pub fn is_translucent(self) -> bool {
        self.a < 255
    }
}

impl std::fmt::Display for Rgba {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, " alpha {}", self.a)?;
        }
        Ok(())
    }
}

/// One palette entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorEntry {
    /// Colour code.
    pub code: ColorCode,
    /// Name, e.g. `Bright_Red`.
    pub name: String,
    /// Face colour.
    pub value: Rgba,
    /// Edge line colour.
    pub edge: Rgba,
}

/// Colour code to RGBA table with a reverse lookup.
///
/// `ColorPalette::default()` holds the main and edge fallbacks.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    entries: BTreeMap<ColorCode, ColorEntry>,
    reverse: HashMap<Rgba, ColorCode>,
}

impl ColorPalette {
    /// An empty palette.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            reverse: HashMap::new(),
        }
    }

    /// Palette holding only the main (16) and edge (24) fallback entries.
    pub fn with_fallbacks() -> Self {
        let mut palette = Self::new();
        palette.insert(ColorEntry {
            code: MAIN_COLOR,
            name: "Main_Colour".to_string(),
            value: Rgba::from_rgb24(0x7F7F7F),
            edge: Rgba::from_rgb24(0x333333),
        });
        palette.insert(ColorEntry {
            code: EDGE_COLOR,
            name: "Edge_Colour".to_string(),
            value: Rgba::from_rgb24(0x7F7F7F),
            edge: Rgba::from_rgb24(0x333333),
        });
        palette
    }

    /// Parse `!COLOUR` lines on top of the fallback entries.
    pub fn parse<S: AsRef<str>>(file: &str, lines: &[S]) -> Result<Self> {
        let mut palette = Self::with_fallbacks();
        for (i, line) in lines.iter().enumerate() {
            let text = line.as_ref();
            let entry = parse_colour_line(text, &palette)
                .map_err(|e| ParseError::line(file, i + 1, text.trim(), e))?;
            if let Some(entry) = entry {
                palette.insert(entry);
            }
        }
        Ok(palette)
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, entry: ColorEntry) {
        self.reverse.entry(entry.value).or_insert(entry.code);
        self.entries.insert(entry.code, entry);
    }

    /// Entry for `code`.
    pub fn get(&self, code: ColorCode) -> Option<&ColorEntry> {
        self.entries.get(&code)
    }

    /// Face colour of `code`, decoding direct colours `0x2RRGGBB`.
    pub fn rgba(&self, code: ColorCode) -> Option<Rgba> {
        if code >> 24 == 0x02 {
            return Some(Rgba::from_rgb24(code & 0x00FF_FFFF));
        }
        self.get(code).map(|e| e.value)
    }

    /// First code registered with face colour `rgba`.
    pub fn code_for(&self, rgba: Rgba) -> Option<ColorCode> {
        self.reverse.get(&rgba).copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the palette has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = &ColorEntry> {
        self.entries.values()
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::with_fallbacks()
    }
}

fn parse_colour_line(
    text: &str,
    palette: &ColorPalette,
) -> std::result::Result<Option<ColorEntry>, FieldError> {
    let mut tokens = Tokens::new(text);
    match tokens.line_kind() {
        Some(Ok(LineKind::Meta)) => {}
        _ => return Ok(None),
    }
    match tokens.next_token() {
        Some(t) if t.eq_ignore_ascii_case("!COLOUR") => {}
        _ => return Ok(None),
    }

    let name = tokens.expect_token("colour name")?.to_string();
    let mut code = None;
    let mut value = None;
    let mut edge = None;
    let mut alpha = 255u8;

    while let Some(key) = tokens.next_token() {
        match key.to_ascii_uppercase().as_str() {
            "CODE" => code = Some(tokens.next_color()?),
            "VALUE" => value = Some(Rgba::parse_hex(tokens.expect_token("VALUE")?)?),
            "EDGE" => {
                let token = tokens.expect_token("EDGE")?;
                edge = Some(match Rgba::parse_hex(token) {
                    Ok(rgba) => rgba,
                    Err(e) => parse_color_code(token)
                        .ok()
                        .and_then(|c| palette.rgba(c))
                        .ok_or(e)?,
                });
            }
            "ALPHA" => {
                let token = tokens.expect_token("ALPHA")?;
                alpha = token.parse().map_err(|_| FieldError::InvalidNumber {
                    field: "ALPHA",
                    token: token.to_string(),
                })?;
            }
            "LUMINANCE" => {
                tokens.next_token();
            }
            "MATERIAL" => break,
            _ => {}
        }
    }

    let code = code.ok_or(FieldError::Missing("CODE"))?;
    let mut value = value.ok_or(FieldError::Missing("VALUE"))?;
    value.a = alpha;
    let edge = edge.ok_or(FieldError::Missing("EDGE"))?;
    Ok(Some(ColorEntry {
        code,
        name,
        value,
        edge,
    }))
}
