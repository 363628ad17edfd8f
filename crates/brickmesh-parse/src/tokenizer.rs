//! Line tokenizer.
//!
//! Model files are line oriented: each line is a run of whitespace
//! separated tokens whose first token is an integer line type.
//! - `0`: comment or meta directive
//! - `1`: sub-part reference
//! - `2`, `5`: edge lines (ignored)
//! - `3`: triangle
//! - `4`: quadrilateral

use brickmesh_math::{convert_point, Point3};
use brickmesh_mesh::ColorCode;

use crate::error::FieldError;

/// The kind of a non-empty line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `0`: comment or meta directive.
    Meta,
    /// `1`: sub-part reference.
    Reference,
    /// `3`: triangle.
    Triangle,
    /// `4`: quadrilateral.
    Quad,
    /// Any other line type; skipped.
    Other,
}

impl LineKind {
    fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Meta,
            1 => Self::Reference,
            3 => Self::Triangle,
            4 => Self::Quad,
            _ => Self::Other,
        }
    }
}

/// Cursor over the tokens of one line.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Tokens<'a> {
    /// Start tokenizing `line`.
    pub fn new(line: &'a str) -> Self {
        Self {
            rest: line.trim_start_matches('\u{feff}'),
        }
    }

    /// Read the line type. `None` for a blank line.
    pub fn line_kind(&mut self) -> Option<Result<LineKind, FieldError>> {
        let token = self.next_token()?;
        Some(
            token
                .parse::<i64>()
                .map(LineKind::from_code)
                .map_err(|_| FieldError::InvalidNumber {
                    field: "line type",
                    token: token.to_string(),
                }),
        )
    }

    /// Next raw token, if any.
    pub fn next_token(&mut self) -> Option<&'a str> {
        let trimmed = self.rest.trim_start();
        if trimmed.is_empty() {
            self.rest = trimmed;
            return None;
        }
        let end = trimmed
            .find(char::is_whitespace)
            .unwrap_or(trimmed.len());
        let (token, rest) = trimmed.split_at(end);
        self.rest = rest;
        Some(token)
    }

    /// Next token, or a missing-field error naming `field`.
    pub fn expect_token(&mut self, field: &'static str) -> Result<&'a str, FieldError> {
        self.next_token().ok_or(FieldError::Missing(field))
    }

    /// Next token as an `f64`.
    pub fn next_f64(&mut self, field: &'static str) -> Result<f64, FieldError> {
        let token = self.expect_token(field)?;
        token.parse().map_err(|_| FieldError::InvalidNumber {
            field,
            token: token.to_string(),
        })
    }

    /// Next token as a colour code.
    pub fn next_color(&mut self) -> Result<ColorCode, FieldError> {
        let token = self.expect_token("colour")?;
        parse_color_code(token)
    }

    /// Next three numbers as a point, converted to the target handedness.
    pub fn next_point(&mut self) -> Result<Point3, FieldError> {
        let x = self.next_f64("x coordinate")?;
        let y = self.next_f64("y coordinate")?;
        let z = self.next_f64("z coordinate")?;
        Ok(convert_point(x, y, z))
    }

    /// Next `N` numbers.
    pub fn next_f64s<const N: usize>(&mut self, field: &'static str) -> Result<[f64; N], FieldError> {
        let mut out = [0.0; N];
        for slot in &mut out {
            *slot = self.next_f64(field)?;
        }
        Ok(out)
    }

    /// The remaining tokens joined by single spaces. Empty if nothing is left.
    pub fn remainder(&mut self) -> String {
        self.by_ref().collect::<Vec<_>>().join(" ")
    }

    /// The rest of the line with surrounding whitespace removed, spacing kept.
    pub fn raw_remainder(&self) -> &'a str {
        self.rest.trim()
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        self.next_token()
    }
}

/// Parse a colour code: decimal, or `0x`-prefixed hex for direct colours.
pub fn parse_color_code(token: &str) -> Result<ColorCode, FieldError> {
    let parsed = match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(hex) => ColorCode::from_str_radix(hex, 16),
        None => token.parse(),
    };
    parsed.map_err(|_| FieldError::InvalidColor(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_kinds() {
        let kind = |s: &str| Tokens::new(s).line_kind();
        assert_eq!(kind("0 comment"), Some(Ok(LineKind::Meta)));
        assert_eq!(kind("  1 16 0 0 0"), Some(Ok(LineKind::Reference)));
        assert_eq!(kind("2 24 0 0 0 1 1 1"), Some(Ok(LineKind::Other)));
        assert_eq!(kind("3 16"), Some(Ok(LineKind::Triangle)));
        assert_eq!(kind("4 16"), Some(Ok(LineKind::Quad)));
        assert_eq!(kind("5 24"), Some(Ok(LineKind::Other)));
        assert_eq!(kind("   "), None);
        assert_eq!(kind(""), None);
        assert!(matches!(kind("x 1 2"), Some(Err(FieldError::InvalidNumber { .. }))));
    }

    #[test]
    fn test_byte_order_mark() {
        assert_eq!(Tokens::new("\u{feff}0 title").line_kind(), Some(Ok(LineKind::Meta)));
    }

    #[test]
    fn test_numbers_and_points() {
        let mut t = Tokens::new("1.5 -2 3e1 x");
        let p = t.next_point().unwrap();
        assert_eq!(p, Point3::new(1.5, 2.0, 30.0));
        assert!(matches!(
            t.next_f64("w"),
            Err(FieldError::InvalidNumber { field: "w", .. })
        ));
        assert_eq!(t.next_f64("w"), Err(FieldError::Missing("w")));
    }

    #[test]
    fn test_color_codes() {
        assert_eq!(parse_color_code("16"), Ok(16));
        assert_eq!(parse_color_code("0x2FF8000"), Ok(0x02FF_8000));
        assert_eq!(parse_color_code("0X2ff8000"), Ok(0x02FF_8000));
        assert!(parse_color_code("red").is_err());
        assert!(parse_color_code("-1").is_err());
    }

    #[test]
    fn test_remainder_joins_with_single_spaces() {
        let mut t = Tokens::new("1   my   part  name.dat  ");
        assert_eq!(t.next_token(), Some("1"));
        assert_eq!(t.raw_remainder(), "my   part  name.dat");
        assert_eq!(t.remainder(), "my part name.dat");
        assert_eq!(t.remainder(), "");
    }
}
