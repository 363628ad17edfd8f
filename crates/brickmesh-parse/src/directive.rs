//! Back-face culling (BFC) directive state machine.
//!
//! `0 BFC [NOCERTIFY|CERTIFY] [CW|CCW|INVERTNEXT]`, keywords matched
//! case-insensitively. `CLIP` and `NOCLIP` are accepted and have no effect.

use std::ops::BitXor;

use tracing::{trace, warn};

/// Declared face winding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Winding {
    /// Counter-clockwise (the default).
    #[default]
    Ccw,
    /// Clockwise.
    Cw,
}

impl BitXor<bool> for Winding {
    type Output = Winding;

    fn bitxor(self, invert: bool) -> Winding {
        match (self, invert) {
            (w, false) => w,
            (Winding::Ccw, true) => Winding::Cw,
            (Winding::Cw, true) => Winding::Ccw,
        }
    }
}

/// Certification state of a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Certification {
    /// No `CERTIFY`/`NOCERTIFY` seen yet.
    #[default]
    Unknown,
    /// `BFC CERTIFY`.
    Certified,
    /// `BFC NOCERTIFY`.
    NotCertified,
}

impl Certification {
    /// Whether the part declared a consistent winding.
    pub fn is_certified(self) -> bool {
        self == Self::Certified
    }
}

/// One recognised keyword of a BFC directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BfcKeyword {
    /// `CERTIFY`
    Certify,
    /// `NOCERTIFY`
    NoCertify,
    /// `CW` / `CCW`
    Winding(Winding),
    /// `INVERTNEXT`
    InvertNext,
    /// `CLIP` / `NOCLIP`
    Clip,
}

impl BfcKeyword {
    fn parse(token: &str) -> Option<Self> {
        let kw = match token.to_ascii_uppercase().as_str() {
            "CERTIFY" => Self::Certify,
            "NOCERTIFY" => Self::NoCertify,
            "CW" => Self::Winding(Winding::Cw),
            "CCW" => Self::Winding(Winding::Ccw),
            "INVERTNEXT" => Self::InvertNext,
            "CLIP" | "NOCLIP" => Self::Clip,
            _ => return None,
        };
        Some(kw)
    }
}

/// Decode the tokens following `0` on a meta line as a BFC directive.
///
/// Returns `None` when the line is not a BFC directive. Unknown keywords
/// after `BFC` are skipped.
pub fn parse_bfc<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Option<Vec<BfcKeyword>> {
    let first = tokens.next()?;
    if !first.eq_ignore_ascii_case("BFC") {
        return None;
    }
    Some(
        tokens
            .filter_map(|t| {
                let kw = BfcKeyword::parse(t);
                if kw.is_none() {
                    trace!(token = t, "ignoring unknown BFC keyword");
                }
                kw
            })
            .collect(),
    )
}

/// Running BFC state while parsing one file.
#[derive(Debug, Clone, Default)]
pub struct BfcState {
    certification: Certification,
    winding: Winding,
    invert_next: bool,
}

impl BfcState {
    /// Fresh state: unknown certification, CCW winding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current certification.
    pub fn certification(&self) -> Certification {
        self.certification
    }

    /// Winding applied to the next primitive.
    pub fn winding(&self) -> Winding {
        self.winding
    }

    /// Whether an `INVERTNEXT` is pending.
    pub fn invert_next_pending(&self) -> bool {
        self.invert_next
    }

    /// Consume the pending `INVERTNEXT` flag.
    pub fn take_invert_next(&mut self) -> bool {
        std::mem::take(&mut self.invert_next)
    }

    /// Set certification. The first definite value wins; a contradiction is
    /// logged and ignored. Returns whether the state now matches `value`.
    pub fn certify(&mut self, value: bool, file: &str, line: usize) -> bool {
        let wanted = if value {
            Certification::Certified
        } else {
            Certification::NotCertified
        };
        match self.certification {
            Certification::Unknown => {
                self.certification = wanted;
                true
            }
            current if current == wanted => true,
            current => {
                warn!(
                    file,
                    line,
                    current = ?current,
                    requested = ?wanted,
                    "contradictory BFC certification ignored"
                );
                false
            }
        }
    }

    /// Apply the keywords of one directive, in order.
    pub fn apply(&mut self, keywords: &[BfcKeyword], file: &str, line: usize) {
        for kw in keywords {
            match *kw {
                BfcKeyword::Certify => {
                    self.certify(true, file, line);
                }
                BfcKeyword::NoCertify => {
                    self.certify(false, file, line);
                }
                BfcKeyword::Winding(w) => self.winding = w,
                BfcKeyword::InvertNext => self.invert_next = true,
                BfcKeyword::Clip => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bfc(s: &str) -> Option<Vec<BfcKeyword>> {
        parse_bfc(s.split_whitespace())
    }

    #[test]
    fn test_parse_bfc_keywords() {
        assert_eq!(
            bfc("BFC CERTIFY CCW"),
            Some(vec![BfcKeyword::Certify, BfcKeyword::Winding(Winding::Ccw)])
        );
        assert_eq!(
            bfc("bfc invertnext"),
            Some(vec![BfcKeyword::InvertNext])
        );
        assert_eq!(
            bfc("BFC NOCLIP"),
            Some(vec![BfcKeyword::Clip])
        );
        assert_eq!(bfc("BFC FOO CW"), Some(vec![BfcKeyword::Winding(Winding::Cw)]));
        assert_eq!(bfc("Name: 3001.dat"), None);
        assert_eq!(bfc(""), None);
    }

    #[test]
    fn test_default_state() {
        let s = BfcState::new();
        assert_eq!(s.certification(), Certification::Unknown);
        assert_eq!(s.winding(), Winding::Ccw);
        assert!(!s.invert_next_pending());
    }

    #[test]
    fn test_first_certification_wins() {
        let mut s = BfcState::new();
        assert!(s.certify(true, "a.dat", 1));
        assert!(s.certify(true, "a.dat", 2));
        assert!(!s.certify(false, "a.dat", 3));
        assert_eq!(s.certification(), Certification::Certified);

        let mut s = BfcState::new();
        s.apply(&[BfcKeyword::NoCertify], "b.dat", 1);
        s.apply(&[BfcKeyword::Certify, BfcKeyword::Winding(Winding::Cw)], "b.dat", 2);
        assert_eq!(s.certification(), Certification::NotCertified);
        assert_eq!(s.winding(), Winding::Cw);
    }

    #[test]
    fn test_invert_next_is_one_shot() {
        let mut s = BfcState::new();
        s.apply(&[BfcKeyword::InvertNext], "a.dat", 1);
        assert!(s.take_invert_next());
        assert!(!s.take_invert_next());
    }

    #[test]
    fn test_winding_xor() {
        assert_eq!(Winding::Ccw ^ false, Winding::Ccw);
        assert_eq!(Winding::Ccw ^ true, Winding::Cw);
        assert_eq!(Winding::Cw ^ true, Winding::Ccw);
    }
}
