//! Colour codes and the inherit rule.

/// An integer colour code as written in model files.
pub type ColorCode = u32;

/// The "main colour" sentinel: use the parent's effective colour.
pub const MAIN_COLOR: ColorCode = 16;

/// The "edge colour" code. Geometry drawn with it is treated like any other
/// colour code by the loader.
pub const EDGE_COLOR: ColorCode = 24;

/// Resolve a colour against its parent: the sentinel [`MAIN_COLOR`] takes the
/// parent's colour, every other code stands for itself.
#[inline]
pub fn effective_color(local: ColorCode, parent: ColorCode) -> ColorCode {
    if local == MAIN_COLOR {
        parent
    } else {
        local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_color() {
        assert_eq!(effective_color(MAIN_COLOR, 7), 7);
        assert_eq!(effective_color(5, 7), 5);
        assert_eq!(effective_color(MAIN_COLOR, MAIN_COLOR), MAIN_COLOR);
    }

    #[test]
    fn test_effective_color_is_transitive() {
        // grandparent red (4), parent inherits, child inherits
        let parent = effective_color(MAIN_COLOR, 4);
        assert_eq!(effective_color(MAIN_COLOR, parent), 4);
    }
}
