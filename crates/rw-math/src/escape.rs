//! Curly-brace escaping for stored math content.
//!
//! Downstream serializers treat raw braces as structural, so segment content
//! is stored with braces replaced by numeric character references and
//! restored before it reaches the typesetting engine.

const OPEN_BRACE: &str = "&#123;";
const CLOSE_BRACE: &str = "&#125;";

/// Replace `{` and `}` with their character references.
///
/// # Example
///
/// ```
/// use rw_math::escape_braces;
///
/// assert_eq!(escape_braces("{a, b}"), "&#123;a, b&#125;");
/// ```
#[must_use]
pub fn escape_braces(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '{' => out.push_str(OPEN_BRACE),
            '}' => out.push_str(CLOSE_BRACE),
            _ => out.push(c),
        }
    }
    out
}

/// Restore braces escaped by [`escape_braces`].
///
/// # Example
///
/// ```
/// use rw_math::unescape_braces;
///
/// assert_eq!(unescape_braces("&#123;a, b&#125;"), "{a, b}");
/// ```
#[must_use]
pub fn unescape_braces(content: &str) -> String {
    content.replace(OPEN_BRACE, "{").replace(CLOSE_BRACE, "}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_set_notation() {
        assert_eq!(escape_braces("{a, b}"), "&#123;a, b&#125;");
    }

    #[test]
    fn test_unescape_restores_original() {
        let original = "frac(1, 2) {x | x > 0}";
        assert_eq!(unescape_braces(&escape_braces(original)), original);
    }

    #[test]
    fn test_no_braces_unchanged() {
        assert_eq!(escape_braces("a^2 + b^2"), "a^2 + b^2");
        assert_eq!(unescape_braces("a^2 + b^2"), "a^2 + b^2");
    }

    #[test]
    fn test_nested_braces() {
        assert_eq!(escape_braces("{{}}"), "&#123;&#123;&#125;&#125;");
    }
}
