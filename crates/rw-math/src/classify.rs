//! Inline/display classification of delimiter runs.

use rw_doctree::MathSegment;

use crate::escape::escape_braces;
use crate::matcher::MathMatch;

/// Decide whether a delimiter run renders in display mode.
///
/// - `$$...$$` is always display.
/// - `$...$` is display only when the untrimmed content both starts and ends
///   with whitespace (`$ x $`); asymmetric padding stays inline.
///
/// # Example
///
/// ```
/// use rw_math::is_display;
///
/// assert!(!is_display("$", "x^2"));
/// assert!(is_display("$", " x^2 "));
/// assert!(is_display("$$", "x^2"));
/// assert!(!is_display("$", " x^2"));
/// ```
#[must_use]
pub fn is_display(delimiter: &str, inner: &str) -> bool {
    if delimiter == "$$" {
        return true;
    }
    let mut chars = inner.chars();
    matches!(
        (chars.next(), chars.next_back()),
        (Some(first), Some(last)) if first.is_whitespace() && last.is_whitespace()
    )
}

/// Build a math segment from a match.
///
/// Returns `None` when the content is empty after trimming; such runs are
/// left in the text untouched.
#[must_use]
pub fn segment_from_match(m: &MathMatch) -> Option<MathSegment> {
    let content = m.inner.trim();
    if content.is_empty() {
        return None;
    }
    Some(MathSegment {
        content: escape_braces(content),
        display: is_display(m.delimiter, &m.inner),
        source: m.source.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn math_match(delimiter: &'static str, inner: &str) -> MathMatch {
        MathMatch {
            start: 0,
            end: inner.len() + 2 * delimiter.len(),
            delimiter,
            inner: inner.to_owned(),
            source: format!("{delimiter}{inner}{delimiter}"),
        }
    }

    #[test]
    fn test_inline_without_padding() {
        assert!(!is_display("$", "x^2"));
    }

    #[test]
    fn test_display_with_symmetric_padding() {
        assert!(is_display("$", " x^2 "));
        assert!(is_display("$", "\nx^2\n"));
    }

    #[test]
    fn test_double_dollar_always_display() {
        assert!(is_display("$$", "x^2"));
        assert!(is_display("$$", " x^2"));
    }

    #[test]
    fn test_asymmetric_padding_is_inline() {
        assert!(!is_display("$", " x^2"));
        assert!(!is_display("$", "x^2 "));
    }

    #[test]
    fn test_single_space_is_not_display() {
        assert!(!is_display("$", " "));
    }

    #[test]
    fn test_segment_content_trimmed_and_escaped() {
        let segment = segment_from_match(&math_match("$", " {a, b} ")).unwrap();
        assert_eq!(segment.content, "&#123;a, b&#125;");
        assert!(segment.display);
        assert_eq!(segment.source, "$ {a, b} $");
    }

    #[test]
    fn test_segment_inline_trims_single_side() {
        let segment = segment_from_match(&math_match("$", " x")).unwrap();
        assert_eq!(segment.content, "x");
        assert!(!segment.display);
    }

    #[test]
    fn test_whitespace_only_is_rejected() {
        assert!(segment_from_match(&math_match("$", "   ")).is_none());
        assert!(segment_from_match(&math_match("$$", "\n")).is_none());
    }
}
