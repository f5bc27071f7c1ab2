//! Flattened text view over a sibling sequence.
//!
//! Prose split across several siblings (`text`, `em`, `strong`, ...) is
//! concatenated into one string so delimiter runs can be found regardless of
//! where the markup boundaries fall. Every sibling keeps a tagged range in
//! the view, which maps match offsets back to the original nodes.

use rw_doctree::Node;

/// Whether a range in the view comes from a text node or another node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    /// Literal text; the range covers the node's value.
    Text,
    /// Any non-text sibling; the range covers its plain text content.
    Opaque,
}

/// Half-open range in the flattened view attributable to one sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetEntry {
    pub start: usize,
    pub end: usize,
    /// Index of the sibling in the original sequence.
    pub index: usize,
    pub kind: RangeKind,
}

/// Concatenated text of a sibling sequence plus its offset map.
///
/// Entries are contiguous, non-overlapping, ordered by `start`, and cover
/// the whole of `text`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FlattenedView {
    pub text: String,
    pub entries: Vec<OffsetEntry>,
}

impl FlattenedView {
    /// Maximal runs of consecutive text entries, as byte ranges of `text`.
    ///
    /// Non-text siblings break runs, including empty ones.
    #[must_use]
    pub fn text_runs(&self) -> Vec<(usize, usize)> {
        let mut runs = Vec::new();
        let mut current: Option<(usize, usize)> = None;
        for entry in &self.entries {
            match entry.kind {
                RangeKind::Text => {
                    current = Some(match current {
                        Some((start, _)) => (start, entry.end),
                        None => (entry.start, entry.end),
                    });
                }
                RangeKind::Opaque => runs.extend(current.take()),
            }
        }
        runs.extend(current);
        runs.retain(|(start, end)| start < end);
        runs
    }
}

/// Build the flattened view of a sibling sequence.
///
/// # Example
///
/// ```
/// use rw_doctree::Node;
/// use rw_math::{RangeKind, flatten};
///
/// let siblings = vec![
///     Node::text("a "),
///     Node::element("strong", vec![Node::text("b")]),
///     Node::text(" c"),
/// ];
/// let view = flatten(&siblings);
/// assert_eq!(view.text, "a b c");
/// assert_eq!(view.entries[1].kind, RangeKind::Opaque);
/// assert_eq!((view.entries[1].start, view.entries[1].end), (2, 3));
/// ```
#[must_use]
pub fn flatten(siblings: &[Node]) -> FlattenedView {
    let mut view = FlattenedView {
        text: String::new(),
        entries: Vec::with_capacity(siblings.len()),
    };
    for (index, node) in siblings.iter().enumerate() {
        let start = view.text.len();
        let kind = if let Node::Text(value) = node {
            view.text.push_str(value);
            RangeKind::Text
        } else {
            view.text.push_str(&node.text_content());
            RangeKind::Opaque
        };
        view.entries.push(OffsetEntry {
            start,
            end: view.text.len(),
            index,
            kind,
        });
    }
    view
}

/// Whether any text sibling contains a delimiter character.
///
/// Checked before flattening so sequences without math are never copied.
#[must_use]
pub fn has_delimiter(siblings: &[Node]) -> bool {
    siblings
        .iter()
        .any(|node| matches!(node, Node::Text(value) if value.contains('$')))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_entries_are_contiguous() {
        let siblings = vec![
            Node::text("x = "),
            Node::element("em", vec![Node::text("y")]),
            Node::InlineCode("z".to_owned()),
            Node::text("!"),
        ];
        let view = flatten(&siblings);
        assert_eq!(view.text, "x = yz!");
        let mut expected_start = 0;
        for (i, entry) in view.entries.iter().enumerate() {
            assert_eq!(entry.start, expected_start);
            assert_eq!(entry.index, i);
            expected_start = entry.end;
        }
        assert_eq!(expected_start, view.text.len());
    }

    #[test]
    fn test_empty_opaque_has_zero_width_entry() {
        let siblings = vec![
            Node::text("a"),
            Node::element("br", Vec::new()),
            Node::text("b"),
        ];
        let view = flatten(&siblings);
        assert_eq!(
            view.entries[1],
            OffsetEntry {
                start: 1,
                end: 1,
                index: 1,
                kind: RangeKind::Opaque
            }
        );
    }

    #[test]
    fn test_text_runs_split_at_opaque() {
        let siblings = vec![
            Node::text("$a"),
            Node::element("strong", vec![Node::text("b")]),
            Node::text("c$"),
            Node::text("d"),
        ];
        let view = flatten(&siblings);
        assert_eq!(view.text_runs(), vec![(0, 2), (3, 6)]);
    }

    #[test]
    fn test_text_runs_skip_empty() {
        let siblings = vec![Node::element("br", Vec::new()), Node::text("")];
        assert!(flatten(&siblings).text_runs().is_empty());
    }

    #[test]
    fn test_has_delimiter_ignores_non_text() {
        let siblings = vec![Node::text("plain"), Node::InlineCode("$x$".to_owned())];
        assert!(!has_delimiter(&siblings));
        assert!(has_delimiter(&[Node::text("cost: $5")]));
    }
}
