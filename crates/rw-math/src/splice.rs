//! Sibling-sequence rebuilding around math matches.

use rw_doctree::{MathSegment, Node};

use crate::classify::segment_from_match;
use crate::flatten::{FlattenedView, RangeKind, flatten, has_delimiter};
use crate::matcher::{SpanPolicy, find_matches};

/// Replace delimiter runs in a sibling sequence with math segment nodes.
///
/// Text outside runs is kept (sliced into new text nodes where a run starts
/// or ends mid-node); other siblings are moved over untouched. Sequences
/// without a recognizable run are returned as-is.
///
/// # Example
///
/// ```
/// use rw_doctree::Node;
/// use rw_math::{SpanPolicy, split_math};
///
/// let spliced = split_math(vec![Node::text("so $x$ holds")], SpanPolicy::Forbid);
/// assert_eq!(spliced.len(), 3);
/// assert!(matches!(&spliced[1], Node::Math(m) if m.content == "x" && !m.display));
/// ```
#[must_use]
pub fn split_math(siblings: Vec<Node>, policy: SpanPolicy) -> Vec<Node> {
    splice_siblings(siblings, policy).0
}

/// [`split_math`] that also reports how many segments were created.
pub(crate) fn splice_siblings(siblings: Vec<Node>, policy: SpanPolicy) -> (Vec<Node>, usize) {
    if !has_delimiter(&siblings) {
        return (siblings, 0);
    }

    let view = flatten(&siblings);
    let segments: Vec<Positioned> = find_matches(&view, policy)
        .iter()
        .filter_map(|m| {
            segment_from_match(m).map(|segment| Positioned {
                start: m.start,
                end: m.end,
                segment,
            })
        })
        .collect();

    if segments.is_empty() {
        return (siblings, 0);
    }

    let count = segments.len();
    (rebuild(siblings, &view, segments), count)
}

/// Segment together with the view range it replaces.
struct Positioned {
    start: usize,
    end: usize,
    segment: MathSegment,
}

/// Single linear pass over the offset map, emitting gaps and segments.
fn rebuild(siblings: Vec<Node>, view: &FlattenedView, segments: Vec<Positioned>) -> Vec<Node> {
    let mut nodes: Vec<Option<Node>> = siblings.into_iter().map(Some).collect();
    let mut out = Vec::with_capacity(nodes.len() + segments.len() * 2);
    let mut segments = segments.into_iter().peekable();
    // View offset up to which output has been produced.
    let mut pos = 0;

    for entry in &view.entries {
        match entry.kind {
            RangeKind::Opaque => {
                // Inside a segment: absorbed into its content.
                if entry.start < pos {
                    continue;
                }
                if let Some(node) = nodes[entry.index].take() {
                    out.push(node);
                }
                pos = pos.max(entry.end);
            }
            RangeKind::Text => {
                if entry.end <= pos {
                    continue;
                }
                let touched = segments
                    .peek()
                    .is_some_and(|next| next.start < entry.end);
                if !touched && pos == entry.start {
                    if let Some(node) = nodes[entry.index].take() {
                        out.push(node);
                    }
                    pos = entry.end;
                    continue;
                }

                while pos < entry.end {
                    match segments.next_if(|next| next.start < entry.end) {
                        Some(next) => {
                            if pos < next.start {
                                out.push(Node::text(&view.text[pos..next.start]));
                            }
                            out.push(Node::Math(next.segment));
                            pos = next.end;
                        }
                        None => {
                            out.push(Node::text(&view.text[pos..entry.end]));
                            pos = entry.end;
                        }
                    }
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn inline(content: &str, source: &str) -> Node {
        Node::Math(MathSegment {
            content: content.to_owned(),
            display: false,
            source: source.to_owned(),
        })
    }

    fn display(content: &str, source: &str) -> Node {
        Node::Math(MathSegment {
            content: content.to_owned(),
            display: true,
            source: source.to_owned(),
        })
    }

    /// Flattened text of a spliced sequence with segments read back as source.
    fn reconstruct(nodes: &[Node]) -> String {
        nodes.iter().map(Node::text_content).collect()
    }

    #[test]
    fn test_inline_formula_in_sentence() {
        let spliced = split_math(
            vec![Node::text("The formula $a^2+b^2=c^2$ is known.")],
            SpanPolicy::Forbid,
        );
        assert_eq!(
            spliced,
            vec![
                Node::text("The formula "),
                inline("a^2+b^2=c^2", "$a^2+b^2=c^2$"),
                Node::text(" is known."),
            ]
        );
    }

    #[test]
    fn test_padded_single_dollar_is_display() {
        let spliced = split_math(
            vec![Node::text("$ sum_(i=1)^n i $")],
            SpanPolicy::Forbid,
        );
        assert_eq!(
            spliced,
            vec![display("sum_(i=1)^n i", "$ sum_(i=1)^n i $")]
        );
    }

    #[test]
    fn test_no_delimiters_returns_input() {
        let siblings = vec![
            Node::text("plain "),
            Node::element("em", vec![Node::text("prose")]),
        ];
        assert_eq!(split_math(siblings.clone(), SpanPolicy::Forbid), siblings);
    }

    #[test]
    fn test_unclosed_delimiter_returns_input() {
        let siblings = vec![Node::text("costs $5")];
        assert_eq!(split_math(siblings.clone(), SpanPolicy::Forbid), siblings);
    }

    #[test]
    fn test_whitespace_only_run_stays_literal() {
        let siblings = vec![Node::text("a $  $ b")];
        assert_eq!(split_math(siblings.clone(), SpanPolicy::Forbid), siblings);
    }

    #[test]
    fn test_opaque_siblings_preserved_around_math() {
        let strong = Node::element("strong", vec![Node::text("Note")]);
        let spliced = split_math(
            vec![strong.clone(), Node::text(": $x$ and "), Node::InlineCode("y".to_owned())],
            SpanPolicy::Forbid,
        );
        assert_eq!(
            spliced,
            vec![
                strong,
                Node::text(": "),
                inline("x", "$x$"),
                Node::text(" and "),
                Node::InlineCode("y".to_owned()),
            ]
        );
    }

    #[test]
    fn test_run_spanning_adjacent_text_nodes() {
        let spliced = split_math(
            vec![Node::text("a $x"), Node::text("+y$ b")],
            SpanPolicy::Forbid,
        );
        assert_eq!(
            spliced,
            vec![Node::text("a "), inline("x+y", "$x+y$"), Node::text(" b")]
        );
    }

    #[test]
    fn test_multiple_runs_in_one_node() {
        let spliced = split_math(vec![Node::text("$a$, $$b$$.")], SpanPolicy::Forbid);
        assert_eq!(
            spliced,
            vec![
                inline("a", "$a$"),
                Node::text(", "),
                display("b", "$$b$$"),
                Node::text("."),
            ]
        );
    }

    #[test]
    fn test_braces_escaped_in_content() {
        let spliced = split_math(vec![Node::text("$x in {a, b}$")], SpanPolicy::Forbid);
        assert_eq!(spliced, vec![inline("x in &#123;a, b&#125;", "$x in {a, b}$")]);
    }

    #[test]
    fn test_forbid_keeps_crossing_run_literal() {
        let siblings = vec![
            Node::text("$a "),
            Node::element("strong", vec![Node::text("b")]),
            Node::text(" c$"),
        ];
        assert_eq!(split_math(siblings.clone(), SpanPolicy::Forbid), siblings);
    }

    #[test]
    fn test_absorb_merges_crossing_run() {
        let siblings = vec![
            Node::text("x $a "),
            Node::element("strong", vec![Node::text("b")]),
            Node::text(" c$ y"),
        ];
        let spliced = split_math(siblings, SpanPolicy::Absorb);
        assert_eq!(
            spliced,
            vec![Node::text("x "), inline("a b c", "$a b c$"), Node::text(" y")]
        );
    }

    #[test]
    fn test_absorb_finds_math_after_dollar_in_code() {
        let code = Node::InlineCode("$PATH".to_owned());
        let spliced = split_math(
            vec![Node::text("Use "), code.clone(), Node::text(" then $x$ holds")],
            SpanPolicy::Absorb,
        );
        assert_eq!(
            spliced,
            vec![
                Node::text("Use "),
                code,
                Node::text(" then "),
                inline("x", "$x$"),
                Node::text(" holds")
            ]
        );
    }

    #[test]
    fn test_absorb_without_crossing_matches_forbid() {
        let siblings = vec![
            Node::element("em", vec![Node::text("e")]),
            Node::text(" is $e^x$"),
        ];
        assert_eq!(
            split_math(siblings.clone(), SpanPolicy::Absorb),
            split_math(siblings, SpanPolicy::Forbid)
        );
    }

    #[test]
    fn test_empty_opaque_at_boundaries_kept() {
        let br = Node::element("br", Vec::new());
        let spliced = split_math(
            vec![Node::text("$x$"), br.clone(), Node::text("$y$")],
            SpanPolicy::Absorb,
        );
        assert_eq!(spliced, vec![inline("x", "$x$"), br, inline("y", "$y$")]);
    }

    #[test]
    fn test_roundtrip_reconstructs_view() {
        let siblings = vec![
            Node::text("Let $x$ be "),
            Node::element("em", vec![Node::text("real")]),
            Node::text(", then $$x^2 >= 0$$ and $ y $ too; costs $5"),
        ];
        let original = flatten(&siblings).text;
        let spliced = split_math(siblings, SpanPolicy::Forbid);
        assert_eq!(reconstruct(&spliced), original);
    }

    #[test]
    fn test_second_pass_is_noop() {
        let spliced = split_math(
            vec![Node::text("a $x$ b $$y$$")],
            SpanPolicy::Forbid,
        );
        assert_eq!(split_math(spliced.clone(), SpanPolicy::Forbid), spliced);
    }

    #[test]
    fn test_splice_count() {
        let (_, count) = splice_siblings(vec![Node::text("$a$ $b$ $ $")], SpanPolicy::Forbid);
        assert_eq!(count, 2);
    }
}
