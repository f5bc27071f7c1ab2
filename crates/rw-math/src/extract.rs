//! Whole-tree math extraction.

use rw_doctree::Node;

use crate::matcher::SpanPolicy;
use crate::splice::splice_siblings;

/// Replace delimiter runs with math segments throughout a document tree.
///
/// Every container's child list is spliced, then its children are visited
/// in pre-order. Code, inline code, raw HTML and existing math segments are
/// leaves and never scanned. Returns the number of segments created.
///
/// # Example
///
/// ```
/// use rw_doctree::from_markdown;
/// use rw_math::{SpanPolicy, extract_math};
///
/// let mut root = from_markdown("Area: $pi r^2$\n\n```\n$not math$\n```");
/// assert_eq!(extract_math(&mut root, SpanPolicy::Forbid), 1);
/// ```
pub fn extract_math(node: &mut Node, policy: SpanPolicy) -> usize {
    let count = extract_in(node, policy);
    tracing::debug!(segments = count, policy = policy.as_str(), "Extracted math segments");
    count
}

fn extract_in(node: &mut Node, policy: SpanPolicy) -> usize {
    let Some(children) = node.children_mut() else {
        return 0;
    };

    let (spliced, mut count) = splice_siblings(std::mem::take(children), policy);
    *children = spliced;

    for child in children.iter_mut() {
        count += extract_in(child, policy);
    }
    count
}
