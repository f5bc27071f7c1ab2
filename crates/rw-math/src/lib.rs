//! Math segment extraction for RW document trees.
//!
//! Finds author-written math (`$...$` and `$$...$$`) in prose and replaces it
//! with [`rw_doctree::MathSegment`] nodes, leaving the surrounding markup
//! intact:
//!
//! - [`flatten`]: concatenated text view of a sibling sequence with an offset map
//! - [`find_matches`]: delimiter runs in the view, governed by [`SpanPolicy`]
//! - [`is_display`]: inline/display classification
//! - [`split_math`]: rebuild a sibling sequence around the runs
//! - [`extract_math`]: apply the split to a whole tree
//! - [`typeset_fence`]: recognize fenced blocks that render through the same engine
//!
//! # Example
//!
//! ```
//! use rw_doctree::{Node, from_markdown};
//! use rw_math::{SpanPolicy, extract_math};
//!
//! let mut root = from_markdown("The formula $a^2+b^2=c^2$ is known.");
//! extract_math(&mut root, SpanPolicy::default());
//!
//! let mut contents = Vec::new();
//! root.walk(&mut |node| {
//!     if let Node::Math(math) = node {
//!         contents.push(math.content.clone());
//!     }
//! });
//! assert_eq!(contents, vec!["a^2+b^2=c^2"]);
//! ```

mod classify;
mod escape;
mod extract;
mod fence;
mod flatten;
mod matcher;
mod splice;

pub use classify::{is_display, segment_from_match};
pub use escape::{escape_braces, unescape_braces};
pub use extract::extract_math;
pub use fence::{FenceKind, FenceMeta, typeset_fence};
pub use flatten::{FlattenedView, OffsetEntry, RangeKind, flatten, has_delimiter};
pub use matcher::{MathMatch, SpanPolicy, find_matches};
pub use splice::split_math;
