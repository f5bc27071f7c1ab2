//! Delimiter-run matching over a flattened view.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::flatten::{FlattenedView, RangeKind};

/// `$$...$$` or `$...$`, shortest content first.
///
/// The double-dollar alternative is tried first so `$$x$$` is never read as
/// an empty inline run followed by literal text.
static DELIMITED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\$\$(.+?)\$\$|\$(.+?)\$").unwrap());

/// How a delimiter run may relate to non-text siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanPolicy {
    /// Runs are searched inside each stretch of adjacent text siblings and
    /// never cross a non-text sibling.
    #[default]
    Forbid,
    /// Runs are searched across the whole view. A non-text sibling strictly
    /// inside a run is absorbed: its plain text becomes part of the math
    /// content and the node itself is dropped. Only text siblings supply
    /// delimiters.
    Absorb,
}

impl SpanPolicy {
    /// Return the policy name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Forbid => "forbid",
            Self::Absorb => "absorb",
        }
    }
}

/// Delimiter run found in a flattened view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathMatch {
    /// Byte offset of the opening delimiter.
    pub start: usize,
    /// Byte offset just past the closing delimiter.
    pub end: usize,
    /// `$` or `$$`.
    pub delimiter: &'static str,
    /// Content between the delimiters, untrimmed.
    pub inner: String,
    /// Full delimited text.
    pub source: String,
}

/// Find all delimiter runs in the view.
///
/// Matches are non-overlapping and ordered by `start`. An opening delimiter
/// that never closes produces no match and stays literal text.
#[must_use]
pub fn find_matches(view: &FlattenedView, policy: SpanPolicy) -> Vec<MathMatch> {
    match policy {
        SpanPolicy::Forbid => view
            .text_runs()
            .into_iter()
            .flat_map(|(start, end)| {
                let text = &view.text[start..end];
                scan(text, text, start)
            })
            .collect(),
        SpanPolicy::Absorb => scan(&delimiter_haystack(view), &view.text, 0),
    }
}

/// Scan `haystack` for delimiter runs, reporting offsets shifted by `base`.
///
/// Content is read from `text`, which has the same byte layout as
/// `haystack`.
fn scan(haystack: &str, text: &str, base: usize) -> Vec<MathMatch> {
    DELIMITED_RE
        .captures_iter(haystack)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let (delimiter, inner) = match (caps.get(1), caps.get(2)) {
                (Some(inner), _) => ("$$", inner.range()),
                (None, Some(inner)) => ("$", inner.range()),
                (None, None) => return None,
            };
            Some(MathMatch {
                start: base + whole.start(),
                end: base + whole.end(),
                delimiter,
                inner: text[inner].to_owned(),
                source: text[whole.range()].to_owned(),
            })
        })
        .collect()
}

/// The view text with `$` inside non-text ranges masked out.
///
/// Byte offsets are unchanged, so a match in the haystack addresses the same
/// bytes of the view.
fn delimiter_haystack(view: &FlattenedView) -> String {
    let mut haystack = view.text.clone();
    for entry in &view.entries {
        let value = &view.text[entry.start..entry.end];
        if entry.kind == RangeKind::Opaque && value.contains('$') {
            haystack.replace_range(entry.start..entry.end, &value.replace('$', OPAQUE_MASK));
        }
    }
    haystack
}

/// Stand-in for `$` in non-text ranges; one byte, like `$`.
const OPAQUE_MASK: &str = "\u{1a}";
