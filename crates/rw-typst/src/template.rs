//! Standalone Typst documents for math content.

use rw_math::FenceKind;

/// Page setup that sizes the page to its content.
pub const PAGE_SETUP: &str = "#set page(width: auto, height: auto, margin: 0pt)";

/// Vertical padding for display equations.
pub const DISPLAY_INSET: &str =
    "#show math.equation: it => box(it, inset: (top: 0.5em, bottom: 0.5em))";

/// Build the document compiled for a math segment.
///
/// `content` must already have its braces unescaped. Content that carries its
/// own `$` delimiters is used as-is below the page setup.
///
/// # Example
///
/// ```
/// use rw_typst::math_document;
///
/// assert_eq!(
///     math_document("x^2", false),
///     "#set page(width: auto, height: auto, margin: 0pt)\n$x^2$\n"
/// );
/// ```
#[must_use]
pub fn math_document(content: &str, display: bool) -> String {
    if content.contains('$') {
        format!("{PAGE_SETUP}\n{content}\n")
    } else if display {
        format!("{PAGE_SETUP}\n{DISPLAY_INSET}\n$ {content} $\n")
    } else {
        format!("{PAGE_SETUP}\n${content}$\n")
    }
}

/// Build the document compiled for a typeset fence.
#[must_use]
pub fn fence_document(value: &str, kind: FenceKind) -> String {
    match kind {
        FenceKind::Math => math_document(value.trim(), true),
        FenceKind::Document => format!("{PAGE_SETUP}\n{value}"),
    }
}
