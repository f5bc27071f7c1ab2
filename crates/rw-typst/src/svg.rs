//! SVG measurement and sizing.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CompileError;

/// Root `<svg ...>` start tag.
static SVG_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<svg\b[^>]*>").unwrap());

/// `width="12.5pt"` on the root tag.
static WIDTH_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\swidth="([0-9]*\.?[0-9]+)(?:pt|px)?""#).unwrap());

/// `height="12.5pt"` on the root tag.
static HEIGHT_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\sheight="([0-9]*\.?[0-9]+)(?:pt|px)?""#).unwrap());

/// `viewBox="min-x min-y width height"`.
static VIEWBOX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\sviewBox="\s*-?[0-9.]+[\s,]+-?[0-9.]+[\s,]+([0-9.]+)[\s,]+([0-9.]+)\s*""#)
        .unwrap()
});

/// Any `width`/`height` attribute on the root tag, whatever its unit.
static SIZE_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s(?:width|height)="[^"]*""#).unwrap());

/// Compiled vector image with its intrinsic size in points.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSvg {
    /// SVG markup starting at the root tag.
    pub svg: String,
    pub width: f64,
    pub height: f64,
}

impl CompiledSvg {
    /// Parse engine output, reading the intrinsic size from the root tag.
    ///
    /// Anything before the root tag (XML declaration, doctype) is dropped.
    pub fn parse(output: &str) -> Result<Self, CompileError> {
        let tag = SVG_TAG_RE
            .find(output)
            .ok_or(CompileError::InvalidSvg("missing <svg> root"))?;
        let (width, height) = root_dimensions(tag.as_str())
            .ok_or(CompileError::InvalidSvg("missing width/height"))?;
        Ok(Self {
            svg: output[tag.start()..].trim_end().to_owned(),
            width,
            height,
        })
    }
}

/// Read `width`/`height` from a root tag, falling back to the `viewBox`.
fn root_dimensions(tag: &str) -> Option<(f64, f64)> {
    let attr = |re: &Regex| {
        re.captures(tag)
            .and_then(|caps| caps[1].parse::<f64>().ok())
    };
    if let (Some(width), Some(height)) = (attr(&WIDTH_ATTR_RE), attr(&HEIGHT_ATTR_RE)) {
        return Some((width, height));
    }
    let caps = VIEWBOX_RE.captures(tag)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

/// Replace the root tag's `width`/`height` with the given CSS lengths.
///
/// # Example
///
/// ```
/// use rw_typst::set_svg_size;
///
/// let svg = r#"<svg viewBox="0 0 22 11" width="22pt" height="11pt"></svg>"#;
/// assert_eq!(
///     set_svg_size(svg, "2em", "1em"),
///     r#"<svg width="2em" height="1em" viewBox="0 0 22 11"></svg>"#
/// );
/// ```
#[must_use]
pub fn set_svg_size(svg: &str, width: &str, height: &str) -> String {
    let Some(tag) = SVG_TAG_RE.find(svg) else {
        return svg.to_owned();
    };
    let stripped = SIZE_ATTR_RE.replace_all(tag.as_str(), "");
    let rest = stripped.strip_prefix("<svg").unwrap_or(&stripped);
    format!(
        r#"{}<svg width="{width}" height="{height}"{rest}{}"#,
        &svg[..tag.start()],
        &svg[tag.end()..]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const TYPST_SVG: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8"?>"#,
        "\n",
        r#"<svg class="typst-doc" viewBox="0 0 30.5 12.25" width="30.5pt" height="12.25pt" xmlns="http://www.w3.org/2000/svg">"#,
        r#"<path stroke-width="1.2" d="M0 0"/></svg>"#,
        "\n"
    );

    #[test]
    fn test_parse_reads_attributes() {
        let compiled = CompiledSvg::parse(TYPST_SVG).unwrap();
        assert!((compiled.width - 30.5).abs() < f64::EPSILON);
        assert!((compiled.height - 12.25).abs() < f64::EPSILON);
        assert!(compiled.svg.starts_with("<svg class"));
        assert!(compiled.svg.ends_with("</svg>"));
    }

    #[test]
    fn test_parse_falls_back_to_viewbox() {
        let compiled = CompiledSvg::parse(r#"<svg viewBox="0 0 44 22"></svg>"#).unwrap();
        assert!((compiled.width - 44.0).abs() < f64::EPSILON);
        assert!((compiled.height - 22.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_rejects_non_svg() {
        assert!(matches!(
            CompiledSvg::parse("error: nothing"),
            Err(CompileError::InvalidSvg(_))
        ));
        assert!(matches!(
            CompiledSvg::parse("<svg></svg>"),
            Err(CompileError::InvalidSvg(_))
        ));
    }

    #[test]
    fn test_set_size_keeps_child_attributes() {
        let compiled = CompiledSvg::parse(TYPST_SVG).unwrap();
        let sized = set_svg_size(&compiled.svg, "2.773em", "1.114em");
        assert!(sized.starts_with(r#"<svg width="2.773em" height="1.114em" class="typst-doc""#));
        assert!(!sized.contains("30.5pt"));
        assert!(sized.contains(r#"stroke-width="1.2""#));
    }

    #[test]
    fn test_set_size_without_svg_is_identity() {
        assert_eq!(set_svg_size("<p>x</p>", "1em", "1em"), "<p>x</p>");
    }
}
