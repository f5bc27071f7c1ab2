//! In-place substitution of compile results into the tree.

use rw_doctree::{Element, Node};
use serde::Deserialize;

use crate::error::CompileError;
use crate::svg::{CompiledSvg, set_svg_size};

/// Reference size in points of one em.
pub const DEFAULT_EM_SIZE: f64 = 11.0;

/// Class name family used for rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassStyle {
    /// `typst-inline`, `typst-display`, `typst-error`.
    #[default]
    Typst,
    /// `math-inline`, `math-display`, `math-error`.
    Math,
}

impl ClassStyle {
    /// Class name prefix.
    #[must_use]
    pub fn family(self) -> &'static str {
        match self {
            Self::Typst => "typst",
            Self::Math => "math",
        }
    }
}

/// Output options for substituted nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub class_style: ClassStyle,
    /// Points per em used to normalize image dimensions.
    pub em_size: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            class_style: ClassStyle::default(),
            em_size: DEFAULT_EM_SIZE,
        }
    }
}

/// Replace `node` with the rendered image or an error marker.
///
/// Display output becomes a `div` centered as a block, inline output a `span`
/// aligned to the middle of the line. On failure the node becomes a marker
/// element with a single `[<family> error: <message>]` text child. Nothing
/// outside `node` is touched.
pub fn substitute(
    node: &mut Node,
    display: bool,
    result: Result<CompiledSvg, CompileError>,
    options: &RenderOptions,
) {
    let family = options.class_style.family();
    let (tag, mode) = if display {
        ("div", "display")
    } else {
        ("span", "inline")
    };

    *node = match result {
        Ok(compiled) => {
            let style = if display {
                "display: block; margin: 0 auto;"
            } else {
                "vertical-align: middle;"
            };
            let svg = set_svg_size(
                &compiled.svg,
                &to_em(compiled.width, options.em_size),
                &to_em(compiled.height, options.em_size),
            );
            Node::Element(
                Element::new(tag)
                    .with_attr("class", format!("{family}-{mode}"))
                    .with_attr("style", style)
                    .with_children(vec![Node::Html(svg)]),
            )
        }
        Err(err) => {
            tracing::warn!(error = %err, mode, "Math rendering failed");
            Node::Element(
                Element::new(tag)
                    .with_attr("class", format!("{family}-error"))
                    .with_children(vec![Node::text(format!("[{family} error: {err}]"))]),
            )
        }
    };
}

/// Format a length in points as an em value.
fn to_em(points: f64, em_size: f64) -> String {
    let value = format!("{:.3}", points / em_size);
    let value = value.trim_end_matches('0').trim_end_matches('.');
    format!("{value}em")
}
