//! HTML serialization for document trees.

use std::fmt::Write;

use crate::node::{Element, MathSegment, Node};

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input"];

/// Escape special HTML characters.
///
/// # Example
///
/// ```
/// use rw_doctree::escape_html;
///
/// assert_eq!(escape_html("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
/// ```
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Serialize a document tree to HTML.
///
/// Math segments that were never substituted are emitted as a `span`
/// (inline) or `div` (display) holding their original delimited source, so
/// the text survives when rendering is disabled.
#[must_use]
pub fn to_html(node: &Node) -> String {
    let mut out = String::with_capacity(4096);
    write_node(node, &mut out);
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Root(children) => write_children(children, out),
        Node::Element(element) => write_element(element, out),
        Node::Text(value) => out.push_str(&escape_html(value)),
        Node::InlineCode(value) => {
            write!(out, "<code>{}</code>", escape_html(value)).unwrap();
        }
        Node::Code(code) => {
            if let Some(lang) = &code.lang {
                write!(
                    out,
                    r#"<pre><code class="language-{}">{}</code></pre>"#,
                    escape_html(lang),
                    escape_html(&code.value)
                )
                .unwrap();
            } else {
                write!(out, "<pre><code>{}</code></pre>", escape_html(&code.value)).unwrap();
            }
        }
        Node::Math(math) => write_math_source(math, out),
        Node::Html(html) => out.push_str(html),
    }
}

fn write_children(children: &[Node], out: &mut String) {
    for child in children {
        write_node(child, out);
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag);
    for (name, value) in &element.attrs {
        if value.is_empty() {
            write!(out, " {name}").unwrap();
        } else {
            write!(out, r#" {name}="{}""#, escape_html(value)).unwrap();
        }
    }
    out.push('>');
    if VOID_ELEMENTS.contains(&element.tag.as_str()) {
        return;
    }
    write_children(&element.children, out);
    write!(out, "</{}>", element.tag).unwrap();
}

fn write_math_source(math: &MathSegment, out: &mut String) {
    let (tag, class) = if math.display {
        ("div", "math-display")
    } else {
        ("span", "math-inline")
    };
    write!(
        out,
        r#"<{tag} class="{class}">{}</{tag}>"#,
        escape_html(&math.source)
    )
    .unwrap();
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::builder::from_markdown;
    use crate::node::CodeBlock;

    #[test]
    fn test_paragraph_roundtrip() {
        let html = to_html(&from_markdown("Hello **bold** & <world>"));
        assert_eq!(html, "<p>Hello <strong>bold</strong> &amp; <world></p>");
    }

    #[test]
    fn test_text_is_escaped() {
        let html = to_html(&Node::element("p", vec![Node::text("1 < 2")]));
        assert_eq!(html, "<p>1 &lt; 2</p>");
    }

    #[test]
    fn test_void_element_and_boolean_attr() {
        let input = Element::new("input")
            .with_attr("type", "checkbox")
            .with_attr("checked", "");
        assert_eq!(
            to_html(&Node::Element(input)),
            r#"<input type="checkbox" checked>"#
        );
    }

    #[test]
    fn test_code_block_with_lang() {
        let code = Node::Code(CodeBlock {
            lang: Some("typst".to_owned()),
            meta: None,
            value: "$x < y$".to_owned(),
        });
        assert_eq!(
            to_html(&code),
            r#"<pre><code class="language-typst">$x &lt; y$</code></pre>"#
        );
    }

    #[test]
    fn test_unrendered_math_keeps_source() {
        let inline = Node::Math(MathSegment {
            content: "x".to_owned(),
            display: false,
            source: "$x$".to_owned(),
        });
        let display = Node::Math(MathSegment {
            content: "x".to_owned(),
            display: true,
            source: "$$x$$".to_owned(),
        });
        assert_eq!(to_html(&inline), r#"<span class="math-inline">$x$</span>"#);
        assert_eq!(to_html(&display), r#"<div class="math-display">$$x$$</div>"#);
    }

    #[test]
    fn test_raw_html_verbatim() {
        let node = Node::element("span", vec![Node::Html("<svg></svg>".to_owned())]);
        assert_eq!(to_html(&node), "<span><svg></svg></span>");
    }
}
