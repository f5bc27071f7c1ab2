//! Markdown to document tree conversion.
//!
//! Walks the pulldown-cmark event stream and assembles a [`Node`] tree.
//! Math parsing is left disabled so `$` delimiters reach the tree as plain
//! text; recognizing them is a separate pass.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::node::{CodeBlock, Element, Node};

/// Parser options used by [`from_markdown`].
#[must_use]
pub fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_GFM
}

/// Parse markdown into a document tree.
///
/// # Example
///
/// ```
/// use rw_doctree::{Node, from_markdown};
///
/// let root = from_markdown("Hello *world*");
/// let Node::Root(blocks) = &root else { unreachable!() };
/// assert_eq!(blocks.len(), 1);
/// assert_eq!(root.text_content(), "Hello world");
/// ```
#[must_use]
pub fn from_markdown(markdown: &str) -> Node {
    let mut builder = TreeBuilder::new();
    for event in Parser::new_ext(markdown, parser_options()) {
        builder.event(event);
    }
    builder.finish()
}

/// Open container on the builder stack.
enum Frame {
    Element(Element),
    Code(CodeBlock),
    Html(String),
    /// Frontmatter and other content that is dropped from the tree.
    Skip,
}

struct TreeBuilder {
    root: Vec<Node>,
    stack: Vec<Frame>,
    in_table_head: bool,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            root: Vec::new(),
            stack: Vec::new(),
            in_table_head: false,
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.push_node(Node::InlineCode(code.into_string())),
            Event::Html(html) | Event::InlineHtml(html) => self.html(&html),
            Event::SoftBreak => self.text("\n"),
            Event::HardBreak => self.push_node(Node::element("br", Vec::new())),
            Event::Rule => self.push_node(Node::element("hr", Vec::new())),
            Event::TaskListMarker(checked) => {
                let mut input = Element::new("input")
                    .with_attr("type", "checkbox")
                    .with_attr("disabled", "");
                if checked {
                    input.set_attr("checked", "");
                }
                self.push_node(Node::Element(input));
            }
            Event::FootnoteReference(label) => {
                let link = Element::new("sup")
                    .with_attr("class", "footnote-reference")
                    .with_children(vec![Node::text(label.into_string())]);
                self.push_node(Node::Element(link));
            }
            // Math parsing is disabled; kept literal should the options change.
            Event::InlineMath(math) => self.text(&format!("${math}$")),
            Event::DisplayMath(math) => self.text(&format!("$${math}$$")),
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        let element = match tag {
            Tag::Paragraph => Element::new("p"),
            Tag::Heading { level, .. } => Element::new(heading_tag(level)),
            Tag::BlockQuote(_) => Element::new("blockquote"),
            Tag::CodeBlock(kind) => {
                let code = match kind {
                    CodeBlockKind::Fenced(info) => parse_fence_info(&info),
                    CodeBlockKind::Indented => CodeBlock::default(),
                };
                self.stack.push(Frame::Code(code));
                return;
            }
            Tag::HtmlBlock => {
                self.stack.push(Frame::Html(String::new()));
                return;
            }
            Tag::MetadataBlock(_) => {
                self.stack.push(Frame::Skip);
                return;
            }
            Tag::List(Some(start)) => {
                let list = Element::new("ol");
                if start == 1 {
                    list
                } else {
                    list.with_attr("start", start.to_string())
                }
            }
            Tag::List(None) => Element::new("ul"),
            Tag::Item => Element::new("li"),
            Tag::FootnoteDefinition(label) => Element::new("div")
                .with_attr("class", "footnote-definition")
                .with_attr("id", label.into_string()),
            Tag::DefinitionList => Element::new("dl"),
            Tag::DefinitionListTitle => Element::new("dt"),
            Tag::DefinitionListDefinition => Element::new("dd"),
            Tag::Table(_) => Element::new("table"),
            Tag::TableHead => {
                self.in_table_head = true;
                self.stack.push(Frame::Element(Element::new("thead")));
                Element::new("tr")
            }
            Tag::TableRow => Element::new("tr"),
            Tag::TableCell => Element::new(if self.in_table_head { "th" } else { "td" }),
            Tag::Emphasis => Element::new("em"),
            Tag::Strong => Element::new("strong"),
            Tag::Strikethrough => Element::new("del"),
            Tag::Superscript => Element::new("sup"),
            Tag::Subscript => Element::new("sub"),
            Tag::Link {
                dest_url, title, ..
            } => {
                let link = Element::new("a").with_attr("href", dest_url.into_string());
                if title.is_empty() {
                    link
                } else {
                    link.with_attr("title", title.into_string())
                }
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let image = Element::new("img").with_attr("src", dest_url.into_string());
                if title.is_empty() {
                    image
                } else {
                    image.with_attr("title", title.into_string())
                }
            }
        };
        self.stack.push(Frame::Element(element));
    }

    fn end_tag(&mut self, tag: TagEnd) {
        if matches!(tag, TagEnd::TableHead) {
            self.in_table_head = false;
            // `thead` wraps a synthetic row: close both.
            self.close_frame();
        }
        self.close_frame();
    }

    fn close_frame(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let node = match frame {
            Frame::Element(mut element) => {
                if element.tag == "img" {
                    // Image children are the alt text.
                    let alt = Node::Root(std::mem::take(&mut element.children)).text_content();
                    element.set_attr("alt", alt);
                }
                Node::Element(element)
            }
            Frame::Code(code) => Node::Code(code),
            Frame::Html(html) => Node::Html(html),
            Frame::Skip => return,
        };
        self.push_node(node);
    }

    fn text(&mut self, text: &str) {
        match self.stack.last_mut() {
            Some(Frame::Code(code)) => code.value.push_str(text),
            Some(Frame::Html(html)) => html.push_str(text),
            Some(Frame::Skip) => {}
            Some(Frame::Element(element)) => push_text(&mut element.children, text),
            None => push_text(&mut self.root, text),
        }
    }

    fn html(&mut self, html: &str) {
        match self.stack.last_mut() {
            Some(Frame::Html(buffer)) => buffer.push_str(html),
            Some(Frame::Skip) => {}
            _ => self.push_node(Node::Html(html.to_owned())),
        }
    }

    fn push_node(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(Frame::Element(element)) => element.children.push(node),
            Some(Frame::Skip) => {}
            // Leaf frames never receive child nodes from a well-formed stream.
            Some(Frame::Code(_) | Frame::Html(_)) | None => self.root.push(node),
        }
    }

    fn finish(mut self) -> Node {
        while !self.stack.is_empty() {
            self.close_frame();
        }
        Node::Root(self.root)
    }
}

/// Append text, merging with a trailing text node.
///
/// pulldown-cmark splits prose at every potential markup character; merging
/// keeps one text node per run so later passes see whole sentences.
fn push_text(children: &mut Vec<Node>, text: &str) {
    if let Some(Node::Text(last)) = children.last_mut() {
        last.push_str(text);
    } else {
        children.push(Node::text(text));
    }
}

/// Split a fence info string into language and meta.
///
/// ```text
/// typst eval=false  ->  lang: "typst", meta: "eval=false"
/// ```
fn parse_fence_info(info: &str) -> CodeBlock {
    let info = info.trim();
    let (lang, meta) = match info.split_once(char::is_whitespace) {
        Some((lang, meta)) => (lang, meta.trim()),
        None => (info, ""),
    };
    CodeBlock {
        lang: (!lang.is_empty()).then(|| lang.to_owned()),
        meta: (!meta.is_empty()).then(|| meta.to_owned()),
        value: String::new(),
    }
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}
