//! Tree node representation for markdown documents.

/// Node in a parsed document tree.
///
/// Each node is owned by exactly one parent's child list; the tree never
/// shares nodes between parents.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Document root.
    Root(Vec<Node>),
    /// Markup container (paragraph, emphasis, heading, list item, ...).
    Element(Element),
    /// Literal text.
    Text(String),
    /// Inline code span.
    InlineCode(String),
    /// Fenced or indented code block.
    Code(CodeBlock),
    /// Math segment awaiting or holding its rendered form.
    Math(MathSegment),
    /// Raw markup fragment, emitted verbatim by the serializer.
    Html(String),
}

/// Markup container with a tag name, ordered attributes and children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    /// Tag name (e.g., `p`, `em`, `div`).
    pub tag: String,
    /// Attributes in insertion order.
    pub attrs: Vec<(String, String)>,
    /// Child nodes.
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty element with the given tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Set an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Set children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Get an attribute value by name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing any existing value with the same name.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.attrs.iter_mut().find(|(key, _)| *key == name) {
            slot.1 = value;
        } else {
            self.attrs.push((name, value));
        }
    }
}

/// Code block with optional language tag and meta string.
///
/// For a fence opened with ```` ```typst eval=false ````, `lang` is `typst`
/// and `meta` is `eval=false`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeBlock {
    pub lang: Option<String>,
    pub meta: Option<String>,
    pub value: String,
}

/// Math expression extracted from prose.
#[derive(Debug, Clone, PartialEq)]
pub struct MathSegment {
    /// Trimmed math content with curly braces entity-escaped.
    pub content: String,
    /// Whether the expression renders as a centered block.
    pub display: bool,
    /// Original delimited source text (e.g., `$x^2$`).
    pub source: String,
}

impl Node {
    /// Create a text node.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Create an element node with the given tag and children.
    #[must_use]
    pub fn element(tag: impl Into<String>, children: Vec<Node>) -> Self {
        Self::Element(Element::new(tag).with_children(children))
    }

    /// Child nodes for container kinds, `None` for leaves.
    #[must_use]
    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Self::Root(children) => Some(children),
            Self::Element(element) => Some(&element.children),
            _ => None,
        }
    }

    /// Mutable child list for container kinds, `None` for leaves.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Self::Root(children) => Some(children),
            Self::Element(element) => Some(&mut element.children),
            _ => None,
        }
    }

    /// Concatenated text of this node and all descendants.
    ///
    /// Math segments contribute their original delimited source.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(value) | Self::InlineCode(value) => out.push_str(value),
            Self::Code(code) => out.push_str(&code.value),
            Self::Math(math) => out.push_str(&math.source),
            Self::Html(_) => {}
            Self::Root(children) => children.iter().for_each(|c| c.collect_text(out)),
            Self::Element(element) => element.children.iter().for_each(|c| c.collect_text(out)),
        }
    }

    /// Visit this node and all descendants in pre-order.
    pub fn walk(&self, visit: &mut impl FnMut(&Node)) {
        visit(self);
        if let Some(children) = self.children() {
            for child in children {
                child.walk(visit);
            }
        }
    }
}
