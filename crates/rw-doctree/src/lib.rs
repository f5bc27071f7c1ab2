//! Document tree model for RW markdown pages.
//!
//! Markdown is parsed once into an owned [`Node`] tree so later passes can
//! rewrite it in place before serialization:
//!
//! - [`from_markdown`]: build the tree from pulldown-cmark events
//! - [`to_html`]: serialize the tree back to HTML
//!
//! # Example
//!
//! ```
//! use rw_doctree::{from_markdown, to_html};
//!
//! let root = from_markdown("# Hello\n\n**Bold** text");
//! assert_eq!(to_html(&root), "<h1>Hello</h1><p><strong>Bold</strong> text</p>");
//! ```

mod builder;
mod html;
mod node;

pub use builder::{from_markdown, parser_options};
pub use html::{escape_html, to_html};
pub use node::{CodeBlock, Element, MathSegment, Node};
