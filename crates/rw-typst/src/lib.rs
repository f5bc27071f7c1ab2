//! Typst rendering for math segments.
//!
//! Takes a document tree whose math has been extracted by `rw_math` and
//! replaces every segment with SVG produced by the Typst compiler:
//!
//! - [`render_math`]: collects segments and typeset fences, compiles them
//!   concurrently and waits for all of them
//! - [`CompileEngine`]: shared compile service with a bounded cache, one
//!   compile at a time
//! - [`TypstBackend`]: the compiler itself; [`TypstCli`] runs the `typst`
//!   binary
//! - [`substitute`]: writes a result (or an error marker) into its node
//!
//! # Example
//!
//! ```no_run
//! use rw_doctree::{from_markdown, to_html};
//! use rw_math::{SpanPolicy, extract_math};
//! use rw_typst::{CompileEngine, RenderOptions, TypstCli, render_math};
//!
//! # async fn run() {
//! let mut root = from_markdown("Euler: $e^(i pi) + 1 = 0$");
//! extract_math(&mut root, SpanPolicy::Forbid);
//!
//! let engine = CompileEngine::new(TypstCli::default());
//! let report = render_math(&mut root, &engine, &RenderOptions::default()).await;
//! println!("{} rendered, {} failed", report.rendered, report.failed);
//! println!("{}", to_html(&root));
//! # }
//! ```

mod backend;
mod dispatch;
mod engine;
mod error;
mod svg;
mod template;
mod writer;

pub use backend::{DEFAULT_TYPST_BINARY, TypstBackend, TypstCli};
pub use dispatch::{RenderReport, render_math};
pub use engine::{CompileEngine, DEFAULT_RETAIN, MathKey};
pub use error::{CompileError, Diagnostics};
pub use svg::{CompiledSvg, set_svg_size};
pub use template::{DISPLAY_INSET, PAGE_SETUP, fence_document, math_document};
pub use writer::{ClassStyle, DEFAULT_EM_SIZE, RenderOptions, substitute};
