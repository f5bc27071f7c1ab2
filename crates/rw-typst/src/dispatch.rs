//! Render pass over a document tree.

use futures::future::join_all;
use rw_doctree::Node;
use rw_math::{FenceKind, typeset_fence, unescape_braces};

use crate::backend::TypstBackend;
use crate::engine::CompileEngine;
use crate::template::{fence_document, math_document};
use crate::writer::{RenderOptions, substitute};

/// Outcome counts of a render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub rendered: usize,
    pub failed: usize,
}

impl RenderReport {
    /// Total number of jobs dispatched.
    #[must_use]
    pub fn total(&self) -> usize {
        self.rendered + self.failed
    }
}

/// Node to be replaced by one compiled document.
struct Job<'a> {
    target: &'a mut Node,
    source: String,
    display: bool,
}

/// Render every math segment and typeset fence in the tree.
///
/// One job is collected per segment in a single pre-order walk, then all
/// jobs are started together and awaited as a group: the returned future
/// completes only once every job has settled. A failed job leaves an error
/// marker in its own node and never affects the others.
///
/// A paragraph holding nothing but a display segment is replaced as a whole,
/// so the block output is not nested in a `p`.
pub async fn render_math<B: TypstBackend>(
    root: &mut Node,
    engine: &CompileEngine<B>,
    options: &RenderOptions,
) -> RenderReport {
    let mut jobs = Vec::new();
    collect_jobs(root, &mut jobs);
    if jobs.is_empty() {
        return RenderReport::default();
    }
    tracing::debug!(jobs = jobs.len(), "Dispatching math jobs");

    let outcomes = join_all(jobs.into_iter().map(|job| async move {
        let result = engine.compile(&job.source).await;
        let ok = result.is_ok();
        substitute(job.target, job.display, result, options);
        ok
    }))
    .await;

    let rendered = outcomes.iter().filter(|ok| **ok).count();
    let report = RenderReport {
        rendered,
        failed: outcomes.len() - rendered,
    };
    tracing::info!(
        rendered = report.rendered,
        failed = report.failed,
        "Rendered math"
    );
    report
}

fn collect_jobs<'a>(node: &'a mut Node, jobs: &mut Vec<Job<'a>>) {
    if let Some((source, display)) = job_source(node) {
        jobs.push(Job {
            target: node,
            source,
            display,
        });
        return;
    }
    if let Some(children) = node.children_mut() {
        for child in children {
            collect_jobs(child, jobs);
        }
    }
}

/// Document source and display flag if `node` is rendered as a unit.
fn job_source(node: &Node) -> Option<(String, bool)> {
    match node {
        Node::Math(math) if !math.content.is_empty() => Some((
            math_document(&unescape_braces(&math.content), math.display),
            math.display,
        )),
        Node::Code(code) => typeset_fence(code)
            .filter(|kind| *kind == FenceKind::Document || !code.value.trim().is_empty())
            .map(|kind| (fence_document(&code.value, kind), true)),
        Node::Element(element) if element.tag == "p" => match element.children.as_slice() {
            [Node::Math(math)] if math.display => job_source(&element.children[0]),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use pretty_assertions::assert_eq;
    use rw_doctree::{from_markdown, to_html};
    use rw_math::{SpanPolicy, extract_math};

    use super::*;
    use crate::engine::tests::FakeBackend;

    fn prepare(markdown: &str) -> Node {
        let mut root = from_markdown(markdown);
        extract_math(&mut root, SpanPolicy::Forbid);
        root
    }

    fn count_class(root: &Node, class: &str) -> usize {
        let mut count = 0;
        root.walk(&mut |node| {
            if let Node::Element(element) = node
                && element.attr("class") == Some(class)
            {
                count += 1;
            }
        });
        count
    }

    #[tokio::test]
    async fn test_inline_segment_rendered_in_place() {
        let mut root = prepare("The formula $a^2+b^2=c^2$ is known.");
        let engine = CompileEngine::new(FakeBackend::default());
        let report = render_math(&mut root, &engine, &RenderOptions::default()).await;

        assert_eq!(report, RenderReport { rendered: 1, failed: 0 });
        assert_eq!(
            to_html(&root),
            concat!(
                "<p>The formula ",
                r#"<span class="typst-inline" style="vertical-align: middle;">"#,
                r#"<svg width="2em" height="1em" viewBox="0 0 22 11"><path/></svg></span>"#,
                " is known.</p>"
            )
        );
    }

    #[tokio::test]
    async fn test_failed_job_does_not_affect_siblings() {
        let mut root = prepare("$a$ then $b$ then $fail$ then $$c$$ and $d$");
        let backend = FakeBackend {
            yields: VecDeque::from([4, 1, 3, 1, 2]),
            ..FakeBackend::default()
        };
        let engine = CompileEngine::new(backend);
        let report = render_math(&mut root, &engine, &RenderOptions::default()).await;

        assert_eq!(report, RenderReport { rendered: 4, failed: 1 });
        assert_eq!(report.total(), 5);
        assert_eq!(count_class(&root, "typst-error"), 1);
        assert_eq!(count_class(&root, "typst-inline"), 3);
        assert_eq!(count_class(&root, "typst-display"), 1);
        assert!(to_html(&root).contains("[typst error: error: unknown variable: fail]"));
        assert_eq!(engine.into_backend().sources.len(), 5);
    }

    #[tokio::test]
    async fn test_braces_unescaped_before_compile() {
        let mut root = prepare("Set $x in {a, b}$.");
        let engine = CompileEngine::new(FakeBackend::default());
        render_math(&mut root, &engine, &RenderOptions::default()).await;
        assert_eq!(
            engine.into_backend().sources,
            vec![math_document("x in {a, b}", false)]
        );
    }

    #[tokio::test]
    async fn test_sole_display_replaces_paragraph() {
        let mut root = prepare("$ sum_(i=1)^n i $\n\nText with $$y$$ inside.");
        let engine = CompileEngine::new(FakeBackend::default());
        render_math(&mut root, &engine, &RenderOptions::default()).await;

        let Node::Root(children) = &root else {
            panic!("expected root");
        };
        let Node::Element(first) = &children[0] else {
            panic!("expected element");
        };
        assert_eq!(first.tag, "div");
        assert_eq!(first.attr("class"), Some("typst-display"));

        // Display math sharing its paragraph stays nested.
        let Node::Element(second) = &children[1] else {
            panic!("expected element");
        };
        assert_eq!(second.tag, "p");
        assert_eq!(count_class(&children[1], "typst-display"), 1);
    }

    #[tokio::test]
    async fn test_typeset_fences() {
        let markdown = "```typst\n#rect()\n```\n\n```typst eval=false\n#circle()\n```\n\n```math\nx + 1\n```";
        let mut root = prepare(markdown);
        let engine = CompileEngine::new(FakeBackend::default());
        let report = render_math(&mut root, &engine, &RenderOptions::default()).await;

        assert_eq!(report.rendered, 2);
        let html = to_html(&root);
        assert!(html.contains(r#"<pre><code class="language-typst">#circle()"#));
        assert_eq!(count_class(&root, "typst-display"), 2);
        assert_eq!(
            engine.into_backend().sources,
            vec![
                fence_document("#rect()\n", rw_math::FenceKind::Document),
                math_document("x + 1", true),
            ]
        );
    }

    #[tokio::test]
    async fn test_no_math_is_noop() {
        let mut root = prepare("Nothing to *see* here, `$x$` is code.");
        let before = root.clone();
        let engine = CompileEngine::new(FakeBackend::default());
        let report = render_math(&mut root, &engine, &RenderOptions::default()).await;
        assert_eq!(report, RenderReport::default());
        assert_eq!(root, before);
    }

    #[tokio::test]
    async fn test_blank_math_fence_is_skipped() {
        let mut root = prepare("```math\n   \n```\n");
        let before = root.clone();
        let engine = CompileEngine::new(FakeBackend::default());
        let report = render_math(&mut root, &engine, &RenderOptions::default()).await;
        assert_eq!(report, RenderReport::default());
        assert_eq!(root, before);
        assert!(engine.into_backend().sources.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_formula_compiles_once() {
        let mut root = prepare("$x$ and again $x$");
        let engine = CompileEngine::new(FakeBackend::default());
        let report = render_math(&mut root, &engine, &RenderOptions::default()).await;
        assert_eq!(report.rendered, 2);
        assert_eq!(engine.into_backend().sources.len(), 1);
    }
}
