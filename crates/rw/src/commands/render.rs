//! `rw render` command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use rw_config::{CliSettings, Config, MathConfig};
use rw_doctree::{from_markdown, to_html};
use rw_math::extract_math;
use rw_typst::{CompileEngine, RenderOptions, RenderReport, TypstCli, render_math};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render.
    input: PathBuf,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover rw.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Typst executable (overrides config).
    #[arg(long, env = "RW_TYPST_BINARY")]
    typst_binary: Option<String>,

    /// Keep math as source text instead of rendering it.
    #[arg(long)]
    no_math: bool,

    /// Enable verbose output (show per-formula warnings and cache activity).
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the input/output files
    /// cannot be accessed. Formulas that fail to compile are reported but
    /// do not fail the command.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            math_enabled: self.no_math.then_some(false),
            typst_binary: self.typst_binary,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }

        let markdown = std::fs::read_to_string(&self.input).map_err(|source| CliError::Input {
            path: self.input.clone(),
            source,
        })?;

        let rendered = render_document(&markdown, &config.math).await;

        match &self.output {
            Some(path) => std::fs::write(path, &rendered.html)?,
            None => std::io::stdout().lock().write_all(rendered.html.as_bytes())?,
        }

        output.summary(rendered.segments, rendered.report);

        Ok(())
    }
}

/// Result of rendering one document.
struct RenderedDocument {
    html: String,
    /// Math segments found in prose.
    segments: usize,
    /// Render outcome, `None` when rendering is disabled.
    report: Option<RenderReport>,
}

/// Parse, extract and (if enabled) typeset a markdown document.
async fn render_document(markdown: &str, math: &MathConfig) -> RenderedDocument {
    let mut root = from_markdown(markdown);
    let segments = extract_math(&mut root, math.span_policy);

    let report = if math.enabled {
        let backend =
            TypstCli::new(&math.typst_binary).with_font_paths(math.font_paths.clone());
        let engine = CompileEngine::with_retain(backend, math.cache_size);
        let options = RenderOptions {
            class_style: math.class_style,
            em_size: math.em_size,
        };
        Some(render_math(&mut root, &engine, &options).await)
    } else {
        None
    };

    RenderedDocument {
        html: to_html(&root),
        segments,
        report,
    }
}
