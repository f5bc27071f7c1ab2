//! Typst engine backends.
//!
//! A [`TypstBackend`] turns one self-contained Typst document into SVG. The
//! engine is not reentrant: `compile` takes `&mut self`, and
//! [`CompileEngine`](crate::CompileEngine) hands out that exclusive access
//! one job at a time.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Output, Stdio};

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::{CompileError, Diagnostics};

/// Default Typst executable, resolved through `PATH`.
pub const DEFAULT_TYPST_BINARY: &str = "typst";

/// Compiler for standalone Typst documents.
pub trait TypstBackend: Send {
    /// Compile a document and return its SVG output.
    fn compile(
        &mut self,
        source: &str,
    ) -> impl Future<Output = Result<String, CompileError>> + Send;

    /// Drop retained intermediate state, keeping the `keep` most recent entries.
    ///
    /// Called after every successful compile. Backends without state ignore it.
    fn evict(&mut self, keep: usize) {
        let _ = keep;
    }
}

/// Backend running the `typst` command-line compiler once per document.
///
/// The source is piped on stdin and the SVG read from stdout. There is no
/// timeout: a hung compiler stalls the render pass.
#[derive(Debug, Clone)]
pub struct TypstCli {
    binary: PathBuf,
    font_paths: Vec<PathBuf>,
}

impl TypstCli {
    /// Create a backend for the given executable.
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            font_paths: Vec::new(),
        }
    }

    /// Add directories searched for fonts (`--font-path`).
    #[must_use]
    pub fn with_font_paths(mut self, font_paths: Vec<PathBuf>) -> Self {
        self.font_paths = font_paths;
        self
    }

    /// Command-line arguments passed to the executable.
    fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["compile", "--format", "svg", "--diagnostic-format", "short"]
            .into_iter()
            .map(OsString::from)
            .collect();
        for path in &self.font_paths {
            args.push("--font-path".into());
            args.push(path.clone().into_os_string());
        }
        args.push("-".into());
        args.push("-".into());
        args
    }

    async fn run(&self, source: &str) -> Result<String, CompileError> {
        let mut child = Command::new(&self.binary)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CompileError::Spawn {
                binary: self.binary.display().to_string(),
                message: e.to_string(),
            })?;

        // The compiler may exit before reading all input; its stderr still
        // explains why, so the write error is held until the process is reaped.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(source.as_bytes()).await,
            None => Ok(()),
        };

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| CompileError::Io(e.to_string()))?;

        svg_output(&written, output)
    }
}

/// Interpret a finished compiler process.
///
/// Diagnostics on stderr take precedence over a failed stdin write.
fn svg_output(written: &std::io::Result<()>, output: Output) -> Result<String, CompileError> {
    let diagnostics = Diagnostics::from_stderr(&output.stderr);
    match written {
        Err(err) if diagnostics.is_empty() => return Err(CompileError::Io(err.to_string())),
        Err(_) => return Err(CompileError::Failure(diagnostics)),
        Ok(()) => {}
    }
    if !output.status.success() || output.stdout.is_empty() {
        return Err(CompileError::Failure(diagnostics));
    }
    String::from_utf8(output.stdout).map_err(|_| CompileError::InvalidSvg("not UTF-8"))
}

impl Default for TypstCli {
    fn default() -> Self {
        Self::new(DEFAULT_TYPST_BINARY)
    }
}

impl TypstBackend for TypstCli {
    async fn compile(&mut self, source: &str) -> Result<String, CompileError> {
        tracing::debug!(binary = %self.binary.display(), "Running typst compiler");
        self.run(source).await
    }
}
