//! Compile error types.

use std::fmt;

/// Diagnostic messages reported by the engine for a failed compile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(pub Vec<String>);

impl Diagnostics {
    /// Collect diagnostics from engine stderr, one per non-empty line.
    #[must_use]
    pub fn from_stderr(stderr: &[u8]) -> Self {
        let text = String::from_utf8_lossy(stderr);
        Self(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    /// Whether no diagnostics were reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("no diagnostics");
        }
        f.write_str(&self.0.join("; "))
    }
}

/// Error produced while compiling a single math segment.
///
/// Cloneable so per-job results can be shared freely.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompileError {
    /// The engine ran but produced no document.
    #[error("{0}")]
    Failure(Diagnostics),
    /// The engine could not be started.
    #[error("failed to run {binary}: {message}")]
    Spawn { binary: String, message: String },
    /// I/O error talking to the engine.
    #[error("I/O error: {0}")]
    Io(String),
    /// The engine output is not a usable SVG document.
    #[error("invalid SVG output: {0}")]
    InvalidSvg(&'static str),
}
