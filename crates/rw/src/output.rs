//! Status lines for the render command.
//!
//! Everything goes to stderr so rendered HTML on stdout stays clean.

use std::fmt;

use console::{Style, Term};
use rw_typst::RenderReport;

use crate::error::CliError;

/// Outcome of a render pass, as reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Summary {
    /// Formulas were found but rendering is turned off.
    Disabled { found: usize },
    /// Every job compiled.
    Rendered { rendered: usize },
    /// At least one job failed and was replaced by an error marker.
    Partial { rendered: usize, failed: usize },
}

impl Summary {
    /// Summarize a pass. `None` when there is nothing worth reporting.
    pub(crate) fn new(segments: usize, report: Option<RenderReport>) -> Option<Self> {
        match report {
            None if segments > 0 => Some(Self::Disabled { found: segments }),
            None => None,
            Some(report) if report.failed > 0 => Some(Self::Partial {
                rendered: report.rendered,
                failed: report.failed,
            }),
            Some(report) if report.total() > 0 => Some(Self::Rendered {
                rendered: report.rendered,
            }),
            Some(_) => None,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled { found } => {
                write!(f, "Found {found} {}, rendering disabled", formulas(*found))
            }
            Self::Rendered { rendered } => write!(f, "Rendered {rendered} {}", formulas(*rendered)),
            Self::Partial { rendered, failed } => write!(
                f,
                "Rendered {rendered} {}, {failed} failed",
                formulas(*rendered)
            ),
        }
    }
}

fn formulas(count: usize) -> &'static str {
    if count == 1 { "formula" } else { "formulas" }
}

/// Terminal reporter for the CLI.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
        }
    }

    /// Print the outcome of a render pass, colored by severity.
    pub(crate) fn summary(&self, segments: usize, report: Option<RenderReport>) {
        let Some(summary) = Summary::new(segments, report) else {
            return;
        };
        let line = match summary {
            Summary::Disabled { .. } => summary.to_string(),
            Summary::Rendered { .. } => self.green.apply_to(summary).to_string(),
            Summary::Partial { .. } => self.yellow.apply_to(summary).to_string(),
        };
        let _ = self.term.write_line(&line);
    }

    /// Print a fatal command error (red).
    pub(crate) fn failure(&self, err: &CliError) {
        let _ = self
            .term
            .write_line(&self.red.apply_to(format!("Error: {err}")).to_string());
    }
}
