//! Report rendering
//!
//! Severity is decided by the executor; this module only turns reports into
//! lines. The entry point picks a renderer once and hands it to
//! [`ReportWriter`], so nothing here touches process-wide color state.

mod colored;
mod formatter;
mod json;

pub use self::colored::{ColorScheme, ColoredRenderer};
pub use self::formatter::{PlainRenderer, ReportRenderer};
pub use self::json::JsonRenderer;

use crate::{
    error::{AppError, Result},
    executor::ExecutionResults,
};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Tab-separated lines, colored on terminals
    #[default]
    Plain,
    /// One JSON object per line
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "plain" | "text" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            _ => Err(AppError::parse(format!("Invalid output format '{}' (expected plain or json)", s))),
        }
    }
}

/// Factory for renderers
pub struct RendererFactory;

impl RendererFactory {
    /// Create a renderer for `format`; color only applies to plain output
    pub fn create(format: OutputFormat, enable_color: bool) -> Box<dyn ReportRenderer> {
        match format {
            OutputFormat::Json => Box::new(JsonRenderer::new()),
            OutputFormat::Plain if enable_color && ColoredRenderer::supports_color() => {
                Box::new(ColoredRenderer::new())
            }
            OutputFormat::Plain => Box::new(PlainRenderer::new()),
        }
    }
}

/// Writes rendered reports to a pair of streams.
///
/// Report lines go to `out`; the summary and save notice go to `notices`
/// so `out` can be piped.
pub struct ReportWriter<'a, O: Write, N: Write> {
    renderer: &'a dyn ReportRenderer,
    out: O,
    notices: N,
}

impl<'a, O: Write, N: Write> ReportWriter<'a, O, N> {
    pub fn new(renderer: &'a dyn ReportRenderer, out: O, notices: N) -> Self {
        Self { renderer, out, notices }
    }

    /// Every report line in order, then the summary
    pub fn write_results(&mut self, results: &ExecutionResults) -> Result<()> {
        for report in &results.reports {
            let line = self.renderer.render_report(report)?;
            writeln!(self.out, "{}", line)?;
        }
        self.out.flush()?;

        let summary = self.renderer.render_summary(&results.summary)?;
        writeln!(self.notices, "{}", summary)?;
        Ok(())
    }

    pub fn write_saved(&mut self, path: &Path, entries: usize) -> Result<()> {
        let line = self.renderer.render_saved(path, entries)?;
        writeln!(self.notices, "{}", line)?;
        Ok(())
    }

    /// Give back the underlying streams
    pub fn into_inner(self) -> (O, N) {
        (self.out, self.notices)
    }
}
