//! Colored renderer for terminals

use super::formatter::{format_duration, plural, PlainRenderer, ReportRenderer};
use crate::{
    error::Result,
    executor::ExecutionSummary,
    models::ProxyReport,
    types::Severity,
};
use colored::*;
use std::path::Path;

/// Colors used for each severity band and the summary
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub good: Color,
    pub degraded: Color,
    pub bad: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            good: Color::Green,
            degraded: Color::Yellow,
            bad: Color::Red,
            muted: Color::BrightBlack,
        }
    }
}

impl ColorScheme {
    pub fn severity_color(&self, severity: Severity) -> Color {
        match severity {
            Severity::Good => self.good,
            Severity::Degraded => self.degraded,
            Severity::Bad => self.bad,
        }
    }
}

/// Same line layout as [`PlainRenderer`], colored by severity
#[derive(Debug, Clone, Default)]
pub struct ColoredRenderer {
    color_scheme: ColorScheme,
}

impl ColoredRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_color_scheme(color_scheme: ColorScheme) -> Self {
        Self { color_scheme }
    }

    pub fn color_scheme(&self) -> &ColorScheme {
        &self.color_scheme
    }

    /// Check if the terminal asks for no colors
    pub fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err() &&
        std::env::var("TERM").map(|term| term != "dumb").unwrap_or(true)
    }
}

impl ReportRenderer for ColoredRenderer {
    fn render_report(&self, report: &ProxyReport) -> Result<String> {
        let color = self.color_scheme.severity_color(report.severity);
        Ok(format!(
            "{}\t{}\t{}",
            report.name.bold(),
            report.outcome.to_string().color(color),
            format!("[{}]", report.severity).color(color).bold()
        ))
    }

    fn render_summary(&self, summary: &ExecutionSummary) -> Result<String> {
        let mut line = format!(
            "checked {} {}: {} good, {} degraded, {} bad",
            summary.total.to_string().bold(),
            plural(summary.total),
            summary.good.to_string().color(self.color_scheme.good),
            summary.degraded.to_string().color(self.color_scheme.degraded),
            summary.bad.to_string().color(self.color_scheme.bad)
        );
        if summary.errored > 0 {
            line.push_str(&format!(" ({} errored)", summary.errored.to_string().color(self.color_scheme.bad)));
        }
        line.push_str(&format!(" in {}", format_duration(summary).color(self.color_scheme.muted)));
        Ok(line)
    }

    fn render_saved(&self, path: &Path, entries: usize) -> Result<String> {
        let plain = PlainRenderer.render_saved(path, entries)?;
        Ok(plain.color(self.color_scheme.good).to_string())
    }
}
