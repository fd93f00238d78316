//! Renderer trait and the plain text renderer

use crate::{
    error::Result,
    executor::ExecutionSummary,
    models::ProxyReport,
};
use std::path::Path;

/// Turns reports into printable lines.
///
/// Renderers are plain values handed to the reporting routine, so two
/// renderers with different colour settings can coexist in one process.
pub trait ReportRenderer: Send + Sync {
    /// One line for one checked proxy
    fn render_report(&self, report: &ProxyReport) -> Result<String>;

    /// One line summarising the run
    fn render_summary(&self, summary: &ExecutionSummary) -> Result<String>;

    /// Notice that the healthy subset was written to `path`
    fn render_saved(&self, path: &Path, entries: usize) -> Result<String> {
        Ok(format!("saved {} healthy {} to {}", entries, plural(entries), path.display()))
    }
}

pub(crate) fn plural(count: usize) -> &'static str {
    if count == 1 { "proxy" } else { "proxies" }
}

pub(crate) fn format_duration(summary: &ExecutionSummary) -> String {
    let ms = summary.duration.as_millis();
    if ms < 1000 {
        format!("{}ms", ms)
    } else {
        format!("{:.2}s", summary.duration.as_secs_f64())
    }
}

/// `<name>\t<delay-or-message>\t[<severity>]`
#[derive(Debug, Clone, Default)]
pub struct PlainRenderer;

impl PlainRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ReportRenderer for PlainRenderer {
    fn render_report(&self, report: &ProxyReport) -> Result<String> {
        Ok(format!("{}\t{}\t[{}]", report.name, report.outcome, report.severity))
    }

    fn render_summary(&self, summary: &ExecutionSummary) -> Result<String> {
        let mut line = format!(
            "checked {} {}: {} good, {} degraded, {} bad",
            summary.total,
            plural(summary.total),
            summary.good,
            summary.degraded,
            summary.bad
        );
        if summary.errored > 0 {
            line.push_str(&format!(" ({} errored)", summary.errored));
        }
        line.push_str(&format!(" in {}", format_duration(summary)));
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::DelayOutcome;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_plain_report_lines() {
        let renderer = PlainRenderer::new();

        let good = ProxyReport::measured(0, "A".to_string(), DelayOutcome::Delay(320));
        assert_eq!(renderer.render_report(&good).unwrap(), "A\t320\t[good]");

        let degraded = ProxyReport::measured(1, "B".to_string(), DelayOutcome::Delay(650));
        assert_eq!(renderer.render_report(&degraded).unwrap(), "B\t650\t[degraded]");

        let slow = ProxyReport::measured(2, "C".to_string(), DelayOutcome::Delay(950));
        assert_eq!(renderer.render_report(&slow).unwrap(), "C\t950\t[bad]");

        let failed = ProxyReport::measured(3, "D".to_string(), DelayOutcome::Failed("timeout".to_string()));
        assert_eq!(renderer.render_report(&failed).unwrap(), "D\ttimeout\t[bad]");

        let errored = ProxyReport::errored(4, "E".to_string(), &AppError::upstream("reset"));
        assert_eq!(
            renderer.render_report(&errored).unwrap(),
            "E\terror: Control API error: reset\t[bad]"
        );
    }

    #[test]
    fn test_plain_summary() {
        let summary = ExecutionSummary {
            total: 5,
            good: 1,
            degraded: 1,
            bad: 3,
            errored: 1,
            healthy: 3,
            duration: Duration::from_millis(1500),
        };
        assert_eq!(
            PlainRenderer.render_summary(&summary).unwrap(),
            "checked 5 proxies: 1 good, 1 degraded, 3 bad (1 errored) in 1.50s"
        );

        let single = ExecutionSummary { total: 1, good: 1, degraded: 0, bad: 0, errored: 0, healthy: 1, duration: Duration::from_millis(12) };
        assert_eq!(
            PlainRenderer.render_summary(&single).unwrap(),
            "checked 1 proxy: 1 good, 0 degraded, 0 bad in 12ms"
        );
    }

    #[test]
    fn test_saved_notice() {
        let line = PlainRenderer.render_saved(&PathBuf::from("out/config-1.yaml"), 2).unwrap();
        assert_eq!(line, "saved 2 healthy proxies to out/config-1.yaml");
    }
}
