//! JSON-lines renderer for scripts

use super::formatter::ReportRenderer;
use crate::{
    error::Result,
    executor::ExecutionSummary,
    models::{CheckOutcome, DelayOutcome, ProxyReport},
};
use serde_json::json;
use std::path::Path;

/// One JSON object per line
#[derive(Debug, Clone, Default)]
pub struct JsonRenderer;

impl JsonRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ReportRenderer for JsonRenderer {
    fn render_report(&self, report: &ProxyReport) -> Result<String> {
        let value = match &report.outcome {
            CheckOutcome::Measured(DelayOutcome::Delay(ms)) => json!({
                "name": report.name,
                "delay_ms": ms,
                "severity": report.severity,
            }),
            CheckOutcome::Measured(DelayOutcome::Failed(message)) => json!({
                "name": report.name,
                "message": message,
                "severity": report.severity,
            }),
            CheckOutcome::Error(message) => json!({
                "name": report.name,
                "message": message,
                "error": true,
                "severity": report.severity,
            }),
        };
        Ok(serde_json::to_string(&value)?)
    }

    fn render_summary(&self, summary: &ExecutionSummary) -> Result<String> {
        let value = json!({
            "total": summary.total,
            "good": summary.good,
            "degraded": summary.degraded,
            "bad": summary.bad,
            "errored": summary.errored,
            "healthy": summary.healthy,
            "duration_ms": summary.duration.as_millis() as u64,
        });
        Ok(serde_json::to_string(&value)?)
    }

    fn render_saved(&self, path: &Path, entries: usize) -> Result<String> {
        let value = json!({
            "saved": path.display().to_string(),
            "entries": entries,
        });
        Ok(serde_json::to_string(&value)?)
    }
}
