//! Check execution: failure policy, per-run results and the executor itself

pub mod check;

pub use check::CheckExecutor;

use crate::{models::ProxyReport, types::Severity};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a per-proxy request failure affects the rest of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Report the failure against that proxy and keep going
    #[default]
    Isolate,
    /// Stop at the first failure
    Abort,
}

/// Counts for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    /// Number of proxies checked
    pub total: usize,
    pub good: usize,
    pub degraded: usize,
    /// Slow or failed checks, errored ones included
    pub bad: usize,
    /// Checks whose request failed before the daemon answered
    pub errored: usize,
    /// Checks that produced a numeric delay
    pub healthy: usize,
    /// Wall-clock time for the whole run
    pub duration: Duration,
}

impl ExecutionSummary {
    pub fn from_reports(reports: &[ProxyReport], duration: Duration) -> Self {
        let count = |severity: Severity| reports.iter().filter(|report| report.severity == severity).count();

        Self {
            total: reports.len(),
            good: count(Severity::Good),
            degraded: count(Severity::Degraded),
            bad: count(Severity::Bad),
            errored: reports.iter().filter(|report| report.is_error()).count(),
            healthy: reports.iter().filter(|report| report.is_healthy()).count(),
            duration,
        }
    }
}

/// Ordered reports plus their summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResults {
    pub reports: Vec<ProxyReport>,
    pub summary: ExecutionSummary,
}

impl ExecutionResults {
    /// Names of proxies with a numeric delay, in report order
    pub fn healthy_names(&self) -> Vec<&str> {
        self.reports
            .iter()
            .filter(|report| report.is_healthy())
            .map(|report| report.name.as_str())
            .collect()
    }

    /// Check if any proxy failed or was slow
    pub fn has_failures(&self) -> bool {
        self.summary.bad > 0
    }
}
