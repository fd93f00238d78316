//! Type definitions and aliases

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

use crate::defaults::{DEGRADED_THRESHOLD_MS, GOOD_THRESHOLD_MS};
use crate::models::proxy::DelayOutcome;

/// Severity band derived from a delay check, used purely for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Delay below 500ms
    Good,
    /// Delay from 500ms up to 899ms
    Degraded,
    /// Delay of 900ms or more, or no delay at all
    Bad,
}

impl Severity {
    /// Classify a numeric delay in milliseconds
    pub fn from_delay_ms(delay_ms: u64) -> Self {
        if delay_ms < GOOD_THRESHOLD_MS {
            Self::Good
        } else if delay_ms < DEGRADED_THRESHOLD_MS {
            Self::Degraded
        } else {
            Self::Bad
        }
    }

    /// Classify the outcome of a delay check
    pub fn from_outcome(outcome: &DelayOutcome) -> Self {
        match outcome {
            DelayOutcome::Delay(ms) => Self::from_delay_ms(*ms),
            DelayOutcome::Failed(_) => Self::Bad,
        }
    }

    /// Lowercase tag used by the plain and JSON renderers
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Degraded => "degraded",
            Self::Bad => "bad",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
