//! Proxy Delay Checker
//!
//! Talks to the control API of a Clash-style proxy daemon, lists every leaf
//! proxy it knows about, asks the daemon to measure each one's delay through a
//! probe URL and reports the results. Optionally writes the proxies that
//! answered with a numeric delay back into a copy of the profile they came from.

pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod profile;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use models::{Settings, DelayOutcome, ProxyDetails, ProxyKind, ProxyReport};
pub use client::{ControlApi, ControllerClient};
pub use executor::{CheckExecutor, ExecutionResults, ExecutionSummary, FailurePolicy};
pub use output::{ReportRenderer, PlainRenderer, ColoredRenderer, JsonRenderer, RendererFactory};
pub use profile::{Profile, ProfileFormat};
pub use types::Severity;

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const GIT_COMMIT: &str = env!("GIT_COMMIT");
pub const TARGET_TRIPLE: &str = env!("TARGET_TRIPLE");

/// Default configuration values
pub mod defaults {
    pub const DEFAULT_CONTROLLER: &str = "127.0.0.1:61168";
    pub const DEFAULT_SECRET: &str = "";
    pub const DEFAULT_TIMEOUT_MS: u64 = 1500;
    pub const DEFAULT_CONCURRENCY: usize = 1;
    pub const DEFAULT_OUTPUT_DIR: &str = ".";
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    /// URL the daemon fetches through each proxy when measuring delay
    pub const PROBE_URL: &str = "http://www.gstatic.com/generate_204";

    /// Name of the virtual group whose `all` list enumerates every entry
    pub const GLOBAL_GROUP: &str = "GLOBAL";

    /// Delays below this are reported as good
    pub const GOOD_THRESHOLD_MS: u64 = 500;
    /// Delays below this (and at or above the good threshold) are degraded
    pub const DEGRADED_THRESHOLD_MS: u64 = 900;
}
