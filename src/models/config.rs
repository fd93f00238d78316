//! Runtime settings model and validation

use crate::executor::FailurePolicy;
use crate::output::OutputFormat;
use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Control API address as `host:port`
    #[serde(default = "default_controller")]
    pub controller: String,

    /// Bearer token sent with every control API request
    #[serde(default = "default_secret")]
    pub secret: String,

    /// Delay check timeout handed to the daemon, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Profile to load healthy entries from
    #[serde(default)]
    pub profile: Option<PathBuf>,

    /// Write the healthy subset of the profile at the end of the run
    #[serde(default)]
    pub save: bool,

    /// Directory the saved profile is written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Maximum delay checks in flight; 0 picks a value from the CPU count
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Abort the run on the first per-proxy error
    #[serde(default)]
    pub fail_fast: bool,

    /// Report rendering
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            controller: default_controller(),
            secret: default_secret(),
            timeout_ms: default_timeout_ms(),
            profile: None,
            save: false,
            output_dir: default_output_dir(),
            concurrency: default_concurrency(),
            fail_fast: false,
            output_format: OutputFormat::default(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Settings {
    /// Create settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the settings and return the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.controller.trim().is_empty() {
            return Err(AppError::config("Controller address cannot be empty"));
        }

        self.controller_base_url()?;

        if self.timeout_ms == 0 {
            return Err(AppError::config("Timeout must be greater than 0"));
        }

        if self.save && self.profile.is_none() {
            return Err(AppError::config("--save requires a profile (--profile or PDC_PROFILE)"));
        }

        Ok(())
    }

    /// Base URL of the control API, always ending with a slash
    pub fn controller_base_url(&self) -> Result<Url> {
        controller_base_url(&self.controller)
    }

    /// Number of delay checks allowed in flight at once
    pub fn effective_concurrency(&self) -> usize {
        if self.concurrency == 0 {
            (num_cpus::get() * 2).clamp(4, 32)
        } else {
            self.concurrency
        }
    }

    /// How per-proxy errors affect the rest of the run
    pub fn failure_policy(&self) -> FailurePolicy {
        if self.fail_fast {
            FailurePolicy::Abort
        } else {
            FailurePolicy::Isolate
        }
    }

    /// Merge `PDC_*` environment variables into these settings
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(controller) = std::env::var("PDC_CONTROLLER") {
            self.controller = controller.trim().to_string();
        }

        if let Ok(secret) = std::env::var("PDC_SECRET") {
            self.secret = secret;
        }

        if let Ok(timeout) = std::env::var("PDC_TIMEOUT_MS") {
            self.timeout_ms = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid PDC_TIMEOUT_MS value '{}': {}", timeout, e)))?;
        }

        if let Ok(profile) = std::env::var("PDC_PROFILE") {
            if !profile.trim().is_empty() {
                self.profile = Some(PathBuf::from(profile.trim()));
            }
        }

        if let Ok(concurrency) = std::env::var("PDC_CONCURRENCY") {
            self.concurrency = concurrency.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid PDC_CONCURRENCY value '{}': {}", concurrency, e)))?;
        }

        if let Ok(enable_color) = std::env::var("PDC_ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid PDC_ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

/// Build the control API base URL from a `host:port` address.
///
/// An explicit `http://` or `https://` prefix is accepted as well.
pub fn controller_base_url(controller: &str) -> Result<Url> {
    let controller = controller.trim().trim_end_matches('/');
    let raw = if controller.starts_with("http://") || controller.starts_with("https://") {
        format!("{}/", controller)
    } else {
        format!("http://{}/", controller)
    };

    let url = Url::parse(&raw)
        .map_err(|e| AppError::config(format!("Invalid controller address '{}': {}", controller, e)))?;

    if url.host_str().map_or(true, str::is_empty) {
        return Err(AppError::config(format!("Controller address '{}' has no host", controller)));
    }

    Ok(url)
}

// Default value functions for serde
fn default_controller() -> String {
    crate::defaults::DEFAULT_CONTROLLER.to_string()
}

fn default_secret() -> String {
    crate::defaults::DEFAULT_SECRET.to_string()
}

fn default_timeout_ms() -> u64 {
    crate::defaults::DEFAULT_TIMEOUT_MS
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(crate::defaults::DEFAULT_OUTPUT_DIR)
}

fn default_concurrency() -> usize {
    crate::defaults::DEFAULT_CONCURRENCY
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
