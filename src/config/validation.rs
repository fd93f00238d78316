//! Semantic checks on settings that are legal but probably not what was meant

use crate::{
    error::{AppError, Result},
    models::Settings,
    profile::ProfileFormat,
};
use colored::*;
use std::net::IpAddr;

/// Timeouts below this leave most proxies no chance to answer
const LOW_TIMEOUT_MS: u64 = 200;
/// Timeouts above this make sequential runs very slow
const HIGH_TIMEOUT_MS: u64 = 10_000;
/// More checks in flight than this tend to skew the daemon's measurements
const HIGH_CONCURRENCY: usize = 16;

/// Settings validator with advanced validation rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate settings and collect warnings.
    ///
    /// Hard errors from [`Settings::validate`] are returned as `Err`; anything
    /// else becomes a warning. `Error`-level warnings should stop the run.
    pub fn validate_comprehensive(settings: &Settings) -> Result<Vec<ValidationWarning>> {
        settings.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::validate_controller(settings)?);
        warnings.extend(Self::validate_timing(settings));
        warnings.extend(Self::validate_profile(settings));
        Ok(warnings)
    }

    fn validate_controller(settings: &Settings) -> Result<Vec<ValidationWarning>> {
        let mut warnings = Vec::new();
        let url = settings.controller_base_url()?;

        let host = url.host_str().unwrap_or_default();
        if settings.secret.is_empty() && !Self::is_loopback(host) {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("No secret set for non-local controller '{}'; the daemon will likely answer 401", settings.controller),
            ));
        }

        if !settings.secret.is_empty() && url.scheme() == "http" && !Self::is_loopback(host) {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Secret is sent in clear text to '{}'", settings.controller),
            ));
        }

        Ok(warnings)
    }

    fn validate_timing(settings: &Settings) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if settings.timeout_ms < LOW_TIMEOUT_MS {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Timeout of {}ms is very low; most proxies will report a timeout", settings.timeout_ms),
            ));
        } else if settings.timeout_ms > HIGH_TIMEOUT_MS {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Timeout of {}ms makes each failed check slow", settings.timeout_ms),
            ));
        }

        let concurrency = settings.effective_concurrency();
        if settings.concurrency == 0 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Concurrency picked automatically: {}", concurrency),
            ));
        }
        if concurrency > HIGH_CONCURRENCY {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("{} concurrent checks share one uplink and may inflate each other's delays", concurrency),
            ));
        }

        warnings
    }

    fn validate_profile(settings: &Settings) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if let Some(ref profile) = settings.profile {
            let has_known_extension = profile
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "yaml" | "yml" | "json"))
                .unwrap_or(false);

            if !has_known_extension && ProfileFormat::from_path(profile) == ProfileFormat::Yaml {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!("Profile '{}' has no .yaml/.yml/.json extension; reading it as YAML", profile.display()),
                ));
            }

            if !settings.save {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    "A profile was given without --save; nothing will be written".to_string(),
                ));
            }
        }

        if settings.save && !settings.output_dir.is_dir() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Error,
                format!("Output directory '{}' does not exist", settings.output_dir.display()),
            ));
        }

        warnings
    }

    fn is_loopback(host: &str) -> bool {
        let host = host.trim_start_matches('[').trim_end_matches(']');
        host.eq_ignore_ascii_case("localhost")
            || host.parse::<IpAddr>().map(|ip| ip.is_loopback()).unwrap_or(false)
    }
}

/// Validation warning levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevel {
    Info,
    Warning,
    Error,
}

impl ValidationLevel {
    /// Get display string for level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    /// Get color for terminal display
    pub fn color(&self) -> Color {
        match self {
            Self::Info => Color::Blue,
            Self::Warning => Color::Yellow,
            Self::Error => Color::Red,
        }
    }
}

/// Settings validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    /// Create a new validation warning
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        if use_color {
            format!("{} {}", tag.color(self.level.color()).bold(), self.message)
        } else {
            format!("{} {}", tag, self.message)
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == ValidationLevel::Error
    }
}

/// Convenience function for comprehensive settings validation
pub fn validate_config(settings: &Settings) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(settings)
}

/// Turn the first `Error`-level warning into a configuration error
pub fn reject_errors(warnings: &[ValidationWarning]) -> Result<()> {
    match warnings.iter().find(|warning| warning.is_error()) {
        Some(warning) => Err(AppError::config(warning.message.clone())),
        None => Ok(()),
    }
}
