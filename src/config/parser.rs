//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::Result,
    models::Settings,
};
use std::path::PathBuf;

/// Configuration parser that layers defaults, `.env`, environment and CLI flags
pub struct ConfigParser {
    cli: Cli,
    env_file: PathBuf,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            env_file: PathBuf::from(".env"),
        }
    }

    /// Read a different env file instead of `./.env`
    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.env_file = path.into();
        self
    }

    /// Parse and build the complete settings
    pub fn parse(&self) -> Result<Settings> {
        let mut settings = Settings::default();

        // .env only fills variables that are not already set
        EnvManager::load_env_file_from(&self.env_file, self.cli.debug)?;

        settings.merge_from_env()?;
        self.apply_cli_overrides(&mut settings);
        settings.validate()?;

        Ok(settings)
    }

    /// Apply CLI argument overrides to settings
    fn apply_cli_overrides(&self, settings: &mut Settings) {
        if let Some(ref controller) = self.cli.controller {
            settings.controller = controller.trim().to_string();
        }

        if let Some(ref secret) = self.cli.secret {
            settings.secret = secret.clone();
        }

        if let Some(timeout) = self.cli.timeout {
            settings.timeout_ms = timeout;
        }

        if let Some(ref profile) = self.cli.profile {
            settings.profile = Some(profile.clone());
        }

        if let Some(ref output_dir) = self.cli.output_dir {
            settings.output_dir = output_dir.clone();
        }

        if let Some(concurrency) = self.cli.concurrency {
            settings.concurrency = concurrency;
        }

        if let Some(format) = self.cli.format {
            settings.output_format = format;
        }

        if let Some(enable_color) = self.cli.color_override() {
            settings.enable_color = enable_color;
        }

        // CLI-only switches
        settings.save = self.cli.save;
        settings.fail_fast = self.cli.fail_fast;
        settings.verbose = self.cli.verbose;
        settings.debug = self.cli.debug;
    }
}

/// Convenience function to load complete settings from CLI arguments
pub fn load_config(cli: Cli) -> Result<Settings> {
    ConfigParser::new(cli).parse()
}

/// Settings summary for debug output; the secret is masked
pub fn display_config_summary(settings: &Settings) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Controller: {}", settings.controller));
    summary.push(format!("Secret: {}", if settings.secret.is_empty() { "(none)" } else { "********" }));
    summary.push(format!("Timeout: {}ms", settings.timeout_ms));
    summary.push(format!(
        "Profile: {}",
        settings.profile.as_ref().map_or_else(|| "(none)".to_string(), |p| p.display().to_string())
    ));
    summary.push(format!("Save: {}", settings.save));
    summary.push(format!("Output Dir: {}", settings.output_dir.display()));
    summary.push(format!("Concurrency: {}", settings.effective_concurrency()));
    summary.push(format!("Failure Policy: {:?}", settings.failure_policy()));
    summary.push(format!("Format: {:?}", settings.output_format));
    summary.push(format!("Color Output: {}", settings.enable_color));
    summary.push(format!("Verbose: {}", settings.verbose));
    summary.push(format!("Debug: {}", settings.debug));

    summary.join("\n")
}
