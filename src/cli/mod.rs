//! Command-line interface

use crate::output::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

/// Proxy Delay Checker - measure every proxy a Clash-style daemon knows about
#[derive(Parser, Debug, Clone)]
#[command(name = "pdc")]
#[command(version, about, long_about = None)]
#[command(after_help = "Environment: PDC_CONTROLLER, PDC_SECRET, PDC_TIMEOUT_MS, PDC_PROFILE, \
PDC_CONCURRENCY, PDC_ENABLE_COLOR (a .env file in the working directory is read too)")]
pub struct Cli {
    /// Control API address [default: 127.0.0.1:61168]
    #[arg(short, long, value_name = "HOST:PORT")]
    pub controller: Option<String>,

    /// Secret sent as a bearer token
    #[arg(short, long, value_name = "TOKEN")]
    pub secret: Option<String>,

    /// Delay check timeout in milliseconds [default: 1500]
    #[arg(short, long, value_name = "MS", value_parser = parse_timeout_ms)]
    pub timeout: Option<u64>,

    /// Profile whose healthy proxies are saved with --save
    #[arg(short, long, value_name = "PATH")]
    pub profile: Option<PathBuf>,

    /// Save the healthy subset of the profile to a new file
    #[arg(long)]
    pub save: bool,

    /// Directory the saved profile is written to [default: .]
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Delay checks in flight at once; 0 picks a value from the CPU count [default: 1]
    #[arg(short = 'j', long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Stop at the first proxy whose check fails instead of reporting it
    #[arg(long)]
    pub fail_fast: bool,

    /// Report format
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts and requirements
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if let Some(ref controller) = self.controller {
            if controller.trim().is_empty() {
                return Err("--controller cannot be empty".to_string());
            }
        }

        Ok(())
    }

    /// Color choice made on the command line, if any
    pub fn color_override(&self) -> Option<bool> {
        if self.color {
            Some(true)
        } else if self.no_color {
            Some(false)
        } else {
            None
        }
    }

    /// Check if colors should be enabled, before settings are loaded
    pub fn use_colors(&self) -> bool {
        self.color_override().unwrap_or_else(supports_color)
    }
}

/// Parse a timeout in milliseconds
fn parse_timeout_ms(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid timeout: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid timeout: {}", s))
        .and_then(|ms| {
            if ms == 0 {
                Err("Timeout must be greater than 0".to_string())
            } else if ms > 300_000 {
                Err("Timeout cannot exceed 300000 ms".to_string())
            } else {
                Ok(ms)
            }
        })
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    cfg!(unix)
}
