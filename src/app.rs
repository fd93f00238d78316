//! Main application orchestration and execution

use crate::{
    client::{ControlApi, ControllerClient},
    config::{display_config_summary, reject_errors, validate_config, ValidationLevel},
    error::{AppError, Result},
    executor::{CheckExecutor, ExecutionResults},
    logging::LoggerFactory,
    models::Settings,
    output::{RendererFactory, ReportWriter},
    profile::Profile,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What a finished run produced
#[derive(Debug)]
pub struct RunOutcome {
    pub results: ExecutionResults,
    /// Path of the saved profile, when `--save` was given
    pub saved: Option<PathBuf>,
}

/// Main application struct that coordinates all components
pub struct App {
    settings: Settings,
    loggers: LoggerFactory,
    api: Option<Arc<dyn ControlApi>>,
}

impl App {
    /// Create a new application instance from loaded settings
    pub fn new(settings: Settings) -> Self {
        let loggers = LoggerFactory::new(&settings);
        Self { settings, loggers, api: None }
    }

    /// Use `api` instead of a client built from the settings
    pub fn with_api(mut self, api: Arc<dyn ControlApi>) -> Self {
        self.api = Some(api);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run against stdout and stderr
    pub async fn run(&self) -> Result<RunOutcome> {
        self.run_with(io::stdout(), io::stderr()).await
    }

    /// Run the whole check: report lines go to `out`, everything else to `notices`
    pub async fn run_with<O: Write, N: Write>(&self, out: O, mut notices: N) -> Result<RunOutcome> {
        let settings = &self.settings;
        let logger = self.loggers.root();

        let warnings = validate_config(settings)?;
        for warning in &warnings {
            if warning.level != ValidationLevel::Info || settings.verbose {
                writeln!(notices, "{}", warning.format(settings.enable_color))?;
            }
        }
        reject_errors(&warnings)?;

        if settings.debug {
            writeln!(notices, "Configuration Summary:\n{}\n", display_config_summary(settings))?;
        }

        // A bad profile fails the run before any request is made
        let mut profile = match settings.profile {
            Some(ref path) => Some(Profile::load(path)?.with_logger(self.loggers.create("profile"))),
            None => None,
        };

        let api: Arc<dyn ControlApi> = match self.api {
            Some(ref api) => Arc::clone(api),
            None => Arc::new(
                ControllerClient::from_settings(settings)?.with_logger(self.loggers.create("client")),
            ),
        };

        let executor = CheckExecutor::from_settings(api, settings)
            .with_logger(self.loggers.create("executor"));
        let results = executor.exec().await?;

        let renderer = RendererFactory::create(settings.output_format, settings.enable_color);
        let mut writer = ReportWriter::new(renderer.as_ref(), out, notices);
        writer.write_results(&results)?;

        let saved = match profile.as_mut() {
            Some(profile) if settings.save => {
                for name in results.healthy_names() {
                    match profile.record_healthy(name) {
                        Ok(()) => {}
                        Err(AppError::LookupMiss(_)) => {
                            // Provider-supplied proxies have no entry in the file
                            logger.warn("healthy proxy is not defined in the profile, skipping")
                                .field("name", name)
                                .log();
                        }
                        Err(e) => return Err(e),
                    }
                }

                let path = if settings.output_dir == Path::new(crate::defaults::DEFAULT_OUTPUT_DIR) {
                    profile.save()?
                } else {
                    profile.save_to_dir(&settings.output_dir)?
                };
                writer.write_saved(&path, profile.recorded().len())?;
                Some(path)
            }
            _ => None,
        };

        Ok(RunOutcome { results, saved })
    }
}
