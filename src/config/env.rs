//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variables read into the settings, with a description and example
pub const SUPPORTED_ENV_VARS: &[(&str, &str, &str)] = &[
    ("PDC_CONTROLLER", "Control API address", "127.0.0.1:9090"),
    ("PDC_SECRET", "Secret sent as a bearer token", "s3cret"),
    ("PDC_TIMEOUT_MS", "Delay check timeout in milliseconds", "1500"),
    ("PDC_PROFILE", "Profile to save healthy proxies from", "config.yaml"),
    ("PDC_CONCURRENCY", "Delay checks in flight at once (0 = auto)", "4"),
    ("PDC_ENABLE_COLOR", "Enable colored output", "true"),
];

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load `.env` from the working directory if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    /// Load an env file if it exists. Variables already set in the
    /// environment are left alone.
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)
                .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

            if debug {
                eprintln!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            eprintln!("No {} file found, using defaults and CLI arguments", path.display());
        }

        Ok(())
    }

    /// Environment variable help text
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in SUPPORTED_ENV_VARS {
            help.push_str(&format!("  {:<18} {}\n", var, description));
            help.push_str(&format!("  {:<18} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_env_file_from() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file, "PDC_ENV_FILE_TEST_VALUE=from-file").unwrap();

        EnvManager::load_env_file_from(file.path(), false).unwrap();
        assert_eq!(std::env::var("PDC_ENV_FILE_TEST_VALUE").unwrap(), "from-file");
        std::env::remove_var("PDC_ENV_FILE_TEST_VALUE");
    }

    #[test]
    fn test_existing_variables_win_over_file() {
        std::env::set_var("PDC_ENV_FILE_TEST_EXISTING", "from-env");

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "PDC_ENV_FILE_TEST_EXISTING=from-file").unwrap();

        EnvManager::load_env_file_from(file.path(), false).unwrap();
        assert_eq!(std::env::var("PDC_ENV_FILE_TEST_EXISTING").unwrap(), "from-env");
        std::env::remove_var("PDC_ENV_FILE_TEST_EXISTING");
    }

    #[test]
    fn test_missing_env_file_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        assert!(EnvManager::load_env_file_from(&dir.path().join(".env"), true).is_ok());
    }

    #[test]
    fn test_env_help_lists_variables() {
        let help = EnvManager::display_env_help();
        for (var, _, _) in SUPPORTED_ENV_VARS {
            assert!(help.contains(var));
        }
        assert!(help.contains("Configuration Priority"));
    }
}
