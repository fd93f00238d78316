//! Error handling for the proxy delay checker

use thiserror::Error;

/// Custom error types for the proxy delay checker
#[derive(Error, Debug)]
pub enum AppError {
    /// Profile path does not exist
    #[error("Profile not found: {0}")]
    ConfigNotFound(String),

    /// Profile path is not a regular file, or the document has the wrong shape
    #[error("Invalid profile: {0}")]
    ConfigInvalid(String),

    /// Invalid runtime settings (flags, environment)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Parsing errors (YAML, JSON, URLs, numbers)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Named proxy is absent from the loaded profile
    #[error("Proxy '{0}' is not defined in the profile")]
    LookupMiss(String),

    /// Transport failure or malformed response from the control API
    #[error("Control API error: {0}")]
    Upstream(String),

    /// Control API answered 404 for a named proxy
    #[error("Proxy '{0}' not found by the control API")]
    ProxyNotFound(String),

    /// Control API rejected the secret
    #[error("Authentication error: {0}")]
    Auth(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new profile-not-found error
    pub fn config_not_found<S: Into<String>>(path: S) -> Self {
        Self::ConfigNotFound(path.into())
    }

    /// Create a new invalid-profile error
    pub fn config_invalid<S: Into<String>>(message: S) -> Self {
        Self::ConfigInvalid(message.into())
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new lookup-miss error
    pub fn lookup_miss<S: Into<String>>(name: S) -> Self {
        Self::LookupMiss(name.into())
    }

    /// Create a new upstream error
    pub fn upstream<S: Into<String>>(message: S) -> Self {
        Self::Upstream(message.into())
    }

    /// Create a new proxy-not-found error
    pub fn proxy_not_found<S: Into<String>>(name: S) -> Self {
        Self::ProxyNotFound(name.into())
    }

    /// Create a new authentication error
    pub fn auth<S: Into<String>>(message: S) -> Self {
        Self::Auth(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::ConfigNotFound(_) | Self::ConfigInvalid(_) => "PROFILE",
            Self::Config(_) => "CONFIG",
            Self::Parse(_) => "PARSE",
            Self::LookupMiss(_) => "LOOKUP",
            Self::Upstream(_) => "UPSTREAM",
            Self::ProxyNotFound(_) => "NOT_FOUND",
            Self::Auth(_) => "AUTH",
            Self::Io(_) => "IO",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Check if error is recoverable (a later run may succeed)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Upstream(_))
    }

    /// Get user-friendly error message with suggestions
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ConfigNotFound(path) => {
                format!("Profile '{}' does not exist.\n\nSuggestion: Check the --profile path.", path)
            }
            Self::ConfigInvalid(msg) => {
                format!("Profile cannot be used: {}\n\nSuggestion: Point --profile at a YAML or JSON file with a top-level 'proxies' list.", msg)
            }
            Self::Config(msg) => {
                format!("Configuration problem: {}\n\nSuggestion: Check your .env file, PDC_* variables or command line arguments.", msg)
            }
            Self::Parse(msg) => {
                format!("Failed to parse data: {}\n\nSuggestion: Check the format of the profile or the value passed on the command line.", msg)
            }
            Self::LookupMiss(name) => {
                format!("Proxy '{}' is missing from the profile.\n\nSuggestion: Make sure the daemon was started with the same profile.", name)
            }
            Self::Upstream(msg) => {
                format!("Control API request failed: {}\n\nSuggestion: Check that the daemon is running and that --controller matches its external-controller address.", msg)
            }
            Self::ProxyNotFound(name) => {
                format!("The daemon does not know proxy '{}'.\n\nSuggestion: The proxy list may have changed during the run. Try again.", name)
            }
            Self::Auth(msg) => {
                format!("Authentication failed: {}\n\nSuggestion: Pass the daemon's secret with --secret or PDC_SECRET.", msg)
            }
            Self::Io(msg) => {
                format!("File operation failed: {}\n\nSuggestion: Check file permissions and disk space.", msg)
            }
            Self::Internal(msg) => {
                format!("Internal error: {}\n\nThis is likely a bug. Please report this issue with the error details.", msg)
            }
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigNotFound(_) | Self::ConfigInvalid(_) | Self::Config(_) | Self::Parse(_) | Self::LookupMiss(_) => 1,
            Self::Upstream(_) | Self::ProxyNotFound(_) => 2,
            Self::Auth(_) => 4,
            Self::Io(_) => 5,
            Self::Internal(_) => 99,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::ConfigNotFound(_) | Self::ConfigInvalid(_) | Self::Config(_) | Self::Parse(_) | Self::LookupMiss(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Upstream(_) | Self::ProxyNotFound(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Auth(_) => {
                    format!("[{}] {}", category.magenta().bold(), message.magenta())
                }
                Self::Io(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::parse(format!("URL parse error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::parse(format!("YAML parse error: {}", error))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::upstream(format!("malformed response: {}", error))
        } else {
            Self::upstream(error.to_string())
        }
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Integer parse error: {}", error))
    }
}

impl From<std::str::ParseBoolError> for AppError {
    fn from(error: std::str::ParseBoolError) -> Self {
        Self::parse(format!("Boolean parse error: {}", error))
    }
}

// Anyhow integration
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::internal(error.to_string())
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Error reporter for user-facing error output
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    /// Create a new error reporter
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Render an error the way `report_error` prints it
    pub fn format_error(&self, error: &AppError) -> String {
        let mut output = error.format_for_console(self.use_color);

        if self.verbose {
            output.push_str("\n\n");
            output.push_str(&error.user_friendly_message());

            if error.is_recoverable() {
                output.push_str("\n\nThis error might be temporary. You can try running the command again.");
            }
        }

        output
    }

    /// Report an error to the user
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", self.format_error(error));
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}
