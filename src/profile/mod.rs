//! Proxy profile loading, healthy-entry accumulation and saving
//!
//! A profile is a YAML (or JSON) document whose top-level `proxies` list holds
//! one mapping per proxy, each with a `name`. Everything else in the document
//! is kept as-is and written back unchanged when the healthy subset is saved.

use crate::error::{AppError, Result};
use crate::logging::Logger;
use chrono::Local;
use serde_yaml::{Mapping, Value};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

const PROXIES_KEY: &str = "proxies";

/// Attempts before giving up on finding a free output file name
const MAX_SAVE_ATTEMPTS: u32 = 1000;

/// Per-process sequence appended to saved file names
static SAVE_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// On-disk format of a profile, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileFormat {
    Yaml,
    Json,
}

impl ProfileFormat {
    /// `.json` files are JSON, anything else is treated as YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }

    fn parse(&self, text: &str) -> Result<Value> {
        match self {
            Self::Yaml => Ok(serde_yaml::from_str(text)?),
            Self::Json => Ok(serde_json::from_str(text)?),
        }
    }

    fn serialize(&self, document: &Value) -> Result<String> {
        match self {
            Self::Yaml => Ok(serde_yaml::to_string(document)?),
            Self::Json => {
                let mut text = serde_json::to_string_pretty(document)?;
                text.push('\n');
                Ok(text)
            }
        }
    }
}

/// A loaded profile plus the entries recorded as healthy during this run
#[derive(Debug)]
pub struct Profile {
    path: PathBuf,
    format: ProfileFormat,
    document: Mapping,
    recorded: Vec<Value>,
    logger: Logger,
}

impl Profile {
    /// Read and parse the profile at `path`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AppError::config_not_found(path.display().to_string()));
            }
            Err(e) => return Err(AppError::io(format!("Cannot stat '{}': {}", path.display(), e))),
        };

        if !metadata.is_file() {
            return Err(AppError::config_invalid(format!("'{}' is not a regular file", path.display())));
        }

        let text = fs::read_to_string(path)
            .map_err(|e| AppError::io(format!("Cannot read '{}': {}", path.display(), e)))?;

        let format = ProfileFormat::from_path(path);
        let document = match format.parse(&text)? {
            Value::Mapping(mapping) => mapping,
            _ => {
                return Err(AppError::config_invalid(format!(
                    "'{}' does not contain a mapping at the top level", path.display()
                )));
            }
        };

        match document.get(PROXIES_KEY) {
            None | Some(Value::Sequence(_)) => {}
            Some(_) => {
                return Err(AppError::config_invalid(format!(
                    "'{}' has a '{}' key that is not a list", path.display(), PROXIES_KEY
                )));
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            format,
            document,
            recorded: Vec::new(),
            logger: Logger::disabled(),
        })
    }

    /// Route this profile's diagnostics through `logger`
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ProfileFormat {
        self.format
    }

    fn entries(&self) -> &[Value] {
        match self.document.get(PROXIES_KEY) {
            Some(Value::Sequence(entries)) => entries.as_slice(),
            _ => &[],
        }
    }

    /// Names of the profile's proxy entries, in document order
    pub fn entry_names(&self) -> Vec<&str> {
        self.entries()
            .iter()
            .filter_map(|entry| entry.get("name").and_then(Value::as_str))
            .collect()
    }

    /// Entries recorded so far, in recording order
    pub fn recorded(&self) -> &[Value] {
        &self.recorded
    }

    /// First entry whose `name` is exactly `name`
    pub fn lookup(&self, name: &str) -> Result<&Value> {
        self.entries()
            .iter()
            .find(|entry| entry.get("name").and_then(Value::as_str) == Some(name))
            .ok_or_else(|| AppError::lookup_miss(name))
    }

    /// Append a copy of the entry named `name` to the healthy set
    pub fn record_healthy(&mut self, name: &str) -> Result<()> {
        let entry = self.lookup(name)?.clone();
        self.recorded.push(entry);
        Ok(())
    }

    /// Write the healthy subset into the current working directory
    pub fn save(&self) -> Result<PathBuf> {
        let dir = std::env::current_dir()
            .map_err(|e| AppError::io(format!("Cannot determine working directory: {}", e)))?;
        self.save_to_dir(dir)
    }

    /// Write the healthy subset into `dir` under a fresh, timestamped name.
    ///
    /// The document keeps every other key; `proxies` is replaced with the
    /// recorded entries. Existing files are never overwritten.
    pub fn save_to_dir<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let dir = dir.as_ref();

        let mut document = self.document.clone();
        document.insert(Value::from(PROXIES_KEY), Value::Sequence(self.recorded.clone()));
        let body = self.format.serialize(&Value::Mapping(document))?;

        for _ in 0..MAX_SAVE_ATTEMPTS {
            let candidate = dir.join(self.output_file_name());

            let mut file = match OpenOptions::new().write(true).create_new(true).open(&candidate) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(AppError::io(format!("Cannot create '{}': {}", candidate.display(), e)));
                }
            };

            file.write_all(body.as_bytes())
                .and_then(|_| file.flush())
                .map_err(|e| AppError::io(format!("Cannot write '{}': {}", candidate.display(), e)))?;

            self.logger.info("saved healthy proxies")
                .field("path", candidate.display().to_string())
                .field("entries", self.recorded.len())
                .log();

            return Ok(candidate);
        }

        Err(AppError::io(format!(
            "No free file name in '{}' after {} attempts", dir.display(), MAX_SAVE_ATTEMPTS
        )))
    }

    /// `<stem>-<YYYYmmdd-HHMMSS>-<nanos>-<pid>-<seq>[.<ext>]`
    fn output_file_name(&self) -> String {
        let now = Local::now();
        let stem = self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "profile".to_string());
        let seq = SAVE_SEQUENCE.fetch_add(1, Ordering::Relaxed);

        let mut name = format!(
            "{}-{}-{:09}-{}-{}",
            stem,
            now.format("%Y%m%d-%H%M%S"),
            now.timestamp_subsec_nanos(),
            std::process::id(),
            seq
        );

        if let Some(ext) = self.path.extension() {
            name.push('.');
            name.push_str(&ext.to_string_lossy());
        }

        name
    }
}
