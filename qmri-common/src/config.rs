//! Configuration loading
//!
//! Bootstrap configuration comes from a single TOML file. Lookup order:
//! 1. `QMRI_CONFIG` environment variable naming a file
//! 2. Platform config file (`~/.config/qmri/config.toml`, then `/etc/qmri/config.toml` on Linux)
//! 3. Compiled defaults
//!
//! `QMRI_SOURCEDATA` and `QMRI_DERIVATIVES` override the dataset roots of
//! whichever configuration was loaded. A missing config file is not an error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "QMRI_CONFIG";
/// Environment variable overriding `sourcedata`
pub const SOURCEDATA_ENV_VAR: &str = "QMRI_SOURCEDATA";
/// Environment variable overriding `derivatives`
pub const DERIVATIVES_ENV_VAR: &str = "QMRI_DERIVATIVES";

/// Top-level dataset folders that never hold raw acquisitions
pub const DEFAULT_IGNORE_PATTERNS: [&str; 4] = ["derivatives", "sourcedata", "code", "stimuli"];

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Root of the raw dataset
    #[serde(default = "default_sourcedata")]
    pub sourcedata: PathBuf,

    /// Root of the derivatives tree
    #[serde(default = "default_derivatives")]
    pub derivatives: PathBuf,

    /// Subjects processed by the batch driver
    #[serde(default)]
    pub subjects: Vec<String>,

    /// Session filter; `None` matches any session
    #[serde(default)]
    pub session: Option<String>,

    /// Acquisition label to resolve
    #[serde(default = "default_acquisition")]
    pub acquisition: String,

    /// Acquisition index options
    #[serde(default)]
    pub index: IndexConfig,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// What to do when an image joins against more than one sidecar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Fail with an ambiguous-join error
    #[default]
    Reject,
    /// Use the lexicographically first sidecar and log a warning
    FirstMatch,
}

/// Acquisition index options
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexConfig {
    #[serde(default)]
    pub duplicate_sidecars: DuplicatePolicy,

    /// Look for a B1 map next to the acquisition
    #[serde(default = "default_true")]
    pub attach_b1_map: bool,

    /// Entries named exactly like one of these are not traversed.
    /// Dot-prefixed entries are always skipped.
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            duplicate_sidecars: DuplicatePolicy::default(),
            attach_b1_map: true,
            ignore_patterns: default_ignore_patterns(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_sourcedata() -> PathBuf {
    PathBuf::from("/sourcedata")
}

fn default_derivatives() -> PathBuf {
    PathBuf::from("/derivatives")
}

fn default_acquisition() -> String {
    "memp2rage".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_ignore_patterns() -> Vec<String> {
    DEFAULT_IGNORE_PATTERNS.iter().map(|p| p.to_string()).collect()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            sourcedata: default_sourcedata(),
            derivatives: default_derivatives(),
            subjects: Vec::new(),
            session: None,
            acquisition: default_acquisition(),
            index: IndexConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        let config: TomlConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that cannot name a BIDS entity
    pub fn validate(&self) -> Result<()> {
        let labels = self
            .subjects
            .iter()
            .map(String::as_str)
            .chain(self.session.as_deref())
            .chain(std::iter::once(self.acquisition.as_str()));

        for label in labels {
            if label.is_empty() || !label.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(Error::Config(format!(
                    "Invalid label '{}': labels must be non-empty and alphanumeric",
                    label
                )));
            }
        }
        Ok(())
    }

    /// Apply `QMRI_SOURCEDATA` / `QMRI_DERIVATIVES` overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var(SOURCEDATA_ENV_VAR) {
            debug!(path = %path, "sourcedata overridden from environment");
            self.sourcedata = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var(DERIVATIVES_ENV_VAR) {
            debug!(path = %path, "derivatives overridden from environment");
            self.derivatives = PathBuf::from(path);
        }
    }
}

/// Locates and loads the configuration file
pub struct ConfigResolver {
    app_name: String,
}

impl ConfigResolver {
    /// Create a resolver for `<config_dir>/<app_name>/config.toml`
    pub fn new(app_name: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
        }
    }

    /// Candidate config file locations, highest priority first
    pub fn candidate_paths(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            paths.push(PathBuf::from(path));
        }
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join(&self.app_name).join("config.toml"));
        }
        if cfg!(target_os = "linux") {
            paths.push(PathBuf::from("/etc").join(&self.app_name).join("config.toml"));
        }
        paths
    }

    /// Load the first available config, falling back to defaults
    ///
    /// A file named by `QMRI_CONFIG` must exist and parse. Platform files
    /// are optional, but once found they must parse.
    pub fn resolve(&self) -> Result<TomlConfig> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let mut config = TomlConfig::load(Path::new(&path))?;
            config.apply_env_overrides();
            return Ok(config);
        }

        let found = self
            .candidate_paths()
            .into_iter()
            .find(|path| path.is_file());

        let mut config = match found {
            Some(path) => {
                debug!(path = %path.display(), "Loading configuration");
                TomlConfig::load(&path)?
            }
            None => {
                warn!("No configuration file found, using defaults");
                TomlConfig::default()
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }
}
