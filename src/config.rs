//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults
//! 2. `config.toml` in the platform config directory, or the file given
//!    with `--config`
//! 3. `CANONMATCH_*` environment variables, `__` separating nested keys
//!    (`CANONMATCH_COMPARE__NAME=true`)
//! 4. Command-line flags, applied by the caller
//!
//! ```toml
//! report_frequency = 50
//! io_threads = 8
//! skip_hidden = true
//!
//! [compare]
//! name = true
//! verify_checksum = true
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::duplicates::ComparisonConfig;
use crate::scanner::ScanFilter;
use crate::session::DEFAULT_REPORT_FREQUENCY;

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "CANONMATCH_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Files between progress updates.
    pub report_frequency: usize,
    /// Threads used to compute checksums ahead of the compare pass.
    pub io_threads: usize,
    /// Only scan the top level of each directory.
    pub skip_sub_dir: bool,
    /// Skip files whose name starts with `.`.
    pub skip_hidden: bool,
    /// Skip empty files.
    pub skip_zero_len: bool,
    /// Default comparison switches.
    pub compare: ComparisonConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report_frequency: DEFAULT_REPORT_FREQUENCY,
            io_threads: 4,
            skip_sub_dir: false,
            skip_hidden: false,
            skip_zero_len: true,
            compare: ComparisonConfig::default(),
        }
    }
}

impl Config {
    /// Load the configuration from `path`, or the default location.
    ///
    /// An unreadable or invalid configuration is reported and replaced by
    /// the defaults.
    #[must_use]
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).or_else(Self::default_path);
        let figment = match &path {
            Some(path) => Self::figment(path),
            None => Self::env_only(),
        };

        match figment.extract() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Invalid configuration, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// The figment layering defaults, the TOML file at `path` and the
    /// environment.
    #[must_use]
    pub fn figment(path: &Path) -> Figment {
        if path.exists() {
            log::debug!("Loading configuration from {}", path.display());
        }
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn env_only() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// The platform-specific location of `config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "canonmatch", "canonmatch")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// The scan filter these settings describe, without patterns.
    #[must_use]
    pub fn scan_filter(&self) -> ScanFilter {
        ScanFilter {
            skip_sub_dir: self.skip_sub_dir,
            skip_hidden: self.skip_hidden,
            skip_zero_len: self.skip_zero_len,
            ..ScanFilter::default()
        }
    }

    /// Render as TOML.
    ///
    /// # Errors
    ///
    /// Returns the serializer error, which only occurs for unrepresentable
    /// values.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
