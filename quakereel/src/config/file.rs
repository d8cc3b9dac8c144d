//! INI configuration file.
//!
//! ```ini
//! [cache]
//! directory = ~/.quakereel/cache
//! ttl_secs = 3600
//!
//! [network]
//! timeout = 30
//! feed_base_url = https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary
//!
//! [playback]
//! feed = all_day
//! rate = 1
//!
//! [logging]
//! directory = ~/.quakereel/logs
//! ```
//!
//! Missing keys take their defaults. Present keys are validated with the
//! same rules `config set` applies.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use super::keys::ConfigKey;
use crate::cache::DEFAULT_TTL;
use crate::feed::{FeedSelector, DEFAULT_FEED_BASE_URL};
use crate::playback::CompressionRate;
use crate::provider::DEFAULT_TIMEOUT;

const CONFIG_DIR_NAME: &str = ".quakereel";
const CONFIG_FILE_NAME: &str = "config.ini";

/// Errors from loading, saving or editing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    pub directory: PathBuf,
    pub ttl_secs: u64,
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// `[network]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSettings {
    pub timeout_secs: u64,
    pub feed_base_url: String,
}

impl NetworkSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[playback]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSettings {
    pub feed: FeedSelector,
    pub rate: CompressionRate,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
}

/// Parsed configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub cache: CacheSettings,
    pub network: NetworkSettings,
    pub playback: PlaybackSettings,
    pub logging: LoggingSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let base = config_directory();
        Self {
            cache: CacheSettings {
                directory: base.join("cache"),
                ttl_secs: DEFAULT_TTL.as_secs(),
            },
            network: NetworkSettings {
                timeout_secs: DEFAULT_TIMEOUT.as_secs(),
                feed_base_url: DEFAULT_FEED_BASE_URL.to_string(),
            },
            playback: PlaybackSettings {
                feed: FeedSelector::default(),
                rate: CompressionRate::default(),
            },
            logging: LoggingSettings {
                directory: base.join("logs"),
            },
        }
    }
}

impl ConfigFile {
    /// Loads `~/.quakereel/config.ini`, or defaults if it does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Loads the file at `path`, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::from_ini(&ini)
    }

    /// Writes to `~/.quakereel/config.ini`.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Writes to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        self.to_ini().write_to_file(path).map_err(write_err)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for key in ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|props| props.get(key.key_name()));
            if let Some(value) = value {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini
    }
}

/// `~/.quakereel`, or `./.quakereel` when no home directory is known.
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Path of the configuration file.
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

/// Expands a leading `~` to the home directory.
pub(crate) fn expand_tilde(value: &str) -> PathBuf {
    match (value.strip_prefix('~'), dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) if rest.starts_with('/') => home.join(&rest[1..]),
        _ => PathBuf::from(value),
    }
}

/// Formats a byte count for display, e.g. `1.5 MB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}
