//! Configuration file handling.
//!
//! Settings live in `~/.quakereel/config.ini`. The CLI reads them on every
//! command and edits them through [`ConfigKey`].

mod file;
mod keys;

pub use file::{
    config_directory, config_file_path, format_size, CacheSettings, ConfigError, ConfigFile,
    LoggingSettings, NetworkSettings, PlaybackSettings,
};
pub use keys::ConfigKey;
