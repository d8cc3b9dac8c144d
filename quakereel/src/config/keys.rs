//! Typed access to individual configuration settings.

use std::fmt;
use std::str::FromStr;

use super::file::{expand_tilde, ConfigError, ConfigFile};
use crate::feed::FeedSelector;
use crate::playback::CompressionRate;

/// A single `section.key` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    CacheDirectory,
    CacheTtlSecs,
    NetworkTimeout,
    NetworkFeedBaseUrl,
    PlaybackFeed,
    PlaybackRate,
    LoggingDirectory,
}

impl ConfigKey {
    /// Every key, in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::CacheDirectory,
            ConfigKey::CacheTtlSecs,
            ConfigKey::NetworkTimeout,
            ConfigKey::NetworkFeedBaseUrl,
            ConfigKey::PlaybackFeed,
            ConfigKey::PlaybackRate,
            ConfigKey::LoggingDirectory,
        ]
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::CacheDirectory | ConfigKey::CacheTtlSecs => "cache",
            ConfigKey::NetworkTimeout | ConfigKey::NetworkFeedBaseUrl => "network",
            ConfigKey::PlaybackFeed | ConfigKey::PlaybackRate => "playback",
            ConfigKey::LoggingDirectory => "logging",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::CacheDirectory | ConfigKey::LoggingDirectory => "directory",
            ConfigKey::CacheTtlSecs => "ttl_secs",
            ConfigKey::NetworkTimeout => "timeout",
            ConfigKey::NetworkFeedBaseUrl => "feed_base_url",
            ConfigKey::PlaybackFeed => "feed",
            ConfigKey::PlaybackRate => "rate",
        }
    }

    /// Full name, e.g. `cache.ttl_secs`.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value rendered as it is written to the file.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::CacheDirectory => config.cache.directory.display().to_string(),
            ConfigKey::CacheTtlSecs => config.cache.ttl_secs.to_string(),
            ConfigKey::NetworkTimeout => config.network.timeout_secs.to_string(),
            ConfigKey::NetworkFeedBaseUrl => config.network.feed_base_url.clone(),
            ConfigKey::PlaybackFeed => config.playback.feed.key(),
            ConfigKey::PlaybackRate => config.playback.rate.hours_per_second().to_string(),
            ConfigKey::LoggingDirectory => config.logging.directory.display().to_string(),
        }
    }

    /// Validates `value` and stores it.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let invalid = |reason: &str| ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        };

        match self {
            ConfigKey::CacheDirectory | ConfigKey::LoggingDirectory => {
                if value.is_empty() {
                    return Err(invalid("directory must not be empty"));
                }
                let path = expand_tilde(value);
                if *self == ConfigKey::CacheDirectory {
                    config.cache.directory = path;
                } else {
                    config.logging.directory = path;
                }
            }
            ConfigKey::CacheTtlSecs => {
                config.cache.ttl_secs = value
                    .parse()
                    .map_err(|_| invalid("expected a whole number of seconds"))?;
            }
            ConfigKey::NetworkTimeout => {
                let secs: u64 = value
                    .parse()
                    .map_err(|_| invalid("expected a whole number of seconds"))?;
                if secs == 0 {
                    return Err(invalid("timeout must be at least 1 second"));
                }
                config.network.timeout_secs = secs;
            }
            ConfigKey::NetworkFeedBaseUrl => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(invalid("expected an http:// or https:// URL"));
                }
                config.network.feed_base_url = value.trim_end_matches('/').to_string();
            }
            ConfigKey::PlaybackFeed => {
                config.playback.feed = FeedSelector::from_str(value)
                    .map_err(|_| invalid("expected a feed such as 2.5_day; see 'quakereel feeds'"))?;
            }
            ConfigKey::PlaybackRate => {
                let rate: CompressionRate = value
                    .parse()
                    .map_err(|_| invalid("expected hours per second, e.g. 6"))?;
                config.playback.rate = rate;
            }
        }
        Ok(())
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::MAX_RATE;

    #[test]
    fn test_parse_key_names() {
        assert_eq!("cache.ttl_secs".parse::<ConfigKey>().unwrap(), ConfigKey::CacheTtlSecs);
        assert_eq!("Playback.Rate".parse::<ConfigKey>().unwrap(), ConfigKey::PlaybackRate);
        assert!(matches!(
            "cache.size".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<String> = ConfigKey::all().iter().map(|k| k.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ConfigKey::all().len());
    }

    #[test]
    fn test_set_then_get() {
        let mut config = ConfigFile::default();

        ConfigKey::PlaybackFeed.set(&mut config, "4.5_week").unwrap();
        assert_eq!(ConfigKey::PlaybackFeed.get(&config), "4.5_week");

        ConfigKey::NetworkFeedBaseUrl
            .set(&mut config, "http://localhost:8080/feeds/")
            .unwrap();
        assert_eq!(config.network.feed_base_url, "http://localhost:8080/feeds");

        ConfigKey::PlaybackRate.set(&mut config, "48").unwrap();
        assert_eq!(config.playback.rate.hours_per_second(), MAX_RATE);
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let mut config = ConfigFile::default();
        let before = config.clone();

        assert!(ConfigKey::NetworkTimeout.set(&mut config, "0").is_err());
        assert!(ConfigKey::CacheTtlSecs.set(&mut config, "-5").is_err());
        assert!(ConfigKey::NetworkFeedBaseUrl.set(&mut config, "ftp://x").is_err());
        assert!(ConfigKey::PlaybackRate.set(&mut config, "fast").is_err());
        assert!(ConfigKey::CacheDirectory.set(&mut config, "  ").is_err());

        assert_eq!(config, before);
    }
}
