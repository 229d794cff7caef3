use std::{path::PathBuf, str::FromStr, time::Duration};

use crate::errors::{BotError, BotResult};

const DEFAULT_DOWNLOAD_PATH: &str = "downloads";
/// Upload cap of the public Bot API.
const DEFAULT_MAX_FILE_SIZE_MB: u64 = 50;
/// Upload cap when `TELOXIDE_API_URL` points at a local Bot API server.
const LOCAL_API_MAX_FILE_SIZE_MB: u64 = 2000;
const MB: u64 = 1024 * 1024;
const DEFAULT_FILE_MAX_AGE_MINUTES: u64 = 60;
const DEFAULT_CLEANUP_INTERVAL_MINUTES: u64 = 30;
const DEFAULT_YTDLP_PATH: &str = "yt-dlp";

/// Settings read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub download_path: PathBuf,
    /// Upload limit in bytes
    pub max_file_size: u64,
    /// Resolutions above this height are not offered
    pub max_height: Option<u32>,
    /// Sessions untouched for longer than this are swept. `None` keeps them forever.
    pub session_ttl: Option<Duration>,
    pub file_max_age: Duration,
    pub cleanup_interval: Duration,
    pub ytdlp_path: String,
    /// Bot username used to sign captions, filled in after `get_me`
    pub bot_username: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download_path: PathBuf::from(DEFAULT_DOWNLOAD_PATH),
            max_file_size: DEFAULT_MAX_FILE_SIZE_MB * MB,
            max_height: None,
            session_ttl: None,
            file_max_age: Duration::from_secs(DEFAULT_FILE_MAX_AGE_MINUTES * 60),
            cleanup_interval: Duration::from_secs(DEFAULT_CLEANUP_INTERVAL_MINUTES * 60),
            ytdlp_path: DEFAULT_YTDLP_PATH.to_string(),
            bot_username: None,
        }
    }
}

impl Config {
    pub fn from_env() -> BotResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> BotResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let max_file_size = match parse_var::<u64>(get("MAX_FILE_SIZE_MB"), "MAX_FILE_SIZE_MB")? {
            Some(mb) => mb.checked_mul(MB).ok_or_else(|| too_large("MAX_FILE_SIZE_MB"))?,
            // teloxide's Bot::from_env talks to this server instead of api.telegram.org.
            None if get("TELOXIDE_API_URL").is_some() => LOCAL_API_MAX_FILE_SIZE_MB * MB,
            None => defaults.max_file_size,
        };

        Ok(Self {
            download_path: get("DOWNLOAD_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.download_path),
            max_file_size,
            max_height: parse_var(get("MAX_HEIGHT"), "MAX_HEIGHT")?,
            session_ttl: parse_minutes(get("SESSION_TTL_MINUTES"), "SESSION_TTL_MINUTES")?,
            file_max_age: parse_minutes(get("FILE_MAX_AGE_MINUTES"), "FILE_MAX_AGE_MINUTES")?
                .unwrap_or(defaults.file_max_age),
            cleanup_interval: parse_minutes(
                get("CLEANUP_INTERVAL_MINUTES"),
                "CLEANUP_INTERVAL_MINUTES",
            )?
            .unwrap_or(defaults.cleanup_interval),
            ytdlp_path: get("YTDLP_PATH").unwrap_or(defaults.ytdlp_path),
            bot_username: None,
        })
    }
}

fn parse_var<T: FromStr>(value: Option<String>, key: &str) -> BotResult<Option<T>> {
    value
        .map(|v| {
            v.trim().parse::<T>().map_err(|_| {
                BotError::invalid_parameters(format!("{} must be a number, got '{}'", key, v))
            })
        })
        .transpose()
}

fn parse_minutes(value: Option<String>, key: &str) -> BotResult<Option<Duration>> {
    parse_var::<u64>(value, key)?
        .map(|m| {
            m.checked_mul(60)
                .map(Duration::from_secs)
                .ok_or_else(|| too_large(key))
        })
        .transpose()
}

fn too_large(key: &str) -> BotError {
    BotError::invalid_parameters(format!("{} is too large", key))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.download_path, PathBuf::from("downloads"));
        assert_eq!(config.max_file_size, 50 * 1024 * 1024);
        assert_eq!(config.max_height, None);
        assert_eq!(config.session_ttl, None);
        assert_eq!(config.cleanup_interval, Duration::from_secs(30 * 60));
        assert_eq!(config.ytdlp_path, "yt-dlp");
    }

    #[test]
    fn test_values_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("DOWNLOAD_PATH", "/tmp/videos"),
            ("MAX_FILE_SIZE_MB", "50"),
            ("MAX_HEIGHT", "1080"),
            ("SESSION_TTL_MINUTES", "30"),
            ("YTDLP_PATH", "/usr/local/bin/yt-dlp"),
        ]))
        .unwrap();
        assert_eq!(config.download_path, PathBuf::from("/tmp/videos"));
        assert_eq!(config.max_file_size, 50 * 1024 * 1024);
        assert_eq!(config.max_height, Some(1080));
        assert_eq!(config.session_ttl, Some(Duration::from_secs(1800)));
        assert_eq!(config.ytdlp_path, "/usr/local/bin/yt-dlp");
    }

    #[test]
    fn test_empty_value_falls_back_to_default() {
        let config = Config::from_lookup(lookup(&[("MAX_HEIGHT", "  ")])).unwrap();
        assert_eq!(config.max_height, None);
    }

    #[test]
    fn test_local_api_server_raises_default_limit() {
        let config =
            Config::from_lookup(lookup(&[("TELOXIDE_API_URL", "http://localhost:8081")])).unwrap();
        assert_eq!(config.max_file_size, 2000 * 1024 * 1024);

        let config = Config::from_lookup(lookup(&[
            ("TELOXIDE_API_URL", "http://localhost:8081"),
            ("MAX_FILE_SIZE_MB", "300"),
        ]))
        .unwrap();
        assert_eq!(config.max_file_size, 300 * 1024 * 1024);
    }

    #[test]
    fn test_overflowing_values_are_rejected() {
        let huge = u64::MAX.to_string();
        for key in [
            "MAX_FILE_SIZE_MB",
            "SESSION_TTL_MINUTES",
            "FILE_MAX_AGE_MINUTES",
            "CLEANUP_INTERVAL_MINUTES",
        ] {
            let err = Config::from_lookup(lookup(&[(key, huge.as_str())])).unwrap_err();
            assert!(matches!(err, BotError::InvalidParameters(_)), "{}", key);
            assert!(err.to_string().contains(key));
        }
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = Config::from_lookup(lookup(&[("MAX_FILE_SIZE_MB", "lots")])).unwrap_err();
        assert!(matches!(err, BotError::InvalidParameters(_)));
        assert!(err.to_string().contains("MAX_FILE_SIZE_MB"));
    }
}
