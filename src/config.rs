//! Configuration management for the Duino-Coin monitor

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "https://server.duinocoin.com";
pub const DEFAULT_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const USERNAME_FILE: &str = "username.txt";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the Duino-Coin REST API
    pub api_url: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Refresh interval used when --interval is not given
    pub interval_secs: u64,

    /// Where the validated username is cached
    pub username_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            interval_secs: DEFAULT_INTERVAL_SECS,
            username_file: None,
        }
    }
}

impl Config {
    /// Resolve the username cache path, falling back to the config directory
    pub fn username_path(&self) -> Result<PathBuf> {
        match &self.username_file {
            Some(path) => Ok(path.clone()),
            None => Ok(config_dir()?.join(USERNAME_FILE)),
        }
    }
}

fn config_dir() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "duinocoin", "duco-monitor")
        .context("Failed to determine config directory")?;

    // created lazily when the username cache is first written
    Ok(proj_dirs.config_dir().to_path_buf())
}

/// Get the config file path
pub fn get_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load configuration from the default location
pub fn load_config() -> Result<Config> {
    load_config_from(&get_config_path()?)
}

/// Load configuration from a given file, defaults when it does not exist
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .context("Failed to read config file")?;

    let config: Config = toml::from_str(&content)
        .context("Failed to parse config file")?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("duco-config-{}-{}", rand::random::<u64>(), name))
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = scratch_file("absent.toml");
        let config = load_config_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.interval_secs, 60);
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let path = scratch_file("partial.toml");
        std::fs::write(&path, "interval_secs = 15\nusername_file = \"/tmp/duco-user\"\n").unwrap();

        let config = load_config_from(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.interval_secs, 15);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(
            config.username_path().unwrap(),
            PathBuf::from("/tmp/duco-user")
        );
    }

    #[test]
    fn test_username_override_creates_nothing() {
        let dir = scratch_file("cache-dir");
        let config = Config {
            username_file: Some(dir.join("username.txt")),
            ..Config::default()
        };

        assert_eq!(config.username_path().unwrap(), dir.join("username.txt"));
        assert!(!dir.exists());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let path = scratch_file("bad.toml");
        std::fs::write(&path, "interval_secs = \"soon\"").unwrap();

        let result = load_config_from(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(result.is_err());
    }
}
