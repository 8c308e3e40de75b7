//! Dashboard settings stored as RON next to the working directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use jobboard_api::ApiSettings;
use jobboard_logging::{board_info, board_warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

pub const CONFIG_FILENAME: &str = ".jobboard.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("could not serialize config: {0}")]
    Serialize(#[from] ron::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub poll_interval_ms: u64,
    pub jobs_limit: u32,
    /// Sent with every interaction record.
    pub user_id: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let api = ApiSettings::default();
        Self {
            api_base_url: api.base_url,
            poll_interval_ms: jobboard_core::DEFAULT_POLL_INTERVAL.as_millis() as u64,
            jobs_limit: jobboard_core::JOBS_PAGE_LIMIT,
            user_id: "anonymous".to_string(),
            connect_timeout_secs: api.connect_timeout.as_secs(),
            request_timeout_secs: api.request_timeout.as_secs(),
        }
    }
}

impl AppConfig {
    /// Rejects values that would spin or stall the monitor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_ms must be at least 1".to_string(),
            ));
        }
        if self.jobs_limit == 0 {
            return Err(ConfigError::Invalid("jobs_limit must be at least 1".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// How long the runner waits without any answer before giving up: one
    /// poll delay plus one full request, with some slack.
    pub fn stall_timeout(&self) -> Duration {
        self.poll_interval()
            + Duration::from_secs(self.connect_timeout_secs + self.request_timeout_secs)
            + Duration::from_secs(5)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.api_base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from(".").join(CONFIG_FILENAME)
}

/// Reads the config file, falling back to defaults when it is missing or broken.
pub fn load_config(path: &Path) -> AppConfig {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return AppConfig::default();
        }
        Err(err) => {
            board_warn!("Failed to read config from {:?}: {}", path, err);
            return AppConfig::default();
        }
    };

    match ron::from_str::<AppConfig>(&content) {
        Ok(config) => {
            board_info!("Loaded config from {:?}", path);
            config
        }
        Err(err) => {
            board_warn!("Failed to parse config from {:?}: {}", path, err);
            AppConfig::default()
        }
    }
}

/// Writes the config through a temp file in the same directory, then renames it into place.
pub fn save_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let pretty = ron::ser::PrettyConfig::new();
    let content = ron::ser::to_string_pretty(config, pretty)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path).map_err(|e| ConfigError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config(&temp.path().join(CONFIG_FILENAME));
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.poll_interval(), Duration::from_millis(2000));
        assert_eq!(config.jobs_limit, 50);
    }

    #[test]
    fn save_then_load_keeps_values() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join(CONFIG_FILENAME);
        let config = AppConfig {
            api_base_url: "http://jobs.internal:8080/api".to_string(),
            poll_interval_ms: 500,
            user_id: "recruiter-7".to_string(),
            ..AppConfig::default()
        };

        save_config(&path, &config).unwrap();
        assert_eq!(load_config(&path), config);

        // Overwrites in place.
        let updated = AppConfig {
            jobs_limit: 10,
            ..config
        };
        save_config(&path, &updated).unwrap();
        assert_eq!(load_config(&path).jobs_limit, 10);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(&path, "(poll_interval_ms: 750)").unwrap();

        let config = load_config(&path);
        assert_eq!(config.poll_interval_ms, 750);
        assert_eq!(config.api_base_url, AppConfig::default().api_base_url);
    }

    #[test]
    fn garbage_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(&path, "this is not ron {").unwrap();
        assert_eq!(load_config(&path), AppConfig::default());
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        assert!(AppConfig::default().validate().is_ok());

        let config = AppConfig {
            poll_interval_ms: 0,
            ..AppConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid config: poll_interval_ms must be at least 1"
        );

        let config = AppConfig {
            jobs_limit: 0,
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn stall_timeout_covers_one_poll_and_one_request() {
        let config = AppConfig {
            poll_interval_ms: 2000,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            ..AppConfig::default()
        };
        assert_eq!(config.stall_timeout(), Duration::from_secs(47));
    }

    #[test]
    fn api_settings_use_configured_timeouts() {
        let config = AppConfig {
            connect_timeout_secs: 3,
            request_timeout_secs: 7,
            ..AppConfig::default()
        };
        let api = config.api_settings();
        assert_eq!(api.connect_timeout, Duration::from_secs(3));
        assert_eq!(api.request_timeout, Duration::from_secs(7));
    }
}
