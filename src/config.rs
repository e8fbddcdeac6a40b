use crate::constants::*;
use crate::errors::{ChatError, ChatResult};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server_url: String,
    pub chat_path: String,
    pub request_timeout_secs: u64,
    pub follow_up_delay_ms: u64,
    pub log_level: String,
    pub log_dir: String,
    pub export_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            chat_path: DEFAULT_CHAT_PATH.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            follow_up_delay_ms: DEFAULT_FOLLOW_UP_DELAY_MS,
            log_level: "info".to_string(),
            log_dir: "logs".to_string(),
            export_dir: ".".to_string(),
        }
    }
}

impl Config {
    /// Full URL of the chat endpoint.
    pub fn chat_endpoint(&self) -> String {
        format!(
            "{}{}",
            self.server_url.trim_end_matches('/'),
            self.chat_path
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn follow_up_delay(&self) -> Duration {
        Duration::from_millis(self.follow_up_delay_ms)
    }

    /// Applies `REGO_CHAT_*` variables on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var(ENV_SERVER_URL) {
            if !url.trim().is_empty() {
                self.server_url = url.trim().to_string();
            }
        }
        if let Ok(level) = env::var(ENV_LOG_LEVEL) {
            if !level.trim().is_empty() {
                self.log_level = level.trim().to_lowercase();
            }
        }
    }
}

/// Loads the config at `path`, writing a default one first when it is missing.
pub fn initialize_config(path: Option<&Path>) -> ChatResult<Config> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => get_config_path()?,
    };

    if config_path.exists() {
        return load_config(&config_path);
    }

    let config = Config::default();
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            ChatError::config_error(format!("Failed to create config directory: {}", e))
        })?;
    }

    let config_str = serde_json::to_string_pretty(&config)
        .map_err(|e| ChatError::config_error(format!("Failed to serialize config: {}", e)))?;

    fs::write(&config_path, config_str)
        .map_err(|e| ChatError::config_error(format!("Failed to write config file: {}", e)))?;

    log::debug!("wrote default config to {}", config_path.display());
    Ok(config)
}

pub fn load_config(path: &Path) -> ChatResult<Config> {
    let config_str = fs::read_to_string(path)
        .map_err(|e| ChatError::config_error(format!("Failed to read config file: {}", e)))?;

    let config: Config = serde_json::from_str(&config_str)
        .map_err(|e| ChatError::config_error(format!("Failed to parse config: {}", e)))?;

    validate_config(&config)?;
    Ok(config)
}

fn get_config_path() -> ChatResult<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| ChatError::config_error("Could not determine config directory"))?;

    Ok(config_dir.join("rego-chat").join("config.json"))
}

pub fn validate_config(config: &Config) -> ChatResult<()> {
    let url = reqwest::Url::parse(&config.server_url)
        .map_err(|e| ChatError::config_error(format!("Invalid server_url: {}", e)))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ChatError::config_error(
            "server_url must use http or https",
        ));
    }

    if !config.chat_path.starts_with('/') {
        return Err(ChatError::config_error("chat_path must start with '/'"));
    }

    if config.request_timeout_secs == 0 {
        return Err(ChatError::config_error(
            "request_timeout_secs must be greater than 0",
        ));
    }

    if !LOG_LEVELS.contains(&config.log_level.as_str()) {
        return Err(ChatError::config_error(format!(
            "Unknown log_level '{}'",
            config.log_level
        )));
    }

    Ok(())
}
