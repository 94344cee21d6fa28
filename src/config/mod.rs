//! Configuration management

use anyhow::{bail, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

const APP_DIR_NAME: &str = "clinic-portal";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Backend base URL shared by both roles
    #[serde(default)]
    pub backend_url: String,

    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Currency symbol shown next to fees and earnings
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Clear a role's token when the backend rejects it (HTTP 401/403)
    #[serde(default = "default_auto_logout")]
    pub auto_logout_on_auth_failure: bool,
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_auto_logout() -> bool {
    true
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Fail early when no backend is configured
    pub fn validate(&self) -> Result<()> {
        if self.backend_url.trim().is_empty() {
            bail!("backend_url is not configured (set PORTAL_BACKEND_URL or backend_url in config)");
        }
        Ok(())
    }
}

/// Get config directory (PORTAL_CONFIG_DIR or platform default)
pub fn get_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PORTAL_CONFIG_DIR") {
        return PathBuf::from(dir);
    }

    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library/Application Support")
                .join(APP_DIR_NAME);
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join(APP_DIR_NAME);
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".config").join(APP_DIR_NAME);
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join(APP_DIR_NAME);
        }
    }

    PathBuf::from(".")
}

/// Get data directory for durable session storage
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PORTAL_DATA_DIR") {
        return PathBuf::from(dir);
    }

    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library/Application Support")
                .join(APP_DIR_NAME);
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join(APP_DIR_NAME);
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".local/share").join(APP_DIR_NAME);
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("LOCALAPPDATA") {
            return PathBuf::from(appdata).join(APP_DIR_NAME);
        }
    }

    PathBuf::from("./data")
}

pub fn load_config() -> Result<Config> {
    let config_dir = get_config_dir();

    let mut builder = ::config::Config::builder()
        .set_default("request_timeout_secs", default_timeout_secs() as i64)?
        .set_default("currency", default_currency())?
        .set_default("auto_logout_on_auth_failure", default_auto_logout())?
        .add_source(
            ::config::File::with_name(&config_dir.join("config").to_string_lossy()).required(false),
        )
        // PORTAL_BACKEND_URL, PORTAL_REQUEST_TIMEOUT_SECS, ...
        .add_source(
            ::config::Environment::with_prefix("PORTAL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    // Precedence: PORTAL_BACKEND_URL > VITE_BACKEND_URL > config file
    if std::env::var("PORTAL_BACKEND_URL").is_err() {
        if let Ok(url) = std::env::var("VITE_BACKEND_URL") {
            builder = builder.set_override("backend_url", url)?;
        }
    }

    let config = builder.build()?;

    Ok(config.try_deserialize()?)
}
