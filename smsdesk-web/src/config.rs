//! Service configuration
//!
//! Loaded from `<config_dir>/smsdesk/config.toml` with environment-variable
//! overrides for deployment (`SMSDESK_BACKEND_URL`, `SMSDESK_BIND_ADDR`,
//! `SMSDESK_SESSION_SECRET`). A missing file falls back to defaults so a
//! fresh checkout runs against a local backend out of the box.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Web service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend connection
    #[serde(default)]
    pub backend: BackendConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Session handling
    #[serde(default)]
    pub session: SessionConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Origin of the sender-data backend
    #[serde(default = "default_backend_url")]
    pub url: String,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address for the dashboard
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Bell poll interval in seconds (what the page's JS uses)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

/// Session handling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Secret used to sign session cookies
    ///
    /// The default is only suitable for local development; deployments must
    /// set `SMSDESK_SESSION_SECRET`.
    #[serde(default = "default_session_secret")]
    pub secret: String,

    /// Session lifetime in minutes
    #[serde(default = "default_session_minutes")]
    pub lifetime_minutes: u64,
}

fn default_backend_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_poll_interval() -> u64 {
    10
}

fn default_session_secret() -> String {
    "smsdesk-dev-secret".to_string()
}

fn default_session_minutes() -> u64 {
    // Matches the backend's own token lifetime.
    1440
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: default_session_secret(),
            lifetime_minutes: default_session_minutes(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            server: ServerConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Config {
    /// Default config file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("smsdesk")
            .join("config.toml")
    }

    /// Load configuration: file (if present), then environment overrides
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let path = path.unwrap_or_else(Self::default_path);
        let mut config = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("Failed to parse config from {}", path.display()))?
        } else {
            Config::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("SMSDESK_BACKEND_URL") {
            self.backend.url = url;
        }
        if let Ok(addr) = std::env::var("SMSDESK_BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        if let Ok(secret) = std::env::var("SMSDESK_SESSION_SECRET") {
            self.session.secret = secret;
        }
    }

    /// Write the current configuration out (used by `dump-config --save`)
    pub fn save(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let raw = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, raw)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        tracing::info!("Saved configuration to {}", path.display());
        Ok(())
    }

}
