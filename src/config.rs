use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

/// Errors raised when a monitor configuration cannot be used to start a run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("monitor configuration not found")]
    Missing,

    #[error("monitor configuration is not active")]
    Inactive,

    #[error("monitor interval must be at least one minute")]
    InvalidInterval,

    #[error("monitor configuration is missing the {0}")]
    MissingEndpoint(&'static str),
}

/// Monitor settings owned by the state store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Base URL of the AList server
    pub alist_url: String,

    /// Admin token used as bearer credential against AList
    pub alist_token: String,

    /// WeChat Work robot webhook URL
    pub webhook_url: String,

    /// Check interval in minutes
    #[serde(default = "default_interval")]
    pub interval: u32,

    #[serde(default)]
    pub active: bool,
}

impl MonitorConfig {
    /// Check that this config is able to drive a scheduled run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.active {
            return Err(ConfigError::Inactive);
        }
        if self.interval == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        if self.alist_url.trim().is_empty() {
            return Err(ConfigError::MissingEndpoint("inventory url"));
        }
        if self.webhook_url.trim().is_empty() {
            return Err(ConfigError::MissingEndpoint("webhook url"));
        }
        Ok(())
    }

    pub fn inventory_target(&self) -> InventoryTarget {
        InventoryTarget {
            base_url: self.alist_url.clone(),
            token: self.alist_token.clone(),
        }
    }
}

/// Endpoint and credential of the remote inventory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryTarget {
    pub base_url: String,
    pub token: String,
}

fn default_interval() -> u32 {
    10
}

/// Storage backend configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    /// In-memory storage (no persistence)
    #[serde(rename = "none")]
    None,

    /// SQLite database
    Sqlite {
        #[serde(default = "default_sqlite_path")]
        path: PathBuf,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Sqlite {
            path: default_sqlite_path(),
        }
    }
}

fn default_sqlite_path() -> PathBuf {
    PathBuf::from("./monitor.db")
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
    pub token: Option<String>,
    #[serde(default = "default_true")]
    pub enable_cors: bool,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            token: None,
            enable_cors: true,
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DispatchSettings {
    /// Maximum number of alerts delivered in parallel within one cycle
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

fn default_concurrency() -> usize {
    1
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

/// Contents of the monitor's configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Seed for the stored monitor configuration
    pub monitor: Option<MonitorConfig>,

    /// Storage configuration (optional - defaults to SQLite)
    pub storage: Option<StorageConfig>,

    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub dispatch: DispatchSettings,

    #[serde(default)]
    pub http: HttpSettings,

    /// Answer AList tokens containing `demo` with a sample inventory
    #[serde(default)]
    pub demo: bool,
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    parse_config(&file_content).inspect(|config| trace!("loaded config: {config:?}"))
}

pub fn parse_config(content: &str) -> anyhow::Result<Config> {
    serde_json::from_str(content).map_err(|e| anyhow::anyhow!("Invalid configuration file provided: {e}"))
}
