//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use accredit_utils::LogFormat;

use crate::NodeError;

/// Deployment environment. Controls whether error detail reaches clients.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    pub fn exposes_errors(&self) -> bool {
        *self != Self::Production
    }
}

/// Configuration for a certification node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Data directory for the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,

    #[serde(default = "default_http_port")]
    pub http_port: u16,

    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Maximum LMDB map size in bytes.
    #[serde(default = "default_lmdb_map_size")]
    pub lmdb_map_size: usize,

    #[serde(default = "default_true")]
    pub enable_metrics: bool,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,
}

/// External fraud classifier.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// When off, every assessment is degraded.
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_classifier_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_classifier_model")]
    pub model: String,

    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Gate deadline for one classification.
    #[serde(default = "default_classifier_timeout_ms")]
    pub timeout_ms: u64,
}

/// Outbound workflow notifications.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// POST every workflow event here as JSON. Events are only logged when unset.
    #[serde(default)]
    pub webhook_url: Option<String>,

    #[serde(default = "default_notification_timeout_ms")]
    pub timeout_ms: u64,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./accredit_data")
}

fn default_bind_address() -> IpAddr {
    IpAddr::from([127, 0, 0, 1])
}

fn default_http_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_lmdb_map_size() -> usize {
    1024 * 1024 * 1024
}

fn default_true() -> bool {
    true
}

fn default_classifier_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_classifier_model() -> String {
    "gpt-4o".to_string()
}

fn default_api_key_env() -> String {
    "ACCREDIT_CLASSIFIER_API_KEY".to_string()
}

fn default_classifier_timeout_ms() -> u64 {
    20_000
}

fn default_notification_timeout_ms() -> u64 {
    5_000
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| NodeError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.http_port)
    }
}

impl ClassifierConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The API key from the configured environment variable, if set.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

impl NotificationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            bind_address: default_bind_address(),
            http_port: default_http_port(),
            environment: Environment::default(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            lmdb_map_size: default_lmdb_map_size(),
            enable_metrics: default_true(),
            classifier: ClassifierConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_classifier_endpoint(),
            model: default_classifier_model(),
            api_key_env: default_api_key_env(),
            timeout_ms: default_classifier_timeout_ms(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_ms: default_notification_timeout_ms(),
        }
    }
}
