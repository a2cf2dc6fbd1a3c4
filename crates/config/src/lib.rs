//! Configuration loading, validation, and management for Pitcrew.
//!
//! Loads configuration from `~/.pitcrew/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use pitcrew_core::order::{OrderRecord, OrderStatus};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable naming the preferred (tunnel) model endpoint.
pub const TUNNEL_URL_ENV: &str = "OLLAMA_URL";
/// Environment variable selecting `production` or `development` mode.
pub const ENVIRONMENT_ENV: &str = "PITCREW_ENV";
/// Environment variable overriding the knowledge root directory.
pub const KNOWLEDGE_DIR_ENV: &str = "PITCREW_KNOWLEDGE_DIR";

/// The root configuration structure.
///
/// Maps directly to `~/.pitcrew/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment mode; `development` adds debug metadata to chat responses
    #[serde(default)]
    pub environment: Environment,

    /// HTTP gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Model backend configuration
    #[serde(default)]
    pub backend: BackendConfig,

    /// Knowledge base location
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Customer-facing support details
    #[serde(default)]
    pub support: SupportConfig,

    /// Demo order table used by the order resolver
    #[serde(default = "default_orders")]
    pub orders: Vec<DemoOrderConfig>,
}

/// Deployment mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Development,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" => Ok(Environment::Development),
            other => Err(ConfigError::ValidationError(format!(
                "environment must be 'production' or 'development', got '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Production => f.write_str("production"),
            Environment::Development => f.write_str("development"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Browser origins allowed to call the API (the chat UI)
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_port() -> u16 {
    8787
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".into()]
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

/// Where and how to reach the model service.
///
/// Candidates are tried tunnel → LAN → localhost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-candidate timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Preferred endpoint, usually a tunnel to a home GPU box
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tunnel_url: Option<String>,

    #[serde(default = "default_lan_url")]
    pub lan_url: String,

    #[serde(default = "default_local_url")]
    pub local_url: String,
}

fn default_model() -> String {
    "qwen3:8b".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_lan_url() -> String {
    "http://192.168.50.1:11434".into()
}
fn default_local_url() -> String {
    "http://localhost:11434".into()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            tunnel_url: None,
            lan_url: default_lan_url(),
            local_url: default_local_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Directory holding products/, compatibility/, parts/ and support/
    #[serde(default = "default_knowledge_root")]
    pub root: PathBuf,
}

fn default_knowledge_root() -> PathBuf {
    PathBuf::from("knowledge")
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            root: default_knowledge_root(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportConfig {
    /// Shown to customers when the model backend is unreachable
    #[serde(default = "default_contact_email")]
    pub contact_email: String,
}

fn default_contact_email() -> String {
    "support@trackracer.com".into()
}

impl Default for SupportConfig {
    fn default() -> Self {
        Self {
            contact_email: default_contact_email(),
        }
    }
}

/// One row of the demo order table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoOrderConfig {
    /// Numeric token customers quote (e.g. "12345" for TR-12345)
    pub token: String,
    pub order_id: String,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking: Option<String>,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_delivery: Option<String>,
}

impl DemoOrderConfig {
    pub fn to_record(&self) -> OrderRecord {
        OrderRecord {
            order_id: self.order_id.clone(),
            status: self.status,
            tracking: self.tracking.clone(),
            items: self.items.clone(),
            estimated_delivery: self.estimated_delivery.clone(),
        }
    }
}

fn default_orders() -> Vec<DemoOrderConfig> {
    vec![
        DemoOrderConfig {
            token: "12345".into(),
            order_id: "TR-12345".into(),
            status: OrderStatus::Shipped,
            tracking: Some("FX123456789US".into()),
            items: vec![
                "TR120".into(),
                "RS6 Racing Seat".into(),
                "Shifter Mount".into(),
            ],
            estimated_delivery: Some("February 5, 2026".into()),
        },
        DemoOrderConfig {
            token: "67890".into(),
            order_id: "TR-67890".into(),
            status: OrderStatus::Processing,
            tracking: None,
            items: vec!["TR8 Pro".into(), "Triple Monitor Stand".into()],
            estimated_delivery: Some("February 8, 2026".into()),
        },
    ]
}

impl AppConfig {
    /// Load configuration from the default path (~/.pitcrew/config.toml).
    ///
    /// Environment overrides (highest priority):
    /// - `OLLAMA_URL`: preferred tunnel endpoint
    /// - `PITCREW_ENV`: `production` or `development`
    /// - `PITCREW_KNOWLEDGE_DIR`: knowledge root directory
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_path(&Self::config_dir().join("config.toml"))
    }

    /// Load a specific file, then apply process environment overrides.
    pub fn load_path(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production, a map in tests). Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = var(TUNNEL_URL_ENV) {
            self.backend.tunnel_url = Some(url);
        }
        if let Some(env) = var(ENVIRONMENT_ENV) {
            self.environment = env.parse()?;
        }
        if let Some(dir) = var(KNOWLEDGE_DIR_ENV) {
            self.knowledge.root = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".pitcrew")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.backend.temperature) {
            return Err(ConfigError::ValidationError(
                "backend.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "backend.timeout_secs must be > 0".into(),
            ));
        }

        if self.backend.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "backend.model must not be empty".into(),
            ));
        }

        for order in &self.orders {
            let valid = (5..=8).contains(&order.token.len())
                && order.token.bytes().all(|b| b.is_ascii_digit());
            if !valid {
                return Err(ConfigError::ValidationError(format!(
                    "order token '{}' must be 5-8 digits",
                    order.token
                )));
            }
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            gateway: GatewayConfig::default(),
            backend: BackendConfig::default(),
            knowledge: KnowledgeConfig::default(),
            support: SupportConfig::default(),
            orders: default_orders(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.backend.model, "qwen3:8b");
        assert_eq!(config.backend.timeout_secs, 60);
        assert!(config.backend.tunnel_url.is_none());
        assert_eq!(config.orders.len(), 2);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.gateway.port, config.gateway.port);
        assert_eq!(parsed.orders, config.orders);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut config = AppConfig::default();
        config.backend.temperature = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut config = AppConfig::default();
        config.backend.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_order_token_rejected() {
        let mut config = AppConfig::default();
        config.orders[0].token = "TR-12".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().gateway.port, 8787);
    }

    #[test]
    fn partial_file_keeps_defaults_elsewhere() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "environment = \"development\"\n[backend]\nmodel = \"llama3.1:8b\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert!(config.environment.is_development());
        assert_eq!(config.backend.model, "llama3.1:8b");
        assert_eq!(config.backend.lan_url, "http://192.168.50.1:11434");
        assert_eq!(config.orders.len(), 2);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[backend\nmodel = ").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn env_overrides_apply() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (TUNNEL_URL_ENV, "https://gpu.example.trycloudflare.com"),
            (ENVIRONMENT_ENV, "development"),
            (KNOWLEDGE_DIR_ENV, "/srv/knowledge"),
        ]);
        let mut config = AppConfig::default();
        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(
            config.backend.tunnel_url.as_deref(),
            Some("https://gpu.example.trycloudflare.com")
        );
        assert!(config.environment.is_development());
        assert_eq!(config.knowledge.root, PathBuf::from("/srv/knowledge"));
    }

    #[test]
    fn blank_tunnel_url_is_ignored() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(|k| (k == TUNNEL_URL_ENV).then(|| "  ".to_string()))
            .unwrap();
        assert!(config.backend.tunnel_url.is_none());
    }

    #[test]
    fn unknown_environment_rejected() {
        let mut config = AppConfig::default();
        let result = config.apply_overrides(|k| (k == ENVIRONMENT_ENV).then(|| "staging".into()));
        assert!(result.is_err());
    }

    #[test]
    fn demo_order_converts_to_record() {
        let config = AppConfig::default();
        let record = config.orders[0].to_record();
        assert_eq!(record.order_id, "TR-12345");
        assert_eq!(record.status, OrderStatus::Shipped);
        assert_eq!(record.tracking.as_deref(), Some("FX123456789US"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("qwen3:8b"));
        assert!(toml_str.contains("8787"));
        assert!(toml_str.contains("TR-12345"));
    }
}
