//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Leave request validation rules.
    #[serde(default)]
    pub leave: LeaveConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT settings as read from configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for verifying tokens.
    pub secret: String,
    /// Clock skew tolerated on token expiry, in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_secs: u64,
    /// Expected token issuer; unset accepts any.
    #[serde(default)]
    pub issuer: Option<String>,
}

fn default_leeway() -> u64 {
    30
}

/// Validation limits applied to leave submissions.
#[derive(Debug, Clone, Deserialize)]
pub struct LeaveConfig {
    /// Minimum reason length in characters (after trimming).
    #[serde(default = "default_min_reason_len")]
    pub min_reason_len: usize,
    /// Maximum reason length in characters.
    #[serde(default = "default_max_reason_len")]
    pub max_reason_len: usize,
    /// Maximum number of attachments on one request.
    #[serde(default = "default_max_attachments")]
    pub max_attachments: usize,
    /// Maximum size of a single attachment in bytes.
    #[serde(default = "default_max_attachment_bytes")]
    pub max_attachment_bytes: u64,
}

impl Default for LeaveConfig {
    fn default() -> Self {
        Self {
            min_reason_len: default_min_reason_len(),
            max_reason_len: default_max_reason_len(),
            max_attachments: default_max_attachments(),
            max_attachment_bytes: default_max_attachment_bytes(),
        }
    }
}

fn default_min_reason_len() -> usize {
    10
}

fn default_max_reason_len() -> usize {
    1000
}

fn default_max_attachments() -> usize {
    5
}

fn default_max_attachment_bytes() -> u64 {
    5 * 1024 * 1024
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("HRM").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
