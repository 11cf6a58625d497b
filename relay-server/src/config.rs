use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Environment variable holding a single EA API key
pub const ENV_EA_API_KEY: &str = "EA_API_KEY";

/// Environment variable holding comma-separated EA API keys
pub const ENV_EA_API_KEYS: &str = "EA_API_KEYS";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub tls: TlsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Static EA API key allow-list
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Single key
    #[serde(default)]
    pub api_key: Option<String>,
    /// Comma-separated keys, merged with `api_key`
    #[serde(default)]
    pub api_keys: Option<String>,
}

impl AuthConfig {
    /// All configured keys, trimmed, without blanks
    pub fn valid_keys(&self) -> BTreeSet<String> {
        let mut keys = BTreeSet::new();

        if let Some(key) = self.api_key.as_deref().map(str::trim) {
            if !key.is_empty() {
                keys.insert(key.to_string());
            }
        }

        if let Some(list) = &self.api_keys {
            keys.extend(
                list.split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string),
            );
        }

        keys
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Trade results retained in memory; the oldest are evicted beyond this
    #[serde(default = "default_trade_result_capacity")]
    pub trade_result_capacity: usize,
    /// Results returned by `/trade_results` when no `limit` is given
    #[serde(default = "default_results_limit")]
    pub default_results_limit: usize,
    /// An EA without heartbeat for this long is marked Timeout
    #[serde(default = "default_heartbeat_timeout")]
    pub heartbeat_timeout_seconds: i64,
    /// Interval of the heartbeat timeout monitor
    #[serde(default = "default_monitor_interval")]
    pub monitor_interval_seconds: u64,
}

fn default_trade_result_capacity() -> usize {
    1000
}
fn default_results_limit() -> usize {
    100
}
fn default_heartbeat_timeout() -> i64 {
    60
}
fn default_monitor_interval() -> u64 {
    10
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            trade_result_capacity: default_trade_result_capacity(),
            default_results_limit: default_results_limit(),
            heartbeat_timeout_seconds: default_heartbeat_timeout(),
            monitor_interval_seconds: default_monitor_interval(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdminConfig {
    /// Expose `POST /admin/reset` (clears registry, queue and results)
    #[serde(default)]
    pub enable_reset: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CorsConfig {
    /// Disable CORS restrictions (allows all origins) - use only in development!
    #[serde(default)]
    pub disable: bool,
    #[serde(default)]
    pub additional_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable file logging
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,
    /// Directory for log files (relative to executable or absolute path)
    #[serde(default = "default_log_directory")]
    pub directory: String,
    /// Prefix for log file names
    #[serde(default = "default_log_file_prefix")]
    pub file_prefix: String,
    /// Rotation strategy: "daily", "hourly", or "never"
    #[serde(default = "default_log_rotation")]
    pub rotation: String,
    /// Maximum number of log files to keep (0 = unlimited)
    #[serde(default = "default_max_files")]
    pub max_files: u32,
    /// Maximum age of log files in days (0 = unlimited)
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u32,
    /// Entries kept in memory for `/logs`
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
}

fn default_logging_enabled() -> bool {
    true
}
fn default_log_directory() -> String {
    "logs".to_string()
}
fn default_log_file_prefix() -> String {
    "ea-signal-bridge".to_string()
}
fn default_log_rotation() -> String {
    "daily".to_string()
}
fn default_max_files() -> u32 {
    30
}
fn default_max_age_days() -> u32 {
    90
}
fn default_buffer_capacity() -> usize {
    crate::log_buffer::DEFAULT_LOG_CAPACITY
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            directory: default_log_directory(),
            file_prefix: default_log_file_prefix(),
            rotation: default_log_rotation(),
            max_files: default_max_files(),
            max_age_days: default_max_age_days(),
            buffer_capacity: default_buffer_capacity(),
        }
    }
}

/// TLS configuration for the optional HTTPS listener
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Path to certificate file (.pem)
    #[serde(default = "default_cert_path")]
    pub cert_path: String,
    /// Path to private key file (.pem)
    #[serde(default = "default_key_path")]
    pub key_path: String,
    /// Validity of a generated self-signed certificate
    #[serde(default = "default_cert_validity_days")]
    pub validity_days: u32,
}

fn default_cert_path() -> String {
    "certs/server.pem".to_string()
}

fn default_key_path() -> String {
    "certs/server-key.pem".to_string()
}

fn default_cert_validity_days() -> u32 {
    3650 // 10 years
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cert_path: default_cert_path(),
            key_path: default_key_path(),
            validity_days: default_cert_validity_days(),
        }
    }
}

impl Config {
    /// Load config from layered TOML files
    ///
    /// Loads configuration in the following order (later sources override earlier):
    /// 1. {base_name}.toml (required, e.g., config.toml)
    /// 2. {base_name}.{ENV}.toml (optional, only if CONFIG_ENV is set)
    /// 3. {base_name}.local.toml (optional, for personal overrides, git-ignored)
    /// 4. `BRIDGE__SECTION__KEY` environment variables (e.g. `BRIDGE__SERVER__PORT`)
    /// 5. `EA_API_KEY` / `EA_API_KEYS`
    pub fn from_file<P: AsRef<Path>>(base_name: P) -> Result<Self> {
        let base_path = base_name.as_ref();
        let base_str = base_path.to_str().context("Invalid base path")?;

        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(base_str));

        if let Ok(env) = std::env::var("CONFIG_ENV") {
            let env_config = format!("{}.{}", base_str, env);
            builder = builder.add_source(config::File::with_name(&env_config).required(false));
        }

        let local_config = format!("{}.local", base_str);
        builder = builder
            .add_source(config::File::with_name(&local_config).required(false))
            .add_source(environment_source());

        Self::finish(builder)
    }

    /// Defaults plus environment layers only, for deployments without `config.toml`
    pub fn from_env() -> Result<Self> {
        Self::finish(config::Config::builder().add_source(environment_source()))
    }

    fn finish(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let config = builder.build().context("Failed to build configuration")?;

        let mut config: Config = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `EA_API_KEY` / `EA_API_KEYS` on top of file configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(ENV_EA_API_KEY) {
            self.auth.api_key = Some(key);
        }
        if let Ok(keys) = std::env::var(ENV_EA_API_KEYS) {
            self.auth.api_keys = Some(keys);
        }
    }

    /// Get server bind address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Get all allowed CORS origins
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins = vec![
            format!("http://localhost:{}", self.server.port),
            format!("http://127.0.0.1:{}", self.server.port),
        ];

        origins.extend(self.cors.additional_origins.clone());

        origins
    }
}

/// `BRIDGE__SECTION__KEY` variables, e.g. `BRIDGE__SERVER__PORT`
fn environment_source() -> config::Environment {
    config::Environment::with_prefix("BRIDGE")
        .prefix_separator("__")
        .separator("__")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            bridge: BridgeConfig::default(),
            admin: AdminConfig::default(),
            cors: CorsConfig::default(),
            logging: LoggingConfig::default(),
            tls: TlsConfig::default(),
        }
    }
}
