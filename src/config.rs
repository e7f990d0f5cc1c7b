use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use thiserror::Error;
use validator::Validate;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const CONFIG_DIR: &str = "config";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_STATIC_DIR: &str = "dist";

/// TTL cache settings.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CacheSettings {
    /// TTL for memoised search results in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub search_ttl_secs: u64,

    /// Interval in seconds for sweeping expired entries
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            search_ttl_secs: default_cache_ttl_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

/// Thresholds for the alert generation pass.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AlertConfig {
    /// Raise document alerts this many days before expiration
    #[serde(default = "default_document_expiration_days")]
    pub document_expiration_days: i64,

    /// Raise maintenance alerts this many days before the scheduled date
    #[serde(default = "default_maintenance_due_days")]
    pub maintenance_due_days: i64,

    /// Interval in seconds between generation passes
    #[serde(default = "default_generation_interval_secs")]
    pub generation_interval_secs: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            document_expiration_days: default_document_expiration_days(),
            maintenance_due_days: default_maintenance_due_days(),
            generation_interval_secs: default_generation_interval_secs(),
        }
    }
}

/// Application configuration with validation.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port; hosting platforms override it via `PORT`
    #[validate(range(min = 1))]
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Directory holding the persisted collections
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Directory with the static SPA build
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    #[validate]
    #[serde(default)]
    pub cache: CacheSettings,

    #[validate]
    #[serde(default)]
    pub alerts: AlertConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            data_dir: default_data_dir(),
            static_dir: default_static_dir(),
            cache: CacheSettings::default(),
            alerts: AlertConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_data_dir() -> String {
    DEFAULT_DATA_DIR.to_string()
}
fn default_static_dir() -> String {
    DEFAULT_STATIC_DIR.to_string()
}
fn default_cache_ttl_secs() -> u64 {
    300
}
fn default_cleanup_interval_secs() -> u64 {
    300
}
fn default_document_expiration_days() -> i64 {
    30
}
fn default_maintenance_due_days() -> i64 {
    7
}
fn default_generation_interval_secs() -> u64 {
    600
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Loads configuration layering `config/default`, the environment-specific
/// file and `APP__*` environment variables (e.g. `APP__PORT`,
/// `APP__CACHE__SEARCH_TTL_SECS`).
pub fn load_config() -> Result<AppConfig, ConfigLoadError> {
    let run_env = env::var("APP__ENVIRONMENT").unwrap_or_else(|_| DEFAULT_ENV.to_string());

    let mut cfg: AppConfig = Config::builder()
        .add_source(File::with_name(&format!("{CONFIG_DIR}/default")).required(false))
        .add_source(File::with_name(&format!("{CONFIG_DIR}/{run_env}")).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?
        .try_deserialize()?;

    // Hosting platforms hand out the port through the bare PORT variable.
    if let Ok(port) = env::var("PORT") {
        if let Ok(port) = port.parse() {
            cfg.port = port;
        }
    }

    cfg.validate()?;
    Ok(cfg)
}

/// Initialises the tracing subscriber. `RUST_LOG` wins over the configured
/// level when set.
pub fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.port, 8080);
        assert!(cfg.is_development());
    }

    #[test]
    fn alert_defaults_match_product_thresholds() {
        let alerts = AlertConfig::default();
        assert_eq!(alerts.document_expiration_days, 30);
        assert_eq!(alerts.maintenance_due_days, 7);
    }
}
