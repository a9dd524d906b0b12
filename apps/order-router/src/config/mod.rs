//! Configuration module for the order router.
//!
//! Provides configuration loading, validation, and environment variable
//! interpolation for the HTTP server, broker adapters, storage, scheduler,
//! vault and metrics exporter.
//!
//! # Usage
//!
//! ```rust,ignore
//! use order_router::config::{Config, load_config};
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("custom/config.yaml"))?;
//!
//! println!("HTTP port: {}", config.server.http_port);
//! ```

mod brokers;
mod observability;
mod scheduler;
mod server;
mod storage;
mod vault;

use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use brokers::{AngelOneBrokerConfig, BrokersConfig, DhanBrokerConfig};
pub use observability::ObservabilityConfig;
pub use scheduler::SchedulerConfig;
pub use server::ServerConfig;
pub use storage::StorageConfig;
pub use vault::VaultConfig;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "ORDER_ROUTER_CONFIG";

/// Config file used when neither an explicit path nor [`CONFIG_PATH_ENV`] is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure. Every section is optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Broker configuration.
    #[serde(default)]
    pub brokers: BrokersConfig,
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Scheduler configuration.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Credential vault configuration.
    #[serde(default)]
    pub vault: VaultConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Address the HTTP server binds to.
    pub fn http_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.server.bind_address.parse().map_err(|_| {
            ConfigError::ValidationError(format!(
                "server.bind_address is not an IP address: {}",
                self.server.bind_address
            ))
        })?;
        Ok(SocketAddr::new(ip, self.server.http_port))
    }

    /// Address the metrics exporter listens on.
    pub fn metrics_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.observability.metrics_addr.parse().map_err(|_| {
            ConfigError::ValidationError(format!(
                "observability.metrics_addr is not a socket address: {}",
                self.observability.metrics_addr
            ))
        })
    }
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// The path is `path`, else the value of [`CONFIG_PATH_ENV`], else
/// [`DEFAULT_CONFIG_PATH`]. A missing default file yields the default
/// configuration; a missing explicit file is an error.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let explicit = path
        .map(str::to_string)
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().filter(|p| !p.is_empty()));
    let path = explicit.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if explicit.is_none() && e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path, "No config file found, using defaults");
            String::new()
        }
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.to_string(),
                source: e,
            });
        }
    };

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = if interpolated.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml_bw::from_str(&interpolated)?
    };
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map(|m| m.as_str());
        match cap.get(1).map(|m| std::env::var(m.as_str())) {
            Some(Ok(v)) if !v.is_empty() => v,
            _ => default_value.map_or_else(String::new, str::to_string),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.http_port == 0 {
        return Err(ConfigError::ValidationError(
            "server.http_port must be non-zero".to_string(),
        ));
    }
    config.http_addr()?;

    let urls = [
        ("brokers.angelone.base_url", &config.brokers.angelone.base_url),
        ("brokers.dhan.base_url", &config.brokers.dhan.base_url),
    ];
    for (field, url) in urls {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "{field} must be an http(s) URL"
            )));
        }
    }

    let timeouts = [
        ("brokers.angelone.timeout_secs", config.brokers.angelone.timeout_secs),
        ("brokers.dhan.timeout_secs", config.brokers.dhan.timeout_secs),
    ];
    for (field, secs) in timeouts {
        if secs == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{field} must be positive"
            )));
        }
    }

    if config.storage.data_dir.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.data_dir must not be empty".to_string(),
        ));
    }

    if config.scheduler.job_store_path.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "scheduler.job_store_path must not be empty".to_string(),
        ));
    }

    if config.observability.metrics_enabled {
        config.metrics_addr()?;
    }

    Ok(())
}
