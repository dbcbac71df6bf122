use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Artifact file locations
    pub artifacts: ArtifactConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: MP_)
            .add_source(
                config::Environment::with_prefix("MP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                http_port: default_http_port(),
                request_timeout_secs: default_request_timeout(),
            },
            artifacts: ArtifactConfig::default(),
            observability: ObservabilityConfig {
                log_level: default_log_level(),
                json_logs: false,
                service_name: default_service_name(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// Serialized classifier, required at startup
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Serialized feature scaler, required at startup
    #[serde(default = "default_scaler_path")]
    pub scaler_path: PathBuf,

    /// Optional per-feature means for form defaults, re-read per request
    #[serde(default = "default_means_path")]
    pub means_path: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            scaler_path: default_scaler_path(),
            means_path: default_means_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Service name
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_model_path() -> PathBuf {
    "artifacts/models/model.bin".into()
}

fn default_scaler_path() -> PathBuf {
    "artifacts/processed/scaler.bin".into()
}

fn default_means_path() -> PathBuf {
    "artifacts/processed/feature_means.json".into()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "maintenance-predictor".to_string()
}
