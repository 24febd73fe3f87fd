// Configuration module

pub mod bulk;
pub mod server;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::DEFAULT_CACHE_MAX_AGE_SECS;
use crate::image_optimizer::OutputFormat;

pub use bulk::{parse_sizes, BulkConfig, BulkSize};
pub use server::ServerConfig;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required but not set")]
    MissingEnv(String),

    #[error("Environment variable '{0}' is referenced but not set")]
    UnresolvedEnv(String),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

fn default_cache_max_age_secs() -> u64 {
    DEFAULT_CACHE_MAX_AGE_SECS
}

/// Resizer configuration, constructed once at startup and shared read-only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Bucket holding both originals and variants
    pub bucket: String,
    /// Public base URL variants are served from
    pub base_url: String,
    #[serde(default)]
    pub debug: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible stores
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(default = "default_cache_max_age_secs")]
    pub cache_max_age_secs: u64,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub bulk: BulkConfig,
}

impl Config {
    /// Minimal configuration with every optional field at its default
    pub fn new(bucket: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            base_url: base_url.into(),
            debug: false,
            region: None,
            endpoint: None,
            access_key: None,
            secret_key: None,
            cache_max_age_secs: default_cache_max_age_secs(),
            server: ServerConfig::default(),
            bulk: BulkConfig::default(),
        }
    }

    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup.
    ///
    /// Reads `BUCKET`, `URL` (both required), `DEBUG`, `AWS_REGION`,
    /// `S3_ENDPOINT`, `BULK_SIZES` and `BULK_FORMAT`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let bucket = non_empty("BUCKET").ok_or_else(|| ConfigError::MissingEnv("BUCKET".into()))?;
        let base_url = non_empty("URL").ok_or_else(|| ConfigError::MissingEnv("URL".into()))?;

        let mut config = Config::new(bucket, base_url);
        config.debug = non_empty("DEBUG").is_some();
        config.region = non_empty("AWS_REGION");
        config.endpoint = non_empty("S3_ENDPOINT");

        if let Some(sizes) = non_empty("BULK_SIZES") {
            config.bulk.sizes = parse_sizes(&sizes).map_err(ConfigError::Invalid)?;
        }
        if let Some(format) = non_empty("BULK_FORMAT") {
            config.bulk.format = format;
        }

        Ok(config)
    }

    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, ConfigError> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        for caps in re.captures_iter(yaml) {
            let var_name = &caps[1];
            if std::env::var(var_name).is_err() {
                return Err(ConfigError::UnresolvedEnv(var_name.to_string()));
            }
        }

        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        });

        serde_yaml::from_str(&substituted).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket.is_empty() {
            return Err(ConfigError::Invalid("Bucket name cannot be empty".into()));
        }
        if self.base_url.is_empty() {
            return Err(ConfigError::Invalid("Base URL cannot be empty".into()));
        }

        let bulk = &self.bulk;
        if bulk.sizes.is_empty() {
            return Err(ConfigError::Invalid("Bulk size catalog cannot be empty".into()));
        }
        if bulk.format.parse::<OutputFormat>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "Unsupported bulk format '{}'",
                bulk.format
            )));
        }
        if bulk.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "Bulk concurrency must be at least 1".into(),
            ));
        }
        for placeholder in ["{width}", "{height}", "{filename}"] {
            if !bulk.key_template.contains(placeholder) {
                return Err(ConfigError::Invalid(format!(
                    "Bulk key template must contain {}",
                    placeholder
                )));
            }
        }

        Ok(())
    }
}
