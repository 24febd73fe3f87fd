//! Bulk generation configuration.
//!
//! Size catalog, output format, cache lifetime, fan-out bound and the output
//! key template used when an upload event arrives.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_BULK_CONCURRENCY, DEFAULT_BULK_FOLDER, DEFAULT_BULK_FORMAT, DEFAULT_BULK_KEY_TEMPLATE,
    DEFAULT_BULK_MAX_AGE_SECS, DEFAULT_BULK_SIZES, DEFAULT_BULK_TENANT, DEFAULT_BULK_VERSION,
};

/// One (width, height) pair of the size catalog. A 0 axis is unconstrained.
///
/// Written as `WxH` in YAML and in the `BULK_SIZES` variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BulkSize {
    pub width: u32,
    pub height: u32,
}

impl BulkSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for BulkSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for BulkSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("Invalid size '{}': expected WxH", s))?;
        let width = w
            .trim()
            .parse()
            .map_err(|_| format!("Invalid width in size '{}'", s))?;
        let height = h
            .trim()
            .parse()
            .map_err(|_| format!("Invalid height in size '{}'", s))?;
        Ok(BulkSize { width, height })
    }
}

impl TryFrom<String> for BulkSize {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BulkSize> for String {
    fn from(size: BulkSize) -> Self {
        size.to_string()
    }
}

/// Parse a comma-separated `WxH,WxH,...` list
pub fn parse_sizes(list: &str) -> Result<Vec<BulkSize>, String> {
    list.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(str::parse)
        .collect()
}

pub fn default_sizes() -> Vec<BulkSize> {
    DEFAULT_BULK_SIZES
        .iter()
        .map(|&(w, h)| BulkSize::new(w, h))
        .collect()
}

fn default_format() -> String {
    DEFAULT_BULK_FORMAT.to_string()
}

fn default_max_age_secs() -> u64 {
    DEFAULT_BULK_MAX_AGE_SECS
}

fn default_concurrency() -> usize {
    DEFAULT_BULK_CONCURRENCY
}

fn default_key_template() -> String {
    DEFAULT_BULK_KEY_TEMPLATE.to_string()
}

fn default_tenant() -> String {
    DEFAULT_BULK_TENANT.to_string()
}

fn default_version() -> u8 {
    DEFAULT_BULK_VERSION
}

fn default_folder() -> String {
    DEFAULT_BULK_FOLDER.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkConfig {
    #[serde(default = "default_sizes")]
    pub sizes: Vec<BulkSize>,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
    /// Sizes transformed at once for a single source
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_key_template")]
    pub key_template: String,
    #[serde(default = "default_tenant")]
    pub tenant: String,
    #[serde(default = "default_version")]
    pub version: u8,
    /// Folder written when the uploaded key does not name one
    #[serde(default = "default_folder")]
    pub folder: String,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            sizes: default_sizes(),
            format: default_format(),
            max_age_secs: default_max_age_secs(),
            concurrency: default_concurrency(),
            key_template: default_key_template(),
            tenant: default_tenant(),
            version: default_version(),
            folder: default_folder(),
        }
    }
}
