//! Key router
//!
//! Classifies a request key into a [`ResourceLocator`] by trying the grammar
//! set in a fixed priority order. The first structural match wins, even if
//! later processing of that resource fails. Sized-image keys are tried first
//! so the looser legacy shapes can never swallow them.

pub mod grammar;

use thiserror::Error;

pub use grammar::{Grammar, LegacyImageGrammar, RawFileGrammar, SizedImageGrammar};

/// Routing failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The key matches none of the grammars
    #[error("Unrecognized key: {key}")]
    Unrecognized { key: String },
}

/// Tenant (shop) identifier with its optional group suffix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant {
    pub id: String,
    pub group: Option<String>,
}

/// What a request key asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceLocator {
    /// An image variant with explicit target dimensions
    SizedImage {
        tenant: Tenant,
        version: u8,
        folder: String,
        width: u32,
        height: u32,
        /// Stored path of the origin image (double extension already split off)
        path: String,
        /// Requested output format, verbatim from the key
        format: String,
    },
    /// An older image request without dimensions; always shrunk to a fixed width
    LegacyUnsizedImage {
        tenant: Tenant,
        version: u8,
        folder: String,
        path: String,
        format: String,
    },
    /// A file copied through without transformation
    RawFile {
        tenant: Tenant,
        file_id: String,
        path: String,
    },
}

impl ResourceLocator {
    /// Key of the canonical source object in the store
    pub fn origin_key(&self) -> String {
        match self {
            ResourceLocator::SizedImage { folder, path, .. }
            | ResourceLocator::LegacyUnsizedImage { folder, path, .. } => {
                format!("catalog/{}/images/{}", folder, path)
            }
            ResourceLocator::RawFile { file_id, path, .. } => {
                format!("files/{}/{}", file_id, path)
            }
        }
    }

    pub fn tenant(&self) -> &Tenant {
        match self {
            ResourceLocator::SizedImage { tenant, .. }
            | ResourceLocator::LegacyUnsizedImage { tenant, .. }
            | ResourceLocator::RawFile { tenant, .. } => tenant,
        }
    }

    /// Pipeline version number, `None` for raw files
    pub fn version(&self) -> Option<u8> {
        match self {
            ResourceLocator::SizedImage { version, .. }
            | ResourceLocator::LegacyUnsizedImage { version, .. } => Some(*version),
            ResourceLocator::RawFile { .. } => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ResourceLocator::SizedImage { .. } => "sized-image",
            ResourceLocator::LegacyUnsizedImage { .. } => "legacy-image",
            ResourceLocator::RawFile { .. } => "raw-file",
        }
    }
}

/// Ordered grammar set
pub struct Router {
    grammars: Vec<Box<dyn Grammar>>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(vec![
            Box::new(SizedImageGrammar),
            Box::new(RawFileGrammar),
            Box::new(LegacyImageGrammar),
        ])
    }
}

impl Router {
    /// Build a router that tries `grammars` in the given order
    pub fn new(grammars: Vec<Box<dyn Grammar>>) -> Self {
        Router { grammars }
    }

    pub fn route(&self, key: &str) -> Result<ResourceLocator, RouteError> {
        for grammar in &self.grammars {
            if let Some(locator) = grammar.parse(key) {
                tracing::debug!(key = %key, grammar = grammar.name(), "Key matched grammar");
                return Ok(locator);
            }
        }

        tracing::debug!(key = %key, "Key matched no grammar");
        Err(RouteError::Unrecognized {
            key: key.to_string(),
        })
    }
}

/// Route `key` with the default grammar set
pub fn route(key: &str) -> Result<ResourceLocator, RouteError> {
    Router::default().route(key)
}
