//! Variant materializer
//!
//! Serves a single request: route the key, fetch the origin, transform it,
//! write the variant back under the requested key and redirect the client to
//! its public URL. Writes are unconditional; an existing variant is simply
//! overwritten. Nothing is retried.

use bytes::Bytes;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::constants::{OCTET_STREAM, REDIRECT_CACHE_CONTROL};
use crate::error::ResizerError;
use crate::image_optimizer::{build_spec, pipeline_version};
use crate::pipeline::select_pipeline;
use crate::router::{ResourceLocator, Router};
use crate::store::{BlobStore, StoredVariant};

/// Permanent redirect to the stored variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectResponse {
    pub status: u16,
    pub location: String,
    pub cache_control: &'static str,
}

impl RedirectResponse {
    pub fn moved_permanently(location: String) -> Self {
        Self {
            status: 301,
            location,
            cache_control: REDIRECT_CACHE_CONTROL,
        }
    }
}

/// Public URL of a stored key
pub fn public_location(base_url: &str, key: &str) -> String {
    format!("{}{}", base_url, key.trim_start_matches('/'))
}

/// Read an origin, logging the key on failure
pub(crate) async fn fetch_origin(
    store: &dyn BlobStore,
    origin_key: &str,
) -> Result<Bytes, ResizerError> {
    store.get(origin_key).await.map_err(|source| {
        tracing::error!(origin_key = %origin_key, error = %source, "Origin fetch failed");
        ResizerError::OriginFetch {
            origin_key: origin_key.to_string(),
            source,
        }
    })
}

pub(crate) async fn write_variant(
    store: &dyn BlobStore,
    variant: StoredVariant,
) -> Result<(), ResizerError> {
    let key = variant.key.clone();
    store.put(variant).await.map_err(|source| {
        tracing::error!(key = %key, error = %source, "Variant write failed");
        ResizerError::StoreWrite { key, source }
    })
}

pub struct Materializer {
    store: Arc<dyn BlobStore>,
    config: Arc<Config>,
    router: Router,
}

impl Materializer {
    pub fn new(store: Arc<dyn BlobStore>, config: Arc<Config>) -> Self {
        Self {
            store,
            config,
            router: Router::default(),
        }
    }

    pub async fn materialize(
        &self,
        key: &str,
        keep_alpha: bool,
    ) -> Result<RedirectResponse, ResizerError> {
        let start = Instant::now();
        let locator = self.router.route(key)?;
        let origin_key = locator.origin_key();

        tracing::debug!(
            key = %key,
            origin_key = %origin_key,
            kind = locator.kind(),
            keep_alpha,
            "Materializing variant"
        );

        let source = fetch_origin(self.store.as_ref(), &origin_key).await?;
        let variant = self.transform(key, &locator, source, keep_alpha).await?;
        write_variant(self.store.as_ref(), variant).await?;

        tracing::info!(
            key = %key,
            origin_key = %origin_key,
            kind = locator.kind(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Variant stored"
        );

        Ok(RedirectResponse::moved_permanently(public_location(
            &self.config.base_url,
            key,
        )))
    }

    async fn transform(
        &self,
        key: &str,
        locator: &ResourceLocator,
        source: Bytes,
        keep_alpha: bool,
    ) -> Result<StoredVariant, ResizerError> {
        let max_age = self.config.cache_max_age_secs;

        let planned = build_spec(locator, keep_alpha).zip(pipeline_version(locator));
        let (spec, version) = match planned {
            Some(planned) => planned,
            None => return Ok(StoredVariant::new(key, source, OCTET_STREAM, max_age)),
        };

        let result = select_pipeline(version, &spec).apply(source).await?;
        let content_type = result.content_type();

        tracing::debug!(
            key = %key,
            version = version.number(),
            width = spec.target_width,
            height = spec.target_height,
            content_type,
            bytes = result.data.len(),
            "Variant transformed"
        );

        Ok(StoredVariant::new(key, result.data, content_type, max_age))
    }
}
