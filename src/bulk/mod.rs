//! Bulk variant generator
//!
//! On an upload event every record's source is fetched once and rendered into
//! the whole size catalog. Records run concurrently with each other; the
//! sizes of one record run on a bounded task group sharing the source buffer.
//!
//! Failure handling is fail-fast: once a size fails no further sizes of that
//! record are started, sizes already running finish, and the invocation
//! reports the first error.

pub mod event;
pub mod template;

use bytes::Bytes;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

use crate::config::{BulkSize, Config};
use crate::error::ResizerError;
use crate::image_optimizer::{ImageError, ResizeSpec};
use crate::materializer::{fetch_origin, write_variant};
use crate::pipeline::{select_pipeline, PipelineVersion};
use crate::store::{BlobStore, StoredVariant};

pub use event::{decode_object_key, UploadEvent, UploadRecord};
pub use template::{filename_of, folder_of, KeyParts, KeyTemplate};

/// Outcome of a successful invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BulkReport {
    pub records: usize,
    pub variants: usize,
}

pub struct BulkGenerator {
    store: Arc<dyn BlobStore>,
    config: Arc<Config>,
    template: KeyTemplate,
}

impl BulkGenerator {
    pub fn new(store: Arc<dyn BlobStore>, config: Arc<Config>) -> Self {
        let template = KeyTemplate::new(config.bulk.key_template.clone());
        Self {
            store,
            config,
            template,
        }
    }

    /// Render the size catalog for every record of `event`
    pub async fn on_upload(&self, event: &UploadEvent) -> Result<BulkReport, ResizerError> {
        let start = Instant::now();
        let records = event.upload_records()?;
        for record in &records {
            self.check_bucket(record)?;
        }

        let results =
            futures::future::join_all(records.iter().map(|record| self.process_record(record)))
                .await;

        let mut report = BulkReport {
            records: records.len(),
            variants: 0,
        };
        for result in results {
            report.variants += result?;
        }

        tracing::info!(
            records = report.records,
            variants = report.variants,
            duration_ms = start.elapsed().as_millis() as u64,
            "Upload event processed"
        );

        Ok(report)
    }

    /// Output key of one size for an uploaded source
    pub fn output_key(&self, source_key: &str, size: BulkSize) -> String {
        let bulk = &self.config.bulk;
        self.template.render(&KeyParts {
            tenant: &bulk.tenant,
            version: bulk.version,
            folder: folder_of(source_key).unwrap_or(&bulk.folder),
            size,
            filename: filename_of(source_key),
            format: &bulk.format,
        })
    }

    /// Records must name the configured bucket; sources are read from and
    /// variants written to that bucket only.
    fn check_bucket(&self, record: &UploadRecord) -> Result<(), ResizerError> {
        if record.bucket != self.config.bucket {
            tracing::warn!(
                bucket = %record.bucket,
                expected = %self.config.bucket,
                key = %record.key,
                "Upload record names another bucket"
            );
            return Err(ResizerError::InvalidEvent(format!(
                "record bucket {} does not match configured bucket {}",
                record.bucket, self.config.bucket
            )));
        }
        Ok(())
    }

    /// Fetch one source and render every configured size. Returns the number
    /// of variants written.
    pub async fn process_record(&self, record: &UploadRecord) -> Result<usize, ResizerError> {
        self.check_bucket(record)?;
        tracing::debug!(bucket = %record.bucket, key = %record.key, "Processing upload");

        let source = fetch_origin(self.store.as_ref(), &record.key).await?;
        let bulk = &self.config.bulk;
        let version = PipelineVersion::from_number(bulk.version);
        let limit = bulk.concurrency.max(1);

        let mut sizes = bulk.sizes.iter().copied();
        let mut tasks = JoinSet::new();
        let mut first_error: Option<ResizerError> = None;
        let mut written = 0;

        loop {
            while first_error.is_none() && tasks.len() < limit {
                let Some(size) = sizes.next() else { break };
                let spec = ResizeSpec::sized(version, size.width, size.height, &bulk.format, false);
                tasks.spawn(render_variant(
                    Arc::clone(&self.store),
                    source.clone(),
                    self.output_key(&record.key, size),
                    version,
                    spec,
                    bulk.max_age_secs,
                ));
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };
            match joined {
                Ok(Ok(())) => written += 1,
                Ok(Err(err)) => {
                    first_error.get_or_insert(err);
                }
                Err(join_err) => {
                    first_error.get_or_insert(ResizerError::Transform(ImageError::TaskFailed {
                        message: join_err.to_string(),
                    }));
                }
            }
        }

        match first_error {
            Some(err) => {
                tracing::error!(key = %record.key, written, error = %err, "Bulk generation failed");
                Err(err)
            }
            None => {
                tracing::debug!(key = %record.key, written, "Bulk generation complete");
                Ok(written)
            }
        }
    }
}

async fn render_variant(
    store: Arc<dyn BlobStore>,
    source: Bytes,
    key: String,
    version: PipelineVersion,
    spec: ResizeSpec,
    max_age_secs: u64,
) -> Result<(), ResizerError> {
    let result = select_pipeline(version, &spec).apply(source).await?;
    let content_type = result.content_type();
    write_variant(
        store.as_ref(),
        StoredVariant::new(key, result.data, content_type, max_age_secs),
    )
    .await
}
