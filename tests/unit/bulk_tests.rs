// Bulk variant generator unit tests

use async_trait::async_trait;
use bytes::Bytes;
use catalog_resizer::bulk::{BulkGenerator, UploadEvent};
use catalog_resizer::config::{BulkSize, Config};
use catalog_resizer::error::ResizerError;
use catalog_resizer::store::{BlobStore, MemoryBlobStore, StoreError, StoredVariant};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::fixtures::opaque_png;

fn config(sizes: &[(u32, u32)], format: &str) -> Arc<Config> {
    let mut config = Config::new("assets", "https://cdn.example.com/");
    config.bulk.sizes = sizes.iter().map(|&(w, h)| BulkSize::new(w, h)).collect();
    config.bulk.format = format.to_string();
    Arc::new(config)
}

fn event(keys: &[&str]) -> UploadEvent {
    let records: Vec<String> = keys
        .iter()
        .map(|k| {
            format!(
                r#"{{"s3":{{"bucket":{{"name":"assets"}},"object":{{"key":"{}"}}}}}}"#,
                k
            )
        })
        .collect();
    UploadEvent::from_json(&format!(r#"{{"Records":[{}]}}"#, records.join(","))).unwrap()
}

/// Store whose writes always fail
#[derive(Default)]
struct ReadOnlyStore {
    inner: MemoryBlobStore,
    put_attempts: AtomicUsize,
}

#[async_trait]
impl BlobStore for ReadOnlyStore {
    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        self.inner.get(key).await
    }

    async fn put(&self, variant: StoredVariant) -> Result<(), StoreError> {
        self.put_attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Backend {
            key: variant.key,
            message: "access denied".to_string(),
        })
    }
}

// Test: one record yields one write per size from a single read
#[tokio::test]
async fn test_one_read_many_writes() {
    let store = Arc::new(MemoryBlobStore::new());
    store.insert("catalog/products/images/shoe.png", opaque_png(120, 80));
    let generator = BulkGenerator::new(
        store.clone() as Arc<dyn BlobStore>,
        config(&[(0, 0), (50, 50), (60, 0)], "png"),
    );

    let report = generator
        .on_upload(&event(&["catalog/products/images/shoe.png"]))
        .await
        .unwrap();

    assert_eq!(report.records, 1);
    assert_eq!(report.variants, 3);
    assert_eq!(store.read_count(), 1);
    assert_eq!(store.write_count(), 3);

    let keys = store.keys();
    assert!(keys.contains(&"1/3/images/products/0/0/shoe.png.png".to_string()));
    assert!(keys.contains(&"1/3/images/products/50/50/shoe.png.png".to_string()));
    assert!(keys.contains(&"1/3/images/products/60/0/shoe.png.png".to_string()));

    let stored = store.object("1/3/images/products/60/0/shoe.png.png").unwrap();
    assert_eq!(stored.cache_control, "max-age=31536000");
    let img = image::load_from_memory(&stored.data).unwrap();
    assert_eq!((img.width(), img.height()), (60, 40));
}

// Test: default format is avif
#[tokio::test]
async fn test_default_format_is_avif() {
    let store = Arc::new(MemoryBlobStore::new());
    store.insert("catalog/blocks/images/hero.png", opaque_png(16, 16));
    let mut config = Config::new("assets", "https://cdn.example.com/");
    config.bulk.sizes = vec![BulkSize::new(8, 8)];
    let generator = BulkGenerator::new(store.clone() as Arc<dyn BlobStore>, Arc::new(config));

    generator
        .on_upload(&event(&["catalog/blocks/images/hero.png"]))
        .await
        .unwrap();

    let stored = store.object("1/3/images/blocks/8/8/hero.png.avif").unwrap();
    assert_eq!(stored.content_type, "image/avif");
}

// Test: every record of an event is processed
#[tokio::test]
async fn test_multiple_records() {
    let store = Arc::new(MemoryBlobStore::new());
    store.insert("catalog/products/images/a.png", opaque_png(20, 20));
    store.insert("uploads/b c.png", opaque_png(20, 20));
    let generator = BulkGenerator::new(
        store.clone() as Arc<dyn BlobStore>,
        config(&[(10, 10), (5, 0)], "png"),
    );

    let report = generator
        .on_upload(&event(&["catalog/products/images/a.png", "uploads/b+c.png"]))
        .await
        .unwrap();

    assert_eq!(report.records, 2);
    assert_eq!(report.variants, 4);
    assert_eq!(store.read_count(), 2);
    // Key decoded, folder falls back to the configured one
    assert!(store
        .object("1/3/images/products/10/10/b c.png.png")
        .is_some());
}

// Test: a missing source fails the invocation without writes
#[tokio::test]
async fn test_missing_source_fails() {
    let store = Arc::new(MemoryBlobStore::new());
    let generator = BulkGenerator::new(
        store.clone() as Arc<dyn BlobStore>,
        config(&[(10, 10)], "png"),
    );

    let err = generator
        .on_upload(&event(&["catalog/products/images/ghost.png"]))
        .await
        .unwrap_err();

    assert!(matches!(err, ResizerError::OriginFetch { .. }));
    assert_eq!(store.write_count(), 0);
}

// Test: after the first failure no further sizes start
#[tokio::test]
async fn test_fail_fast_stops_new_sizes() {
    let store = Arc::new(ReadOnlyStore::default());
    store
        .inner
        .insert("catalog/products/images/a.png", opaque_png(20, 20));
    let mut config = Config::new("assets", "https://cdn.example.com/");
    config.bulk.sizes = vec![
        BulkSize::new(10, 10),
        BulkSize::new(8, 8),
        BulkSize::new(6, 6),
        BulkSize::new(4, 4),
    ];
    config.bulk.format = "png".into();
    config.bulk.concurrency = 1;
    let generator = BulkGenerator::new(store.clone() as Arc<dyn BlobStore>, Arc::new(config));

    let err = generator
        .on_upload(&event(&["catalog/products/images/a.png"]))
        .await
        .unwrap_err();

    assert!(matches!(err, ResizerError::StoreWrite { .. }));
    assert_eq!(err.to_http_status(), 500);
    assert_eq!(store.put_attempts.load(Ordering::SeqCst), 1);
}

// Test: an undecodable source fails with a transform error
#[tokio::test]
async fn test_undecodable_source_fails() {
    let store = Arc::new(MemoryBlobStore::new());
    store.insert("catalog/products/images/a.png", b"garbage".to_vec());
    let generator = BulkGenerator::new(
        store.clone() as Arc<dyn BlobStore>,
        config(&[(10, 10), (20, 20)], "png"),
    );

    let err = generator
        .on_upload(&event(&["catalog/products/images/a.png"]))
        .await
        .unwrap_err();

    assert!(matches!(err, ResizerError::Transform(_)));
    assert_eq!(store.write_count(), 0);
}

// Test: a record naming another bucket rejects the whole event before any read or write
#[tokio::test]
async fn test_foreign_bucket_is_rejected() {
    let store = Arc::new(MemoryBlobStore::new());
    store.insert("catalog/products/images/a.png", opaque_png(20, 20));
    let generator = BulkGenerator::new(
        store.clone() as Arc<dyn BlobStore>,
        config(&[(10, 10)], "png"),
    );
    let event = UploadEvent::from_json(
        r#"{"Records":[
            {"s3":{"bucket":{"name":"assets"},"object":{"key":"catalog/products/images/a.png"}}},
            {"s3":{"bucket":{"name":"other-bucket"},"object":{"key":"catalog/products/images/a.png"}}}
        ]}"#,
    )
    .unwrap();

    let err = generator.on_upload(&event).await.unwrap_err();

    assert!(matches!(err, ResizerError::InvalidEvent(_)));
    assert_eq!(err.to_http_status(), 400);
    assert_eq!(store.read_count(), 0);
    assert_eq!(store.write_count(), 0);
}
