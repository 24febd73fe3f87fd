//! Upload event parsing
//!
//! Accepts the S3 event notification shape:
//!
//! ```json
//! {"Records": [{"s3": {"bucket": {"name": "assets"},
//!                      "object": {"key": "catalog/products/images/red+shoe.png"}}}]}
//! ```
//!
//! Object keys arrive URL-encoded with `+` standing for a space.

use serde::Deserialize;

use crate::error::ResizerError;

#[derive(Debug, Clone, Deserialize)]
pub struct UploadEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<EventRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Object {
    pub key: String,
}

/// One uploaded source, key already decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRecord {
    pub bucket: String,
    pub key: String,
}

impl UploadEvent {
    pub fn from_json(json: &str) -> Result<Self, ResizerError> {
        serde_json::from_str(json).map_err(|e| ResizerError::InvalidEvent(e.to_string()))
    }

    pub fn from_slice(json: &[u8]) -> Result<Self, ResizerError> {
        serde_json::from_slice(json).map_err(|e| ResizerError::InvalidEvent(e.to_string()))
    }

    /// Decoded records, in event order
    pub fn upload_records(&self) -> Result<Vec<UploadRecord>, ResizerError> {
        self.records
            .iter()
            .map(|record| {
                Ok(UploadRecord {
                    bucket: record.s3.bucket.name.clone(),
                    key: decode_object_key(&record.s3.object.key)?,
                })
            })
            .collect()
    }
}

/// Decode an event object key: `+` is a space, then percent-decoding
pub fn decode_object_key(raw: &str) -> Result<String, ResizerError> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| ResizerError::InvalidEvent(format!("Invalid object key '{}': {}", raw, e)))
}
