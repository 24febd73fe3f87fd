//! Image optimization module
//!
//! Provides the primitives the transform pipelines are built from:
//! - Output formats and fit modes
//! - Resize specs derived from routed keys
//! - Decode, geometry planning, resize, letterbox and flatten
//! - Multiple encoder support (JPEG, PNG, WebP, AVIF, GIF)

pub mod encoder;
pub mod error;
pub mod params;
pub mod processor;
pub mod spec;

pub use encoder::{EncodeOptions, EncodedImage, EncoderFactory, EncoderQuality, ImageEncoder};
pub use error::ImageError;
pub use params::{FitMode, OutputFormat};
pub use processor::{plan_resize, ResizePlan};
pub use spec::{build_spec, pipeline_version, ResizeSpec};
