//! Transform pipeline selector
//!
//! Maps a pipeline version onto a transformation strategy and yields a
//! [`TransformPipeline`]: an immutable, cloneable callable that turns source
//! bytes into an encoded variant. Pipelines hold no shared mutable state and
//! can run concurrently on any number of sources.
//!
//! Versions:
//! - **1** (minimal): decode, resize with the default `cover` fit, re-encode
//!   in the source's own format. No alpha handling, no encoder tuning.
//! - **2/3** (current): one implementation driven by a per-format option
//!   table. Alpha check when `keep_alpha` is requested, progressive PNG,
//!   progressive mozjpeg JPEG on an opaque white background, flatten onto
//!   white unless alpha is kept. Version 3 additionally preserves GIF
//!   animation.

use bytes::Bytes;
use image::{Frame, Rgba};

use crate::constants::FALLBACK_CONTENT_TYPE;
use crate::image_optimizer::encoder::{
    encode_gif_frames, EncodeOptions, EncodedImage, EncoderFactory, EncoderQuality, ImageEncoder,
};
use crate::image_optimizer::processor::{
    apply_plan, decode_gif_frames, decode_image, detect_format, flatten, plan_resize,
    validate_dimensions, WHITE,
};
use crate::image_optimizer::{FitMode, ImageError, OutputFormat, ResizeSpec};

/// Pipeline behaviour selected by the version number in a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineVersion {
    /// Legacy minimal behaviour
    V1,
    /// Current behaviour
    V2,
    /// Current behaviour with animation support
    V3,
}

impl PipelineVersion {
    /// 1 selects the minimal pipeline, 0 and 2 the current one, 3 and above
    /// the current one with the version-3 option table.
    pub fn from_number(version: u8) -> Self {
        match version {
            1 => PipelineVersion::V1,
            0 | 2 => PipelineVersion::V2,
            _ => PipelineVersion::V3,
        }
    }

    /// Legacy unsized keys never run the minimal pipeline: versions below 3
    /// select the current one, 3 and above add animation.
    pub fn for_legacy(version: u8) -> Self {
        if version >= 3 {
            PipelineVersion::V3
        } else {
            PipelineVersion::V2
        }
    }

    pub fn number(self) -> u8 {
        match self {
            PipelineVersion::V1 => 1,
            PipelineVersion::V2 => 2,
            PipelineVersion::V3 => 3,
        }
    }

    pub fn supports_animation(self) -> bool {
        matches!(self, PipelineVersion::V3)
    }
}

/// Encoded variant plus the format the encoder reported
#[derive(Debug, Clone)]
pub struct VariantResult {
    pub data: Bytes,
    pub format: Option<OutputFormat>,
}

impl VariantResult {
    /// Content type to store, `image/jpeg` when no format was reported
    pub fn content_type(&self) -> &'static str {
        self.format
            .map(|f| f.content_type())
            .unwrap_or(FALLBACK_CONTENT_TYPE)
    }
}

impl From<EncodedImage> for VariantResult {
    fn from(encoded: EncodedImage) -> Self {
        VariantResult {
            data: Bytes::from(encoded.data),
            format: Some(encoded.format),
        }
    }
}

/// Encoder switches of the current pipeline
pub fn encode_options_for(format: OutputFormat) -> EncodeOptions {
    match format {
        OutputFormat::Png => EncodeOptions {
            progressive: true,
            mozjpeg: false,
        },
        OutputFormat::Jpeg => EncodeOptions {
            progressive: true,
            mozjpeg: true,
        },
        _ => EncodeOptions::default(),
    }
}

/// Background of the current pipeline.
///
/// White, transparent only when alpha is kept and the source already carries
/// an alpha channel. JPEG is always opaque white.
pub fn background_for(format: OutputFormat, keep_alpha: bool, source_has_alpha: bool) -> Rgba<u8> {
    if format == OutputFormat::Jpeg {
        return WHITE;
    }
    if keep_alpha && source_has_alpha {
        Rgba([255, 255, 255, 0])
    } else {
        WHITE
    }
}

/// A ready-to-run transformation
#[derive(Debug, Clone)]
pub struct TransformPipeline {
    version: PipelineVersion,
    spec: ResizeSpec,
    quality: EncoderQuality,
}

/// Select the pipeline for `version` configured with `spec`
pub fn select_pipeline(version: PipelineVersion, spec: &ResizeSpec) -> TransformPipeline {
    TransformPipeline {
        version,
        spec: spec.clone(),
        quality: EncoderQuality::default(),
    }
}

impl TransformPipeline {
    pub fn version(&self) -> PipelineVersion {
        self.version
    }

    pub fn spec(&self) -> &ResizeSpec {
        &self.spec
    }

    /// Whether the output is flattened onto white before encoding
    pub fn flattens(&self) -> bool {
        self.version != PipelineVersion::V1 && !self.spec.keep_alpha
    }

    /// Run the transform on the blocking pool
    pub async fn apply(&self, source: Bytes) -> Result<VariantResult, ImageError> {
        let pipeline = self.clone();
        tokio::task::spawn_blocking(move || pipeline.run(&source))
            .await
            .map_err(|e| ImageError::TaskFailed {
                message: e.to_string(),
            })?
    }

    /// Run the transform on the current thread
    pub fn run(&self, source: &[u8]) -> Result<VariantResult, ImageError> {
        tracing::debug!(
            version = self.version.number(),
            format = %self.spec.output_format,
            width = self.spec.target_width,
            height = self.spec.target_height,
            keep_alpha = self.spec.keep_alpha,
            animated = self.spec.animated,
            source_bytes = source.len(),
            "Running transform pipeline"
        );

        validate_dimensions(self.spec.target_width, self.spec.target_height)?;

        match self.version {
            PipelineVersion::V1 => self.run_minimal(source),
            PipelineVersion::V2 | PipelineVersion::V3 => self.run_current(source),
        }
    }

    fn run_minimal(&self, source: &[u8]) -> Result<VariantResult, ImageError> {
        let format =
            detect_format(source).ok_or_else(|| ImageError::unsupported_format("unknown"))?;
        let rgba = decode_image(source)?.to_rgba8();

        let plan = plan_resize(
            rgba.dimensions(),
            self.spec.width(),
            self.spec.height(),
            FitMode::Cover,
            self.spec.allow_enlargement,
        );
        let out = apply_plan(&rgba, plan, Rgba([0, 0, 0, 255]))?;

        let (w, h) = out.dimensions();
        EncoderFactory::create(format, EncodeOptions::default())
            .encode(out.as_raw(), w, h, self.quality)
            .map(VariantResult::from)
    }

    fn run_current(&self, source: &[u8]) -> Result<VariantResult, ImageError> {
        let format: OutputFormat = self.spec.output_format.parse()?;
        let options = encode_options_for(format);

        if self.spec.animated
            && format.supports_animation()
            && detect_format(source) == Some(OutputFormat::Gif)
        {
            return self.run_animated(source);
        }

        let img = decode_image(source)?;
        let has_alpha = self.spec.keep_alpha && img.color().has_alpha();
        let background = background_for(format, self.spec.keep_alpha, has_alpha);

        let out = self.place(&img.to_rgba8(), background)?;
        let (w, h) = out.dimensions();
        EncoderFactory::create(format, options)
            .encode(out.as_raw(), w, h, self.quality)
            .map(VariantResult::from)
    }

    fn run_animated(&self, source: &[u8]) -> Result<VariantResult, ImageError> {
        let frames = decode_gif_frames(source)?;
        // GIF frames always decode with an alpha channel
        let background = background_for(OutputFormat::Gif, self.spec.keep_alpha, true);

        let mut resized = Vec::with_capacity(frames.len());
        for frame in frames {
            let delay = frame.delay();
            let out = self.place(frame.buffer(), background)?;
            resized.push(Frame::from_parts(out, 0, 0, delay));
        }

        encode_gif_frames(resized).map(VariantResult::from)
    }

    fn place(
        &self,
        rgba: &image::RgbaImage,
        background: Rgba<u8>,
    ) -> Result<image::RgbaImage, ImageError> {
        let plan = plan_resize(
            rgba.dimensions(),
            self.spec.width(),
            self.spec.height(),
            self.spec.fit,
            self.spec.allow_enlargement,
        );
        let mut out = apply_plan(rgba, plan, background)?;
        if self.flattens() {
            flatten(&mut out, WHITE);
        }
        Ok(out)
    }
}
