//! Image encoder abstraction
//!
//! Provides a trait-based encoder system that allows:
//! - Plain encoders for the minimal pipeline
//! - Tuned encoders (progressive PNG, progressive mozjpeg JPEG) for the current pipeline
//! - One default quality across lossy formats

use std::io::Cursor;

use super::error::ImageError;
use super::params::OutputFormat;
use crate::constants::DEFAULT_QUALITY;

/// Quality settings for image encoding
#[derive(Debug, Clone, Copy)]
pub struct EncoderQuality {
    /// Quality value (1-100, where 100 is best quality)
    pub quality: u8,
}

impl Default for EncoderQuality {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
        }
    }
}

/// Format-specific encoder switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Interlaced PNG / progressive JPEG
    pub progressive: bool,
    /// Use the mozjpeg encoder with optimized Huffman coding
    pub mozjpeg: bool,
}

/// Result of encoding an image
#[derive(Debug)]
pub struct EncodedImage {
    /// The encoded image data
    pub data: Vec<u8>,
    /// The output format
    pub format: OutputFormat,
}

impl EncodedImage {
    /// Create a new encoded image result
    pub fn new(data: Vec<u8>, format: OutputFormat) -> Self {
        Self { data, format }
    }
}

/// Trait for image encoders
///
/// Implementations handle encoding raw RGBA pixels to a specific format.
/// The trait is object-safe to allow dynamic dispatch.
pub trait ImageEncoder: Send + Sync {
    /// The output format this encoder produces
    fn format(&self) -> OutputFormat;

    /// Encode raw RGBA image data (4 bytes per pixel) to the target format
    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, ImageError>;
}

/// JPEG encoder: baseline via the image crate, or mozjpeg when tuned
pub struct JpegEncoder {
    pub progressive: bool,
    pub mozjpeg: bool,
}

impl ImageEncoder for JpegEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Jpeg
    }

    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, ImageError> {
        // JPEG has no alpha channel
        let rgb_data = rgba_to_rgb(data);

        let encoded = if self.mozjpeg || self.progressive {
            encode_mozjpeg(&rgb_data, width, height, quality.quality, self.progressive)?
        } else {
            use image::codecs::jpeg::JpegEncoder as ImageJpegEncoder;
            use image::ImageEncoder as _;

            let mut output = Cursor::new(Vec::new());
            ImageJpegEncoder::new_with_quality(&mut output, quality.quality)
                .write_image(&rgb_data, width, height, image::ColorType::Rgb8)
                .map_err(|e| ImageError::encode_failed("jpeg", e.to_string()))?;
            output.into_inner()
        };

        Ok(EncodedImage::new(encoded, OutputFormat::Jpeg))
    }
}

fn encode_mozjpeg(
    rgb: &[u8],
    width: u32,
    height: u32,
    quality: u8,
    progressive: bool,
) -> Result<Vec<u8>, ImageError> {
    // mozjpeg reports libjpeg errors by unwinding
    std::panic::catch_unwind(|| -> std::io::Result<Vec<u8>> {
        let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
        comp.set_size(width as usize, height as usize);
        comp.set_quality(quality as f32);
        if progressive {
            comp.set_progressive_mode();
        }
        comp.set_optimize_coding(true);

        let mut comp = comp.start_compress(Vec::new())?;
        comp.write_scanlines(rgb)?;
        comp.finish()
    })
    .map_err(|_| ImageError::encode_failed("jpeg", "mozjpeg aborted"))?
    .map_err(|e| ImageError::encode_failed("jpeg", e.to_string()))
}

/// PNG encoder; progressive output is Adam7-interlaced
pub struct PngEncoder {
    pub progressive: bool,
}

impl ImageEncoder for PngEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Png
    }

    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        _quality: EncoderQuality,
    ) -> Result<EncodedImage, ImageError> {
        use image::codecs::png::PngEncoder as ImagePngEncoder;
        use image::ImageEncoder as _;

        let mut output = Cursor::new(Vec::new());
        ImagePngEncoder::new(&mut output)
            .write_image(data, width, height, image::ColorType::Rgba8)
            .map_err(|e| ImageError::encode_failed("png", e.to_string()))?;
        let mut encoded = output.into_inner();

        if self.progressive {
            let mut options = oxipng::Options::from_preset(2);
            options.interlace = Some(oxipng::Interlacing::Adam7);
            encoded = oxipng::optimize_from_memory(&encoded, &options)
                .map_err(|e| ImageError::encode_failed("png", e.to_string()))?;
        }

        Ok(EncodedImage::new(encoded, OutputFormat::Png))
    }
}

/// Lossy WebP encoder backed by libwebp
#[derive(Default)]
pub struct WebPEncoder;

impl ImageEncoder for WebPEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::WebP
    }

    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, ImageError> {
        let encoded = webp::Encoder::from_rgba(data, width, height).encode(quality.quality as f32);
        Ok(EncodedImage::new(encoded.to_vec(), OutputFormat::WebP))
    }
}

/// AVIF encoder backed by ravif
pub struct AvifEncoder {
    /// Speed preset (1-10, where 1 is slowest/best quality)
    pub speed: u8,
}

impl Default for AvifEncoder {
    fn default() -> Self {
        Self { speed: 4 }
    }
}

impl ImageEncoder for AvifEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Avif
    }

    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, ImageError> {
        use rgb::FromSlice;

        let pixels = data.as_rgba();
        let img = imgref::Img::new(pixels, width as usize, height as usize);
        let encoded = ravif::Encoder::new()
            .with_quality(quality.quality as f32)
            .with_speed(self.speed)
            .encode_rgba(img)
            .map_err(|e| ImageError::encode_failed("avif", e.to_string()))?;

        Ok(EncodedImage::new(encoded.avif_file, OutputFormat::Avif))
    }
}

/// Single-frame GIF encoder
pub struct GifEncoder;

impl ImageEncoder for GifEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Gif
    }

    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        _quality: EncoderQuality,
    ) -> Result<EncodedImage, ImageError> {
        let mut output = Vec::new();
        {
            let mut encoder = image::codecs::gif::GifEncoder::new(&mut output);
            encoder
                .encode(data, width, height, image::ColorType::Rgba8)
                .map_err(|e| ImageError::encode_failed("gif", e.to_string()))?;
        }
        Ok(EncodedImage::new(output, OutputFormat::Gif))
    }
}

/// Encode an animation, looping forever
pub fn encode_gif_frames(frames: Vec<image::Frame>) -> Result<EncodedImage, ImageError> {
    use image::codecs::gif::{GifEncoder as ImageGifEncoder, Repeat};

    let mut output = Vec::new();
    {
        let mut encoder = ImageGifEncoder::new(&mut output);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| ImageError::encode_failed("gif", e.to_string()))?;
        encoder
            .encode_frames(frames)
            .map_err(|e| ImageError::encode_failed("gif", e.to_string()))?;
    }
    Ok(EncodedImage::new(output, OutputFormat::Gif))
}

/// Factory for creating encoders based on output format
pub struct EncoderFactory;

impl EncoderFactory {
    pub fn create(format: OutputFormat, options: EncodeOptions) -> Box<dyn ImageEncoder> {
        match format {
            OutputFormat::Jpeg => Box::new(JpegEncoder {
                progressive: options.progressive,
                mozjpeg: options.mozjpeg,
            }),
            OutputFormat::Png => Box::new(PngEncoder {
                progressive: options.progressive,
            }),
            OutputFormat::WebP => Box::new(WebPEncoder),
            OutputFormat::Avif => Box::new(AvifEncoder::default()),
            OutputFormat::Gif => Box::new(GifEncoder),
        }
    }
}

/// Convert RGBA to RGB by discarding alpha channel
fn rgba_to_rgb(rgba: &[u8]) -> Vec<u8> {
    let pixel_count = rgba.len() / 4;
    let mut rgb = Vec::with_capacity(pixel_count * 3);

    for chunk in rgba.chunks_exact(4) {
        rgb.extend_from_slice(&chunk[..3]);
    }

    rgb
}
