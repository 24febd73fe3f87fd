//! Image processing primitives
//!
//! Decode, geometry planning, resize, letterbox/crop, flatten.

use fast_image_resize::{FilterType, Image, PixelType, ResizeAlg, Resizer};
use image::io::Reader as ImageReader;
use image::{AnimationDecoder, DynamicImage, Frame, ImageDecoder, Rgba, RgbaImage};
use std::io::Cursor;
use std::num::NonZeroU32;

use crate::constants::{MAX_DIMENSION, MAX_PIXELS};

use super::error::ImageError;
use super::params::{FitMode, OutputFormat};

/// Opaque white
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Reject geometry beyond [`MAX_DIMENSION`] per side or [`MAX_PIXELS`] total
pub fn validate_dimensions(width: u32, height: u32) -> Result<(), ImageError> {
    let pixels = width as u64 * height as u64;
    if width > MAX_DIMENSION || height > MAX_DIMENSION || pixels > MAX_PIXELS {
        return Err(ImageError::dimensions_too_large(width, height));
    }
    Ok(())
}

fn reader(data: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, ImageError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ImageError::decode_failed(e.to_string()))
}

/// Decode image data into a DynamicImage.
///
/// The header is checked against the dimension limits before any pixel
/// buffer is allocated.
pub fn decode_image(data: &[u8]) -> Result<DynamicImage, ImageError> {
    let (width, height) = reader(data)?
        .into_dimensions()
        .map_err(|e| ImageError::decode_failed(e.to_string()))?;
    validate_dimensions(width, height)?;

    reader(data)?
        .decode()
        .map_err(|e| ImageError::decode_failed(e.to_string()))
}

/// Decode every frame of an animated GIF as full-canvas RGBA frames
pub fn decode_gif_frames(data: &[u8]) -> Result<Vec<Frame>, ImageError> {
    let decoder = image::codecs::gif::GifDecoder::new(Cursor::new(data))
        .map_err(|e| ImageError::decode_failed(e.to_string()))?;
    let (width, height) = decoder.dimensions();
    validate_dimensions(width, height)?;

    decoder
        .into_frames()
        .collect_frames()
        .map_err(|e| ImageError::decode_failed(e.to_string()))
}

/// Detect the encodable format of the source data
pub fn detect_format(data: &[u8]) -> Option<OutputFormat> {
    image::guess_format(data)
        .ok()
        .and_then(OutputFormat::from_image_format)
}

/// Geometry of a resize: the image is scaled to `scaled`, then centered on
/// a `canvas`. A larger canvas letterboxes, a smaller one crops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePlan {
    pub scaled: (u32, u32),
    pub canvas: (u32, u32),
}

/// Plan the output geometry.
///
/// `None` dimensions are unconstrained and follow the aspect ratio of the
/// source. With enlargement disallowed the source is never scaled up.
pub fn plan_resize(
    source: (u32, u32),
    width: Option<u32>,
    height: Option<u32>,
    fit: FitMode,
    allow_enlargement: bool,
) -> ResizePlan {
    let (src_w, src_h) = (source.0.max(1) as f64, source.1.max(1) as f64);

    let (scale, canvas) = match (width, height) {
        (None, None) => (1.0, None),
        (Some(w), None) => (w as f64 / src_w, None),
        (None, Some(h)) => (h as f64 / src_h, None),
        (Some(w), Some(h)) => {
            let sx = w as f64 / src_w;
            let sy = h as f64 / src_h;
            match fit {
                FitMode::Cover => (sx.max(sy), Some((w, h))),
                FitMode::Contain => (sx.min(sy), Some((w, h))),
                FitMode::Inside => (sx.min(sy), None),
            }
        }
    };

    let scale = if allow_enlargement { scale } else { scale.min(1.0) };
    let scaled = (
        ((src_w * scale).round() as u32).max(1),
        ((src_h * scale).round() as u32).max(1),
    );

    ResizePlan {
        scaled,
        canvas: canvas.unwrap_or(scaled),
    }
}

impl ResizePlan {
    /// Both the scaled image and the canvas must stay within the limits
    pub fn validate(&self) -> Result<(), ImageError> {
        validate_dimensions(self.scaled.0, self.scaled.1)?;
        validate_dimensions(self.canvas.0, self.canvas.1)
    }
}

/// Resize and place an RGBA image according to `plan`
pub fn apply_plan(
    img: &RgbaImage,
    plan: ResizePlan,
    background: Rgba<u8>,
) -> Result<RgbaImage, ImageError> {
    plan.validate()?;

    let scaled = if img.dimensions() == plan.scaled {
        img.clone()
    } else {
        resize_rgba(img, plan.scaled.0, plan.scaled.1)?
    };

    if plan.canvas == plan.scaled {
        return Ok(scaled);
    }

    let (canvas_w, canvas_h) = plan.canvas;
    let (scaled_w, scaled_h) = plan.scaled;

    if canvas_w >= scaled_w && canvas_h >= scaled_h {
        let mut canvas = RgbaImage::from_pixel(canvas_w, canvas_h, background);
        let x = (canvas_w - scaled_w) / 2;
        let y = (canvas_h - scaled_h) / 2;
        image::imageops::replace(&mut canvas, &scaled, x as i64, y as i64);
        Ok(canvas)
    } else {
        let x = scaled_w.saturating_sub(canvas_w) / 2;
        let y = scaled_h.saturating_sub(canvas_h) / 2;
        Ok(image::imageops::crop_imm(
            &scaled,
            x,
            y,
            canvas_w.min(scaled_w),
            canvas_h.min(scaled_h),
        )
        .to_image())
    }
}

/// Resize using fast-image-resize with Lanczos3 filter.
///
/// Always a full convolution; there is no shrink-on-load shortcut.
pub fn resize_rgba(img: &RgbaImage, target_w: u32, target_h: u32) -> Result<RgbaImage, ImageError> {
    let (src_w, src_h) = img.dimensions();

    let src_width =
        NonZeroU32::new(src_w).ok_or_else(|| ImageError::resize_failed("Source width is 0"))?;
    let src_height =
        NonZeroU32::new(src_h).ok_or_else(|| ImageError::resize_failed("Source height is 0"))?;
    let dst_width =
        NonZeroU32::new(target_w).ok_or_else(|| ImageError::resize_failed("Target width is 0"))?;
    let dst_height =
        NonZeroU32::new(target_h).ok_or_else(|| ImageError::resize_failed("Target height is 0"))?;

    let src_image = Image::from_vec_u8(src_width, src_height, img.as_raw().clone(), PixelType::U8x4)
        .map_err(|e| ImageError::resize_failed(format!("Failed to create source image: {:?}", e)))?;

    let mut dst_image = Image::new(dst_width, dst_height, PixelType::U8x4);

    let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::Lanczos3));
    resizer
        .resize(&src_image.view(), &mut dst_image.view_mut())
        .map_err(|e| ImageError::resize_failed(format!("Resize operation failed: {:?}", e)))?;

    RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| ImageError::resize_failed("Failed to create output image buffer"))
}

/// Composite the image onto an opaque background, leaving no transparency
pub fn flatten(img: &mut RgbaImage, background: Rgba<u8>) {
    for pixel in img.pixels_mut() {
        let alpha = pixel[3] as u32;
        for c in 0..3 {
            let fg = pixel[c] as u32;
            let bg = background[c] as u32;
            pixel[c] = ((fg * alpha + bg * (255 - alpha) + 127) / 255) as u8;
        }
        pixel[3] = 255;
    }
}
