//! Output formats and fit modes

use std::str::FromStr;

use super::error::ImageError;

/// Output image format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
    Avif,
    Gif,
}

impl OutputFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
            Self::Avif => "image/avif",
            Self::Gif => "image/gif",
        }
    }

    /// Whether the encoder can carry more than one frame
    pub fn supports_animation(&self) -> bool {
        matches!(self, Self::Gif)
    }

    /// Map a detected container format onto an encodable output format
    pub fn from_image_format(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::WebP => Some(Self::WebP),
            image::ImageFormat::Avif => Some(Self::Avif),
            image::ImageFormat::Gif => Some(Self::Gif),
            _ => None,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::WebP),
            "avif" => Ok(OutputFormat::Avif),
            "gif" => Ok(OutputFormat::Gif),
            _ => Err(ImageError::unsupported_format(s)),
        }
    }
}

/// How to fit the image within target dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitMode {
    /// Scale to fill the box, cropping the overflow
    Cover,
    /// Scale to fit within the box, letterboxing with the background
    #[default]
    Contain,
    /// Scale to fit within the box, no letterbox
    Inside,
}
