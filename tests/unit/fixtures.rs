// Shared image fixtures

use image::{DynamicImage, Frame, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

pub fn encode(img: RgbaImage, format: ImageFormat) -> Vec<u8> {
    let img = if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img).to_rgb8())
    } else {
        DynamicImage::ImageRgba8(img)
    };
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

/// Opaque PNG of the given size
pub fn opaque_png(width: u32, height: u32) -> Vec<u8> {
    encode(
        RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255])),
        ImageFormat::Png,
    )
}

/// PNG whose every pixel is fully transparent
pub fn transparent_png(width: u32, height: u32) -> Vec<u8> {
    encode(
        RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0])),
        ImageFormat::Png,
    )
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(
        RgbaImage::from_pixel(width, height, Rgba([10, 120, 200, 255])),
        ImageFormat::Jpeg,
    )
}

/// Animated GIF with `frames` frames of 100ms each
pub fn animated_gif(width: u32, height: u32, frames: usize) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut encoder = image::codecs::gif::GifEncoder::new(&mut buffer);
        for i in 0..frames {
            let shade = (i * 60 % 256) as u8;
            let frame = Frame::from_parts(
                RgbaImage::from_pixel(width, height, Rgba([shade, 0, 0, 255])),
                0,
                0,
                image::Delay::from_numer_denom_ms(100, 1),
            );
            encoder.encode_frame(frame).unwrap();
        }
    }
    buffer
}
