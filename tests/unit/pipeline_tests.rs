// Transform pipeline unit tests

use bytes::Bytes;
use catalog_resizer::image_optimizer::{ImageError, OutputFormat, ResizeSpec};
use catalog_resizer::pipeline::{select_pipeline, PipelineVersion};
use image::AnimationDecoder;
use std::io::Cursor;

use super::fixtures::{animated_gif, jpeg, opaque_png, transparent_png};

fn decode_rgba(data: &[u8]) -> image::RgbaImage {
    image::load_from_memory(data).unwrap().to_rgba8()
}

// Test: keepAlpha with a transparent source keeps transparency
#[tokio::test]
async fn test_keep_alpha_preserves_transparency() {
    let spec = ResizeSpec::sized(PipelineVersion::V2, 20, 10, "png", true);
    let result = select_pipeline(PipelineVersion::V2, &spec)
        .apply(Bytes::from(transparent_png(40, 40)))
        .await
        .unwrap();

    let out = decode_rgba(&result.data);
    assert_eq!(out.dimensions(), (20, 10));
    assert!(out.pixels().any(|p| p[3] < 255));
}

// Test: without keepAlpha every pixel is opaque
#[tokio::test]
async fn test_flatten_removes_alpha() {
    let spec = ResizeSpec::sized(PipelineVersion::V2, 20, 10, "png", false);
    let result = select_pipeline(PipelineVersion::V2, &spec)
        .apply(Bytes::from(transparent_png(40, 40)))
        .await
        .unwrap();

    let out = decode_rgba(&result.data);
    assert!(out.pixels().all(|p| p[3] == 255));
    // Transparent pixels flatten to white
    assert_eq!(out.get_pixel(10, 5).0, [255, 255, 255, 255]);
}

// Test: keepAlpha on an opaque source letterboxes with opaque white
#[tokio::test]
async fn test_keep_alpha_opaque_source_uses_white_letterbox() {
    let spec = ResizeSpec::sized(PipelineVersion::V3, 30, 30, "png", true);
    let result = select_pipeline(PipelineVersion::V3, &spec)
        .apply(Bytes::from(jpeg(60, 30)))
        .await
        .unwrap();

    let out = decode_rgba(&result.data);
    assert_eq!(out.dimensions(), (30, 30));
    assert_eq!(out.get_pixel(0, 0).0, [255, 255, 255, 255]);
}

// Test: a zero axis follows the source aspect ratio
#[tokio::test]
async fn test_zero_width_is_proportional() {
    let spec = ResizeSpec::sized(PipelineVersion::V2, 0, 300, "png", false);
    let result = select_pipeline(PipelineVersion::V2, &spec)
        .apply(Bytes::from(opaque_png(400, 200)))
        .await
        .unwrap();

    let out = decode_rgba(&result.data);
    assert_eq!(out.dimensions(), (600, 300));
}

// Test: legacy spec never enlarges
#[tokio::test]
async fn test_legacy_spec_does_not_enlarge() {
    let spec = ResizeSpec::legacy(PipelineVersion::V2, "webp", false);
    let result = select_pipeline(PipelineVersion::V2, &spec)
        .apply(Bytes::from(opaque_png(300, 150)))
        .await
        .unwrap();

    assert_eq!(result.format, Some(OutputFormat::WebP));
    assert_eq!(result.content_type(), "image/webp");
    let out = decode_rgba(&result.data);
    assert_eq!(out.dimensions(), (300, 150));
}

// Test: version 1 re-encodes in the source format
#[tokio::test]
async fn test_minimal_pipeline_keeps_jpeg() {
    let spec = ResizeSpec::sized(PipelineVersion::V1, 20, 20, "png", false);
    let result = select_pipeline(PipelineVersion::V1, &spec)
        .apply(Bytes::from(jpeg(80, 40)))
        .await
        .unwrap();

    assert_eq!(result.format, Some(OutputFormat::Jpeg));
    // Cover fit fills the whole box
    let out = decode_rgba(&result.data);
    assert_eq!(out.dimensions(), (20, 20));
}

// Test: jpg output is a progressive JPEG
#[tokio::test]
async fn test_jpeg_output_is_progressive() {
    let spec = ResizeSpec::sized(PipelineVersion::V2, 16, 16, "jpg", false);
    let result = select_pipeline(PipelineVersion::V2, &spec)
        .apply(Bytes::from(opaque_png(32, 32)))
        .await
        .unwrap();

    assert_eq!(result.content_type(), "image/jpeg");
    let sof2 = result.data.windows(2).any(|w| w == [0xFF, 0xC2]);
    assert!(sof2, "expected a progressive (SOF2) frame header");
}

// Test: version 3 keeps every GIF frame
#[tokio::test]
async fn test_v3_gif_keeps_animation() {
    let spec = ResizeSpec::sized(PipelineVersion::V3, 10, 10, "gif", false);
    assert!(spec.animated);
    let result = select_pipeline(PipelineVersion::V3, &spec)
        .apply(Bytes::from(animated_gif(20, 20, 3)))
        .await
        .unwrap();

    assert_eq!(result.format, Some(OutputFormat::Gif));
    let decoder = image::codecs::gif::GifDecoder::new(Cursor::new(result.data.to_vec())).unwrap();
    let frames = decoder.into_frames().collect_frames().unwrap();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0].buffer().dimensions(), (10, 10));
}

// Test: version 2 collapses an animation to one frame
#[tokio::test]
async fn test_v2_gif_is_single_frame() {
    let spec = ResizeSpec::sized(PipelineVersion::V2, 10, 10, "gif", false);
    let result = select_pipeline(PipelineVersion::V2, &spec)
        .apply(Bytes::from(animated_gif(20, 20, 3)))
        .await
        .unwrap();

    let decoder = image::codecs::gif::GifDecoder::new(Cursor::new(result.data.to_vec())).unwrap();
    let frames = decoder.into_frames().collect_frames().unwrap();
    assert_eq!(frames.len(), 1);
}

// Test: undecodable input is a decode failure
#[tokio::test]
async fn test_garbage_input_fails_to_decode() {
    let spec = ResizeSpec::sized(PipelineVersion::V2, 10, 10, "png", false);
    let err = select_pipeline(PipelineVersion::V2, &spec)
        .apply(Bytes::from_static(b"definitely not an image"))
        .await
        .unwrap_err();

    assert!(matches!(err, ImageError::DecodeFailed { .. }));
    assert_eq!(err.to_http_status(), 400);
}
