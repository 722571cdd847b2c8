use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, RgbImage};

const JPEG_QUALITY: u8 = 80;

/// Compress a frame to JPEG and encode the bytes as base64 text so the
/// payload can travel inside a JSON message.
pub fn to_base64_jpeg(frame: &RgbImage) -> Result<String> {
    let mut jpeg = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY);
    encoder
        .encode(
            frame.as_raw(),
            frame.width(),
            frame.height(),
            ExtendedColorType::Rgb8,
        )
        .context("encode frame as JPEG")?;

    Ok(base64::encode(&jpeg))
}
