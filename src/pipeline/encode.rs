//! Image encoding: raster → PNG bytes.
//!
//! Both the chart and every rendered page go through here, so the report
//! assembler only ever sees PNG payloads plus their pixel dimensions.

use crate::error::ReportError;
use image::{DynamicImage, RgbImage};
use std::io::Cursor;
use tracing::debug;

/// Encode an image as lossless PNG.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, ReportError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| ReportError::Internal(format!("PNG encoding failed: {e}")))?;

    debug!(
        "Encoded {}x{} image → {} bytes PNG",
        img.width(),
        img.height(),
        buf.len()
    );
    Ok(buf)
}

/// Encode a packed RGB buffer (3 bytes per pixel, row-major) as PNG.
pub fn encode_rgb_png(width: u32, height: u32, rgb: Vec<u8>) -> Result<Vec<u8>, ReportError> {
    let img = RgbImage::from_raw(width, height, rgb).ok_or_else(|| {
        ReportError::Internal(format!("RGB buffer does not match {width}x{height}"))
    })?;
    encode_png(&DynamicImage::ImageRgb8(img))
}

/// Read the pixel dimensions from a PNG header without decoding it.
pub fn png_dimensions(png: &[u8]) -> Option<(u32, u32)> {
    const SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
    if png.len() < 24 || !png.starts_with(SIGNATURE) || &png[12..16] != b"IHDR" {
        return None;
    }
    let w = u32::from_be_bytes(png[16..20].try_into().ok()?);
    let h = u32::from_be_bytes(png[20..24].try_into().ok()?);
    Some((w, h))
}
