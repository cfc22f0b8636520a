//! Image preprocessing module
//!
//! Prepares a scanned report card for OCR:
//! - Decoding from any format the `image` crate understands
//! - Grayscale conversion
//! - Contrast adjustment

use crate::error::{PipelineError, Result};
use image::{DynamicImage, GrayImage};
use std::path::Path;
use tracing::debug;

/// Contrast boost applied before OCR, in `image`'s percentage units
pub const DEFAULT_CONTRAST: f32 = 20.0;

/// Decode a scanned image from disk
pub fn load_scan(path: &Path) -> Result<DynamicImage> {
    let image = image::open(path)
        .map_err(|e| PipelineError::Ocr(format!("cannot read image {}: {e}", path.display())))?;
    debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "loaded scan"
    );
    Ok(image)
}

/// Preprocess a scanned image for OCR
pub fn preprocess_image(input: &DynamicImage, contrast: f32) -> GrayImage {
    let gray = input.to_luma8();
    if contrast == 0.0 {
        return gray;
    }
    image::imageops::contrast(&gray, contrast)
}

/// Encode a grayscale image as PNG bytes for the OCR engine
pub fn encode_png(image: &GrayImage) -> Result<Vec<u8>> {
    let mut png_bytes = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut png_bytes);
    image
        .write_to(&mut cursor, image::ImageFormat::Png)
        .map_err(|e| PipelineError::Ocr(format!("failed to encode image as PNG: {e}")))?;
    Ok(png_bytes)
}
