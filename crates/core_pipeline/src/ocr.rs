//! OCR module
//!
//! Provides text extraction using Tesseract (via leptess). The engine sits
//! behind the [`TextRecognizer`] trait so the rest of the pipeline can run
//! headless against canned text.

use crate::error::{PipelineError, Result};
use crate::preprocess::{encode_png, load_scan, preprocess_image, DEFAULT_CONTRAST};
use crate::types::RawText;
use image::GrayImage;
use leptess::LepTess;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default Tesseract language
pub const DEFAULT_LANGUAGE: &str = "eng";

/// Engine parameters supplied at startup
#[derive(Debug, Clone, PartialEq)]
pub struct OcrConfig {
    /// Tesseract language code (default: eng)
    pub language: String,
    /// Directory holding `*.traineddata`; `None` uses the engine default
    pub datapath: Option<PathBuf>,
    /// Contrast boost applied before recognition (0 disables)
    pub contrast: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            datapath: None,
            contrast: DEFAULT_CONTRAST,
        }
    }
}

/// Anything that turns an image file into raw text
pub trait TextRecognizer {
    /// # Errors
    /// * `PipelineError::Ocr` carrying the engine's message
    fn recognize(&self, path: &Path) -> Result<RawText>;
}

/// Tesseract-backed recognizer
#[derive(Debug, Clone, Default)]
pub struct TesseractRecognizer {
    config: OcrConfig,
}

impl TesseractRecognizer {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, path: &Path) -> Result<RawText> {
        let scan = load_scan(path)?;
        let gray = preprocess_image(&scan, self.config.contrast);
        let text = extract_text_tesseract(&gray, &self.config).inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "recognition failed");
        })?;
        let raw = RawText::new(&text);
        debug!(lines = raw.line_count(), "recognized text");
        Ok(raw)
    }
}

/// Extract text from a grayscale image using Tesseract
///
/// # Errors
/// * Returns `PipelineError::Ocr` if Tesseract or the language data is
///   missing, or the image cannot be handed to the engine
pub fn extract_text_tesseract(input: &GrayImage, config: &OcrConfig) -> Result<String> {
    let datapath = match &config.datapath {
        Some(dir) => Some(dir.to_str().ok_or_else(|| {
            PipelineError::Ocr(format!("tessdata path is not UTF-8: {}", dir.display()))
        })?),
        None => None,
    };

    let mut tesseract = LepTess::new(datapath, &config.language).map_err(|e| {
        PipelineError::Ocr(format!(
            "failed to initialize Tesseract ({}): {e}. Is Tesseract installed?",
            config.language
        ))
    })?;

    let png_bytes = encode_png(input)?;

    tesseract
        .set_image_from_mem(&png_bytes)
        .map_err(|e| PipelineError::Ocr(format!("failed to load image into Tesseract: {e}")))?;

    tesseract
        .get_utf8_text()
        .map_err(|e| PipelineError::Ocr(format!("failed to extract text from image: {e}")))
}
