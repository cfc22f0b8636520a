//! Error taxonomy for the report card pipeline
//!
//! Every variant is local to one user action. Noisy OCR lines are never
//! errors; they are skipped by the extractors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// OCR engine failure: unreadable image, missing language data, bad UTF-8
    #[error("OCR failed: {0}")]
    Ocr(String),

    /// No subject/mark pairs survived filtering
    #[error("No valid subject-mark pairs found.")]
    EmptyExtraction,

    /// Failure while encoding or writing the output document
    #[error("Error saving PDF: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
