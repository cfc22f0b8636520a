//! Core pipeline for gradescan
//!
//! This crate turns a scanned student report card into a structured
//! record and a printable analysis: OCR, heuristic field and mark
//! extraction over the noisy OCR lines, summary statistics, a pie chart
//! of the marks and a PDF export.

pub mod chart;
pub mod error;
pub mod export;
pub mod fields;
pub mod marks;
pub mod ocr;
pub mod preprocess;
pub mod report;
pub mod session;
pub mod types;

pub use chart::PieChart;
pub use error::{PipelineError, Result};
pub use export::{export_report, with_pdf_extension};
pub use fields::extract_details;
pub use marks::{extract_marks, MarkRules};
pub use ocr::{OcrConfig, TesseractRecognizer, TextRecognizer};
pub use report::{synthesize, Grade, Report};
pub use session::{Analysis, Session};
pub use types::*;
