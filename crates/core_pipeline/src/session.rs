//! Application state for one interactive session
//!
//! A [`Session`] owns the analysis of the most recently loaded card and the
//! text shown to the user. Each action either replaces the analysis or
//! leaves it untouched; failures become display text, never panics.

use crate::chart::PieChart;
use crate::error::{PipelineError, Result};
use crate::export::export_report;
use crate::fields::extract_details;
use crate::marks::MarkRules;
use crate::ocr::TextRecognizer;
use crate::report::{synthesize, Report};
use crate::types::{MarksMap, RawText, StudentDetails};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Everything derived from one recognized report card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub details: StudentDetails,
    pub marks: MarksMap,
    pub report: Report,
    pub chart: PieChart,
}

impl Analysis {
    /// Run extraction and synthesis over recognized text
    ///
    /// # Errors
    /// * `PipelineError::EmptyExtraction` if no subject/mark pair survives
    pub fn from_text(raw: &RawText, rules: &MarkRules) -> Result<Self> {
        let details = extract_details(raw);
        let marks = rules.extract(raw);
        let report = synthesize(&details, &marks)?;
        let chart = PieChart::from_marks(&marks);

        Ok(Self {
            details,
            marks,
            report,
            chart,
        })
    }
}

#[derive(Debug, Default)]
pub struct Session {
    rules: MarkRules,
    analysis: Option<Analysis>,
    display: String,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: MarkRules) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    /// Text currently shown to the user
    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    /// Recognize an image and analyze it, replacing any earlier analysis
    pub fn load_image(
        &mut self,
        recognizer: &dyn TextRecognizer,
        path: &Path,
    ) -> Result<&Analysis> {
        info!(path = %path.display(), "loading report card");
        match recognizer.recognize(path) {
            Ok(raw) => self.load_text(&raw),
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Analyze already recognized text, replacing any earlier analysis
    pub fn load_text(&mut self, raw: &RawText) -> Result<&Analysis> {
        debug!(lines = raw.line_count(), "analyzing text");
        match Analysis::from_text(raw, &self.rules) {
            Ok(analysis) => {
                self.display = analysis.report.render();
                Ok(self.analysis.insert(analysis))
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Export the current analysis as a PDF
    ///
    /// The outcome is appended to the display text; the analysis is kept
    /// whether or not the export succeeds.
    pub fn save_pdf(&mut self, path: &Path) -> Result<PathBuf> {
        let result = match &self.analysis {
            Some(analysis) => export_report(&analysis.report.render(), &analysis.chart, path),
            None => Err(PipelineError::Export("no report to export".to_string())),
        };

        match result {
            Ok(written) => {
                info!(path = %written.display(), "saved report");
                self.display
                    .push_str(&format!("\n\nPDF saved to: {}", written.display()));
                Ok(written)
            }
            Err(err) => {
                warn!(error = %err, "saving report failed");
                self.display.push_str(&format!("\n{err}"));
                Err(err)
            }
        }
    }

    fn fail(&mut self, err: PipelineError) -> PipelineError {
        warn!(error = %err, "analysis failed");
        self.analysis = None;
        self.display = err.to_string();
        err
    }
}
