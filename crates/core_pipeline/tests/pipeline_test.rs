//! End-to-end pipeline tests
//!
//! Runs the session headless with canned OCR output.

use core_pipeline::{
    extract_details, extract_marks, synthesize, Grade, PipelineError, RawText, Result, Session,
    TextRecognizer,
};
use std::path::Path;

struct CannedText(Vec<&'static str>);

impl TextRecognizer for CannedText {
    fn recognize(&self, _path: &Path) -> Result<RawText> {
        Ok(RawText::from_lines(self.0.iter().copied()))
    }
}

fn sample_card() -> RawText {
    RawText::from_lines([
        "Name: Jane Doe",
        "Class Teacher: Mr Smith",
        "Year: 2023",
        "Department: Science",
        "Math 95",
        "Physics 15",
        "Report Card 2023",
    ])
}

#[test]
fn test_sample_card_fields_and_marks() {
    let raw = sample_card();

    let details = extract_details(&raw);
    assert_eq!(details.name.as_deref(), Some("Jane Doe"));
    assert_eq!(details.year.as_deref(), Some("2023"));
    assert_eq!(details.department.as_deref(), Some("Science"));

    let marks = extract_marks(&raw);
    assert_eq!(marks.len(), 1);
    assert_eq!(marks.get("Math"), Some(95));
}

#[test]
fn test_sample_card_report() {
    let raw = sample_card();
    let report = synthesize(&extract_details(&raw), &extract_marks(&raw)).unwrap();

    assert_eq!(report.total, 95);
    assert_eq!(report.grade, Grade::A);
    assert_eq!(report.top_subject.subject, "Math");
    assert_eq!(report.lowest_subject.subject, "Math");

    let text = report.render();
    assert!(text.contains("Name           : Jane Doe"));
    assert!(text.contains("Department     : Science"));
    assert!(text.contains("Year           : 2023"));
    assert!(!text.contains("Physics"));
}

#[test]
fn test_noisy_scan_end_to_end_with_export() {
    let recognizer = CannedText(vec![
        "  SPRINGFIELD HIGH SCHOOL  ",
        "Student Report Card",
        "Name - John Roe",
        "Name: Someone Else",
        "Academic Year: 2022",
        "Year: 2024",
        "Stream: Commerce",
        "Subject        Marks",
        "English        88",
        "Mathematics    72",
        "Accounts & Tax 64",
        "Economics      101",
        "Page 2",
        "English        91",
        "",
        "Class Teacher: Ms Krabappel",
    ]);

    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::new();

    let analysis = session
        .load_image(&recognizer, Path::new("scan.png"))
        .unwrap();
    assert_eq!(analysis.details.name.as_deref(), Some("John Roe"));
    assert_eq!(analysis.details.year.as_deref(), Some("2024"));
    assert_eq!(analysis.details.department.as_deref(), Some("Commerce"));

    let subjects: Vec<(&str, u32)> = analysis
        .marks
        .iter()
        .map(|e| (e.subject.as_str(), e.mark))
        .collect();
    assert_eq!(
        subjects,
        vec![("English", 91), ("Mathematics", 72), ("Accounts & Tax", 64)]
    );
    assert_eq!(analysis.report.total, 227);
    assert_eq!(analysis.report.grade, Grade::B);

    let written = session.save_pdf(&dir.path().join("john")).unwrap();
    let bytes = std::fs::read(&written).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert!(session.display().contains("PDF saved to:"));
}

#[test]
fn test_blank_scan_reports_no_marks() {
    let recognizer = CannedText(vec!["", "   ", "Report Card"]);
    let mut session = Session::new();

    let result = session.load_image(&recognizer, Path::new("blank.png"));
    assert!(matches!(result, Err(PipelineError::EmptyExtraction)));
    assert_eq!(session.display(), "No valid subject-mark pairs found.");
}
