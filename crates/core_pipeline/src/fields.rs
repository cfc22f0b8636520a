//! Student identity extraction
//!
//! Applies three case-insensitive rules to every trimmed OCR line:
//! - Name: first match wins, lines mentioning a teacher are ignored
//! - Year: four digits after a separator, last match wins
//! - Department: course/department/stream/program, last match wins

use crate::types::{RawText, StudentDetails, StudentField};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    static ref NAME_RE: Regex = Regex::new(r"(?i)\bname\b\s*[:\-]\s*(.+)").unwrap();
    static ref YEAR_RE: Regex = Regex::new(r"(?i)\byear\b\s*[:\-]\s*([0-9]{4})").unwrap();
    static ref DEPARTMENT_RE: Regex =
        Regex::new(r"(?i)(course|department|stream|program)\s*[:\-]\s*(.+)").unwrap();
}

/// Token that disqualifies a line from supplying the student name
const TEACHER_TOKEN: &str = "teacher";

/// Extract name, year and department from raw OCR text
///
/// Fields with no matching line are left empty; this never fails.
pub fn extract_details(text: &RawText) -> StudentDetails {
    let mut details = StudentDetails::default();

    for line in text.lines() {
        let line = line.trim();

        if let Some(caps) = NAME_RE.captures(line) {
            if !line.to_lowercase().contains(TEACHER_TOKEN) {
                details.record_first(StudentField::Name, caps[1].trim());
            }
        }

        if let Some(caps) = YEAR_RE.captures(line) {
            details.record_last(StudentField::Year, caps[1].trim());
        }

        if let Some(caps) = DEPARTMENT_RE.captures(line) {
            details.record_last(StudentField::Department, caps[2].trim());
        }
    }

    debug!(?details, "extracted student details");
    details
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details_of(lines: &[&str]) -> StudentDetails {
        extract_details(&RawText::from_lines(lines.iter().copied()))
    }

    #[test]
    fn test_no_matching_lines_yields_empty_details() {
        let details = details_of(&["Math 95", "Science 80", "Signature ______"]);
        assert!(details.is_empty());
    }

    #[test]
    fn test_name_first_match_wins() {
        let details = details_of(&["Name: Jane Doe", "Name - John Roe"]);
        assert_eq!(details.name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_teacher_line_never_supplies_name() {
        let details = details_of(&["Class Teacher Name: Mr Smith", "Student Name: Jane Doe"]);
        assert_eq!(details.name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_name_is_case_insensitive_and_trimmed() {
        let details = details_of(&["   NAME :   Jane Doe   "]);
        assert_eq!(details.name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_name_requires_whole_word() {
        let details = details_of(&["Surname: Doe", "Username - jdoe"]);
        assert!(details.name.is_none());
    }

    #[test]
    fn test_year_last_match_wins() {
        let details = details_of(&["Year: 2021", "Academic Year - 2023"]);
        assert_eq!(details.year.as_deref(), Some("2023"));
    }

    #[test]
    fn test_year_needs_four_digits() {
        let details = details_of(&["Year: 23"]);
        assert!(details.year.is_none());
    }

    #[test]
    fn test_year_accepts_any_four_digit_run() {
        let details = details_of(&["Year: 9999"]);
        assert_eq!(details.year.as_deref(), Some("9999"));
    }

    #[test]
    fn test_department_synonyms_last_match_wins() {
        let details = details_of(&["Course: B.Sc", "Stream: Science", "Program - Honours"]);
        assert_eq!(details.department.as_deref(), Some("Honours"));
    }

    #[test]
    fn test_department_captures_remainder() {
        let details = details_of(&["department:  Computer Science & Engineering "]);
        assert_eq!(
            details.department.as_deref(),
            Some("Computer Science & Engineering")
        );
    }

    #[test]
    fn test_rules_apply_independently_on_one_line() {
        let details = details_of(&["Name: Jane Year: 2023"]);
        assert_eq!(details.name.as_deref(), Some("Jane Year: 2023"));
        assert_eq!(details.year.as_deref(), Some("2023"));
    }
}
