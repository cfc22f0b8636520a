//! Subject mark extraction
//!
//! Header and metadata lines are dropped by a keyword filter, then each
//! remaining line is searched for a subject label followed by a 1-3 digit
//! number. Numbers outside the plausible mark range are treated as OCR
//! noise (page numbers, misread characters) and skipped without error.

use crate::types::{MarksMap, RawText};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace};

/// Lowest mark accepted as a real score
pub const MIN_MARK: u32 = 20;

/// Highest mark accepted as a real score
pub const MAX_MARK: u32 = 100;

/// Lines shorter than this are never considered
pub const MIN_LINE_CHARS: usize = 3;

/// Lowercase keywords marking header and metadata lines
pub const NOISE_KEYWORDS: [&str; 7] = [
    "report card",
    "teacher",
    "student",
    "name",
    "year",
    "department",
    "course",
];

lazy_static! {
    static ref MARK_RE: Regex = Regex::new(r"([A-Za-z &]+)\s+([0-9]{1,3})").unwrap();
}

/// Filtering policy for mark extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkRules {
    pub min_mark: u32,
    pub max_mark: u32,
    pub min_line_chars: usize,
    pub noise_keywords: Vec<String>,
}

impl Default for MarkRules {
    fn default() -> Self {
        Self {
            min_mark: MIN_MARK,
            max_mark: MAX_MARK,
            min_line_chars: MIN_LINE_CHARS,
            noise_keywords: NOISE_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl MarkRules {
    /// True when a trimmed line is a header or too short to hold a mark
    pub fn is_noise(&self, line: &str) -> bool {
        if line.chars().count() < self.min_line_chars {
            return true;
        }
        let lower = line.to_lowercase();
        self.noise_keywords.iter().any(|k| lower.contains(k.as_str()))
    }

    pub fn accepts(&self, mark: u32) -> bool {
        (self.min_mark..=self.max_mark).contains(&mark)
    }

    /// Extract every accepted subject/mark pair, in order of appearance
    pub fn extract(&self, text: &RawText) -> MarksMap {
        let mut marks = MarksMap::new();

        for line in text.lines() {
            let line = line.trim();
            if self.is_noise(line) {
                trace!(line, "skipping header or short line");
                continue;
            }

            let Some(caps) = MARK_RE.captures(line) else {
                continue;
            };

            let subject = caps[1].trim();
            // A label of only spaces/ampersands (e.g. "Total:  45") would
            // otherwise be stored under an empty key
            if subject.is_empty() {
                trace!(line, "skipping match without a subject label");
                continue;
            }

            let Ok(mark) = caps[2].parse::<u32>() else {
                continue;
            };

            if !self.accepts(mark) {
                trace!(subject, mark, "mark outside accepted range");
                continue;
            }

            if let Some(previous) = marks.insert(subject, mark) {
                debug!(subject, previous, mark, "subject repeated, keeping later mark");
            }
        }

        debug!(count = marks.len(), "extracted subject marks");
        marks
    }
}

/// Extract marks using the default rules
pub fn extract_marks(text: &RawText) -> MarksMap {
    MarkRules::default().extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marks_of(lines: &[&str]) -> MarksMap {
        extract_marks(&RawText::from_lines(lines.iter().copied()))
    }

    #[test]
    fn test_range_boundaries() {
        let marks = marks_of(&["Math 19", "Physics 20", "Chemistry 100", "Biology 101"]);
        assert_eq!(marks.get("Math"), None);
        assert_eq!(marks.get("Physics"), Some(20));
        assert_eq!(marks.get("Chemistry"), Some(100));
        assert_eq!(marks.get("Biology"), None);
        assert_eq!(marks.len(), 2);
    }

    #[test]
    fn test_noise_keywords_skip_lines() {
        let marks = marks_of(&[
            "Report Card 2023",
            "Class Teacher 45",
            "Student ID 77",
            "Roll name 50",
            "Year 60",
            "Department 70",
            "Course 80",
            "English 85",
        ]);
        assert_eq!(marks.len(), 1);
        assert_eq!(marks.get("English"), Some(85));
    }

    #[test]
    fn test_short_lines_skipped() {
        let rules = MarkRules::default();
        assert!(rules.is_noise("A1"));
        assert!(rules.is_noise(""));
        assert!(!rules.is_noise("Art 50"));
    }

    #[test]
    fn test_subject_labels_with_spaces_and_ampersand() {
        let marks = marks_of(&["Arts & Crafts   72", "Social Studies 64"]);
        assert_eq!(marks.get("Arts & Crafts"), Some(72));
        assert_eq!(marks.get("Social Studies"), Some(64));
    }

    #[test]
    fn test_duplicate_subject_last_write_wins() {
        let marks = marks_of(&["Math 70", "Art 50", "Math 88"]);
        assert_eq!(marks.get("Math"), Some(88));
        assert_eq!(marks.len(), 2);
    }

    #[test]
    fn test_lines_without_pattern_are_skipped() {
        let marks = marks_of(&["----------", "95", "Signature: ______", "Total: 45"]);
        assert!(marks.is_empty());
    }

    #[test]
    fn test_blank_subject_label_is_skipped() {
        // Class matches the double space before the number, trimming to nothing
        let marks = marks_of(&["Total:  45", "Art 60"]);
        assert_eq!(marks.get(""), None);
        assert_eq!(marks.len(), 1);
    }

    #[test]
    fn test_four_digit_numbers_only_take_three_digits() {
        // "1234" yields the candidate 123, which is out of range
        let marks = marks_of(&["Math 1234"]);
        assert!(marks.is_empty());
    }

    #[test]
    fn test_custom_rules() {
        let rules = MarkRules {
            min_mark: 0,
            max_mark: 10,
            min_line_chars: 3,
            noise_keywords: vec!["quiz".to_string()],
        };
        let raw = RawText::from_lines(["Math 7", "Quiz 5", "Art 15"]);
        let marks = rules.extract(&raw);
        assert_eq!(marks.get("Math"), Some(7));
        assert_eq!(marks.len(), 1);
    }
}
