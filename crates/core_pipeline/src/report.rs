//! Report synthesis
//!
//! Computes total, average, grade band and extrema over a [`MarksMap`]
//! and renders the fixed-width text report shown to the user and written
//! into the exported document.

use crate::error::{PipelineError, Result};
use crate::types::{MarksMap, StudentDetails, SubjectMark};
use serde::Serialize;
use std::fmt::{self, Write as _};
use tracing::debug;

/// Inclusive lower bound of grade A
pub const GRADE_A_MIN: f64 = 90.0;
/// Inclusive lower bound of grade B
pub const GRADE_B_MIN: f64 = 75.0;
/// Inclusive lower bound of grade C
pub const GRADE_C_MIN: f64 = 60.0;

/// Shown when no name line was recognized
const NAME_PLACEHOLDER: &str = "N/A";

/// Width of the subject column in the marks block
const SUBJECT_COLUMN_WIDTH: usize = 25;

/// Performance band derived from the average score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
}

impl Grade {
    pub fn from_average(average: f64) -> Self {
        if average >= GRADE_A_MIN {
            Grade::A
        } else if average >= GRADE_B_MIN {
            Grade::B
        } else if average >= GRADE_C_MIN {
            Grade::C
        } else {
            Grade::D
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Grade::A => "A (Excellent)",
            Grade::B => "B (Good)",
            Grade::C => "C (Average)",
            Grade::D => "D (Needs Improvement)",
        }
    }

    pub fn remark(self) -> &'static str {
        match self {
            Grade::A => "Outstanding performance! Keep it up.",
            Grade::B => "Great job! Aim for excellence.",
            Grade::C => "Good effort, but there's room for improvement.",
            Grade::D => "Needs serious attention. Work harder and seek help.",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Summary statistics and formatted text for one report card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub details: StudentDetails,
    pub marks: MarksMap,
    pub total: u32,
    pub average: f64,
    pub grade: Grade,
    pub top_subject: SubjectMark,
    pub lowest_subject: SubjectMark,
}

/// Build a report from extracted details and marks
///
/// # Errors
/// * `PipelineError::EmptyExtraction` if `marks` holds no entries
pub fn synthesize(details: &StudentDetails, marks: &MarksMap) -> Result<Report> {
    let mut entries = marks.iter();
    let first = entries.next().ok_or(PipelineError::EmptyExtraction)?;

    let mut total = first.mark;
    let mut top = first;
    let mut lowest = first;

    for entry in entries {
        total += entry.mark;
        // Strict comparisons: ties keep the subject seen first
        if entry.mark > top.mark {
            top = entry;
        }
        if entry.mark < lowest.mark {
            lowest = entry;
        }
    }

    let average = f64::from(total) / marks.len() as f64;
    let grade = Grade::from_average(average);

    debug!(total, average, grade = grade.label(), "synthesized report");

    Ok(Report {
        details: details.clone(),
        marks: marks.clone(),
        total,
        average,
        grade,
        top_subject: top.clone(),
        lowest_subject: lowest.clone(),
    })
}

impl Report {
    pub fn remark(&self) -> &'static str {
        self.grade.remark()
    }

    /// Render the fixed-width text report
    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "STUDENT REPORT ANALYSIS")?;
        writeln!(out, "=================================")?;
        writeln!(out, "Student Details:")?;
        writeln!(out, "------------------------")?;
        writeln!(
            out,
            "Name           : {}",
            self.details.name.as_deref().unwrap_or(NAME_PLACEHOLDER)
        )?;
        if let Some(department) = &self.details.department {
            writeln!(out, "Department     : {}", department)?;
        }
        if let Some(year) = &self.details.year {
            writeln!(out, "Year           : {}", year)?;
        }

        writeln!(out)?;
        writeln!(out, "SUBJECT-WISE MARKS")?;
        writeln!(out, "---------------------------------")?;
        for entry in &self.marks {
            writeln!(out, "{}", format_mark_line(&entry.subject, entry.mark))?;
        }

        writeln!(out)?;
        writeln!(out, "---------------------------------")?;
        writeln!(out, " Total Marks       : {}", self.total)?;
        writeln!(out, " Average Score     : {:.2}", round_half_up(self.average))?;
        writeln!(out, " Final Grade       : {}", self.grade.label())?;
        writeln!(
            out,
            " Top Subject       : {} ({})",
            self.top_subject.subject, self.top_subject.mark
        )?;
        writeln!(
            out,
            " Lowest Subject    : {} ({})",
            self.lowest_subject.subject, self.lowest_subject.mark
        )?;
        writeln!(out)?;
        write!(out, " Remarks           : {}", self.remark())
    }
}

/// Round to two decimals with halves away from zero
///
/// `{:.2}` alone rounds exact halves (71.625) to even.
fn round_half_up(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One row of the marks block
pub fn format_mark_line(subject: &str, mark: u32) -> String {
    format!("{:<width$} : {:>3}", subject, mark, width = SUBJECT_COLUMN_WIDTH)
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
