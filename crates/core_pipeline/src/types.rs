//! Core types for the gradescan pipeline
//!
//! This module defines the records that flow between the extractors and
//! the report synthesizer. Conflict policies (first-wins for the student
//! name, last-wins for everything else) live here as explicit operations
//! rather than as side effects of a hash map.

use serde::Serialize;
use std::fmt;

/// Raw OCR output: an ordered sequence of text lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RawText {
    lines: Vec<String>,
}

impl RawText {
    /// Split engine output on line feeds
    pub fn new(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(str::to_string).collect(),
        }
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

impl From<&str> for RawText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for RawText {
    fn from(text: String) -> Self {
        Self::new(&text)
    }
}

/// Identity fields recognized on a report card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StudentField {
    Name,
    Year,
    Department,
}

impl StudentField {
    pub fn label(self) -> &'static str {
        match self {
            StudentField::Name => "Name",
            StudentField::Year => "Year",
            StudentField::Department => "Department",
        }
    }
}

impl fmt::Display for StudentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Student identity extracted from the card header
///
/// Each field is optional and holds at most one value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StudentDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl StudentDetails {
    pub fn get(&self, field: StudentField) -> Option<&str> {
        match field {
            StudentField::Name => self.name.as_deref(),
            StudentField::Year => self.year.as_deref(),
            StudentField::Department => self.department.as_deref(),
        }
    }

    /// Store `value` only if the field is still empty.
    ///
    /// Returns true when the value was recorded.
    pub fn record_first(&mut self, field: StudentField, value: impl Into<String>) -> bool {
        let slot = self.slot_mut(field);
        if slot.is_some() {
            return false;
        }
        *slot = Some(value.into());
        true
    }

    /// Store `value`, replacing any earlier one.
    pub fn record_last(&mut self, field: StudentField, value: impl Into<String>) {
        *self.slot_mut(field) = Some(value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.year.is_none() && self.department.is_none()
    }

    fn slot_mut(&mut self, field: StudentField) -> &mut Option<String> {
        match field {
            StudentField::Name => &mut self.name,
            StudentField::Year => &mut self.year,
            StudentField::Department => &mut self.department,
        }
    }
}

/// One subject and its mark
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectMark {
    pub subject: String,
    pub mark: u32,
}

/// Insertion-ordered mapping from subject label to mark
///
/// Iteration follows first-insertion order. Inserting a label that is
/// already present overwrites its mark in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MarksMap {
    entries: Vec<SubjectMark>,
}

impl MarksMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a subject, returning the previous mark if any
    pub fn insert(&mut self, subject: impl Into<String>, mark: u32) -> Option<u32> {
        let subject = subject.into();
        match self.entries.iter_mut().find(|e| e.subject == subject) {
            Some(existing) => Some(std::mem::replace(&mut existing.mark, mark)),
            None => {
                self.entries.push(SubjectMark { subject, mark });
                None
            }
        }
    }

    pub fn get(&self, subject: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.subject == subject)
            .map(|e| e.mark)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SubjectMark> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a MarksMap {
    type Item = &'a SubjectMark;
    type IntoIter = std::slice::Iter<'a, SubjectMark>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for MarksMap {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        let mut map = MarksMap::new();
        for (subject, mark) in iter {
            map.insert(subject, mark);
        }
        map
    }
}
