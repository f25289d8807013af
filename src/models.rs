//! Data models for the gradebook.
//!
//! This module contains the rows persisted by the record store and the
//! derived statistics produced by the aggregator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used for attendance rows.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A student as stored in the students table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Student identifier (not enforced unique).
    pub id: String,
    /// Display name.
    pub name: String,
}

/// A single recorded grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeEntry {
    /// Identifier of the graded student.
    pub student_id: String,
    /// Subject the grade belongs to.
    pub subject: String,
    /// Grade exactly as entered.
    pub grade: String,
}

impl GradeEntry {
    /// Returns the grade as a number, or `None` if it is not numeric.
    ///
    /// Surrounding whitespace is ignored. Non-finite values (`inf`, `NaN`)
    /// are treated as non-numeric.
    pub fn numeric_grade(&self) -> Option<f64> {
        self.grade
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    }
}

/// A single attendance mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    /// Identifier of the student.
    pub student_id: String,
    /// Day the mark was recorded, as stored (normally `YYYY-MM-DD`).
    pub date: String,
    /// Status exactly as entered.
    pub status: String,
}

impl AttendanceEntry {
    /// Creates an entry dated with the given calendar day.
    pub fn on(student_id: impl Into<String>, date: NaiveDate, status: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            date: date.format(DATE_FORMAT).to_string(),
            status: status.into(),
        }
    }

    /// Whether this entry counts as present.
    pub fn is_present(&self) -> bool {
        AttendanceStatus::classify(&self.status) == AttendanceStatus::Present
    }
}

/// Attendance classification derived from the free-text status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    /// Classify a status string. Anything starting with `p` (any case) is present.
    pub fn classify(status: &str) -> Self {
        match status.trim().chars().next() {
            Some(c) if c.eq_ignore_ascii_case(&'p') => AttendanceStatus::Present,
            _ => AttendanceStatus::Absent,
        }
    }
}

/// Average grade of one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentAverage {
    pub student_id: String,
    /// Looked-up name, or the unknown placeholder.
    pub name: String,
    pub average: f64,
    /// Number of numeric grades that went into the average.
    pub count: usize,
}

/// Per-student and overall grade averages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradeSummary {
    /// One row per student, in order of first appearance.
    pub students: Vec<StudentAverage>,
    /// Mean across every numeric grade.
    pub overall: f64,
    /// Number of numeric grades overall.
    pub count: usize,
}

impl GradeSummary {
    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}

/// Attendance tally of one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentAttendance {
    pub student_id: String,
    pub name: String,
    pub present: usize,
    pub total: usize,
    /// Present marks as a percentage of all marks.
    pub percentage: f64,
}

/// Per-student and overall attendance percentages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub students: Vec<StudentAttendance>,
    pub present: usize,
    pub total: usize,
    pub overall: f64,
}

impl AttendanceSummary {
    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}

/// Percentage of `part` in `whole`, 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64) * 100.0
    }
}
