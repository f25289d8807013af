//! Grade and attendance aggregation.
//!
//! Groups rows by student id, computes per-student and overall statistics
//! and joins each student id against the students table for display names.

use crate::models::{
    percentage, AttendanceEntry, AttendanceSummary, GradeEntry, GradeSummary, Student,
    StudentAttendance, StudentAverage,
};
use std::collections::HashMap;

/// Placeholder shown for ids with no matching student row.
pub const UNKNOWN_NAME: &str = "<unknown>";

/// Maps trimmed student ids to trimmed names.
#[derive(Debug, Clone)]
pub struct NameLookup {
    names: HashMap<String, String>,
    unknown: String,
}

impl NameLookup {
    /// Build a lookup from student rows. Later duplicates win.
    pub fn new(students: &[Student], unknown: impl Into<String>) -> Self {
        let names = students
            .iter()
            .map(|s| (s.id.trim().to_string(), s.name.trim().to_string()))
            .collect();

        Self {
            names,
            unknown: unknown.into(),
        }
    }

    /// Name for `id`, or the unknown placeholder.
    pub fn name(&self, id: &str) -> &str {
        self.names
            .get(id)
            .map(String::as_str)
            .unwrap_or(self.unknown.as_str())
    }
}

/// Groups values by key while remembering first-appearance order.
struct Grouped<V> {
    order: Vec<String>,
    groups: HashMap<String, V>,
}

impl<V: Default> Grouped<V> {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            groups: HashMap::new(),
        }
    }

    fn entry(&mut self, key: &str) -> &mut V {
        if !self.groups.contains_key(key) {
            self.order.push(key.to_string());
        }
        self.groups.entry(key.to_string()).or_default()
    }

    fn into_groups(mut self) -> impl Iterator<Item = (String, V)> {
        self.order.into_iter().map(move |key| {
            let value = self.groups.remove(&key).unwrap_or_default();
            (key, value)
        })
    }
}

/// Compute per-student and overall grade averages.
///
/// Non-numeric grades are skipped entirely; students with no numeric
/// grade do not appear.
pub fn average_grades(grades: &[GradeEntry], names: &NameLookup) -> GradeSummary {
    let mut by_student: Grouped<(f64, usize)> = Grouped::new();
    let mut total_sum = 0.0;
    let mut total_count = 0usize;

    for entry in grades {
        let Some(value) = entry.numeric_grade() else {
            continue;
        };
        let (sum, count) = by_student.entry(entry.student_id.trim());
        *sum += value;
        *count += 1;
        total_sum += value;
        total_count += 1;
    }

    let students = by_student
        .into_groups()
        .map(|(id, (sum, count))| StudentAverage {
            name: names.name(&id).to_string(),
            average: sum / count as f64,
            count,
            student_id: id,
        })
        .collect();

    GradeSummary {
        students,
        overall: if total_count > 0 {
            total_sum / total_count as f64
        } else {
            0.0
        },
        count: total_count,
    }
}

/// Compute per-student and overall attendance percentages.
pub fn attendance_percentage(marks: &[AttendanceEntry], names: &NameLookup) -> AttendanceSummary {
    let mut by_student: Grouped<(usize, usize)> = Grouped::new();

    for mark in marks {
        let (present, total) = by_student.entry(mark.student_id.trim());
        if mark.is_present() {
            *present += 1;
        }
        *total += 1;
    }

    let mut summary = AttendanceSummary::default();
    for (id, (present, total)) in by_student.into_groups() {
        summary.present += present;
        summary.total += total;
        summary.students.push(StudentAttendance {
            name: names.name(&id).to_string(),
            present,
            total,
            percentage: percentage(present, total),
            student_id: id,
        });
    }
    summary.overall = percentage(summary.present, summary.total);

    summary
}
