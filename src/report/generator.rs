//! Summary report generation.
//!
//! Renders the grade and attendance statistics as a Markdown document or
//! as JSON, for use outside the interactive shell.

use crate::analysis::{attendance_percentage, average_grades, NameLookup};
use crate::models::{AttendanceSummary, GradeSummary};
use crate::store::{RecordStore, StoreResult};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Both statistics, as of one point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReport {
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Directory the tables were read from.
    pub data_dir: String,
    /// Number of student rows.
    pub student_count: usize,
    pub grades: GradeSummary,
    pub attendance: AttendanceSummary,
}

impl SummaryReport {
    /// Compute the report from the current contents of the store.
    pub fn from_store(store: &RecordStore, unknown_name: &str) -> StoreResult<Self> {
        let students = store.students()?;
        let names = NameLookup::new(&students, unknown_name);

        Ok(Self {
            generated_at: Utc::now(),
            data_dir: store.paths().data_dir.display().to_string(),
            student_count: students.len(),
            grades: average_grades(&store.grades()?, &names),
            attendance: attendance_percentage(&store.attendance()?, &names),
        })
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &SummaryReport) -> String {
    let mut output = String::new();

    output.push_str("# Gradebook Summary\n\n");
    output.push_str(&format!(
        "- **Generated:** {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!("- **Data Directory:** `{}`\n", report.data_dir));
    output.push_str(&format!("- **Students:** {}\n\n", report.student_count));

    output.push_str(&generate_grades_section(&report.grades));
    output.push_str(&generate_attendance_section(&report.attendance));

    output
}

/// Generate the average grades section.
fn generate_grades_section(grades: &GradeSummary) -> String {
    let mut section = String::new();

    section.push_str("## Average Grades\n\n");
    if grades.is_empty() {
        section.push_str("No numeric grades recorded yet.\n\n");
        return section;
    }

    section.push_str("| ID | Name | Average | Grades |\n");
    section.push_str("|:---|:---|---:|---:|\n");
    for row in &grades.students {
        section.push_str(&format!(
            "| {} | {} | {:.2} | {} |\n",
            escape_cell(&row.student_id),
            escape_cell(&row.name),
            row.average,
            row.count
        ));
    }
    section.push_str(&format!(
        "\n**Overall average:** {:.2} ({} grades)\n\n",
        grades.overall, grades.count
    ));

    section
}

/// Generate the attendance section.
fn generate_attendance_section(attendance: &AttendanceSummary) -> String {
    let mut section = String::new();

    section.push_str("## Attendance\n\n");
    if attendance.is_empty() {
        section.push_str("No attendance records yet.\n\n");
        return section;
    }

    section.push_str("| ID | Name | Present | Total | Attendance |\n");
    section.push_str("|:---|:---|---:|---:|---:|\n");
    for row in &attendance.students {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {:.2}% |\n",
            escape_cell(&row.student_id),
            escape_cell(&row.name),
            row.present,
            row.total,
            row.percentage
        ));
    }
    section.push_str(&format!(
        "\n**Overall attendance:** {}/{} ({:.2}%)\n\n",
        attendance.present, attendance.total, attendance.overall
    ));

    section
}

/// Keep user text from breaking the table layout.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Generate a JSON report.
pub fn generate_json_report(report: &SummaryReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
