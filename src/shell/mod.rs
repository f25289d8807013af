//! Interactive menu shell.
//!
//! A blocking read-eval loop over the record store. Every answer goes
//! through a [`Prompt`]; cancelling any prompt abandons the current
//! operation and returns to the menu.

pub mod input;

pub use input::{LineInput, Prompt, Reply, TerminalInput};

use crate::analysis::{attendance_percentage, average_grades, NameLookup};
use crate::config::ShellConfig;
use crate::models::{AttendanceEntry, GradeEntry, Student};
use crate::store::{RecordStore, StoreError};
use chrono::{Local, NaiveDate};
use std::io::{self, Write};
use thiserror::Error;
use tracing::{debug, error, warn};

const MENU: &[&str] = &[
    "1. Add Student",
    "2. Record Grade",
    "3. Record Attendance",
    "4. View Students",
    "5. View Grades",
    "6. View Attendance",
    "7. Average Grades",
    "8. Average Attendance Percentage",
    "9. Reset All Data",
    "10. Exit",
];

/// Errors that stop a single shell operation.
#[derive(Debug, Error)]
pub enum ShellError {
    /// The console itself failed; the session cannot continue.
    #[error("console I/O failed: {0}")]
    Console(#[from] io::Error),

    /// A table could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    AddStudent,
    RecordGrade,
    RecordAttendance,
    ViewStudents,
    ViewGrades,
    ViewAttendance,
    AverageGrades,
    AttendancePercentage,
    Reset,
    Exit,
}

impl Command {
    /// Parse a menu choice such as `"3"`.
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(Command::AddStudent),
            "2" => Some(Command::RecordGrade),
            "3" => Some(Command::RecordAttendance),
            "4" => Some(Command::ViewStudents),
            "5" => Some(Command::ViewGrades),
            "6" => Some(Command::ViewAttendance),
            "7" => Some(Command::AverageGrades),
            "8" => Some(Command::AttendancePercentage),
            "9" => Some(Command::Reset),
            "10" => Some(Command::Exit),
            _ => None,
        }
    }
}

/// The interactive shell.
pub struct Shell<P, W> {
    store: RecordStore,
    config: ShellConfig,
    input: P,
    out: W,
    today: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl<P: Prompt, W: Write> Shell<P, W> {
    pub fn new(store: RecordStore, config: ShellConfig, input: P, out: W) -> Self {
        Self {
            store,
            config,
            input,
            out,
            today: local_today,
        }
    }

    /// Use a fixed clock for attendance dates.
    #[cfg(test)]
    fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Run the menu loop until Exit, or until input is gone for good.
    pub fn run(&mut self) -> Result<(), ShellError> {
        loop {
            for line in MENU {
                writeln!(self.out, "{}", line)?;
            }

            let choice = match self.ask("Select an option: ")? {
                Some(choice) => choice,
                None if self.input.is_exhausted() => {
                    writeln!(self.out, "Exiting...")?;
                    return Ok(());
                }
                None => continue,
            };

            let Some(command) = Command::from_choice(&choice) else {
                writeln!(self.out, "Invalid choice. Try again.\n")?;
                continue;
            };

            if command == Command::Exit {
                writeln!(self.out, "Exiting...")?;
                return Ok(());
            }

            match self.execute(command) {
                Ok(()) => {}
                Err(ShellError::Store(e)) => {
                    error!("{:?} failed: {}", command, e);
                    writeln!(self.out, "Error: {}\n", e)?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Run one menu command.
    pub fn execute(&mut self, command: Command) -> Result<(), ShellError> {
        debug!("Executing {:?}", command);
        match command {
            Command::AddStudent => self.add_student(),
            Command::RecordGrade => self.record_grade(),
            Command::RecordAttendance => self.record_attendance(),
            Command::ViewStudents => self.view_students(),
            Command::ViewGrades => self.view_grades(),
            Command::ViewAttendance => self.view_attendance(),
            Command::AverageGrades => self.average_grades(),
            Command::AttendancePercentage => self.attendance_percentage(),
            Command::Reset => self.reset_all_data(),
            Command::Exit => Ok(()),
        }
    }

    /// Print `prompt` and read an answer. `None` means the user cancelled.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>, ShellError> {
        write!(self.out, "{}", prompt)?;
        self.out.flush()?;

        match self.input.read_line()? {
            Reply::Line(line) => Ok(Some(line)),
            Reply::Cancelled(cancel) => {
                warn!("Input cancelled ({})", cancel);
                writeln!(self.out, "\nInput cancelled ({}). Returning to menu...", cancel)?;
                Ok(None)
            }
        }
    }

    fn add_student(&mut self) -> Result<(), ShellError> {
        let Some(id) = self.ask("Enter student ID: ")? else {
            return Ok(());
        };
        let Some(name) = self.ask("Enter student name: ")? else {
            return Ok(());
        };

        self.store.add_student(&Student { id, name: name.clone() })?;
        writeln!(self.out, "Student {} added successfully!\n", name)?;
        Ok(())
    }

    fn record_grade(&mut self) -> Result<(), ShellError> {
        let Some(student_id) = self.ask("Enter student ID: ")? else {
            return Ok(());
        };
        let Some(subject) = self.ask("Enter subject: ")? else {
            return Ok(());
        };
        let Some(grade) = self.ask("Enter grade: ")? else {
            return Ok(());
        };

        self.store.add_grade(&GradeEntry {
            student_id,
            subject,
            grade,
        })?;
        writeln!(self.out, "Grade recorded successfully!\n")?;
        Ok(())
    }

    fn record_attendance(&mut self) -> Result<(), ShellError> {
        let Some(student_id) = self.ask("Enter student ID: ")? else {
            return Ok(());
        };
        let Some(status) = self.ask("Enter attendance (Present/Absent): ")? else {
            return Ok(());
        };

        let entry = AttendanceEntry::on(student_id, (self.today)(), status);
        self.store.add_attendance(&entry)?;
        writeln!(self.out, "Attendance recorded successfully!\n")?;
        Ok(())
    }

    fn view_students(&mut self) -> Result<(), ShellError> {
        let students = self.store.students()?;
        writeln!(self.out, "\n--- Students ---")?;
        for s in &students {
            writeln!(self.out, "ID: {}, Name: {}", s.id, s.name)?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn view_grades(&mut self) -> Result<(), ShellError> {
        let grades = self.store.grades()?;
        writeln!(self.out, "\n--- Grades ---")?;
        for g in &grades {
            writeln!(
                self.out,
                "ID: {}, Subject: {}, Grade: {}",
                g.student_id, g.subject, g.grade
            )?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn view_attendance(&mut self) -> Result<(), ShellError> {
        let marks = self.store.attendance()?;
        writeln!(self.out, "\n--- Attendance ---")?;
        for a in &marks {
            writeln!(
                self.out,
                "ID: {}, Date: {}, Status: {}",
                a.student_id, a.date, a.status
            )?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn name_lookup(&self) -> Result<NameLookup, ShellError> {
        let students = self.store.students()?;
        Ok(NameLookup::new(&students, self.config.unknown_name.clone()))
    }

    fn average_grades(&mut self) -> Result<(), ShellError> {
        let grades = self.store.grades()?;
        let names = self.name_lookup()?;
        let summary = average_grades(&grades, &names);

        writeln!(self.out, "\n--- Average Grades ---")?;
        if summary.is_empty() {
            writeln!(self.out, "No numeric grades recorded yet.\n")?;
            return Ok(());
        }

        for row in &summary.students {
            writeln!(
                self.out,
                "ID: {}, Name: {}, Average: {:.2} ({} grades)",
                row.student_id, row.name, row.average, row.count
            )?;
        }
        writeln!(self.out, "\nOverall average: {:.2}\n", summary.overall)?;
        Ok(())
    }

    fn attendance_percentage(&mut self) -> Result<(), ShellError> {
        let marks = self.store.attendance()?;
        let names = self.name_lookup()?;
        let summary = attendance_percentage(&marks, &names);

        writeln!(self.out, "\n--- Attendance Percentage ---")?;
        if summary.is_empty() {
            writeln!(self.out, "No attendance records yet.\n")?;
            return Ok(());
        }

        for row in &summary.students {
            writeln!(
                self.out,
                "ID: {}, Name: {}, Attendance: {}/{} ({:.2}%)",
                row.student_id, row.name, row.present, row.total, row.percentage
            )?;
        }
        writeln!(
            self.out,
            "\nOverall attendance percentage: {:.2}%\n",
            summary.overall
        )?;
        Ok(())
    }

    fn reset_all_data(&mut self) -> Result<(), ShellError> {
        writeln!(self.out, "\n--- Reset All Data ---")?;
        let prompt = format!(
            "Type '{}' to permanently delete all data (Enter to cancel): ",
            self.config.reset_token
        );

        match self.ask(&prompt)? {
            Some(answer) if answer == self.config.reset_token => {
                self.store.reset()?;
                writeln!(self.out, "All data reset successfully.\n")?;
            }
            _ => {
                writeln!(self.out, "Reset cancelled.\n")?;
            }
        }
        Ok(())
    }
}
