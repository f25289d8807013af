//! Append-only record store.
//!
//! Keeps students, grades and attendance in three CSV tables. Rows are
//! appended one at a time and read back with a full scan; malformed rows
//! are skipped on read.

pub mod csv;

use crate::models::{AttendanceEntry, GradeEntry, Student};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// The three tables kept by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Students,
    Grades,
    Attendance,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Students, Table::Grades, Table::Attendance];

    /// Minimum number of fields a well-formed row has.
    pub fn field_count(self) -> usize {
        match self {
            Table::Students => 2,
            Table::Grades | Table::Attendance => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Table::Students => "students",
            Table::Grades => "grades",
            Table::Attendance => "attendance",
        }
    }
}

/// Errors raised by the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {table} table at {path}: {source}")]
    Io {
        table: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Locations of the three table files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub data_dir: PathBuf,
    pub students: PathBuf,
    pub grades: PathBuf,
    pub attendance: PathBuf,
}

impl StorePaths {
    /// Default file names inside `data_dir`.
    #[cfg(test)]
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self::with_names(data_dir, "students.csv", "grades.csv", "attendance.csv")
    }

    pub fn with_names(
        data_dir: impl Into<PathBuf>,
        students: &str,
        grades: &str,
        attendance: &str,
    ) -> Self {
        let data_dir = data_dir.into();
        Self {
            students: data_dir.join(students),
            grades: data_dir.join(grades),
            attendance: data_dir.join(attendance),
            data_dir,
        }
    }

    pub fn table(&self, table: Table) -> &Path {
        match table {
            Table::Students => &self.students,
            Table::Grades => &self.grades,
            Table::Attendance => &self.attendance,
        }
    }
}

impl From<&crate::config::StorageConfig> for StorePaths {
    fn from(config: &crate::config::StorageConfig) -> Self {
        Self::with_names(
            &config.data_dir,
            &config.students_file,
            &config.grades_file,
            &config.attendance_file,
        )
    }
}

/// Flat-file store for students, grades and attendance.
#[derive(Debug, Clone)]
pub struct RecordStore {
    paths: StorePaths,
}

impl RecordStore {
    /// Open the store, creating the data directory and any missing table
    /// files. Existing files are left as they are.
    pub fn open(paths: StorePaths) -> StoreResult<Self> {
        if !paths.data_dir.as_os_str().is_empty() {
            fs::create_dir_all(&paths.data_dir).map_err(|source| StoreError::DataDir {
                path: paths.data_dir.clone(),
                source,
            })?;
        }

        let store = Self { paths };
        for table in Table::ALL {
            store.touch(table)?;
        }

        debug!("Record store opened at {}", store.paths.data_dir.display());
        Ok(store)
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    /// Append a student row.
    pub fn add_student(&self, student: &Student) -> StoreResult<()> {
        self.append(Table::Students, &[&student.id, &student.name])?;
        info!("Added student {}", student.id);
        Ok(())
    }

    /// Append a grade row.
    pub fn add_grade(&self, entry: &GradeEntry) -> StoreResult<()> {
        self.append(
            Table::Grades,
            &[&entry.student_id, &entry.subject, &entry.grade],
        )?;
        info!("Recorded grade for {} in {}", entry.student_id, entry.subject);
        Ok(())
    }

    /// Append an attendance row.
    pub fn add_attendance(&self, entry: &AttendanceEntry) -> StoreResult<()> {
        self.append(
            Table::Attendance,
            &[&entry.student_id, &entry.date, &entry.status],
        )?;
        info!("Recorded attendance for {} on {}", entry.student_id, entry.date);
        Ok(())
    }

    /// All well-formed student rows, in file order.
    pub fn students(&self) -> StoreResult<Vec<Student>> {
        Ok(self
            .read_rows(Table::Students)?
            .into_iter()
            .map(|mut row| {
                row.truncate(2);
                let name = row.pop().unwrap_or_default();
                let id = row.pop().unwrap_or_default();
                Student { id, name }
            })
            .collect())
    }

    /// All well-formed grade rows, in file order.
    pub fn grades(&self) -> StoreResult<Vec<GradeEntry>> {
        Ok(self
            .read_rows(Table::Grades)?
            .into_iter()
            .map(|row| {
                let mut fields = row.into_iter();
                GradeEntry {
                    student_id: fields.next().unwrap_or_default(),
                    subject: fields.next().unwrap_or_default(),
                    grade: fields.next().unwrap_or_default(),
                }
            })
            .collect())
    }

    /// All well-formed attendance rows, in file order.
    pub fn attendance(&self) -> StoreResult<Vec<AttendanceEntry>> {
        Ok(self
            .read_rows(Table::Attendance)?
            .into_iter()
            .map(|row| {
                let mut fields = row.into_iter();
                AttendanceEntry {
                    student_id: fields.next().unwrap_or_default(),
                    date: fields.next().unwrap_or_default(),
                    status: fields.next().unwrap_or_default(),
                }
            })
            .collect())
    }

    /// Truncate all three tables.
    pub fn reset(&self) -> StoreResult<()> {
        for table in Table::ALL {
            let path = self.paths.table(table);
            fs::write(path, b"").map_err(|source| self.io_error(table, source))?;
        }
        info!("All tables reset");
        Ok(())
    }

    fn touch(&self, table: Table) -> StoreResult<()> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.paths.table(table))
            .map(|_| ())
            .map_err(|source| self.io_error(table, source))
    }

    fn append<S: AsRef<str>>(&self, table: Table, fields: &[S]) -> StoreResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.paths.table(table))
            .map_err(|source| self.io_error(table, source))?;

        file.write_all(csv::encode_row(fields).as_bytes())
            .map_err(|source| self.io_error(table, source))
    }

    /// Read rows with at least the table's field count.
    fn read_rows(&self, table: Table) -> StoreResult<Vec<Vec<String>>> {
        let path = self.paths.table(table);
        let content = match fs::read(path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} table missing, treating as empty", table.name());
                return Ok(Vec::new());
            }
            Err(source) => return Err(self.io_error(table, source)),
        };

        let expected = table.field_count();
        let mut skipped = 0usize;
        let rows: Vec<Vec<String>> = csv::decode_rows(&content)
            .into_iter()
            .filter(|row| {
                let ok = row.len() >= expected;
                if !ok {
                    skipped += 1;
                }
                ok
            })
            .collect();

        if skipped > 0 {
            debug!("Skipped {} malformed {} rows", skipped, table.name());
        }

        Ok(rows)
    }

    fn io_error(&self, table: Table, source: std::io::Error) -> StoreError {
        StoreError::Io {
            table: table.name(),
            path: self.paths.table(table).to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, RecordStore) {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::open(StorePaths::in_dir(dir.path())).unwrap();
        (dir, store)
    }

    fn student(id: &str, name: &str) -> Student {
        Student {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_open_creates_empty_tables() {
        let (dir, store) = open_store();
        for table in Table::ALL {
            let path = store.paths().table(table);
            assert!(path.exists(), "{} missing", table.name());
            assert_eq!(fs::read(path).unwrap().len(), 0);
        }
        assert!(dir.path().join("students.csv").exists());
    }

    #[test]
    fn test_open_preserves_existing_rows() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("students.csv"), "s1,Ada\r\n").unwrap();

        let store = RecordStore::open(StorePaths::in_dir(dir.path())).unwrap();
        assert_eq!(store.students().unwrap(), vec![student("s1", "Ada")]);
    }

    #[test]
    fn test_open_creates_nested_data_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("term1").join("data");
        let store = RecordStore::open(StorePaths::in_dir(&nested)).unwrap();
        assert!(store.paths().students.exists());
    }

    #[test]
    fn test_add_then_list_students() {
        let (_dir, store) = open_store();
        store.add_student(&student("s1", "Ada")).unwrap();
        store.add_student(&student("s2", "Lovelace, Grace")).unwrap();

        assert_eq!(
            store.students().unwrap(),
            vec![student("s1", "Ada"), student("s2", "Lovelace, Grace")]
        );
    }

    #[test]
    fn test_grades_and_attendance_roundtrip() {
        let (_dir, store) = open_store();
        let grade = GradeEntry {
            student_id: "s1".to_string(),
            subject: "Math".to_string(),
            grade: "85".to_string(),
        };
        store.add_grade(&grade).unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        let mark = AttendanceEntry::on("s1", date, "Present");
        store.add_attendance(&mark).unwrap();

        assert_eq!(store.grades().unwrap(), vec![grade]);
        assert_eq!(store.attendance().unwrap(), vec![mark]);
        let raw = fs::read_to_string(&store.paths().attendance).unwrap();
        assert_eq!(raw, "s1,2024-09-02,Present\r\n");
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let (_dir, store) = open_store();
        fs::write(
            &store.paths().grades,
            "s1,Math,90\n\ns2,Art\nonly\ns3,Bio,70,extra\n",
        )
        .unwrap();
        fs::write(&store.paths().students, "s1\n,\ns2,Bob\n").unwrap();

        let grades = store.grades().unwrap();
        assert_eq!(grades.len(), 2);
        assert_eq!(grades[0].grade, "90");
        assert_eq!(grades[1].student_id, "s3");
        assert_eq!(grades[1].grade, "70");

        let students = store.students().unwrap();
        assert_eq!(students, vec![student("", ""), student("s2", "Bob")]);
    }

    #[test]
    fn test_stray_quote_keeps_following_rows() {
        let (_dir, store) = open_store();
        fs::write(
            &store.paths().grades,
            "s1,12\" ruler,80\ns2,Math,90\ns3,Art,70\n",
        )
        .unwrap();

        let grades = store.grades().unwrap();
        assert_eq!(grades.len(), 3);
        assert_eq!(grades[0].subject, "12\" ruler");
        assert_eq!(grades[2].grade, "70");
    }

    #[test]
    fn test_reset_truncates_all_tables() {
        let (_dir, store) = open_store();
        store.add_student(&student("s1", "Ada")).unwrap();
        store
            .add_grade(&GradeEntry {
                student_id: "s1".to_string(),
                subject: "Math".to_string(),
                grade: "85".to_string(),
            })
            .unwrap();
        store
            .add_attendance(&AttendanceEntry::on(
                "s1",
                NaiveDate::from_ymd_opt(2024, 9, 2).unwrap(),
                "p",
            ))
            .unwrap();

        store.reset().unwrap();

        assert!(store.students().unwrap().is_empty());
        assert!(store.grades().unwrap().is_empty());
        assert!(store.attendance().unwrap().is_empty());
        for table in Table::ALL {
            assert!(store.paths().table(table).exists());
        }
    }

    #[test]
    fn test_missing_table_reads_as_empty() {
        let (_dir, store) = open_store();
        fs::remove_file(&store.paths().grades).unwrap();
        assert!(store.grades().unwrap().is_empty());
    }

    #[test]
    fn test_custom_file_names() {
        let dir = TempDir::new().unwrap();
        let paths = StorePaths::with_names(dir.path(), "kids.csv", "marks.csv", "days.csv");
        let store = RecordStore::open(paths).unwrap();
        store.add_student(&student("s1", "Ada")).unwrap();
        assert!(dir.path().join("kids.csv").exists());
        assert!(dir.path().join("marks.csv").exists());
        assert!(dir.path().join("days.csv").exists());
    }
}
