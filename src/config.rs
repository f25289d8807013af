//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.gradebook.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".gradebook.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where the tables live.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Interactive shell settings.
    #[serde(default)]
    pub shell: ShellConfig,
}

/// Table file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the three tables.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_students_file")]
    pub students_file: String,

    #[serde(default = "default_grades_file")]
    pub grades_file: String,

    #[serde(default = "default_attendance_file")]
    pub attendance_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            students_file: default_students_file(),
            grades_file: default_grades_file(),
            attendance_file: default_attendance_file(),
        }
    }
}

impl StorageConfig {
    /// Anchor a relative `data_dir` at the directory holding the config file.
    fn anchor_data_dir(&mut self, config_dir: &Path) {
        if config_dir.as_os_str().is_empty() || self.data_dir.is_absolute() {
            return;
        }
        self.data_dir = if self.data_dir == Path::new(".") {
            config_dir.to_path_buf()
        } else {
            config_dir.join(&self.data_dir)
        };
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_students_file() -> String {
    "students.csv".to_string()
}

fn default_grades_file() -> String {
    "grades.csv".to_string()
}

fn default_attendance_file() -> String {
    "attendance.csv".to_string()
}

/// Interactive shell settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Exact phrase required to reset all data.
    #[serde(default = "default_reset_token")]
    pub reset_token: String,

    /// Name shown for ids with no student row.
    #[serde(default = "default_unknown_name")]
    pub unknown_name: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            reset_token: default_reset_token(),
            unknown_name: default_unknown_name(),
        }
    }
}

fn default_reset_token() -> String {
    "RESET".to_string()
}

fn default_unknown_name() -> String {
    crate::analysis::UNKNOWN_NAME.to_string()
}

impl Config {
    /// Load configuration from a file path.
    ///
    /// A relative `storage.data_dir` is taken relative to the file's own
    /// directory, not the working directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if let Some(config_dir) = path.parent() {
            config.storage.anchor_data_dir(config_dir);
        }

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.gradebook.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data_dir) = args.data_dir {
            self.storage.data_dir = data_dir.clone();
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage.data_dir, PathBuf::from("."));
        assert_eq!(config.storage.students_file, "students.csv");
        assert_eq!(config.storage.grades_file, "grades.csv");
        assert_eq!(config.storage.attendance_file, "attendance.csv");
        assert_eq!(config.shell.reset_token, "RESET");
        assert_eq!(config.shell.unknown_name, "<unknown>");
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[storage]
data_dir = "records"
grades_file = "marks.csv"

[shell]
reset_token = "WIPE"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.storage.data_dir, PathBuf::from("records"));
        assert_eq!(config.storage.grades_file, "marks.csv");
        assert_eq!(config.storage.students_file, "students.csv");
        assert_eq!(config.shell.reset_token, "WIPE");
        assert_eq!(config.shell.unknown_name, "<unknown>");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.shell.reset_token, "RESET");
        assert_eq!(config.storage.attendance_file, "attendance.csv");
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[storage]"));
        assert!(toml_str.contains("[shell]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.shell.reset_token, "RESET");
    }

    #[test]
    fn test_load_from_dir() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[shell]\nunknown_name = \"(none)\"\n",
        )
        .unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.shell.unknown_name, "(none)");
    }

    #[test]
    fn test_load_resolves_data_dir_next_to_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("term1.toml");

        std::fs::write(&path, "[storage]\ndata_dir = \"records\"\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.storage.data_dir, dir.path().join("records"));

        std::fs::write(&path, "[shell]\nreset_token = \"WIPE\"\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.storage.data_dir, dir.path());
    }

    #[test]
    fn test_load_keeps_absolute_data_dir() {
        let dir = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        std::fs::write(
            &path,
            format!(
                "[storage]\ndata_dir = {:?}\n",
                elsewhere.path().display().to_string()
            ),
        )
        .unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.storage.data_dir, elsewhere.path());
    }

    #[test]
    fn test_cli_data_dir_overrides_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[storage]\ndata_dir = \"records\"\n").unwrap();

        let mut config = Config::load(&path).unwrap();
        let args = Args::try_parse_from(["gradebook", "--data-dir", "term2"]).unwrap();
        config.merge_with_args(&args);
        assert_eq!(config.storage.data_dir, PathBuf::from("term2"));
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[storage\n").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
