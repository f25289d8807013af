//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Gradebook - student, grade and attendance tracker
///
/// Keeps students, grades and attendance in three CSV files and computes
/// average grades and attendance percentages. Runs an interactive menu
/// unless --summary is given.
///
/// Examples:
///   gradebook
///   gradebook --data-dir ./term1
///   gradebook --summary --format json --output summary.json
///   gradebook --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Directory holding students.csv, grades.csv and attendance.csv
    ///
    /// Defaults to the value in .gradebook.toml, or the current directory.
    #[arg(short, long, value_name = "DIR", env = "GRADEBOOK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .gradebook.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the grade and attendance summary and exit
    #[arg(long)]
    pub summary: bool,

    /// Summary format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write the summary to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Generate a default .gradebook.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the summary report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.output.is_some() && !self.summary {
            return Err("--output requires --summary".to_string());
        }

        if self.format != OutputFormat::Markdown && !self.summary {
            return Err("--format requires --summary".to_string());
        }

        if let Some(ref data_dir) = self.data_dir {
            if data_dir.exists() && !data_dir.is_dir() {
                return Err(format!(
                    "Data path is not a directory: {}",
                    data_dir.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            data_dir: None,
            config: None,
            verbose: false,
            quiet: false,
            summary: false,
            format: OutputFormat::Markdown,
            output: None,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_defaults() {
        let args = Args::try_parse_from(["gradebook"]).unwrap();
        assert!(!args.summary);
        assert_eq!(args.format, OutputFormat::Markdown);
        assert!(args.output.is_none());
    }

    #[test]
    fn test_parse_summary_flags() {
        let args = Args::try_parse_from([
            "gradebook",
            "--summary",
            "--format",
            "json",
            "-o",
            "out.json",
            "-d",
            "records",
        ])
        .unwrap();
        assert!(args.summary);
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.output, Some(PathBuf::from("out.json")));
        assert_eq!(args.data_dir, Some(PathBuf::from("records")));
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_output_without_summary() {
        let mut args = make_args();
        args.output = Some(PathBuf::from("report.md"));
        assert!(args.validate().is_err());

        args.summary = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_format_without_summary() {
        let mut args = make_args();
        args.format = OutputFormat::Json;
        assert_eq!(
            args.validate(),
            Err("--format requires --summary".to_string())
        );

        args.summary = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_data_dir_is_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut args = make_args();
        args.data_dir = Some(file.path().to_path_buf());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::WARN);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
