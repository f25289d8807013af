//! Gradebook - flat-file student, grade and attendance tracker
//!
//! An interactive terminal tool that appends students, grades and
//! attendance marks to three CSV files and reports average grades and
//! attendance percentages.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad arguments, config, data directory, etc.)

mod analysis;
mod cli;
mod config;
mod models;
mod report;
mod shell;
mod store;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use report::SummaryReport;
use shell::{LineInput, Shell, TerminalInput};
use std::io::{self, IsTerminal};
use store::{RecordStore, StorePaths};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    init_logging(&args);

    info!("Gradebook v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        error!("Gradebook failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Handle --init-config: generate a default .gradebook.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        anyhow::bail!(
            "{} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("Created {} with default settings.", CONFIG_FILE);
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so they never interleave with the menu.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to set tracing subscriber: {}", e);
    }
}

/// Open the store and run either the summary or the interactive shell.
fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let paths = StorePaths::from(&config.storage);
    let store = RecordStore::open(paths).context("Failed to open record store")?;
    info!("Using data directory: {}", store.paths().data_dir.display());

    if args.summary {
        return write_summary(&args, &store, &config);
    }

    let stdout = io::stdout();
    if io::stdin().is_terminal() {
        let input = TerminalInput::new(io::stdout());
        Shell::new(store, config.shell, input, stdout.lock()).run()?;
    } else {
        debug!("stdin is not a terminal, reading plain lines");
        let input = LineInput::new(io::stdin().lock());
        Shell::new(store, config.shell, input, stdout.lock()).run()?;
    }

    Ok(())
}

/// Handle --summary: render both statistics and exit.
fn write_summary(args: &Args, store: &RecordStore, config: &Config) -> Result<()> {
    let report = SummaryReport::from_store(store, &config.shell.unknown_name)
        .context("Failed to read records")?;

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write summary to {}", path.display()))?;
            println!("Summary saved to: {}", path.display());
        }
        None => print!("{}", output),
    }

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
