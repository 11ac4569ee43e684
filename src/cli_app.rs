//! Top-level CLI definition and dispatch.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use serde_json::Value;
use thiserror::Error;

use delete_after::core::config::Config;
use delete_after::core::errors::{DeleteAfterError, RootProblem};
use delete_after::core::paths::validate_root_directory;
use delete_after::logger::activity::{ActivityLogger, Level, LogRecord, LogSink, LOGGER_NAME};
use delete_after::logger::file::{FileLogConfig, FileSink};
use delete_after::scanner::deletion::DeletionConfig;
use delete_after::scanner::walker::TreeScanner;

const FORMAT_HELP: &str = "\
.delete_after file format:
    <number> <unit>

Examples:
    30 minutes
    2.5 hours
    7 days
    1 week

Valid units: minute(s), hour(s), day(s), week(s), month(s), year(s) (and abbreviations)";

/// Scan directories and delete old files based on .delete_after specifications.
#[derive(Debug, Parser)]
#[command(
    name = "delete-after",
    version,
    about = "Scan directories and delete old files based on .delete_after specifications",
    long_about = None,
    after_help = FORMAT_HELP
)]
pub struct Cli {
    /// Root directory to scan.
    #[arg(value_name = "DIRECTORY", default_value = ".")]
    directory: PathBuf,
    /// Show what would be deleted without actually deleting files.
    #[arg(long)]
    dry_run: bool,
    /// Enable verbose logging (per-file keep/skip decisions).
    #[arg(short, long)]
    verbose: bool,
    /// Override config file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Override the log file path.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
    /// Print the final statistics as JSON.
    #[arg(long)]
    json: bool,
    /// Disable colored output.
    #[arg(long)]
    no_color: bool,
    /// Print shell completions and exit.
    #[arg(long, value_name = "SHELL", exclusive = true)]
    completions: Option<CompletionShell>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type. Every variant exits with status 1.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input (bad root directory).
    #[error("{0}")]
    User(String),
    /// Configuration or environment failure.
    #[error("{0}")]
    Runtime(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// Echoes records to stdout with a colored level tag.
struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn write(&self, record: &LogRecord) {
        let level = match record.level {
            Level::Debug => record.level.as_str().dimmed(),
            Level::Info => record.level.as_str().green(),
            Level::Warning => record.level.as_str().yellow(),
            Level::Error => record.level.as_str().red().bold(),
        };
        let _ = writeln!(
            io::stdout(),
            "{} - {LOGGER_NAME} - {level} - {}",
            record.ts.format("%Y-%m-%d %H:%M:%S,%3f"),
            record.message
        );
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

/// Validate the root, build the logger, run one scan.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        let binary_name = command.get_name().to_string();
        generate(shell, &mut command, binary_name, &mut io::stdout());
        return Ok(());
    }

    let root = validate_root_directory(&cli.directory)
        .map_err(|e| CliError::User(root_error_message(&e)))?;

    let mut config =
        Config::load(cli.config.as_deref()).map_err(|e| CliError::Runtime(e.to_string()))?;
    config.scan.dry_run |= cli.dry_run;
    config.scan.verbose |= cli.verbose;
    if let Some(path) = &cli.log_file {
        config.logging.path.clone_from(path);
    }

    let mode = output_mode(cli);
    let mut logger = ActivityLogger::for_verbosity(config.scan.verbose)
        .with_sink(FileSink::open(FileLogConfig::from(&config.logging)));
    if mode == OutputMode::Human && config.logging.echo_stdout {
        logger = logger.with_sink(ConsoleSink);
    }

    install_interrupt_handler();

    let report = TreeScanner::new(
        DeletionConfig {
            dry_run: config.scan.dry_run,
        },
        &logger,
    )
    .run(&root);

    if mode == OutputMode::Json {
        write_json_line(&serde_json::to_value(&report)?)?;
    }
    Ok(())
}

/// Exit cleanly on Ctrl-C. In-flight file operations are not rolled back.
#[cfg(unix)]
fn install_interrupt_handler() {
    use signal_hook::consts::SIGINT;
    use signal_hook::iterator::Signals;

    match Signals::new([SIGINT]) {
        Ok(mut signals) => {
            std::thread::spawn(move || {
                if signals.forever().next().is_some() {
                    println!("\nInterrupted by user");
                    std::process::exit(0);
                }
            });
        }
        Err(e) => eprintln!("[DA-SIGNAL] failed to register SIGINT: {e}"),
    }
}

#[cfg(not(unix))]
fn install_interrupt_handler() {}

fn root_error_message(err: &DeleteAfterError) -> String {
    match err {
        DeleteAfterError::InvalidRootDirectory { path, reason } => match reason {
            RootProblem::Missing => format!("Directory {} does not exist", path.display()),
            RootProblem::NotADirectory => format!("{} is not a directory", path.display()),
            RootProblem::Inaccessible(msg) => format!("Cannot scan {}: {msg}", path.display()),
        },
        other => other.to_string(),
    }
}

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("DELETE_AFTER_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }
    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        _ => OutputMode::Human,
    }
}
