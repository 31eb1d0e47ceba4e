// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};

use crate::app_config::{Config, LogLevel};
use crate::document_store::{ConfirmationLevel, XliffDocument};
use crate::providers::languagetool::LanguageTool;
use crate::qa::{CheckKind, Glossary, QaService};

mod app_config;
mod codec;
mod document_store;
mod errors;
mod language_utils;
mod providers;
mod qa;
mod xml_tree;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every segment in the document
    Extract {
        /// Path to the document
        file: PathBuf,

        /// Emit segments as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show document statistics (languages, status counts, locks)
    Stats {
        /// Path to the document
        file: PathBuf,
    },

    /// Run QA checks over all segments
    Qa {
        /// Path to the document
        file: PathBuf,

        /// Comma-separated subset of checks to run
        #[arg(long, value_delimiter = ',')]
        checks: Option<Vec<String>>,

        /// Glossary JSON file for the terminology check
        #[arg(long)]
        glossary: Option<PathBuf>,

        /// Include the spelling check (requires a reachable backend)
        #[arg(long)]
        spelling: bool,

        /// Language code for spell checking (defaults to the document's
        /// target language)
        #[arg(long)]
        language: Option<String>,
    },

    /// Update one segment's target text
    Update {
        /// Path to the document
        file: PathBuf,

        /// Segment id to update
        segment_id: String,

        /// New target text (with tag placeholders where required)
        text: String,

        /// Replace the target with plain text, discarding inline tags
        #[arg(long)]
        discard_tags: bool,

        /// Write the result to a different file instead of in place
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Set one segment's confirmation level without changing its text
    SetStatus {
        /// Path to the document
        file: PathBuf,

        /// Segment id to update
        segment_id: String,

        /// One of: Draft, Translated, RejectedTranslation,
        /// ApprovedTranslation, RejectedSignOff, ApprovedSignOff
        status: String,
    },
}

/// xliffedit - segment-level editing and QA for bilingual XLIFF documents
#[derive(Parser, Debug)]
#[command(name = "xliffedit")]
#[command(version = "1.0.0")]
#[command(about = "Segment-level editing and QA for bilingual XLIFF documents")]
#[command(long_about = "xliffedit reads bilingual XLIFF documents, exposes their segments for \
editing with inline tags represented as {id}...{/id} placeholders, validates edited text against \
the original tag inventory, and runs deterministic QA checks.

EXAMPLES:
    xliffedit extract job.sdlxliff                   # List all segments
    xliffedit extract --json job.sdlxliff            # Same, as JSON
    xliffedit stats job.sdlxliff                     # Status counts
    xliffedit qa job.sdlxliff                        # Default QA checks
    xliffedit qa --checks numbers,brackets job.sdlxliff
    xliffedit qa --spelling --language de-DE job.sdlxliff
    xliffedit update job.sdlxliff 42 '{5}Acme{/5} Meetings'
    xliffedit set-status job.sdlxliff 42 ApprovedTranslation

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a
    different config file with --config. Missing files fall back to
    defaults.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// Custom logger writing timestamped, colored lines to stderr
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    fn color_code(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::color_code(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

#[tokio::main]
async fn main() -> Result<()> {
    let options = CommandLineOptions::parse();

    let mut config = Config::from_file_or_default(&options.config_path)?;
    if let Some(cli_level) = options.log_level {
        config.log_level = cli_level.into();
    }
    CustomLogger::init(config.log_level.to_level_filter())
        .map_err(|e| anyhow!("Failed to initialize logger: {}", e))?;

    match options.command {
        Commands::Extract { file, json } => run_extract(&config, &file, json),
        Commands::Stats { file } => run_stats(&config, &file),
        Commands::Qa {
            file,
            checks,
            glossary,
            spelling,
            language,
        } => run_qa(&config, &file, checks, glossary, spelling, language).await,
        Commands::Update {
            file,
            segment_id,
            text,
            discard_tags,
            output,
        } => run_update(&config, &file, &segment_id, &text, discard_tags, output),
        Commands::SetStatus {
            file,
            segment_id,
            status,
        } => run_set_status(&config, &file, &segment_id, &status),
    }
}

fn open_document(config: &Config, file: &PathBuf) -> Result<XliffDocument> {
    let document = XliffDocument::open_with_limits(file, config.limits())
        .with_context(|| format!("Failed to open {}", file.display()))?;
    Ok(document.with_backup_on_save(config.backup_on_save))
}

fn run_extract(config: &Config, file: &PathBuf, json: bool) -> Result<()> {
    let mut document = open_document(config, file)?;
    let segments = document.extract_all();

    if json {
        println!("{}", serde_json::to_string_pretty(&segments)?);
        return Ok(());
    }

    for segment in &segments {
        let status = segment
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let lock_marker = if segment.locked { " [locked]" } else { "" };
        println!(
            "{} ({}){}: {} => {}",
            segment.segment_id, status, lock_marker, segment.source_tagged, segment.target_tagged
        );
    }
    info!("{} segment(s)", segments.len());
    Ok(())
}

fn run_stats(config: &Config, file: &PathBuf) -> Result<()> {
    let document = open_document(config, file)?;
    let stats = document.statistics();
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

async fn run_qa(
    config: &Config,
    file: &PathBuf,
    checks: Option<Vec<String>>,
    glossary_path: Option<PathBuf>,
    spelling: bool,
    language: Option<String>,
) -> Result<()> {
    let mut document = open_document(config, file)?;
    let segments = document.extract_all();

    let mut qa_config = config.qa.clone();
    if let Some(names) = checks {
        let mut selected = Vec::new();
        for name in names {
            selected.push(name.trim().parse::<CheckKind>()?);
        }
        qa_config.checks = selected;
    }
    if spelling && !qa_config.checks.contains(&CheckKind::Spelling) {
        qa_config.checks.push(CheckKind::Spelling);
    }

    let mut service = QaService::with_config(qa_config);
    if let Some(path) = glossary_path {
        service = service.with_glossary(Glossary::from_json_file(&path)?);
    }

    let report = if spelling {
        let code = language
            .or_else(|| config.spelling.language.clone())
            .or_else(|| document.metadata().target_language)
            .ok_or_else(|| {
                anyhow!("No language for spell checking: pass --language or set one in config")
            })?;
        let code = language_utils::normalize_spelling_language(&code)?;
        let backend = LanguageTool::new(config.spelling.endpoint.clone());
        service
            .run_checks_with_spelling(&segments, &backend, &code)
            .await
    } else {
        service.run_checks(&segments)
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    if report.segments_with_issues > 0 {
        warn!("{}", report.summary_line());
    } else {
        info!("{}", report.summary_line());
    }
    Ok(())
}

fn run_update(
    config: &Config,
    file: &PathBuf,
    segment_id: &str,
    text: &str,
    discard_tags: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut document = open_document(config, file)?;

    let outcome = document.update_segment(segment_id, text, !discard_tags);
    for warning in &outcome.warnings {
        warn!("{}", warning);
    }

    if !outcome.succeeded() {
        return Err(anyhow!("{}", outcome.message));
    }

    document.save(output.as_deref())?;
    info!("{}", outcome.message);
    Ok(())
}

fn run_set_status(config: &Config, file: &PathBuf, segment_id: &str, status: &str) -> Result<()> {
    let level: ConfirmationLevel = status.parse()?;
    let mut document = open_document(config, file)?;

    if !document.set_segment_status(segment_id, level) {
        return Err(anyhow!("Segment '{}' not found", segment_id));
    }

    document.save(None)?;
    info!("Set segment '{}' to {}", segment_id, level);
    Ok(())
}
