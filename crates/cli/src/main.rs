use std::fs;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use json_adapter::JsonResponseWriter;
use markdown_adapter::MarkdownWriterAdapter;
use mention_core::application::ScanServiceImpl;
use mention_core::ports::{DocumentSource, RecordWriter};
use mention_core::{Extractor, ExtractorConfig, ScanResponse};
use snapshot_adapter::SnapshotFileSource;
use tracing::{error, info};

const EMPTY_HINT: &str =
    "No messages found. Scroll down to load messages, then capture the page again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Markdown,
}

/// Extracts message records (sender, context, body) from a captured page
#[derive(Parser, Debug)]
#[command(name = "mention-scan")]
#[command(about = "Extracts message records from a rendered page capture (JSON snapshot or annotated HTML)")]
struct Cli {
    /// Path to the page capture (.json snapshot or .html with rendered-size attributes)
    #[arg(short = 'i', long = "input", required = true)]
    input: PathBuf,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Output file (JSON) or folder (Markdown); JSON goes to stdout when omitted
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// JSON file replacing the default selector and grammar tables
    #[arg(long = "rules")]
    rules: Option<PathBuf>,

    /// Keep the timestamp token of each message
    #[arg(long = "capture-time")]
    capture_time: bool,

    /// How long to wait for the scan to respond
    #[arg(long = "timeout-ms", default_value_t = 5000)]
    timeout_ms: u64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(response) if response.count == 0 => {
            eprintln!("{EMPTY_HINT}");
        }
        Ok(response) => {
            info!(count = response.count, "Scan delivered");
        }
        Err(ScanFailure::Timeout(waited)) => {
            error!(timeout_ms = waited.as_millis() as u64, "Scan did not respond");
            eprintln!(
                "The page did not respond within {} ms. Reload the page, capture it again and retry.",
                waited.as_millis()
            );
            std::process::exit(2);
        }
        Err(ScanFailure::Failed(e)) => {
            eprintln!("Error during scan: {e:#}");
            std::process::exit(1);
        }
    }
}

enum ScanFailure {
    Timeout(Duration),
    Failed(anyhow::Error),
}

impl From<anyhow::Error> for ScanFailure {
    fn from(e: anyhow::Error) -> Self {
        ScanFailure::Failed(e)
    }
}

fn run(cli: &Cli) -> std::result::Result<ScanResponse, ScanFailure> {
    let extractor = Extractor::new(&load_config(cli)?).context("Invalid extraction rules")?;

    // Instantiate concrete implementations of secondary adapters
    let source: Box<dyn DocumentSource> = Box::new(SnapshotFileSource::new(cli.input.clone()));
    let writer: Box<dyn RecordWriter> = match (cli.format, &cli.output) {
        (OutputFormat::Json, Some(path)) => Box::new(JsonResponseWriter::to_file(path.clone())),
        (OutputFormat::Json, None) => Box::new(JsonResponseWriter::to_stdout()),
        (OutputFormat::Markdown, Some(path)) => Box::new(MarkdownWriterAdapter::new(
            path.to_string_lossy().to_string(),
        )),
        (OutputFormat::Markdown, None) => {
            return Err(anyhow!("--output <folder> is required for markdown output").into());
        }
    };

    // Instantiate the core business service with dependency injection
    let service = ScanServiceImpl::new(source, writer, extractor);

    // The scan is not cancellable; on timeout the worker is left to finish on its own.
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(service.execute_scan());
    });

    let timeout = Duration::from_millis(cli.timeout_ms);
    match rx.recv_timeout(timeout) {
        Ok(Ok(response)) => Ok(response),
        Ok(Err(e)) => Err(anyhow!(e).context("Scan failed").into()),
        Err(mpsc::RecvTimeoutError::Timeout) => Err(ScanFailure::Timeout(timeout)),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(anyhow!("Scan worker exited without a response").into())
        }
    }
}

fn load_config(cli: &Cli) -> Result<ExtractorConfig> {
    let mut config = match &cli.rules {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read rules file {}", path.display()))?;
            ExtractorConfig::from_json(&raw)
                .with_context(|| format!("Failed to parse rules file {}", path.display()))?
        }
        None => ExtractorConfig::default(),
    };
    if cli.capture_time {
        config.capture_time = true;
    }
    Ok(config)
}
