//! CLI entry point for the Kabutan analyzer.
//!
//! Fetches financial metrics for a list of security codes, grades each A–E,
//! and exports the report as an Excel-friendly CSV.

use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use kabutan_analyzer::{
    output::write_report,
    pipeline::{LogProgress, PacingPolicy, Pipeline},
    source::KabutanSource,
};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "kabutan_analyzer")]
#[command(about = "A tool to fetch and grade stock financials from Kabutan", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch metrics for the given codes, grade them, and export a CSV report
    Analyze {
        /// Security codes, comma- or newline-separated (e.g. "9432, 1332, 2914")
        #[arg(value_name = "CODES")]
        codes: Option<String>,

        /// Read codes from a text file instead of the command line
        #[arg(short, long)]
        input: Option<String>,

        /// CSV file to write the report to
        #[arg(short, long, default_value = "analysis_result.csv")]
        output: String,

        /// Minimum pause between fetches, in milliseconds
        #[arg(long, default_value_t = 1500)]
        delay_ms: u64,

        /// Per-request timeout, in seconds
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/kabutan_analyzer.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("kabutan_analyzer.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            codes,
            input,
            output,
            delay_ms,
            timeout_secs,
        } => {
            let raw = match (codes, input) {
                (Some(text), None) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)?,
                (Some(_), Some(_)) => bail!("pass codes either inline or via --input, not both"),
                (None, None) => bail!("no codes given; pass them inline or via --input"),
            };

            let codes = split_codes(&raw);
            if codes.is_empty() {
                bail!("no usable codes after splitting input");
            }

            analyze(codes, &output, delay_ms, timeout_secs).await?;
        }
    }

    Ok(())
}

/// Splits free text into trimmed, non-empty code tokens. Newlines and commas
/// both act as separators, matching how users paste watchlists.
fn split_codes(raw: &str) -> Vec<String> {
    raw.replace('\n', ",")
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// Runs the full batch and writes the CSV report.
#[tracing::instrument(skip(codes), fields(batch_size = codes.len(), output))]
async fn analyze(codes: Vec<String>, output: &str, delay_ms: u64, timeout_secs: u64) -> Result<()> {
    let source = KabutanSource::with_timeout(Duration::from_secs(timeout_secs));
    let pacing = PacingPolicy::after(Duration::from_millis(delay_ms));
    let pipeline = Pipeline::new(source).with_pacing(pacing);

    // Ctrl+C stops the batch after the code currently in flight.
    let cancel = pipeline.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping after current code");
            cancel.cancel();
        }
    });

    info!(codes = codes.len(), delay_ms, "Starting analysis batch");
    let batch = pipeline.run(&codes, &LogProgress).await;

    write_report(output, &batch)?;
    info!(
        succeeded = batch.succeeded(),
        failed = batch.failed(),
        elapsed_secs = (chrono::Utc::now() - batch.started_at).num_seconds(),
        output,
        "Batch complete"
    );

    Ok(())
}
