//! Command-line front end: run the receipt extractor over OCR text dumps.

mod report;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use rust_decimal::Decimal;
use tally_core::{ExtractorConfig, Granularity};
use tally_ocr::{Extractor, FrameProcessor, JsonRecognizer, PlainTextRecognizer, TextRecognizer};
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

use report::Report;

/// Extract the receipt total and date from recognized-text dumps
#[derive(Parser)]
#[command(name = "tally")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input dumps: `.json` recognized text or plain text; `-` reads stdin
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Largest plausible total (exclusive)
    #[arg(long)]
    ceiling: Option<Decimal>,

    /// Fragment level fed to the extractor: block, line or element
    #[arg(long)]
    granularity: Option<Granularity>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = resolve_config(&cli)?;
    tracing::debug!(ceiling = %config.ceiling, granularity = %config.granularity, "config resolved");
    let extractor = Extractor::new(config);

    let mut reports = Vec::new();
    let mut failures = 0usize;
    for input in &cli.inputs {
        match process_input(input, &extractor).await {
            Ok(report) => reports.push(report),
            Err(e) => {
                tracing::error!("{}: {e:#}", input.display());
                failures += 1;
            }
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print!("{}", report.render_text());
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} inputs failed", cli.inputs.len());
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(cli: &Cli) -> anyhow::Result<ExtractorConfig> {
    let mut config = match &cli.config {
        Some(path) => ExtractorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ExtractorConfig::default(),
    };
    if let Some(ceiling) = cli.ceiling {
        config.ceiling = ceiling;
    }
    if let Some(granularity) = cli.granularity {
        config.granularity = granularity;
    }
    config.validate()?;
    Ok(config)
}

fn recognizer_for(path: &Path) -> Box<dyn TextRecognizer> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        Box::new(JsonRecognizer)
    } else {
        Box::new(PlainTextRecognizer)
    }
}

async fn process_input(input: &Path, extractor: &Extractor) -> anyhow::Result<Report> {
    tracing::info!("Processing dump: {}", input.display());

    if input == Path::new("-") {
        let mut bytes = Vec::new();
        tokio::io::stdin().read_to_end(&mut bytes).await.context("reading stdin")?;
        let processor = FrameProcessor::new(PlainTextRecognizer, extractor.clone());
        let result = processor.process_bytes(&bytes)?;
        return Ok(Report::new("-", &result));
    }

    let processor = FrameProcessor::new(recognizer_for(input), extractor.clone());
    let result = processor.process_file(input).await?;
    Ok(Report::new(input.display().to_string(), &result))
}
