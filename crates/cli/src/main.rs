//! gradescan CLI
//!
//! Command-line front end for analyzing scanned report cards:
//! OCR -> field and mark extraction -> summary report -> PDF with chart.
//!
//! Copyright (c) 2025 Michael A Wright

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use core_pipeline::marks::{MAX_MARK, MIN_MARK};
use core_pipeline::{MarkRules, OcrConfig, RawText, Session, TesseractRecognizer};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[allow(dead_code)]
mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\nhost: ",
    env!("BUILT_HOST"),
    "\nbuilt: ",
    env!("BUILT_TIME_UTC")
);

#[derive(Parser)]
#[command(name = "gradescan")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "Scan a student report card and analyze subject-wise performance", long_about = None)]
struct Cli {
    /// Log pipeline stages (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run OCR on a report card image and analyze it
    Analyze {
        /// Report card image
        #[arg(short, long)]
        input: PathBuf,

        /// Tesseract language code
        #[arg(long, default_value = core_pipeline::ocr::DEFAULT_LANGUAGE)]
        lang: String,

        /// Directory containing Tesseract traineddata files
        #[arg(long)]
        tessdata: Option<PathBuf>,

        /// Contrast boost applied before OCR (0 disables)
        #[arg(long, default_value_t = core_pipeline::preprocess::DEFAULT_CONTRAST)]
        contrast: f32,

        #[command(flatten)]
        rules: RuleArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Analyze text that was already recognized (one line per OCR line)
    Parse {
        /// Text file with OCR output
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        rules: RuleArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct RuleArgs {
    /// Lowest number accepted as a mark; smaller values are treated as noise
    #[arg(long, default_value_t = MIN_MARK)]
    min_mark: u32,

    /// Highest number accepted as a mark
    #[arg(long, default_value_t = MAX_MARK)]
    max_mark: u32,
}

impl RuleArgs {
    fn into_rules(self) -> Result<MarkRules> {
        anyhow::ensure!(
            self.min_mark <= self.max_mark,
            "--min-mark ({}) must not exceed --max-mark ({})",
            self.min_mark,
            self.max_mark
        );
        Ok(MarkRules {
            min_mark: self.min_mark,
            max_mark: self.max_mark,
            ..MarkRules::default()
        })
    }
}

#[derive(Args)]
struct OutputArgs {
    /// Save the report and chart as a PDF (default: report.pdf)
    #[arg(short, long, num_args = 0..=1, default_missing_value = "report.pdf")]
    output: Option<PathBuf>,

    /// Print the analysis as JSON instead of the text report
    #[arg(long)]
    json: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    tracing::debug!(
        rustc = built_info::RUSTC_VERSION,
        target = built_info::TARGET,
        "gradescan starting"
    );

    let (mut session, loaded, output) = match cli.command {
        Commands::Analyze {
            input,
            lang,
            tessdata,
            contrast,
            rules,
            output,
        } => {
            let mut session = Session::with_rules(rules.into_rules()?);
            let recognizer = TesseractRecognizer::new(OcrConfig {
                language: lang,
                datapath: tessdata,
                contrast,
            });
            let loaded = session.load_image(&recognizer, &input).is_ok();
            (session, loaded, output)
        }
        Commands::Parse {
            input,
            rules,
            output,
        } => {
            let mut session = Session::with_rules(rules.into_rules()?);
            let raw = read_text(&input)?;
            let loaded = session.load_text(&raw).is_ok();
            (session, loaded, output)
        }
    };

    if !loaded {
        eprintln!("{}", session.display());
        return Ok(ExitCode::FAILURE);
    }

    let saved = match &output.output {
        Some(path) => session.save_pdf(path).is_ok(),
        None => true,
    };

    if output.json {
        let analysis = session
            .analysis()
            .context("analysis missing after successful load")?;
        println!("{}", serde_json::to_string_pretty(analysis)?);
    } else {
        println!("{}", session.display());
    }

    if saved {
        Ok(ExitCode::SUCCESS)
    } else {
        if output.json {
            eprintln!("{}", session.display().lines().last().unwrap_or_default());
        }
        Ok(ExitCode::FAILURE)
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_text(path: &Path) -> Result<RawText> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read OCR text from {}", path.display()))?;
    Ok(RawText::new(&text))
}
