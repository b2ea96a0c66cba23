//! CLI binary for examprep.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `AnalysisConfig`, runs the analysis, and prints or exports the plan.

use anyhow::{Context, Result};
use clap::Parser;
use examprep::{analyze, export_pdf_to_file, render_plan, AnalysisConfig, UploadedDocument};
use futures::future::try_join_all;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Analyze two past papers against an inline syllabus
  examprep --syllabus "Unit 1: Kinematics. Unit 2: Optics." 2022.pdf 2023.pdf

  # Syllabus from a file, plan written as PDF
  examprep --syllabus-file syllabus.txt papers/*.pdf -o study-plan.pdf

  # Scanned papers work too
  examprep --syllabus-file syllabus.txt scan-p1.jpg scan-p2.png

  # Structured JSON to stdout
  examprep --syllabus-file syllabus.txt 2023.pdf --json > plan.json

  # Go through a relay instead of calling the API directly
  examprep --provider relay --relay-url https://prep.example.com/api/analyze \
      --syllabus-file syllabus.txt 2023.pdf

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY       API key for the direct provider
  EXAMPREP_RELAY_URL   Relay endpoint (used when no API key is set)
  EXAMPREP_MODEL       Override the model ID

SETUP:
  1. Set API key:   export GEMINI_API_KEY=...
  2. Analyze:       examprep --syllabus-file syllabus.txt papers/*.pdf -o plan.pdf
"#;

/// Analyze past exam papers against a syllabus and produce a study plan.
#[derive(Parser, Debug)]
#[command(
    name = "examprep",
    version,
    about = "Turn a syllabus and past exam papers into a prioritized study plan",
    long_about = "Analyze past exam papers (PDFs or scanned images) against a syllabus using a \
generative model and produce a prioritized, topic-wise study plan with every extracted question.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Exam paper files: PDF, PNG, or JPEG.
    #[arg(required = true)]
    papers: Vec<PathBuf>,

    /// Syllabus text, inline.
    #[arg(short, long, conflicts_with = "syllabus_file")]
    syllabus: Option<String>,

    /// Read the syllabus from a text file.
    #[arg(long, env = "EXAMPREP_SYLLABUS_FILE")]
    syllabus_file: Option<PathBuf>,

    /// Write the plan as a PDF to this file.
    #[arg(short, long, env = "EXAMPREP_OUTPUT")]
    output: Option<PathBuf>,

    /// Output the plan as JSON instead of formatted text.
    #[arg(long, env = "EXAMPREP_JSON")]
    json: bool,

    /// Provider: gemini or relay. Auto-detected from the environment if not set.
    #[arg(long, env = "EXAMPREP_PROVIDER")]
    provider: Option<String>,

    /// Model ID for the direct provider.
    #[arg(long, env = "EXAMPREP_MODEL")]
    model: Option<String>,

    /// Relay endpoint URL.
    #[arg(long, env = "EXAMPREP_RELAY_URL")]
    relay_url: Option<String>,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "EXAMPREP_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Retries after the first attempt on transient provider failures.
    #[arg(long, env = "EXAMPREP_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// Per-file size ceiling in MiB.
    #[arg(long, env = "EXAMPREP_MAX_FILE_SIZE_MB", default_value_t = 10)]
    max_file_size_mb: u64,

    /// Provider call timeout in seconds.
    #[arg(long, env = "EXAMPREP_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "EXAMPREP_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the plan itself.
    #[arg(short, long, env = "EXAMPREP_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Syllabus ─────────────────────────────────────────────────────────
    let syllabus = match (&cli.syllabus, &cli.syllabus_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read syllabus from {}", path.display()))?,
        (None, None) => anyhow::bail!("Provide a syllabus with --syllabus or --syllabus-file"),
    };

    // ── Load papers ──────────────────────────────────────────────────────
    let documents: Vec<UploadedDocument> =
        try_join_all(cli.papers.iter().map(UploadedDocument::from_path))
            .await
            .context("Failed to load exam papers")?;

    let config = AnalysisConfig::builder()
        .temperature(cli.temperature)
        .max_retries(cli.max_retries)
        .max_file_size_bytes(cli.max_file_size_mb * 1024 * 1024)
        .api_timeout_secs(cli.api_timeout);
    let config = apply_optionals(config, &cli)
        .build()
        .context("Invalid configuration")?;

    // ── Analyze ──────────────────────────────────────────────────────────
    let spinner = if cli.quiet || cli.json {
        None
    } else {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Analyzing");
        bar.set_message(format!("{} paper(s)", documents.len()));
        bar.enable_steady_tick(Duration::from_millis(80));
        Some(bar)
    };

    let result = analyze(&syllabus, &documents, &config).await;
    if let Some(ref bar) = spinner {
        bar.finish_and_clear();
    }
    let plan = result.context("Analysis failed")?;

    // ── Output ───────────────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::to_string_pretty(&plan).context("Failed to serialise plan")?;
        println!("{json}");
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(render_plan(&plan).as_bytes())
            .context("Failed to write to stdout")?;
    }

    if let Some(ref output_path) = cli.output {
        export_pdf_to_file(&plan, output_path)
            .await
            .context("Failed to export PDF")?;
        if !cli.quiet {
            eprintln!(
                "{} {} questions, {} modules  →  {}",
                green("✔"),
                bold(&plan.extracted_questions.len().to_string()),
                plan.modules.len(),
                bold(&output_path.display().to_string()),
            );
        }
    } else if !cli.quiet && !cli.json {
        eprintln!(
            "{} {} questions across {} modules  {}",
            green("✔"),
            bold(&plan.extracted_questions.len().to_string()),
            plan.modules.len(),
            dim("(use -o plan.pdf to export)"),
        );
    }

    Ok(())
}

/// Apply the optional CLI flags the builder only needs when present.
fn apply_optionals(
    mut builder: examprep::AnalysisConfigBuilder,
    cli: &Cli,
) -> examprep::AnalysisConfigBuilder {
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref url) = cli.relay_url {
        builder = builder.relay_url(url);
    }
    builder
}
