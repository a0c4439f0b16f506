//! CLI binary for docsum.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `SummarizerConfig` / `RequestParameters` and prints the result.

use anyhow::{Context, Result};
use clap::Parser;
use docsum::{
    save_output, spawn, FormattedOutput, HostCapabilities, RequestParameters, StatusEvent,
    SummarizerConfig, SystemHost, WorkflowState,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── Spinner fed by workflow status events ────────────────────────────────────

fn new_spinner() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed:.dim}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
    bar.set_style(style);
    bar.set_message(WorkflowState::Idle.status_message());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Apply one status event. Runs on the main task only.
fn show_event(bar: Option<&ProgressBar>, event: &StatusEvent, quiet: bool) {
    match event {
        StatusEvent::State { state, message } => {
            if let Some(bar) = bar {
                if !state.is_terminal() {
                    bar.set_message(message.clone());
                }
            }
        }
        StatusEvent::Warning(msg) if !quiet => {
            let line = format!("{} {}", yellow("⚠"), msg);
            match bar {
                Some(bar) => bar.println(line),
                None => eprintln!("{line}"),
            }
        }
        StatusEvent::Warning(_) => {}
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Structured summary (TITLE / TL;DR / SUMMARY) to stdout
  docsum report.pdf

  # Shorter summary focused on some keywords
  docsum --length 10 --keywords "revenue, churn" report.docx

  # Ask a question instead of summarising
  docsum --question "What is the conclusion?" paper.pdf

  # Use another local model and save the result
  docsum --model mistral:7b notes.txt -o summaries/notes.txt

  # Machine-readable output with run statistics
  docsum --json report.pdf > report.json

  # Housekeeping
  docsum --list-models
  docsum --check-ocr

ENVIRONMENT VARIABLES:
  DOCSUM_MODEL        Model identifier (default: llama3.2:3b)
  DOCSUM_ENDPOINT     Generate endpoint (default: http://localhost:11434/api/generate)
  DOCSUM_TIMEOUT      Inference timeout in seconds (default: 600)
  DOCSUM_WORD_LIMIT   Summary word cap (default: 1000)
  DOCSUM_OCR_BINARY   OCR executable (default: tesseract)
  PDFIUM_LIB_PATH     Path to the pdfium shared library (needed for .pdf input)
  RUST_LOG            Override the log filter

SETUP:
  1. Start Ollama:    ollama serve
  2. Pull a model:    ollama pull llama3.2:3b
  3. Summarise:       docsum document.pdf

  Scanned PDFs need Tesseract on PATH; check with `docsum --check-ocr`.
"#;

/// Summarise documents or answer questions about them with a local LLM.
#[derive(Parser, Debug)]
#[command(
    name = "docsum",
    version,
    about = "Summarise .txt, .docx and .pdf files with a local Ollama model",
    long_about = "Extract text from a .txt, .docx or .pdf file (with OCR for scanned PDFs) and \
send it to a locally running Ollama server. Produces a structured summary (title, TL;DR, \
detailed summary) or, with --question, an answer taken strictly from the document.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Document to process (.txt, .docx or .pdf).
    #[arg(required_unless_present_any = ["list_models", "check_ocr"])]
    input: Option<PathBuf>,

    /// Answer this question instead of summarising.
    #[arg(short = 'Q', long)]
    question: Option<String>,

    /// Target SUMMARY length as a percentage of the source word count (1–100).
    #[arg(
        short,
        long,
        default_value = "20",
        long_help = "Target SUMMARY length as a percentage of the source word count.\n\
          Accepts 1–100, with or without a trailing '%'. Anything else falls back to 20."
    )]
    length: String,

    /// Comma-separated keywords the summary should focus on.
    #[arg(short, long, default_value = "")]
    keywords: String,

    /// Ollama model identifier.
    #[arg(short, long, env = "DOCSUM_MODEL")]
    model: Option<String>,

    /// Full URL of the generate endpoint.
    #[arg(long, env = "DOCSUM_ENDPOINT", default_value = docsum::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Inference timeout in seconds.
    #[arg(long, env = "DOCSUM_TIMEOUT", default_value_t = 600)]
    timeout: u64,

    /// Truncate the summary (or answer) to at most this many words [default: 1000].
    #[arg(long, env = "DOCSUM_WORD_LIMIT")]
    word_limit: Option<usize>,

    /// Do not truncate the summary (or answer).
    #[arg(long, conflicts_with = "word_limit")]
    no_word_limit: bool,

    /// OCR executable used for scanned PDFs.
    #[arg(long, env = "DOCSUM_OCR_BINARY", default_value = "tesseract")]
    ocr_binary: String,

    /// Also write the result to this file.
    #[arg(short, long, env = "DOCSUM_OUTPUT")]
    output: Option<PathBuf>,

    /// Print structured JSON (fields + stats) instead of text.
    #[arg(long, env = "DOCSUM_JSON")]
    json: bool,

    /// List locally installed models and exit.
    #[arg(long)]
    list_models: bool,

    /// Report whether the OCR engine is available and exit.
    #[arg(long)]
    check_ocr: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "DOCSUM_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCSUM_VERBOSE")]
    verbose: bool,

    /// Suppress all output except the result and errors.
    #[arg(short, long, env = "DOCSUM_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner provides the feedback that matters; keep INFO logs out of
    // its way unless asked for.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let host = SystemHost::new(cli.ocr_binary.clone());

    // ── Housekeeping modes ───────────────────────────────────────────────
    if cli.list_models {
        for model in host.list_models() {
            println!("{model}");
        }
        return Ok(());
    }

    if cli.check_ocr {
        if host.ocr_available() {
            println!("{} OCR engine '{}' found", green("✔"), cli.ocr_binary);
        } else {
            println!(
                "{} OCR engine '{}' not found; scanned PDFs cannot be read",
                red("✘"),
                cli.ocr_binary
            );
        }
        return Ok(());
    }

    let input = cli
        .input
        .clone()
        .context("An input document is required")?;

    // ── Build config ─────────────────────────────────────────────────────
    let config = build_config(&cli)?;
    let params = build_params(&cli);

    // ── Run on a background task, draining status here ───────────────────
    let bar = show_progress.then(new_spinner);
    let mut handle = spawn(input.clone(), params, config);
    while let Some(event) = handle.events.recv().await {
        show_event(bar.as_ref(), &event, cli.quiet);
    }
    if let Some(ref bar) = bar {
        bar.finish_and_clear();
    }

    let output = handle
        .finish()
        .await
        .with_context(|| format!("Failed to process {}", input.display()))?;

    // ── Print ────────────────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        write_text(&output)?;
    }

    if let Some(ref path) = cli.output {
        save_output(path, &output.text)
            .await
            .context("Failed to save output")?;
        if !cli.quiet {
            eprintln!("{} saved to {}", green("✔"), bold(&path.display().to_string()));
        }
    }

    if !cli.quiet && !cli.json {
        let s = &output.stats;
        eprintln!(
            "{}",
            dim(&format!(
                "{}  ·  {} source words  ·  {:?} extraction  ·  {}ms total",
                s.model, s.source_words, s.extraction_method, s.total_duration_ms
            ))
        );
    }

    Ok(())
}

fn write_text(output: &FormattedOutput) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(output.text.as_bytes())
        .context("Failed to write to stdout")?;
    if !output.text.ends_with('\n') {
        handle.write_all(b"\n").ok();
    }
    Ok(())
}

/// Map CLI args to `SummarizerConfig`.
fn build_config(cli: &Cli) -> Result<SummarizerConfig> {
    let mut builder = SummarizerConfig::builder()
        .endpoint(cli.endpoint.clone())
        .request_timeout_secs(cli.timeout)
        .ocr_binary(cli.ocr_binary.clone());

    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(limit) = cli.word_limit {
        builder = builder.summary_word_limit(limit);
    }
    if cli.no_word_limit {
        builder = builder.no_summary_word_limit();
    }

    builder.build().context("Invalid configuration")
}

/// Map CLI args to per-run `RequestParameters`.
fn build_params(cli: &Cli) -> RequestParameters {
    let mut params = RequestParameters::new()
        .length_percentage(&cli.length)
        .keywords(&cli.keywords);
    if let Some(ref q) = cli.question {
        params = params.question(q.clone());
    }
    params
}
