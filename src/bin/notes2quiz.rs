//! CLI binary for notes2quiz.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `QuizConfig` and prints the study set as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use notes2quiz::config::{DEFAULT_ENDPOINT, DEFAULT_MAX_CHARS, DEFAULT_MODEL};
use notes2quiz::pipeline::input::resolve_input;
use notes2quiz::{
    build_prompt_for, extract_only, PipelineProgressCallback, ProgressCallback, QuizConfig,
    QuizMode, QuizRequest, QuizSummary, SchemaPolicy, Stage, StudyPipeline,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one spinner whose message follows the current
/// stage, plus a tick line per finished stage.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("notes2quiz");
        bar.set_message("Reading input…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_message(format!("{}…", stage.label()));
    }

    fn on_stage_complete(&self, stage: Stage) {
        self.bar
            .println(format!("  {} {}", green("✓"), dim(stage.label())));
    }

    fn on_pipeline_error(&self, stage: Stage, error: &str) {
        let first_line = error.lines().next().unwrap_or(error);
        self.bar.println(format!(
            "  {} {}  {}",
            red("✗"),
            stage.label(),
            red(first_line)
        ));
        self.bar.finish_and_clear();
    }

    fn on_pipeline_complete(&self, summary: &QuizSummary) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} {} questions, {} flashcards from {} pages  {}",
            green("✔"),
            bold(&summary.quiz_items.to_string()),
            summary.mode,
            bold(&summary.flashcards.to_string()),
            summary.page_count,
            dim(&format!("{}ms", summary.duration_ms)),
        );
        if summary.truncated {
            eprintln!(
                "  {}",
                dim(&format!(
                    "source text truncated to {} chars",
                    summary.source_chars
                ))
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Ten descriptive questions plus flashcards (stdout)
  notes2quiz lecture.pdf

  # Five multiple-choice questions, written to a file
  notes2quiz --mode mcq --questions 5 lecture.pdf -o quiz.json

  # From a URL
  notes2quiz https://example.com/notes/week3.pdf

  # See what the model would be given (no API key needed)
  notes2quiz --extract-only lecture.pdf
  notes2quiz --prompt-only --mode mcq lecture.pdf

  # Any OpenAI-compatible endpoint
  notes2quiz --endpoint http://localhost:11434/v1/chat/completions --model llama3.1 lecture.pdf

ENVIRONMENT VARIABLES:
  OPENROUTER_API_KEY       Bearer credential for the generation service
  NOTES2QUIZ_ENDPOINT      Chat-completion URL (default: OpenRouter)
  NOTES2QUIZ_MODEL         Model ID (default: mistralai/mistral-7b-instruct)
  NOTES2QUIZ_TEMPERATURE   Sampling temperature (default: 0.3)
  NOTES2QUIZ_MAX_CHARS     Source-text budget in characters (default: 4000)
  NOTES2QUIZ_API_TIMEOUT   Generation call timeout in seconds (default: 60)
  NOTES2QUIZ_REFERER       HTTP-Referer header sent to OpenRouter
  PDFIUM_LIB_PATH          Path to libpdfium (else ./ then the system path)
"#;

/// Generate a quiz and flashcards from PDF notes with a hosted LLM.
#[derive(Parser, Debug)]
#[command(
    name = "notes2quiz",
    version,
    about = "Generate a quiz and flashcards from PDF notes",
    long_about = "Extract the text of a PDF (local file or URL), ask a chat-completion model for \
a quiz and ten flashcards, and print the result as JSON. Works with OpenRouter and any \
OpenAI-compatible endpoint.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Write JSON to this file instead of stdout.
    #[arg(short, long, env = "NOTES2QUIZ_OUTPUT")]
    output: Option<PathBuf>,

    /// Quiz type: mcq or descriptive.
    #[arg(long, env = "NOTES2QUIZ_MODE", value_enum, default_value = "descriptive")]
    mode: ModeArg,

    /// Number of quiz questions.
    #[arg(short = 'n', long, env = "NOTES2QUIZ_QUESTIONS", default_value_t = 10,
          value_parser = clap::value_parser!(u32).range(1..))]
    questions: u32,

    /// Model ID sent to the endpoint.
    #[arg(long, env = "NOTES2QUIZ_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Chat-completion URL.
    #[arg(long, env = "NOTES2QUIZ_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// API key for the endpoint.
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Maximum characters of extracted text placed in the prompt.
    #[arg(long, env = "NOTES2QUIZ_MAX_CHARS", default_value_t = DEFAULT_MAX_CHARS)]
    max_chars: usize,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "NOTES2QUIZ_TEMPERATURE", default_value_t = 0.3)]
    temperature: f32,

    /// Generation call timeout in seconds.
    #[arg(long, env = "NOTES2QUIZ_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "NOTES2QUIZ_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// HTTP-Referer header for OpenRouter attribution.
    #[arg(long, env = "NOTES2QUIZ_REFERER")]
    referer: Option<String>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "NOTES2QUIZ_PASSWORD")]
    password: Option<String>,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "NOTES2QUIZ_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Path to the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Return the model's JSON without checking it against the quiz schema.
    #[arg(long)]
    pass_through: bool,

    /// Print single-line JSON instead of pretty-printed.
    #[arg(long)]
    compact: bool,

    /// Print the extracted (truncated) text only; no API call.
    #[arg(long, conflicts_with = "prompt_only")]
    extract_only: bool,

    /// Print the prompt that would be sent; no API call.
    #[arg(long)]
    prompt_only: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "NOTES2QUIZ_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "NOTES2QUIZ_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "NOTES2QUIZ_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Mcq,
    Descriptive,
}

impl From<ModeArg> for QuizMode {
    fn from(v: ModeArg) -> Self {
        match v {
            ModeArg::Mcq => QuizMode::Mcq,
            ModeArg::Descriptive => QuizMode::Descriptive,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner gives all the feedback that matters; keep INFO logs out of
    // its way unless asked for.
    let offline = cli.extract_only || cli.prompt_only;
    let show_progress = !cli.quiet && !cli.no_progress && !offline;
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

    let request = QuizRequest::new(cli.mode.into(), cli.questions);

    // ── Offline modes ────────────────────────────────────────────────────
    if offline {
        let config = build_config(&cli, None).await?;
        let document = extract_only(&cli.input, &config)
            .await
            .context("Failed to extract text")?;
        let text = if cli.prompt_only {
            build_prompt_for(&document, &request).into_string()
        } else {
            document.truncated_text()
        };
        return emit(&cli, &text);
    }

    // ── Build pipeline ───────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn PipelineProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb).await?;
    let pipeline = StudyPipeline::from_config(config).context("Cannot reach a model")?;

    // ── Run ──────────────────────────────────────────────────────────────
    let bytes = resolve_input(&cli.input, cli.download_timeout)
        .await
        .context("Failed to read input")?;
    let set = pipeline
        .run_bytes(bytes, &request)
        .await
        .context("Quiz generation failed")?;

    let json = if cli.compact {
        serde_json::to_string(&set)
    } else {
        serde_json::to_string_pretty(&set)
    }
    .context("Failed to serialise study set")?;

    emit(&cli, &json)
}

/// Print `text` to stdout, or write it atomically to `--output`.
fn emit(cli: &Cli, text: &str) -> Result<()> {
    match cli.output {
        Some(ref path) => {
            write_atomic(path, text)?;
            if !cli.quiet {
                eprintln!("{}  →  {}", green("✔"), bold(&path.display().to_string()));
            }
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(text.as_bytes())
                .context("Failed to write to stdout")?;
            if !text.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }
    }
    Ok(())
}

/// Write to a sibling temp file, then rename over `path`.
fn write_atomic(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, text)
        .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to move output into {}", path.display()))?;
    Ok(())
}

/// Map CLI args to `QuizConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<QuizConfig> {
    let mut builder = QuizConfig::builder()
        .endpoint(cli.endpoint.clone())
        .model(cli.model.clone())
        .max_chars(cli.max_chars)
        .temperature(cli.temperature)
        .api_timeout_secs(cli.api_timeout)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key.clone());
    }
    if let Some(ref referer) = cli.referer {
        builder = builder.referer(referer.clone());
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password.clone());
    }
    if let Some(ref path) = cli.pdfium_lib {
        builder = builder.pdfium_lib_path(path.clone());
    }
    if let Some(ref path) = cli.system_prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system prompt from {:?}", path))?;
        builder = builder.system_prompt(prompt);
    }
    if cli.pass_through {
        builder = builder.schema_policy(SchemaPolicy::PassThrough);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
