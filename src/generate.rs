//! Pipeline driver: document → study set.
//!
//! [`StudyPipeline`] owns a [`TextExtractor`], a [`ReplyGenerator`] and the
//! config, and runs the stages in order:
//!
//! ```text
//! extract ──▶ prompt ──▶ generate ──▶ sanitize ──▶ validate
//! ```
//!
//! Any stage failure aborts the run; the caller gets exactly one
//! [`QuizError`] and nothing else. The pipeline holds no per-request state,
//! so a host server can build one at startup and share it behind an `Arc`.
//!
//! The free functions at the bottom ([`generate_from_path`],
//! [`generate_from_bytes`], [`generate_sync`], [`extract_only`]) are
//! one-shot conveniences for callers that do not want to keep a pipeline
//! around.

use crate::config::{QuizConfig, SchemaPolicy};
use crate::error::QuizError;
use crate::output::{QuizSummary, StudySet};
use crate::pipeline::extract::{ExtractedDocument, TextExtractor};
use crate::pipeline::input::{self, check_pdf_magic};
use crate::pipeline::llm::{GenerationClient, ReplyGenerator};
use crate::pipeline::{sanitize, validate};
use crate::progress::Stage;
use crate::prompts::{build_prompt, GenerationPrompt};
use crate::request::{QuizRequest, UploadRequest};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Reusable document-to-quiz pipeline.
///
/// # Example
/// ```rust,no_run
/// use notes2quiz::{QuizConfig, StudyPipeline, UploadRequest};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pipeline = StudyPipeline::from_config(QuizConfig::from_env()?)?;
/// let upload = UploadRequest::new(std::fs::read("lecture.pdf")?)
///     .quiz_mode("mcq")
///     .question_count("5");
/// let set = pipeline.run(upload).await?;
/// println!("{}", serde_json::to_string_pretty(&set)?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct StudyPipeline<G: ReplyGenerator = GenerationClient> {
    config: QuizConfig,
    extractor: TextExtractor,
    generator: G,
}

impl StudyPipeline<GenerationClient> {
    /// Build a pipeline that talks to the configured chat-completion endpoint.
    ///
    /// Fails with `ProviderNotConfigured` when no API key is set.
    pub fn from_config(config: QuizConfig) -> Result<Self, QuizError> {
        let generator = GenerationClient::new(&config)?;
        Ok(Self::with_generator(config, generator))
    }
}

impl<G: ReplyGenerator> StudyPipeline<G> {
    /// Build a pipeline around a caller-supplied generator.
    pub fn with_generator(config: QuizConfig, generator: G) -> Self {
        Self {
            extractor: TextExtractor::new(&config),
            config,
            generator,
        }
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Handle one upload.
    ///
    /// Missing or empty file bytes fail with `NoInput`. The mode and count
    /// fields are parsed leniently (see [`QuizRequest::from_fields`]).
    pub async fn run(&self, upload: UploadRequest) -> Result<StudySet, QuizError> {
        let request = upload.quiz_request();
        let bytes = upload
            .file_bytes
            .filter(|b| !b.is_empty())
            .ok_or(QuizError::NoInput)?;
        self.run_bytes(bytes, &request).await
    }

    /// Run every stage on in-memory PDF bytes.
    pub async fn run_bytes(
        &self,
        bytes: Vec<u8>,
        request: &QuizRequest,
    ) -> Result<StudySet, QuizError> {
        if bytes.is_empty() {
            return Err(QuizError::NoInput);
        }
        let started = Instant::now();
        info!(
            "Starting quiz generation: {} bytes, mode={}, questions={}",
            bytes.len(),
            request.mode,
            request.question_count
        );

        self.begin(Stage::Extract);
        let extracted = match check_pdf_magic(&bytes, "upload") {
            Ok(()) => self.extractor.extract(bytes).await,
            Err(e) => Err(e),
        };
        let document = self.finish_stage(Stage::Extract, extracted)?;

        self.generate_from_document(&document, request, started)
            .await
    }

    /// Run the stages after extraction on an already-extracted document.
    pub async fn run_extracted(
        &self,
        document: &ExtractedDocument,
        request: &QuizRequest,
    ) -> Result<StudySet, QuizError> {
        self.generate_from_document(document, request, Instant::now())
            .await
    }

    async fn generate_from_document(
        &self,
        document: &ExtractedDocument,
        request: &QuizRequest,
        started: Instant,
    ) -> Result<StudySet, QuizError> {
        self.begin(Stage::Prompt);
        let source_text = document.truncated_text();
        let prompt = build_prompt(&source_text, request.mode, request.question_count);
        debug!("Prompt built: {} chars", prompt.as_str().chars().count());
        self.finish_stage(Stage::Prompt, Ok(()))?;

        self.begin(Stage::Generate);
        let reply = self.generator.generate(&prompt).await;
        let reply = self.finish_stage(Stage::Generate, reply)?;
        debug!("Raw model reply: {}", reply);

        self.begin(Stage::Sanitize);
        let value = self.finish_stage(Stage::Sanitize, sanitize::sanitize(reply.as_str()))?;

        let set = match self.config.schema_policy {
            SchemaPolicy::Strict => {
                self.begin(Stage::Validate);
                let validated = validate::validate(value, request.mode, request.question_count);
                StudySet::Validated(self.finish_stage(Stage::Validate, validated)?)
            }
            SchemaPolicy::PassThrough => StudySet::Unvalidated(value),
        };

        let summary = summarize(&set, document, &source_text, request, started);
        info!(
            "Study set ready: {} quiz items, {} flashcards from {} pages in {}ms",
            summary.quiz_items, summary.flashcards, summary.page_count, summary.duration_ms
        );
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_pipeline_complete(&summary);
        }
        Ok(set)
    }

    fn begin(&self, stage: Stage) {
        debug!("Stage '{}' started", stage.label());
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_stage_start(stage);
        }
    }

    fn finish_stage<T>(&self, stage: Stage, result: Result<T, QuizError>) -> Result<T, QuizError> {
        match &result {
            Ok(_) => {
                if let Some(ref cb) = self.config.progress_callback {
                    cb.on_stage_complete(stage);
                }
            }
            Err(e) => {
                warn!("Stage '{}' failed: {}", stage.label(), e);
                if let Some(ref cb) = self.config.progress_callback {
                    cb.on_pipeline_error(stage, &e.to_string());
                }
            }
        }
        result
    }
}

fn summarize(
    set: &StudySet,
    document: &ExtractedDocument,
    source_text: &str,
    request: &QuizRequest,
    started: Instant,
) -> QuizSummary {
    let (quiz_items, flashcards) = match set {
        StudySet::Validated(doc) => (doc.quiz.len(), doc.flashcards.len()),
        StudySet::Unvalidated(value) => {
            let len = |key: &str| value.get(key).and_then(|v| v.as_array()).map_or(0, Vec::len);
            (len("quiz"), len("flashcards"))
        }
    };
    QuizSummary {
        mode: request.mode,
        requested_questions: request.question_count,
        quiz_items,
        flashcards,
        page_count: document.page_count(),
        source_chars: source_text.chars().count(),
        truncated: document.is_truncated(),
        duration_ms: started.elapsed().as_millis() as u64,
    }
}

// ── One-shot entry points ────────────────────────────────────────────────

/// Generate a study set from PDF bytes in memory.
pub async fn generate_from_bytes(
    bytes: Vec<u8>,
    request: &QuizRequest,
    config: &QuizConfig,
) -> Result<StudySet, QuizError> {
    StudyPipeline::from_config(config.clone())?
        .run_bytes(bytes, request)
        .await
}

/// Generate a study set from a local path or an http(s) URL.
///
/// The credential is checked before anything is read or downloaded.
pub async fn generate_from_path(
    input_str: impl AsRef<str>,
    request: &QuizRequest,
    config: &QuizConfig,
) -> Result<StudySet, QuizError> {
    let pipeline = StudyPipeline::from_config(config.clone())?;
    let bytes = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    pipeline.run_bytes(bytes, request).await
}

/// Synchronous wrapper around [`generate_from_path`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(
    input_str: impl AsRef<str>,
    request: &QuizRequest,
    config: &QuizConfig,
) -> Result<StudySet, QuizError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| QuizError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate_from_path(input_str, request, config))
}

/// Extract page text without calling the generation service.
///
/// Does not require an API key.
pub async fn extract_only(
    input_str: impl AsRef<str>,
    config: &QuizConfig,
) -> Result<ExtractedDocument, QuizError> {
    let bytes = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    TextExtractor::new(config).extract(bytes).await
}

/// The prompt [`StudyPipeline`] would send for `document`.
pub fn build_prompt_for(document: &ExtractedDocument, request: &QuizRequest) -> GenerationPrompt {
    build_prompt(
        &document.truncated_text(),
        request.mode,
        request.question_count,
    )
}
