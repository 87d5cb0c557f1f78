//! # notes2quiz
//!
//! Turn lecture notes (PDF) into a quiz and a deck of flashcards using a
//! hosted chat-completion model.
//!
//! ## Why this crate?
//!
//! Asking a model for "a quiz as JSON" is easy; getting JSON back reliably is
//! not. Replies arrive wrapped in prose, inside markdown fences, or with
//! LaTeX escapes that are invalid JSON. This crate isolates that
//! unreliability in one sanitizer and a schema check, so callers get either a
//! well-typed [`QuizDocument`] or a single classified [`QuizError`].
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input     read a local file or download from URL
//!  ├─ 2. Extract   page text via pdfium (spawn_blocking), truncated to 4000 chars
//!  ├─ 3. Prompt    mode-specific instruction + JSON template + rules
//!  ├─ 4. Generate  one chat-completion call (OpenRouter by default)
//!  ├─ 5. Sanitize  locate { … }, strip fences, undo LaTeX escapes, parse
//!  └─ 6. Validate  check the shape against the requested quiz mode
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use notes2quiz::{generate_from_path, QuizConfig, QuizMode, QuizRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credential from OPENROUTER_API_KEY
//!     let config = QuizConfig::from_env()?;
//!     let request = QuizRequest::new(QuizMode::Mcq, 5);
//!     let set = generate_from_path("lecture.pdf", &request, &config).await?;
//!     println!("{}", serde_json::to_string_pretty(&set)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `notes2quiz` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! notes2quiz = { version = "0.1", default-features = false }
//! ```
//!
//! ## pdfium
//!
//! Text extraction binds to a pdfium shared library at runtime. Set
//! `PDFIUM_LIB_PATH` (or [`QuizConfigBuilder::pdfium_lib_path`]) to point at
//! it; otherwise `./libpdfium.*` and then the system library path are tried.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod request;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{QuizConfig, QuizConfigBuilder, QuizMode, SchemaPolicy};
pub use error::{ErrorClass, QuizError};
pub use generate::{
    build_prompt_for, extract_only, generate_from_bytes, generate_from_path, generate_sync,
    StudyPipeline,
};
pub use output::{Flashcard, QuestionItem, QuizDocument, QuizSummary, StudySet};
pub use pipeline::extract::{ExtractedDocument, TextExtractor};
pub use pipeline::llm::{GenerationClient, RawModelReply, ReplyGenerator};
pub use progress::{NoopProgressCallback, PipelineProgressCallback, ProgressCallback, Stage};
pub use prompts::GenerationPrompt;
pub use request::{QuizRequest, UploadRequest};
