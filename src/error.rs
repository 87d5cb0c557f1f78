//! Error types for the notes2quiz library.
//!
//! Every stage of the pipeline fails with a [`QuizError`]. Nothing is
//! partially returned: a document either becomes a complete study set or the
//! caller gets exactly one error describing which stage gave up.
//!
//! Host applications (an upload route, a CLI, a job runner) usually need to
//! map errors onto a small number of user-facing outcomes. [`QuizError::class`]
//! groups the variants into [`ErrorClass`] so a web layer can answer 400 for
//! bad uploads and 502 for upstream non-conformance without matching on
//! every variant.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the notes2quiz library.
#[derive(Debug, Error)]
pub enum QuizError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The request carried no document bytes.
    #[error("No file uploaded")]
    NoInput,

    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// The bytes were read, but they are not a PDF.
    #[error("Input '{source_name}' is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { source_name: String, magic: Vec<u8> },

    // ── Document errors ───────────────────────────────────────────────────
    /// pdfium could not parse the document.
    #[error("Could not read PDF: {detail}")]
    DocumentParse { detail: String },

    /// The document parsed but has no pages to read text from.
    #[error("PDF has zero pages")]
    EmptyDocument,

    /// PDF requires a password but none was provided.
    #[error("PDF is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired,

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF")]
    WrongPassword,

    // ── Upstream errors ───────────────────────────────────────────────────
    /// The generation service could not be reached (DNS, connect, timeout).
    #[error("Generation service at '{endpoint}' is unavailable: {reason}")]
    UpstreamUnavailable { endpoint: String, reason: String },

    /// The service answered, but without a usable completion.
    #[error("AI response invalid: {detail}")]
    UpstreamResponse { detail: String },

    /// The completion text contains no `{ … }` pair.
    #[error("Could not find JSON in AI response ({reply_len} chars)")]
    MalformedReply { reply_len: usize },

    /// The delimited completion text is not valid JSON even after cleanup.
    #[error("AI response is not valid JSON after cleanup: {source}")]
    JsonParse {
        cleaned: String,
        #[source]
        source: serde_json::Error,
    },

    /// The parsed JSON does not have the shape the prompt asked for.
    #[error("AI response does not match the quiz schema: {detail}")]
    SchemaMismatch { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// No credential is configured for the generation service.
    #[error("Generation service is not configured.\n{hint}")]
    ProviderNotConfigured { hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install libpdfium on the\n\
system library path.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse grouping of [`QuizError`] for user-facing responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// The caller sent something unusable (no file, not a PDF, bad password).
    BadInput,
    /// The generation service failed or replied with unusable content.
    UpstreamFailure,
    /// Misconfiguration or a bug on our side.
    Internal,
}

impl QuizError {
    pub fn class(&self) -> ErrorClass {
        match self {
            QuizError::NoInput
            | QuizError::FileNotFound { .. }
            | QuizError::PermissionDenied { .. }
            | QuizError::InvalidInput { .. }
            | QuizError::DownloadFailed { .. }
            | QuizError::DownloadTimeout { .. }
            | QuizError::NotAPdf { .. }
            | QuizError::DocumentParse { .. }
            | QuizError::EmptyDocument
            | QuizError::PasswordRequired
            | QuizError::WrongPassword => ErrorClass::BadInput,

            QuizError::UpstreamUnavailable { .. }
            | QuizError::UpstreamResponse { .. }
            | QuizError::MalformedReply { .. }
            | QuizError::JsonParse { .. }
            | QuizError::SchemaMismatch { .. } => ErrorClass::UpstreamFailure,

            QuizError::ProviderNotConfigured { .. }
            | QuizError::InvalidConfig(_)
            | QuizError::PdfiumBindingFailed(_)
            | QuizError::Internal(_) => ErrorClass::Internal,
        }
    }

    /// HTTP status a host server should answer with for this error.
    pub fn status_code(&self) -> u16 {
        match self.class() {
            ErrorClass::BadInput => 400,
            ErrorClass::UpstreamFailure => 502,
            ErrorClass::Internal => 500,
        }
    }

    /// True for every failure to turn the uploaded bytes into page text.
    pub fn is_document_parse(&self) -> bool {
        matches!(
            self,
            QuizError::NotAPdf { .. }
                | QuizError::DocumentParse { .. }
                | QuizError::EmptyDocument
                | QuizError::PasswordRequired
                | QuizError::WrongPassword
        )
    }
}
