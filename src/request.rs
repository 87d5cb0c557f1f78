//! Inbound request types.
//!
//! [`UploadRequest`] mirrors the multipart form an upload route receives: the
//! file plus two optional text fields, all unvalidated. [`QuizRequest`] is
//! what the pipeline actually runs on once those fields have been parsed.

use crate::config::{parse_question_count, QuizMode, DEFAULT_QUESTION_COUNT};
use serde::{Deserialize, Serialize};

/// Parsed generation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizRequest {
    pub mode: QuizMode,
    /// Always greater than zero.
    pub question_count: u32,
}

impl Default for QuizRequest {
    fn default() -> Self {
        Self {
            mode: QuizMode::Descriptive,
            question_count: DEFAULT_QUESTION_COUNT,
        }
    }
}

impl QuizRequest {
    /// A request for `question_count` questions; zero falls back to the default.
    pub fn new(mode: QuizMode, question_count: u32) -> Self {
        Self {
            mode,
            question_count: if question_count == 0 {
                DEFAULT_QUESTION_COUNT
            } else {
                question_count
            },
        }
    }

    /// Parse the raw form fields. Never fails: unknown modes become
    /// descriptive, bad counts become [`DEFAULT_QUESTION_COUNT`].
    pub fn from_fields(quiz_mode: Option<&str>, question_count: Option<&str>) -> Self {
        Self {
            mode: QuizMode::parse(quiz_mode),
            question_count: parse_question_count(question_count),
        }
    }
}

/// One upload as received from a client.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub file_bytes: Option<Vec<u8>>,
    pub quiz_mode: Option<String>,
    pub question_count: Option<String>,
}

impl UploadRequest {
    pub fn new(file_bytes: Vec<u8>) -> Self {
        Self {
            file_bytes: Some(file_bytes),
            ..Default::default()
        }
    }

    pub fn quiz_mode(mut self, mode: impl Into<String>) -> Self {
        self.quiz_mode = Some(mode.into());
        self
    }

    pub fn question_count(mut self, count: impl Into<String>) -> Self {
        self.question_count = Some(count.into());
        self
    }

    /// The parsed [`QuizRequest`] for this upload's form fields.
    pub fn quiz_request(&self) -> QuizRequest {
        QuizRequest::from_fields(self.quiz_mode.as_deref(), self.question_count.as_deref())
    }
}
