//! Output types: the study set returned to callers.

use crate::config::QuizMode;
use serde::{Deserialize, Serialize};

/// A generated quiz plus flashcards.
///
/// Serialises to exactly the JSON shape the prompt teaches the model:
///
/// ```json
/// { "quiz": [ { "question": "...", "options": ["A","B","C","D"], "answer": "A" } ],
///   "flashcards": [ { "front": "...", "back": "..." } ] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuizDocument {
    pub quiz: Vec<QuestionItem>,
    pub flashcards: Vec<Flashcard>,
}

/// One quiz question. The variant always matches the requested [`QuizMode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionItem {
    MultipleChoice {
        question: String,
        options: Vec<String>,
        answer: String,
    },
    Descriptive {
        question: String,
        answer: String,
    },
}

impl QuestionItem {
    pub fn question(&self) -> &str {
        match self {
            QuestionItem::MultipleChoice { question, .. }
            | QuestionItem::Descriptive { question, .. } => question,
        }
    }

    pub fn answer(&self) -> &str {
        match self {
            QuestionItem::MultipleChoice { answer, .. }
            | QuestionItem::Descriptive { answer, .. } => answer,
        }
    }

    /// Options of a multiple-choice item; empty for descriptive items.
    pub fn options(&self) -> &[String] {
        match self {
            QuestionItem::MultipleChoice { options, .. } => options,
            QuestionItem::Descriptive { .. } => &[],
        }
    }

    pub fn mode(&self) -> QuizMode {
        match self {
            QuestionItem::MultipleChoice { .. } => QuizMode::Mcq,
            QuestionItem::Descriptive { .. } => QuizMode::Descriptive,
        }
    }
}

/// A term on the front, its definition on the back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

/// What the pipeline hands back.
///
/// Under [`crate::config::SchemaPolicy::Strict`] this is always
/// [`StudySet::Validated`]. `PassThrough` returns the sanitised JSON as-is.
/// Both serialise to the bare JSON document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StudySet {
    Validated(QuizDocument),
    Unvalidated(serde_json::Value),
}

impl StudySet {
    /// The typed document, when the reply was validated.
    pub fn document(&self) -> Option<&QuizDocument> {
        match self {
            StudySet::Validated(doc) => Some(doc),
            StudySet::Unvalidated(_) => None,
        }
    }

    pub fn into_document(self) -> Option<QuizDocument> {
        match self {
            StudySet::Validated(doc) => Some(doc),
            StudySet::Unvalidated(_) => None,
        }
    }

    /// JSON form of the study set, whichever variant it is.
    pub fn to_value(&self) -> serde_json::Value {
        match self {
            StudySet::Validated(doc) => {
                serde_json::to_value(doc).unwrap_or(serde_json::Value::Null)
            }
            StudySet::Unvalidated(v) => v.clone(),
        }
    }
}

/// Per-run statistics reported to progress callbacks and logs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuizSummary {
    pub mode: QuizMode,
    pub requested_questions: u32,
    pub quiz_items: usize,
    pub flashcards: usize,
    pub page_count: usize,
    /// Characters of source text sent to the model.
    pub source_chars: usize,
    /// Whether the extracted text was cut to the configured budget.
    pub truncated: bool,
    pub duration_ms: u64,
}
