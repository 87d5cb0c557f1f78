//! Schema validation: sanitised JSON → [`QuizDocument`].
//!
//! The sanitizer only guarantees *some* JSON. Models still answer with
//! descriptive items when asked for multiple choice, drop the `answer` field,
//! or give three options instead of four. This stage checks the shape
//! against the requested mode and reports the first offending path.
//!
//! Counts are deliberately soft: a quiz with fewer questions than requested,
//! or a deck with 9 flashcards, is still useful to a student, so those are
//! only logged.

use crate::config::QuizMode;
use crate::error::QuizError;
use crate::output::{Flashcard, QuestionItem, QuizDocument};
use crate::prompts::{FLASHCARD_COUNT, MCQ_OPTION_COUNT};
use serde_json::{Map, Value};
use tracing::warn;

/// Check `value` against the quiz schema for `mode`.
///
/// `requested` is the question count the prompt asked for; a mismatch only
/// produces a warning.
pub fn validate(value: Value, mode: QuizMode, requested: u32) -> Result<QuizDocument, QuizError> {
    let root = value
        .as_object()
        .ok_or_else(|| mismatch("$", "expected a JSON object"))?;

    let quiz = array_field(root, "quiz", "$")?
        .iter()
        .enumerate()
        .map(|(i, item)| question_item(item, mode, &format!("$.quiz[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    let flashcards = array_field(root, "flashcards", "$")?
        .iter()
        .enumerate()
        .map(|(i, card)| flashcard(card, &format!("$.flashcards[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    if quiz.len() != requested as usize {
        warn!(
            "Model returned {} quiz items, {} were requested",
            quiz.len(),
            requested
        );
    }
    if flashcards.len() != FLASHCARD_COUNT {
        warn!(
            "Model returned {} flashcards, {} were requested",
            flashcards.len(),
            FLASHCARD_COUNT
        );
    }

    Ok(QuizDocument { quiz, flashcards })
}

fn question_item(item: &Value, mode: QuizMode, path: &str) -> Result<QuestionItem, QuizError> {
    let obj = item
        .as_object()
        .ok_or_else(|| mismatch(path, "expected an object"))?;
    let question = string_field(obj, "question", path)?;
    let answer = string_field(obj, "answer", path)?;

    match mode {
        QuizMode::Mcq => {
            let options = array_field(obj, "options", path)?;
            if options.len() != MCQ_OPTION_COUNT {
                return Err(mismatch(
                    path,
                    &format!(
                        "expected {MCQ_OPTION_COUNT} options, found {}",
                        options.len()
                    ),
                ));
            }
            let options = options
                .iter()
                .enumerate()
                .map(|(i, o)| {
                    o.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| mismatch(&format!("{path}.options[{i}]"), "expected a string"))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(QuestionItem::MultipleChoice {
                question,
                options,
                answer,
            })
        }
        QuizMode::Descriptive => {
            if obj.contains_key("options") {
                return Err(mismatch(
                    path,
                    "descriptive question must not carry options",
                ));
            }
            Ok(QuestionItem::Descriptive { question, answer })
        }
    }
}

fn flashcard(card: &Value, path: &str) -> Result<Flashcard, QuizError> {
    let obj = card
        .as_object()
        .ok_or_else(|| mismatch(path, "expected an object"))?;
    Ok(Flashcard {
        front: string_field(obj, "front", path)?,
        back: string_field(obj, "back", path)?,
    })
}

fn array_field<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a Vec<Value>, QuizError> {
    match obj.get(key) {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(mismatch(&format!("{path}.{key}"), "expected an array")),
        None => Err(mismatch(&format!("{path}.{key}"), "missing")),
    }
}

fn string_field(obj: &Map<String, Value>, key: &str, path: &str) -> Result<String, QuizError> {
    match obj.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        // Models occasionally answer numeric questions with a bare number.
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(_) => Err(mismatch(&format!("{path}.{key}"), "expected a string")),
        None => Err(mismatch(&format!("{path}.{key}"), "missing")),
    }
}

fn mismatch(path: &str, what: &str) -> QuizError {
    QuizError::SchemaMismatch {
        detail: format!("{path}: {what}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cards(n: usize) -> Vec<Value> {
        (0..n)
            .map(|i| json!({"front": format!("term {i}"), "back": format!("definition {i}")}))
            .collect()
    }

    #[test]
    fn valid_mcq_document() {
        let v = json!({
            "quiz": [{"question": "q", "options": ["a", "b", "c", "d"], "answer": "a"}],
            "flashcards": cards(10),
        });
        let doc = validate(v, QuizMode::Mcq, 1).unwrap();
        assert_eq!(doc.quiz.len(), 1);
        assert_eq!(doc.quiz[0].options().len(), 4);
        assert_eq!(doc.flashcards.len(), 10);
    }

    #[test]
    fn valid_descriptive_document() {
        let v = json!({
            "quiz": [{"question": "Why?", "answer": "Because."}],
            "flashcards": cards(10),
        });
        let doc = validate(v, QuizMode::Descriptive, 1).unwrap();
        assert_eq!(doc.quiz[0].mode(), QuizMode::Descriptive);
    }

    #[test]
    fn wrong_option_count_is_rejected() {
        let v = json!({
            "quiz": [{"question": "q", "options": ["a", "b", "c"], "answer": "a"}],
            "flashcards": [],
        });
        let err = validate(v, QuizMode::Mcq, 1).unwrap_err();
        assert!(err.to_string().contains("$.quiz[0]: expected 4 options, found 3"), "got: {err}");
    }

    #[test]
    fn descriptive_items_in_mcq_mode_are_rejected() {
        let v = json!({"quiz": [{"question": "q", "answer": "a"}], "flashcards": []});
        let err = validate(v, QuizMode::Mcq, 1).unwrap_err();
        assert!(err.to_string().contains("$.quiz[0].options: missing"), "got: {err}");
    }

    #[test]
    fn mcq_items_in_descriptive_mode_are_rejected() {
        let v = json!({
            "quiz": [{"question": "q", "options": ["a", "b", "c", "d"], "answer": "a"}],
            "flashcards": [],
        });
        assert!(matches!(
            validate(v, QuizMode::Descriptive, 1),
            Err(QuizError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn missing_sections_are_rejected() {
        let err = validate(json!({"quiz": []}), QuizMode::Mcq, 0).unwrap_err();
        assert!(err.to_string().contains("$.flashcards: missing"));
        let err = validate(json!([1, 2]), QuizMode::Mcq, 0).unwrap_err();
        assert!(err.to_string().contains("expected a JSON object"));
    }

    #[test]
    fn incomplete_flashcard_is_rejected() {
        let v = json!({"quiz": [], "flashcards": [{"front": "ATP"}]});
        let err = validate(v, QuizMode::Descriptive, 0).unwrap_err();
        assert!(err.to_string().contains("$.flashcards[0].back: missing"));
    }

    #[test]
    fn counts_are_not_enforced() {
        let v = json!({"quiz": [{"question": "q", "answer": "a"}], "flashcards": cards(3)});
        let doc = validate(v, QuizMode::Descriptive, 5).unwrap();
        assert_eq!(doc.quiz.len(), 1);
        assert_eq!(doc.flashcards.len(), 3);
    }

    #[test]
    fn numeric_answer_is_accepted_as_text() {
        let v = json!({"quiz": [{"question": "2+2?", "answer": 4}], "flashcards": []});
        let doc = validate(v, QuizMode::Descriptive, 1).unwrap();
        assert_eq!(doc.quiz[0].answer(), "4");
    }
}
