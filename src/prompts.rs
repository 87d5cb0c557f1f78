//! Prompts for quiz and flashcard generation.
//!
//! The generation service is a free-text model, so the output schema is
//! taught by example: the prompt embeds one literal JSON template per quiz
//! mode and a list of things the model must not do (LaTeX, markdown, code
//! fences). The sanitizer in [`crate::pipeline::sanitize`] is the backstop
//! for when the model ignores those rules anyway.
//!
//! Keeping every string here lets tests inspect the exact wording without a
//! network call.

use crate::config::QuizMode;
use std::fmt;

/// Default system message establishing the assistant persona.
///
/// Used when `QuizConfig::system_prompt` is `None`.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful study assistant.";

/// Number of flashcards the prompt asks for. Not enforced on the reply.
pub const FLASHCARD_COUNT: usize = 10;

/// Options per multiple-choice question.
pub const MCQ_OPTION_COUNT: usize = 4;

/// Output template for multiple-choice quizzes.
pub const MCQ_SCHEMA_EXAMPLE: &str = r#"{
  "quiz": [
    {
      "question": "...",
      "options": ["A", "B", "C", "D"],
      "answer": "A"
    }
  ],
  "flashcards": [
    { "front": "...", "back": "..." }
  ]
}"#;

/// Output template for descriptive quizzes.
pub const DESCRIPTIVE_SCHEMA_EXAMPLE: &str = r#"{
  "quiz": [
    { "question": "...", "answer": "..." }
  ],
  "flashcards": [
    { "front": "...", "back": "..." }
  ]
}"#;

/// Negative constraints appended after the templates.
pub const OUTPUT_RULES: &str = "IMPORTANT:
- Do NOT use LaTeX.
- Use plain text for math (e.g., 10^-3).
- Do NOT use markdown.
- Do NOT use backticks.
- Return ONLY JSON.";

/// The instruction string sent as the user message. Built once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPrompt(String);

impl GenerationPrompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for GenerationPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The mode-specific first instruction line.
pub fn quiz_instruction(mode: QuizMode, question_count: u32) -> String {
    match mode {
        QuizMode::Mcq => format!(
            "{question_count} MULTIPLE CHOICE questions. Each must have {MCQ_OPTION_COUNT} options and the correct answer."
        ),
        QuizMode::Descriptive => format!("{question_count} DESCRIPTIVE questions with answers."),
    }
}

/// Build the full generation prompt.
///
/// `source_text` is appended verbatim as the last section, so it should
/// already be truncated to the configured budget.
pub fn build_prompt(source_text: &str, mode: QuizMode, question_count: u32) -> GenerationPrompt {
    let instruction = quiz_instruction(mode, question_count);
    GenerationPrompt(format!(
        r#"
You are a study assistant.

From the following text, generate:
1) {instruction}
2) {FLASHCARD_COUNT} flashcards (term + definition).

Return ONLY valid JSON.

If quiz type is "mcq", use this format:
{MCQ_SCHEMA_EXAMPLE}

If quiz type is "descriptive", use this format:
{DESCRIPTIVE_SCHEMA_EXAMPLE}

{OUTPUT_RULES}

TEXT:
{source_text}
"#
    ))
}
