//! Reply sanitisation: recover a JSON object from noisy model output.
//!
//! ## Why is this necessary?
//!
//! The generation service is not bound to emit pure JSON. Even with a prompt
//! that says "Return ONLY JSON" in capitals, replies regularly arrive:
//!
//! - wrapped in prose ("Here you go:") before and after the object,
//! - inside ` ```json ` fences,
//! - with LaTeX-style escapes (`\(10^{-3}\)`, `\_`) that are invalid JSON
//!   escape sequences and make the whole document unparsable.
//!
//! Everything that deals with that unreliability is isolated here so the
//! rest of the crate can assume clean structured data.
//!
//! ## Steps
//!
//! 1. [`locate_json`]: slice from the first `{` to the last `}`.
//! 2. [`clean_json`]: apply [`CLEANUP_RULES`] in table order.
//! 3. Parse with `serde_json` and return the value verbatim.

use crate::error::QuizError;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

/// One named `pattern → replacement` step of [`clean_json`].
pub struct CleanupRule {
    pub name: &'static str,
    pub pattern: &'static Lazy<Regex>,
    pub replacement: &'static str,
}

impl CleanupRule {
    pub fn apply(&self, input: &str) -> String {
        self.pattern
            .replace_all(input, regex::NoExpand(self.replacement))
            .into_owned()
    }
}

static RE_FENCE_JSON: Lazy<Regex> = Lazy::new(|| Regex::new(r"```json").unwrap());
static RE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```").unwrap());
static RE_ESC_LPAREN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\\(").unwrap());
static RE_ESC_RPAREN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\\)").unwrap());
static RE_ESC_CARET: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\\^").unwrap());
static RE_ESC_UNDERSCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\_").unwrap());
static RE_ESC_LBRACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\\{").unwrap());
static RE_ESC_RBRACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\\}").unwrap());
static RE_DOUBLE_BACKSLASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\\\").unwrap());

/// Cleanup rules, applied top to bottom.
///
/// `fence_json` must precede `fence`, otherwise a bare `json` word is left
/// behind. `double_backslash` must stay last: collapsing `\\` first would
/// turn `\\(` into `\(`, which the paren rule would then unescape a second
/// time.
pub static CLEANUP_RULES: [CleanupRule; 9] = [
    CleanupRule {
        name: "fence_json",
        pattern: &RE_FENCE_JSON,
        replacement: "",
    },
    CleanupRule {
        name: "fence",
        pattern: &RE_FENCE,
        replacement: "",
    },
    CleanupRule {
        name: "escaped_lparen",
        pattern: &RE_ESC_LPAREN,
        replacement: "(",
    },
    CleanupRule {
        name: "escaped_rparen",
        pattern: &RE_ESC_RPAREN,
        replacement: ")",
    },
    CleanupRule {
        name: "escaped_caret",
        pattern: &RE_ESC_CARET,
        replacement: "^",
    },
    CleanupRule {
        name: "escaped_underscore",
        pattern: &RE_ESC_UNDERSCORE,
        replacement: "_",
    },
    CleanupRule {
        name: "escaped_lbrace",
        pattern: &RE_ESC_LBRACE,
        replacement: "{",
    },
    CleanupRule {
        name: "escaped_rbrace",
        pattern: &RE_ESC_RBRACE,
        replacement: "}",
    },
    CleanupRule {
        name: "double_backslash",
        pattern: &RE_DOUBLE_BACKSLASH,
        replacement: "\\",
    },
];

/// Find a rule by name.
pub fn rule(name: &str) -> Option<&'static CleanupRule> {
    CLEANUP_RULES.iter().find(|r| r.name == name)
}

/// Slice `reply` from its first `{` to its last `}`, inclusive.
pub fn locate_json(reply: &str) -> Result<&str, QuizError> {
    let malformed = || QuizError::MalformedReply {
        reply_len: reply.chars().count(),
    };
    let start = reply.find('{').ok_or_else(malformed)?;
    let end = reply.rfind('}').ok_or_else(malformed)?;
    if end < start {
        return Err(malformed());
    }
    Ok(&reply[start..=end])
}

/// Apply every [`CLEANUP_RULES`] entry in order.
pub fn clean_json(json: &str) -> String {
    CLEANUP_RULES
        .iter()
        .fold(json.to_string(), |acc, rule| rule.apply(&acc))
}

/// Turn a raw model reply into parsed JSON.
///
/// No schema checks happen here; see [`crate::pipeline::validate`].
pub fn sanitize(reply: &str) -> Result<serde_json::Value, QuizError> {
    let located = locate_json(reply).inspect_err(|_| {
        warn!("No JSON object delimiters in reply: {:?}", reply);
    })?;
    let cleaned = clean_json(located);
    debug!("Cleaned JSON string: {}", cleaned);

    serde_json::from_str(&cleaned).map_err(|source| {
        warn!("Cleaned reply is not valid JSON ({}): {}", source, cleaned);
        QuizError::JsonParse { cleaned, source }
    })
}

// ── Tests ────────────────────────────────────────────────────────────────────
