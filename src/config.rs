//! Configuration types for document-to-quiz generation.
//!
//! Everything the pipeline needs from the outside world (credential, model,
//! endpoint, text budget) lives in [`QuizConfig`], built via its
//! [`QuizConfigBuilder`] or read once from the process environment with
//! [`QuizConfig::from_env`]. The config is passed explicitly into the text
//! extractor and the generation client at construction time; nothing in the
//! library reads global state after that.

use crate::error::QuizError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Chat-completion endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Model identifier used when none is configured.
pub const DEFAULT_MODEL: &str = "mistralai/mistral-7b-instruct";

/// Character budget for the source text embedded in the prompt.
pub const DEFAULT_MAX_CHARS: usize = 4000;

/// Number of quiz questions when the request does not say (or says nonsense).
pub const DEFAULT_QUESTION_COUNT: u32 = 10;

/// Configuration for a quiz generation run.
///
/// # Example
/// ```rust
/// use notes2quiz::QuizConfig;
///
/// let config = QuizConfig::builder()
///     .api_key("sk-or-...")
///     .model("mistralai/mistral-7b-instruct")
///     .max_chars(4000)
///     .build()
///     .unwrap();
/// assert_eq!(config.temperature, 0.3);
/// ```
#[derive(Clone)]
pub struct QuizConfig {
    /// Bearer credential for the generation service.
    pub api_key: Option<String>,

    /// Chat-completion URL. Default: OpenRouter.
    pub endpoint: String,

    /// Model identifier sent in every request.
    pub model: String,

    /// Sampling temperature. Default: 0.3.
    ///
    /// Low enough that the model sticks to the JSON template it was shown,
    /// high enough that questions are not verbatim copies of the text.
    pub temperature: f32,

    /// Maximum characters of extracted text placed in the prompt. Default: 4000.
    pub max_chars: usize,

    /// Custom system message. If None, uses [`crate::prompts::DEFAULT_SYSTEM_PROMPT`].
    pub system_prompt: Option<String>,

    /// Per-request timeout for the generation call in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// `HTTP-Referer` attribution header (OpenRouter app ranking).
    pub referer: Option<String>,

    /// `X-Title` attribution header. Default: "Notes-to-Quiz".
    pub app_title: Option<String>,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Explicit path to the pdfium shared library.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Whether parsed replies are checked against the quiz schema.
    pub schema_policy: SchemaPolicy,

    /// Optional observer for stage events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.3,
            max_chars: DEFAULT_MAX_CHARS,
            system_prompt: None,
            api_timeout_secs: 60,
            download_timeout_secs: 120,
            referer: None,
            app_title: Some("Notes-to-Quiz".to_string()),
            password: None,
            pdfium_lib_path: None,
            schema_policy: SchemaPolicy::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for QuizConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_chars", &self.max_chars)
            .field("system_prompt", &self.system_prompt.is_some())
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("referer", &self.referer)
            .field("app_title", &self.app_title)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("schema_policy", &self.schema_policy)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn PipelineProgressCallback>"),
            )
            .finish()
    }
}

impl QuizConfig {
    /// Create a new builder for `QuizConfig`.
    pub fn builder() -> QuizConfigBuilder {
        QuizConfigBuilder {
            config: Self::default(),
        }
    }

    /// Read the configuration from process environment variables.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `OPENROUTER_API_KEY` | `api_key` |
    /// | `NOTES2QUIZ_ENDPOINT` | `endpoint` |
    /// | `NOTES2QUIZ_MODEL` | `model` |
    /// | `NOTES2QUIZ_TEMPERATURE` | `temperature` |
    /// | `NOTES2QUIZ_MAX_CHARS` | `max_chars` |
    /// | `NOTES2QUIZ_API_TIMEOUT` | `api_timeout_secs` |
    /// | `NOTES2QUIZ_REFERER` | `referer` |
    /// | `PDFIUM_LIB_PATH` | `pdfium_lib_path` |
    pub fn from_env() -> Result<QuizConfig, QuizError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`QuizConfig::from_env`] but with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<QuizConfig, QuizError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut builder = QuizConfig::builder();

        if let Some(key) = get("OPENROUTER_API_KEY") {
            builder = builder.api_key(key);
        }
        if let Some(endpoint) = get("NOTES2QUIZ_ENDPOINT") {
            builder = builder.endpoint(endpoint);
        }
        if let Some(model) = get("NOTES2QUIZ_MODEL") {
            builder = builder.model(model);
        }
        if let Some(t) = get("NOTES2QUIZ_TEMPERATURE") {
            builder = builder.temperature(parse_var("NOTES2QUIZ_TEMPERATURE", &t)?);
        }
        if let Some(n) = get("NOTES2QUIZ_MAX_CHARS") {
            builder = builder.max_chars(parse_var("NOTES2QUIZ_MAX_CHARS", &n)?);
        }
        if let Some(secs) = get("NOTES2QUIZ_API_TIMEOUT") {
            builder = builder.api_timeout_secs(parse_var("NOTES2QUIZ_API_TIMEOUT", &secs)?);
        }
        if let Some(referer) = get("NOTES2QUIZ_REFERER") {
            builder = builder.referer(referer);
        }
        if let Some(path) = get("PDFIUM_LIB_PATH") {
            builder = builder.pdfium_lib_path(path);
        }

        builder.build()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, QuizError> {
    value
        .trim()
        .parse()
        .map_err(|_| QuizError::InvalidConfig(format!("{name} has an invalid value: '{value}'")))
}

/// Builder for [`QuizConfig`].
#[derive(Debug)]
pub struct QuizConfigBuilder {
    config: QuizConfig,
}

impl QuizConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Clamped to `0.0..=2.0`; non-finite values are kept and fail in `build`.
    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = if t.is_finite() { t.clamp(0.0, 2.0) } else { t };
        self
    }

    pub fn max_chars(mut self, n: usize) -> Self {
        self.config.max_chars = n;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn referer(mut self, referer: impl Into<String>) -> Self {
        self.config.referer = Some(referer.into());
        self
    }

    pub fn app_title(mut self, title: Option<String>) -> Self {
        self.config.app_title = title;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn schema_policy(mut self, policy: SchemaPolicy) -> Self {
        self.config.schema_policy = policy;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<QuizConfig, QuizError> {
        let c = &self.config;
        if c.max_chars == 0 {
            return Err(QuizError::InvalidConfig(
                "max_chars must be ≥ 1".into(),
            ));
        }
        if !(c.endpoint.starts_with("http://") || c.endpoint.starts_with("https://")) {
            return Err(QuizError::InvalidConfig(format!(
                "endpoint must be an http(s) URL, got '{}'",
                c.endpoint
            )));
        }
        if c.model.trim().is_empty() {
            return Err(QuizError::InvalidConfig("model must not be empty".into()));
        }
        if c.api_timeout_secs == 0 {
            return Err(QuizError::InvalidConfig(
                "api_timeout_secs must be ≥ 1".into(),
            ));
        }
        if !c.temperature.is_finite() {
            return Err(QuizError::InvalidConfig(format!(
                "temperature must be a finite number, got {}",
                c.temperature
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Which kind of quiz questions to ask the model for.
///
/// Determines both the instruction line in the prompt and the item shape the
/// validator expects back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizMode {
    /// Four options plus the correct answer per question.
    Mcq,
    /// Open question plus a model answer. (default)
    #[default]
    Descriptive,
}

impl QuizMode {
    /// Parse the optional mode field of an upload.
    ///
    /// Only `"mcq"` (any case) selects multiple choice; anything else,
    /// including a missing field, means descriptive.
    pub fn parse(raw: Option<&str>) -> QuizMode {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("mcq") => QuizMode::Mcq,
            _ => QuizMode::Descriptive,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuizMode::Mcq => "mcq",
            QuizMode::Descriptive => "descriptive",
        }
    }
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with a reply once it parses as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SchemaPolicy {
    /// Check the reply against the quiz schema and reject mismatches. (default)
    #[default]
    Strict,
    /// Hand the parsed JSON to the caller unchecked.
    PassThrough,
}

/// Parse the optional question-count field of an upload.
///
/// Absent, unparsable and zero values all fall back to
/// [`DEFAULT_QUESTION_COUNT`].
pub fn parse_question_count(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_QUESTION_COUNT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_service_contract() {
        let c = QuizConfig::default();
        assert_eq!(c.model, DEFAULT_MODEL);
        assert_eq!(c.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(c.max_chars, 4000);
        assert_eq!(c.temperature, 0.3);
        assert_eq!(c.app_title.as_deref(), Some("Notes-to-Quiz"));
        assert_eq!(c.schema_policy, SchemaPolicy::Strict);
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = QuizConfig::builder().api_key("sk-secret").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("sk-secret"), "got: {dbg}");
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn build_rejects_zero_budget_and_bad_endpoint() {
        assert!(QuizConfig::builder().max_chars(0).build().is_err());
        assert!(QuizConfig::builder().endpoint("ftp://x").build().is_err());
        assert!(QuizConfig::builder().model("  ").build().is_err());
    }

    #[test]
    fn temperature_is_clamped() {
        let c = QuizConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn non_finite_temperature_is_rejected() {
        for raw in ["NaN", "inf", "-inf"] {
            let err = QuizConfig::from_lookup(|k| {
                (k == "NOTES2QUIZ_TEMPERATURE").then(|| raw.to_string())
            })
            .unwrap_err();
            assert!(matches!(err, QuizError::InvalidConfig(_)), "{raw}: {err:?}");
        }
        assert!(QuizConfig::builder().temperature(f32::NAN).build().is_err());
    }

    #[test]
    fn from_lookup_reads_variables() {
        let vars: HashMap<&str, &str> = [
            ("OPENROUTER_API_KEY", "sk-or-1"),
            ("NOTES2QUIZ_MODEL", "openai/gpt-4o-mini"),
            ("NOTES2QUIZ_MAX_CHARS", "1200"),
            ("NOTES2QUIZ_ENDPOINT", ""),
        ]
        .into_iter()
        .collect();
        let c = QuizConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(c.api_key.as_deref(), Some("sk-or-1"));
        assert_eq!(c.model, "openai/gpt-4o-mini");
        assert_eq!(c.max_chars, 1200);
        // Empty values are ignored rather than overriding the default.
        assert_eq!(c.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn from_lookup_rejects_garbage_numbers() {
        let err = QuizConfig::from_lookup(|k| {
            (k == "NOTES2QUIZ_MAX_CHARS").then(|| "lots".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("NOTES2QUIZ_MAX_CHARS"));
    }

    #[test]
    fn quiz_mode_parsing() {
        assert_eq!(QuizMode::parse(Some("mcq")), QuizMode::Mcq);
        assert_eq!(QuizMode::parse(Some(" MCQ ")), QuizMode::Mcq);
        assert_eq!(QuizMode::parse(Some("descriptive")), QuizMode::Descriptive);
        assert_eq!(QuizMode::parse(Some("true/false")), QuizMode::Descriptive);
        assert_eq!(QuizMode::parse(None), QuizMode::Descriptive);
    }

    #[test]
    fn question_count_parsing() {
        assert_eq!(parse_question_count(Some("3")), 3);
        assert_eq!(parse_question_count(Some(" 25 ")), 25);
        assert_eq!(parse_question_count(Some("0")), 10);
        assert_eq!(parse_question_count(Some("-4")), 10);
        assert_eq!(parse_question_count(Some("ten")), 10);
        assert_eq!(parse_question_count(None), 10);
    }
}
