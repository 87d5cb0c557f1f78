//! Progress-callback trait for pipeline stage events.
//!
//! Inject an [`Arc<dyn PipelineProgressCallback>`] via
//! [`crate::config::QuizConfigBuilder::progress_callback`] to be told when
//! each stage starts and finishes. The CLI uses this to drive its spinner; a
//! server could forward the events to a websocket or a job table.
//!
//! # Example
//!
//! ```rust
//! use notes2quiz::{PipelineProgressCallback, QuizConfig, Stage};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl PipelineProgressCallback for Printer {
//!     fn on_stage_start(&self, stage: Stage) {
//!         eprintln!("{}…", stage.label());
//!     }
//! }
//!
//! let config = QuizConfig::builder()
//!     .progress_callback(Arc::new(Printer) as Arc<dyn PipelineProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::QuizSummary;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// One step of the document-to-quiz pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extract,
    Prompt,
    Generate,
    Sanitize,
    Validate,
}

impl Stage {
    /// Short human-readable description used in logs and spinners.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Extract => "Extracting text",
            Stage::Prompt => "Building prompt",
            Stage::Generate => "Waiting for the model",
            Stage::Sanitize => "Cleaning reply",
            Stage::Validate => "Checking quiz schema",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Called by the pipeline as it moves through its stages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync` because a
/// shared pipeline may serve several requests at once.
pub trait PipelineProgressCallback: Send + Sync {
    /// Called just before `stage` runs.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when `stage` finished successfully.
    fn on_stage_complete(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called once when `stage` failed; no further events follow.
    fn on_pipeline_error(&self, stage: Stage, error: &str) {
        let _ = (stage, error);
    }

    /// Called once after the last stage succeeded.
    fn on_pipeline_complete(&self, summary: &QuizSummary) {
        let _ = summary;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::QuizConfig`].
pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl PipelineProgressCallback for Recorder {
        fn on_stage_start(&self, stage: Stage) {
            self.events.lock().unwrap().push(format!("start {stage:?}"));
        }

        fn on_stage_complete(&self, stage: Stage) {
            self.events.lock().unwrap().push(format!("done {stage:?}"));
        }

        fn on_pipeline_error(&self, stage: Stage, error: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("error {stage:?}: {error}"));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_stage_start(Stage::Extract);
        cb.on_stage_complete(Stage::Extract);
        cb.on_pipeline_error(Stage::Generate, "timeout");
        cb.on_pipeline_complete(&QuizSummary::default());
    }

    #[test]
    fn recorder_sees_events_in_order() {
        let rec = Recorder::default();
        rec.on_stage_start(Stage::Generate);
        rec.on_pipeline_error(Stage::Generate, "HTTP 503");
        let events = rec.events.lock().unwrap();
        assert_eq!(
            *events,
            vec!["start Generate".to_string(), "error Generate: HTTP 503".to_string()]
        );
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_stage_start(Stage::Validate);
        assert_eq!(Stage::Validate.to_string(), "Checking quiz schema");
    }
}
