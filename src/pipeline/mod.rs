//! Pipeline stages for notes-to-quiz generation.
//!
//! Each submodule implements exactly one transformation step and can be
//! tested without the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ (prompts) ──▶ llm ──▶ sanitize ──▶ validate
//! (path/URL)  (pdfium)                (chat)   (JSON fix)   (schema)
//! ```
//!
//! 1. [`input`]    — read a local path or download a URL; `%PDF` magic check
//! 2. [`extract`]  — page text via pdfium, in `spawn_blocking`; truncation
//! 3. [`llm`]      — one chat-completion call; the only stage talking to the
//!    generation service
//! 4. [`sanitize`] — locate the JSON object in the reply and undo LaTeX-style
//!    escapes
//! 5. [`validate`] — check the parsed value against the quiz schema for the
//!    requested mode

pub mod extract;
pub mod input;
pub mod llm;
pub mod sanitize;
pub mod validate;
