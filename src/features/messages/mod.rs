//! # Messages Feature
//!
//! Reminder text composition: fixed templates, optional generated text, and
//! the sanitization pipeline generated text must pass.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 1.1.0: Ollama backend and trainer-facing messages
//! - 1.0.0: Initial release

pub mod backend;
pub mod composer;
pub mod prompts;
pub mod sanitize;

pub use backend::{GenerationBackend, GenerationParams, OllamaBackend, OpenAiBackend};
pub use composer::{ComposeOptions, ComposedMessage, MessageComposer, MessageSource};
