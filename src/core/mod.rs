//! # Core Module
//!
//! Configuration and the error taxonomy shared by every feature.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.7.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Domain error types; schedule-aware configuration
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod error;

pub use config::{Config, GenerationProvider};
pub use error::{GenerationError, ScheduleError, TransportError};
