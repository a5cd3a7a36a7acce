//! Domain error types
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Initial taxonomy for schedule, generation and delivery failures

/// Errors raised by the schedule engine and its configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// The calendar cannot produce a schedule. Fatal at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A date supplied by a caller (override or diagnostic) could not be parsed.
    #[error("invalid date '{input}': {reason}")]
    InvalidDate {
        /// The raw input that was rejected.
        input: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl ScheduleError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn invalid_date(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidDate {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failures of the text generation backend. Never surfaced past the composer.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Backend(String),

    #[error("generation timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("generation returned empty text")]
    Empty,
}

/// Delivery failure reported by a transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("destination '{0}' is not a valid channel id")]
    InvalidDestination(String),

    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("transport unreachable: {0}")]
    Unreachable(String),
}
