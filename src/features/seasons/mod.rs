//! # Seasons Feature
//!
//! Seasonal schedule engine: calendar rules, season resolution and occurrence
//! projection.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Clock abstraction for test-mode date overrides
//! - 1.0.0: Initial release

pub mod clock;
pub mod projector;
pub mod resolver;
pub mod rules;

pub use clock::{parse_instant, Clock, FixedClock, SystemClock};
pub use projector::{format_date, ResolvedOccurrence};
pub use rules::{DateBoundary, RegimeConfig, RegimeName, SeasonCalendar, SlotTime, WeeklySlot};
