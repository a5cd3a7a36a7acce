//! # Features
//!
//! Schedule engine, message composition, delivery, reminders and health checks.

pub mod delivery;
pub mod health;
pub mod messages;
pub mod reminders;
pub mod seasons;

pub use delivery::{DiscordTransport, SendOptions, Transport};
pub use health::{HealthChecker, HealthServer};
pub use messages::{ComposeOptions, ComposedMessage, MessageComposer, MessageSource};
pub use reminders::{ReminderDispatcher, ReminderScheduler, ReminderTrigger};
pub use seasons::{Clock, RegimeName, SeasonCalendar};

/// Crate version shown by `/info` and the health endpoints
pub fn get_bot_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
