//! # Reminders Feature
//!
//! Day-before practice reminders: tick decisions, dispatch to the group and
//! trainer channels, and the background scheduler.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 2.0.0: Seasonal practice reminders
//! - 1.0.0: Initial release

pub mod dispatch;
pub mod scheduler;
pub mod trigger;

pub use dispatch::{DeliveryOutcome, DispatchReport, ReminderDispatcher, TrainerOptions};
pub use scheduler::{duration_until, ReminderScheduler};
pub use trigger::{Diagnosis, ReminderTrigger};
