// Core layer - configuration and error types
pub mod core;

// Features layer - schedule engine, messages, delivery, reminders
pub mod features;

// Application layer
pub mod commands;

pub use core::Config;

pub use features::{
    // Seasons
    Clock, RegimeName, SeasonCalendar,
    // Messages
    MessageComposer,
    // Delivery
    DiscordTransport, Transport,
    // Reminders
    ReminderDispatcher, ReminderScheduler, ReminderTrigger,
};
