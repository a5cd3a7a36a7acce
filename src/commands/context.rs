//! Shared context for command handlers
//!
//! - **Version**: 2.0.0
//! - **Since**: 3.38.0
//!
//! ## Changelog
//! - 2.0.0: Schedule engine, dispatcher and clock replace persona services
//! - 1.0.0: Initial implementation with core shared state

use crate::features::reminders::{ReminderDispatcher, ReminderTrigger};
use crate::features::seasons::{Clock, RegimeConfig, SeasonCalendar};
use chrono::NaiveDateTime;
use serenity::model::id::ChannelId;
use std::sync::Arc;

/// Shared context for all command handlers
///
/// Holds the read-only season calendar, the trigger used for previews and
/// diagnostics, the dispatcher `/send_now` goes through, and the clock every
/// "now" comes from.
#[derive(Clone)]
pub struct CommandContext {
    pub calendar: Arc<SeasonCalendar>,
    pub trigger: ReminderTrigger,
    pub dispatcher: ReminderDispatcher,
    pub clock: Arc<dyn Clock>,
    pub admin_channel_id: Option<String>,
}

impl CommandContext {
    pub fn new(
        calendar: Arc<SeasonCalendar>,
        dispatcher: ReminderDispatcher,
        clock: Arc<dyn Clock>,
        admin_channel_id: Option<String>,
    ) -> Self {
        Self {
            trigger: ReminderTrigger::new(calendar.clone()),
            calendar,
            dispatcher,
            clock,
            admin_channel_id,
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Regime in effect right now
    pub fn current_regime(&self) -> &RegimeConfig {
        self.calendar.regime(self.calendar.resolve(self.now()))
    }

    /// Whether admin commands may run in `channel_id`
    pub fn is_admin_channel(&self, channel_id: ChannelId) -> bool {
        self.admin_channel_id
            .as_deref()
            .and_then(|id| id.trim().parse::<u64>().ok())
            .is_some_and(|id| id == channel_id.0)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::features::delivery::tests::RecordingTransport;
    use crate::features::messages::{ComposeOptions, MessageComposer};
    use crate::features::seasons::rules::tests::sample_calendar;
    use crate::features::seasons::{FixedClock, RegimeName};

    pub(crate) fn test_context(now: &str, admin: Option<&str>) -> CommandContext {
        context_with(sample_calendar(), now, admin)
    }

    pub(crate) fn context_with(
        calendar: SeasonCalendar,
        now: &str,
        admin: Option<&str>,
    ) -> CommandContext {
        let calendar = Arc::new(calendar);
        let dispatcher = ReminderDispatcher::new(
            calendar.clone(),
            MessageComposer::templates_only(),
            Arc::new(RecordingTransport::default()),
            Some("111".to_string()),
            ComposeOptions::template(),
        );
        let clock = Arc::new(FixedClock::parse(now).unwrap());
        CommandContext::new(calendar, dispatcher, clock, admin.map(str::to_string))
    }

    #[test]
    fn test_command_context_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<CommandContext>();
    }

    #[test]
    fn test_current_regime_follows_clock() {
        assert_eq!(
            test_context("2024-01-15", None).current_regime().name,
            RegimeName::Winter
        );
        assert_eq!(
            test_context("2024-07-01", None).current_regime().name,
            RegimeName::Summer
        );
    }

    #[test]
    fn test_admin_channel() {
        let ctx = test_context("2024-01-15", Some("555"));
        assert!(ctx.is_admin_channel(ChannelId(555)));
        assert!(!ctx.is_admin_channel(ChannelId(556)));
        assert!(!test_context("2024-01-15", None).is_admin_channel(ChannelId(555)));
    }
}
