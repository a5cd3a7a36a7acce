//! Schedule command handlers
//!
//! Handles: info, schedule, help
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: /schedule reports the next practice even when it is today; version in /info
//! - 1.0.0: Initial release

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Datelike, Duration};
use log::info;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::SlashCommandHandler;
use crate::core::error::ScheduleError;
use crate::features::get_bot_version;
use crate::features::seasons::{DateBoundary, RegimeConfig, ResolvedOccurrence, SeasonCalendar};

/// Handler for schedule lookups: info, schedule, help
pub struct ScheduleHandler;

#[async_trait]
impl SlashCommandHandler for ScheduleHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["info", "schedule", "help"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let text = match command.data.name.as_str() {
            "info" => info_text(&ctx),
            "schedule" => schedule_text(&next_training(&ctx)?),
            "help" => help_text(&ctx.calendar),
            _ => return Ok(()),
        };

        command
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| message.content(text))
            })
            .await?;

        info!(
            "/{} command completed for user {}",
            command.data.name, command.user.id
        );
        Ok(())
    }
}

/// Current season summary
pub fn info_text(ctx: &CommandContext) -> String {
    let regime = ctx.current_regime();
    let times: Vec<String> = regime
        .distinct_times()
        .into_iter()
        .map(|t| t.to_string())
        .collect();

    format!(
        "📅 Current Season: {}\n📍 Location: {}\n🗓️ Training Days: {}\n📢 Reminders sent the day before at: {}\n🥏 Bot version: {}",
        regime.name.title(),
        regime.location,
        regime.training_days(),
        times.join(", "),
        get_bot_version()
    )
}

/// First practice starting after the current instant
pub fn next_training(ctx: &CommandContext) -> Result<ResolvedOccurrence, ScheduleError> {
    ctx.calendar.next_occurrence(ctx.now())
}

pub fn schedule_text(next: &ResolvedOccurrence) -> String {
    format!(
        "🏃 Next Training:\n\n📅 Date: {}, {}\n📍 Location: {}\n⏰ Time: {}",
        next.day_name(),
        next.formatted_date(),
        next.effective_location,
        next.slot.time
    )
}

pub fn help_text(calendar: &SeasonCalendar) -> String {
    let mut text = String::from(
        "🥏 Ultimate Frisbee Training Bot Help\n\n🤖 This bot sends a training reminder the day before every practice, following the season:\n",
    );

    for regime in calendar.regimes() {
        let other = calendar
            .regimes()
            .into_iter()
            .find(|r| r.name != regime.name)
            .unwrap_or(regime);
        text.push_str(&format!(
            "\n{} {} ({} - {}):\n{}\n",
            regime.name.emoji(),
            regime.name.title(),
            regime.boundary.format_short(),
            season_end(other),
            practice_lines(regime)
        ));
    }

    text.push_str(
        "\n📝 Commands:\n\
        /info - Show current season info\n\
        /schedule - Show next training\n\
        /test_template - Preview the template reminder\n\
        /test_llm - Preview an AI-generated reminder\n\
        /test_season [date] - Check season logic for a date\n\
        /send_now - Send the next reminder now (admin channel)\n\
        /help - Show this help",
    );
    text
}

/// Last day of a season: the day before the next season starts
fn season_end(next_season: &RegimeConfig) -> String {
    // Non-leap year so a Mar 1 start ends on Feb 28
    let end = next_season.boundary.anchor(2023) - Duration::days(1);
    DateBoundary::new(end.month(), end.day())
        .map(|b| b.format_short())
        .unwrap_or_default()
}

fn practice_lines(regime: &RegimeConfig) -> String {
    regime
        .slots
        .iter()
        .map(|slot| {
            let location = regime.effective_location(slot);
            if location == regime.location {
                format!("   • {}s at {}", slot.day_name(), slot.time)
            } else {
                format!("   • {}s at {} ({location})", slot.day_name(), slot.time)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::tests::{context_with, test_context};
    use crate::features::seasons::{RegimeName, WeeklySlot};

    #[test]
    fn test_schedule_handler_commands() {
        let names = ScheduleHandler.command_names();
        assert_eq!(names, &["info", "schedule", "help"]);
    }

    #[test]
    fn test_info_text() {
        let ctx = test_context("2024-01-15", None);
        let text = info_text(&ctx);
        assert!(text.contains("Current Season: Winter"));
        assert!(text.contains("Location: Park Arena"));
        assert!(text.contains("Tuesday at 20:30, Saturday at 21:00"));
        assert!(text.contains("20:30, 21:00"));
        assert!(text.ends_with(&format!("Bot version: {}", get_bot_version())));
    }

    #[test]
    fn test_schedule_text() {
        let ctx = test_context("2024-01-15T20:30", None);
        let next = next_training(&ctx).unwrap();
        assert_eq!(
            schedule_text(&next),
            "🏃 Next Training:\n\n📅 Date: Tuesday, Jan 16, 2024\n📍 Location: Park Arena\n⏰ Time: 20:30"
        );
    }

    #[test]
    fn test_next_training_prefers_today() {
        let sample = crate::features::seasons::rules::tests::sample_calendar();
        let mut winter = sample.regime(RegimeName::Winter).clone();
        winter.slots = vec![
            WeeklySlot::new(2, "20:30".parse().unwrap()),
            WeeklySlot::new(3, "20:30".parse().unwrap()),
        ];
        let calendar =
            SeasonCalendar::new(winter, sample.regime(RegimeName::Summer).clone()).unwrap();

        // Tuesday morning: tonight's practice comes before Wednesday's
        let ctx = context_with(calendar, "2024-01-16T10:00", None);
        let next = next_training(&ctx).unwrap();
        assert_eq!(next.formatted_date(), "Jan 16, 2024");
        assert!(schedule_text(&next).contains("Tuesday, Jan 16, 2024"));
    }

    #[test]
    fn test_help_text_season_ranges() {
        let ctx = test_context("2024-01-15", None);
        let text = help_text(&ctx.calendar);
        assert!(text.contains("Winter (Sept 15 - May 19)"));
        assert!(text.contains("Summer (May 20 - Sept 14)"));
        assert!(text.contains("   • Tuesdays at 20:30"));
        assert!(text.contains("/send_now"));
    }
}
