//! Diagnostic command handlers
//!
//! Handles: test_template, test_llm, test_season, send_now
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: /send_now restricted to the admin channel
//! - 1.0.0: Initial release

use anyhow::Result;
use async_trait::async_trait;
use log::{info, warn};
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::SlashCommandHandler;
use crate::commands::slash::get_string_option;
use crate::core::error::ScheduleError;
use crate::features::messages::{ComposeOptions, ComposedMessage};
use crate::features::reminders::{Diagnosis, DispatchReport};
use crate::features::seasons::parse_instant;

const DATE_FORMAT_HELP: &str = "Use format: YYYY-MM-DD (e.g., 2024-01-15)";

/// Handler for previews and admin actions
pub struct DiagnosticsHandler;

#[async_trait]
impl SlashCommandHandler for DiagnosticsHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["test_template", "test_llm", "test_season", "send_now"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        match command.data.name.as_str() {
            "test_template" => self.handle_preview(&ctx, serenity_ctx, command, false).await,
            "test_llm" => self.handle_preview(&ctx, serenity_ctx, command, true).await,
            "test_season" => self.handle_test_season(&ctx, serenity_ctx, command).await,
            "send_now" => self.handle_send_now(&ctx, serenity_ctx, command).await,
            _ => Ok(()),
        }
    }
}

impl DiagnosticsHandler {
    /// Handle /test_template and /test_llm
    async fn handle_preview(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
        use_generation: bool,
    ) -> Result<()> {
        // Generation can take longer than the interaction window
        command
            .create_interaction_response(&serenity_ctx.http, |r| {
                r.kind(InteractionResponseType::DeferredChannelMessageWithSource)
            })
            .await?;

        let occurrence = ctx.trigger.upcoming(ctx.now())?;
        let regime = ctx.calendar.regime(occurrence.regime);
        let composer = ctx.dispatcher.composer();
        let message = composer
            .compose(regime, &occurrence.slot, ComposeOptions { use_generation })
            .await;

        let text = preview_text(&message, use_generation, composer.provider_name());
        command
            .edit_original_interaction_response(&serenity_ctx.http, |r| r.content(text))
            .await?;

        info!(
            "/{} preview for {} ({})",
            command.data.name,
            occurrence.formatted_date(),
            message.source
        );
        Ok(())
    }

    /// Handle /test_season
    async fn handle_test_season(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let input = get_string_option(&command.data.options, "date").unwrap_or_default();

        let text = match test_season_text(ctx, &input) {
            Ok(text) => text,
            Err(e) => {
                warn!("/test_season rejected '{input}': {e}");
                format!("❌ Error: {e}\n{DATE_FORMAT_HELP}")
            }
        };

        command
            .create_interaction_response(&serenity_ctx.http, |r| {
                r.kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|m| m.content(text))
            })
            .await?;
        Ok(())
    }

    /// Handle /send_now
    async fn handle_send_now(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        if !ctx.is_admin_channel(command.channel_id) {
            warn!(
                "/send_now refused for user {} in channel {}",
                command.user.id, command.channel_id
            );
            command
                .create_interaction_response(&serenity_ctx.http, |r| {
                    r.kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(|m| {
                            m.content("❌ This command can only be used in the admin channel.")
                                .ephemeral(true)
                        })
                })
                .await?;
            return Ok(());
        }

        command
            .create_interaction_response(&serenity_ctx.http, |r| {
                r.kind(InteractionResponseType::DeferredChannelMessageWithSource)
            })
            .await?;

        let occurrence = ctx.trigger.upcoming(ctx.now())?;
        info!(
            "/send_now by {}: dispatching reminder for {}",
            command.user.id,
            occurrence.formatted_date()
        );
        let report = ctx.dispatcher.dispatch(&occurrence).await;

        let text = send_now_text(&report);
        command
            .edit_original_interaction_response(&serenity_ctx.http, |r| r.content(text))
            .await?;
        Ok(())
    }
}

fn preview_text(message: &ComposedMessage, use_generation: bool, provider: &str) -> String {
    if use_generation {
        format!(
            "🤖 Generated Message ({provider}, {}):\n\n{}",
            message.source, message.text
        )
    } else {
        format!("📝 Template Message:\n\n{}", message.text)
    }
}

/// Diagnostic report for a simulated date
pub fn test_season_text(ctx: &CommandContext, input: &str) -> Result<String, ScheduleError> {
    let instant = parse_instant(input)?;
    let diagnosis = ctx.trigger.diagnose(instant)?;
    let mut text = format_diagnosis(input.trim(), &diagnosis);

    if let Some(tomorrow) = &diagnosis.tomorrow {
        let regime = ctx.calendar.regime(tomorrow.regime);
        let message = ctx.dispatcher.composer().template_message(regime, &tomorrow.slot);
        text.push_str(&format!("\n\n📢 Message that would be sent:\n\n{}", message.text));
    }
    Ok(text)
}

fn format_diagnosis(label: &str, diagnosis: &Diagnosis) -> String {
    let should_send = if diagnosis.should_send() {
        "✅ Yes"
    } else {
        "❌ No"
    };
    format!(
        "🧪 Test Results for {label}:\n\n\
        📅 Season: {}\n\
        📍 Location: {}\n\
        ⏰ Time: {}\n\
        📝 Should send message today: {should_send}\n\
        🏃 Next training: {}, {}",
        diagnosis.season.title(),
        diagnosis.location,
        diagnosis.time,
        diagnosis.next.day_name(),
        diagnosis.next.formatted_date()
    )
}

fn send_now_text(report: &DispatchReport) -> String {
    match (&report.group, report.delivered_count()) {
        (None, _) if report.trainer.is_none() => {
            "⚠️ No reminder channel configured, nothing sent.".to_string()
        }
        (_, 0) => "❌ Sending failed, check the logs.".to_string(),
        (_, n) => format!("✅ Message sent! ({n} delivered)"),
    }
}
