use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info, warn};
use serenity::async_trait;
use serenity::http::Http;
use serenity::model::application::interaction::{Interaction, InteractionResponseType};
use serenity::model::gateway::Ready;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::sync::Arc;

use practice_reminder::commands::{
    register_global_commands, register_guild_commands, CommandContext, CommandRegistry,
};
use practice_reminder::core::Config;
use practice_reminder::features::delivery::{DiscordTransport, Transport};
use practice_reminder::features::health::{HealthChecker, HealthServer};
use practice_reminder::features::messages::MessageComposer;
use practice_reminder::features::reminders::{
    ReminderDispatcher, ReminderScheduler, ReminderTrigger,
};

struct Handler {
    registry: CommandRegistry,
    command_ctx: Arc<CommandContext>,
    guild_id: Option<GuildId>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!("🤖 Bot ID: {}", ready.user.id);

        // Guild commands update instantly; global ones can take up to an hour
        if let Some(guild_id) = self.guild_id {
            info!("🔧 Development mode: Registering commands for guild {guild_id}");
            if let Err(e) = register_guild_commands(&ctx, guild_id).await {
                error!("❌ Failed to register guild slash commands: {e}");
            } else {
                info!("✅ Successfully registered slash commands for guild {guild_id}");
            }
        } else {
            info!("🌍 Production mode: Registering commands globally");
            if let Err(e) = register_global_commands(&ctx).await {
                error!("❌ Failed to register global slash commands: {e}");
            } else {
                info!("✅ Successfully registered slash commands globally (may take up to 1 hour to propagate)");
            }
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::ApplicationCommand(command) = interaction else {
            return;
        };

        let name = command.data.name.clone();
        let Some(handler) = self.registry.get(&name) else {
            warn!("Unknown slash command: /{name}");
            return;
        };

        if let Err(e) = handler
            .handle(Arc::clone(&self.command_ctx), &ctx, &command)
            .await
        {
            error!("Error handling /{name}: {e}");

            // The interaction may already be deferred; try both reply paths
            let text = "Sorry, something went wrong while handling that command.";
            let edited = command
                .edit_original_interaction_response(&ctx.http, |r| r.content(text))
                .await;
            if edited.is_err() {
                if let Err(why) = command
                    .create_interaction_response(&ctx.http, |r| {
                        r.kind(InteractionResponseType::ChannelMessageWithSource)
                            .interaction_response_data(|m| m.content(text).ephemeral(true))
                    })
                    .await
                {
                    error!("Failed to send error response: {why}");
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    // The openai crate reads its key from the environment
    if let Some(key) = &config.openai_api_key {
        std::env::set_var("OPENAI_API_KEY", key);
        std::env::set_var("OPENAI_KEY", key);
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("🥏 Starting Practice Reminder Bot...");

    let calendar = Arc::new(config.calendar.clone());
    let clock = config.clock();

    let current = calendar.regime(calendar.resolve(clock.now()));
    info!("{} Current season: {}", current.name.emoji(), current.name.title());
    info!("📍 Location: {}", current.location);
    info!("🗓️ Training days: {}", current.training_days());

    let composer = MessageComposer::new(config.generation_backend());
    info!(
        "🤖 Message generation: {} (group: {}, trainer: {})",
        composer.provider_name(),
        if config.generation_enabled { "on" } else { "off" },
        if config.trainer_generation_enabled { "on" } else { "off" }
    );

    if config.reminder_channel_id.is_none() {
        warn!("⚠️ REMINDER_CHANNEL_ID not set - reminders will be composed but not sent");
    }
    if let Some(trainer) = &config.trainer_channel_id {
        info!("👟 Trainer requests go to channel {trainer}");
    }

    let http = Arc::new(Http::new(&config.discord_token));
    let transport: Arc<dyn Transport> = Arc::new(DiscordTransport::new(http));

    // Kept alive for the life of main; dropping it stops the listener
    let _health_server = match config.health_port {
        Some(port) => {
            let checker = HealthChecker::new(
                transport.clone(),
                composer.clone(),
                config.generation_enabled,
            );
            Some(HealthServer::start(checker, &config.health_host, port).await?)
        }
        None => {
            info!("🩺 Health server disabled");
            None
        }
    };

    let dispatcher = ReminderDispatcher::new(
        calendar.clone(),
        composer,
        transport,
        config.reminder_channel_id.clone(),
        config.group_compose_options(),
    )
    .with_trainer(config.trainer_options());

    let command_ctx = Arc::new(CommandContext::new(
        calendar.clone(),
        dispatcher.clone(),
        clock.clone(),
        config.admin_channel_id.clone(),
    ));

    // Parse guild ID if provided for development mode
    let guild_id = config
        .discord_guild_id
        .as_ref()
        .and_then(|id| id.parse::<u64>().ok())
        .map(GuildId);

    let handler = Handler {
        registry: CommandRegistry::with_default_handlers(),
        command_ctx,
        guild_id,
    };

    let intents = GatewayIntents::GUILDS;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    // Start the reminder scheduler
    let scheduler = Arc::new(ReminderScheduler::new(
        ReminderTrigger::new(calendar),
        dispatcher,
        clock,
    ));
    tokio::spawn(async move {
        scheduler.run().await;
    });

    info!("Bot configured successfully. Connecting to Discord gateway...");

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        error!("This could be due to:");
        error!("  - Invalid bot token");
        error!("  - Network connectivity issues");
        error!("  - Discord API outage");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
