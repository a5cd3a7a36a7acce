//! Diagnostic slash commands: /test_template, /test_llm, /test_season, /send_now

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;

/// Creates diagnostic commands
pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![
        CreateApplicationCommand::default()
            .name("test_template")
            .description("Preview the template reminder for the next training")
            .to_owned(),
        CreateApplicationCommand::default()
            .name("test_llm")
            .description("Preview a generated reminder for the next training")
            .to_owned(),
        create_test_season_command(),
        CreateApplicationCommand::default()
            .name("send_now")
            .description("Send the reminder for the next training right away (admin channel only)")
            .to_owned(),
    ]
}

fn create_test_season_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("test_season")
        .description("Check season logic for a simulated date")
        .create_option(|option| {
            option
                .name("date")
                .description("Date to simulate (YYYY-MM-DD)")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .to_owned()
}
