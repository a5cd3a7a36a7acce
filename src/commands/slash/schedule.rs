//! Schedule slash commands: /info, /schedule, /help

use serenity::builder::CreateApplicationCommand;

/// Creates schedule commands
pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![
        CreateApplicationCommand::default()
            .name("info")
            .description("Current season, location and training days")
            .to_owned(),
        CreateApplicationCommand::default()
            .name("schedule")
            .description("When and where the next training takes place")
            .to_owned(),
        CreateApplicationCommand::default()
            .name("help")
            .description("Season summary and available commands")
            .to_owned(),
    ]
}
