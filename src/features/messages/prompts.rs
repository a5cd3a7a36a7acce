//! Reminder templates and generation instructions
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Trainer availability prompt and template
//! - 1.0.0: Group reminder prompt and template

use super::sanitize::location_display_name;
use crate::features::seasons::{RegimeName, SlotTime};

pub const FRISBEE: &str = "🥏";
pub const ROCKET: &str = "🚀";
pub const BULB: &str = "💡";
pub const THUMBS_UP: &str = "👍";
pub const RUNNER: &str = "🏃";
pub const FIRE: &str = "🔥";
pub const SUN: &str = "☀️";
pub const SNOWFLAKE: &str = "❄️";

/// The only emojis generated text may use
pub const ALLOWED_EMOJIS: [&str; 8] = [FRISBEE, ROCKET, BULB, THUMBS_UP, RUNNER, FIRE, SUN, SNOWFLAKE];

/// Everything a template or prompt needs to describe one practice
#[derive(Debug, Clone, Copy)]
pub struct PracticeDetails<'a> {
    pub regime: RegimeName,
    pub location: &'a str,
    pub time: SlotTime,
    pub day_name: &'static str,
}

/// Deterministic group reminder
pub fn group_template(details: &PracticeDetails<'_>) -> String {
    format!(
        "{ROCKET} Hey team!\n\n\
         Tomorrow we're planning an Ultimate Frisbee training at {} starting at {}.\n\n\
         {BULB} If you're in, just drop a {THUMBS_UP} on this message so we know how many are coming.\n\
         The more the merrier! {FRISBEE}",
        details.location, details.time
    )
}

/// Deterministic trainer request
pub fn trainer_template(details: &PracticeDetails<'_>) -> String {
    format!(
        "{FRISBEE} Hi coaches!\n\n\
         Tomorrow ({}) there's a {} training at {} starting at {}.\n\n\
         {BULB} Can you lead the session? React with {THUMBS_UP} if you're available.",
        details.day_name,
        details.regime,
        details.location,
        details.time
    )
}

/// Instruction for a generated group reminder.
///
/// Only the location's display name goes into the prompt; the sanitizer puts
/// the configured link back afterwards.
pub fn group_prompt(details: &PracticeDetails<'_>) -> String {
    let location = location_display_name(details.location);
    format!(
        "You write the reminder an Ultimate Frisbee group posts the day before training.\n\n\
         Context:\n\
         - Season: {season}\n\
         - Location: {location}\n\
         - Starting time: {time}\n\
         - Training day: tomorrow ({day})\n\n\
         Write exactly three short sections separated by one blank line:\n\
         1. A greeting with the location ({location}) and time ({time}) of tomorrow's training.\n\
         2. One request to react with {THUMBS_UP} to confirm attendance. Ask for nothing else.\n\
         3. A short, fun closing catch-phrase (like \"The more the merrier!\").\n\n\
         Rules:\n\
         - Use only these emojis, 2-4 in total: {emojis}\n\
         - Keep it casual and motivating, not cheesy.\n\
         - Output only the message. No title, no quotes, no explanations.",
        season = details.regime,
        location = location,
        time = details.time,
        day = details.day_name,
        emojis = ALLOWED_EMOJIS.join(" "),
    )
}

/// Instruction for a generated trainer request
pub fn trainer_prompt(details: &PracticeDetails<'_>) -> String {
    let location = location_display_name(details.location);
    format!(
        "You write a short message asking the coaches of an Ultimate Frisbee group \
         who can lead tomorrow's training.\n\n\
         Context:\n\
         - Season: {season}\n\
         - Location: {location}\n\
         - Starting time: {time}\n\
         - Training day: tomorrow ({day})\n\n\
         Write exactly three short sections separated by one blank line:\n\
         1. A greeting with the location ({location}) and time ({time}).\n\
         2. One request: react with {THUMBS_UP} if you can lead the session. Offer no other reactions.\n\
         3. A short, friendly closing line.\n\n\
         Rules:\n\
         - Use only these emojis, 1-3 in total: {emojis}\n\
         - Output only the message. No title, no quotes, no explanations.",
        season = details.regime,
        location = location,
        time = details.time,
        day = details.day_name,
        emojis = ALLOWED_EMOJIS.join(" "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(location: &str) -> PracticeDetails<'_> {
        PracticeDetails {
            regime: RegimeName::Winter,
            location,
            time: "20:30".parse().unwrap(),
            day_name: "Tuesday",
        }
    }

    #[test]
    fn test_group_template_is_deterministic() {
        let d = details("Park Arena");
        let text = group_template(&d);
        assert_eq!(text, group_template(&d));
        assert!(text.contains("at Park Arena starting at 20:30"));
        assert!(text.contains(THUMBS_UP));
    }

    #[test]
    fn test_trainer_template() {
        let text = trainer_template(&details("Park Arena"));
        assert!(text.contains("Tomorrow (Tuesday) there's a winter training"));
        assert!(text.contains("lead the session"));
    }

    #[test]
    fn test_prompt_uses_display_name() {
        let prompt = group_prompt(&details("[Park Arena](https://maps.example/p)"));
        assert!(prompt.contains("Location: Park Arena"));
        assert!(!prompt.contains("https://maps.example/p"));
        assert!(prompt.contains("Season: winter"));
        assert!(prompt.contains("exactly three short sections"));
    }

    #[test]
    fn test_trainer_prompt_differs() {
        let d = details("Park Arena");
        assert_ne!(group_prompt(&d), trainer_prompt(&d));
        assert!(trainer_prompt(&d).contains("lead the session"));
    }
}
