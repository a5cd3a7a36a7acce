//! Environment-driven configuration
//!
//! - **Version**: 2.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.1.0: Health server host and port
//! - 2.0.0: Season calendar, generation provider and test-mode settings
//! - 1.0.0: Initial release

use crate::core::error::ScheduleError;
use crate::features::messages::{
    ComposeOptions, GenerationBackend, OllamaBackend, OpenAiBackend,
};
use crate::features::health::DEFAULT_HEALTH_PORT;
use crate::features::reminders::TrainerOptions;
use crate::features::seasons::{
    parse_instant, Clock, DateBoundary, FixedClock, RegimeConfig, RegimeName, SeasonCalendar,
    SystemClock, WeeklySlot,
};
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use log::info;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_SCHEDULE_PATH: &str = "schedule.yaml";

/// Which text generation backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationProvider {
    Disabled,
    OpenAi,
    Ollama,
}

impl FromStr for GenerationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" | "off" | "disabled" => Ok(Self::Disabled),
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            other => anyhow::bail!(
                "Unknown GENERATION_PROVIDER '{other}' (expected openai, ollama or none)"
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub discord_guild_id: Option<String>,
    pub reminder_channel_id: Option<String>,
    pub admin_channel_id: Option<String>,
    pub trainer_channel_id: Option<String>,
    pub generation_provider: GenerationProvider,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub ollama_host: String,
    pub ollama_model: String,
    pub generation_enabled: bool,
    pub trainer_generation_enabled: bool,
    pub generation_timeout: Duration,
    pub calendar: SeasonCalendar,
    pub override_date: Option<NaiveDateTime>,
    /// `None` when `HEALTH_PORT=off`
    pub health_port: Option<u16>,
    pub health_host: String,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let discord_token = get("DISCORD_TOKEN").context("DISCORD_TOKEN must be set")?;

        let generation_provider: GenerationProvider = get("GENERATION_PROVIDER")
            .unwrap_or_default()
            .parse()?;
        let openai_api_key = get("OPENAI_API_KEY");
        if generation_provider == GenerationProvider::OpenAi && openai_api_key.is_none() {
            anyhow::bail!("OPENAI_API_KEY must be set when GENERATION_PROVIDER=openai");
        }

        let generation_enabled = match get("GENERATION_ENABLED") {
            Some(value) => parse_flag("GENERATION_ENABLED", &value)?,
            None => generation_provider != GenerationProvider::Disabled,
        };
        let trainer_generation_enabled = match get("TRAINER_GENERATION_ENABLED") {
            Some(value) => parse_flag("TRAINER_GENERATION_ENABLED", &value)?,
            None => false,
        };

        let generation_timeout = get("GENERATION_TIMEOUT_SECS")
            .map(|v| {
                v.parse::<u64>()
                    .with_context(|| format!("GENERATION_TIMEOUT_SECS '{v}' is not a number"))
            })
            .transpose()?
            .unwrap_or(45);

        let calendar = match get("SCHEDULE_CONFIG_PATH") {
            Some(path) => SeasonCalendar::load(&path)
                .with_context(|| format!("Failed to load schedule from {path}"))?,
            None if Path::new(DEFAULT_SCHEDULE_PATH).exists() => {
                SeasonCalendar::load(DEFAULT_SCHEDULE_PATH)
                    .with_context(|| format!("Failed to load schedule from {DEFAULT_SCHEDULE_PATH}"))?
            }
            None => calendar_from_lookup(&get)?,
        };

        let test_mode = match get("TEST_MODE") {
            Some(value) => parse_flag("TEST_MODE", &value)?,
            None => false,
        };
        let override_date = match get("OVERRIDE_DATE") {
            Some(value) if test_mode => Some(parse_instant(&value)?),
            _ => None,
        };

        let health_port = match get("HEALTH_PORT") {
            None => Some(DEFAULT_HEALTH_PORT),
            Some(value) if matches!(value.to_lowercase().as_str(), "off" | "none" | "disabled") => {
                None
            }
            Some(value) => Some(
                value
                    .parse::<u16>()
                    .with_context(|| format!("HEALTH_PORT '{value}' is not a valid port"))?,
            ),
        };

        let reminder_channel_id = get("REMINDER_CHANNEL_ID");

        Ok(Config {
            discord_token,
            discord_guild_id: get("DISCORD_GUILD_ID"),
            admin_channel_id: get("ADMIN_CHANNEL_ID").or_else(|| reminder_channel_id.clone()),
            reminder_channel_id,
            trainer_channel_id: get("TRAINER_CHANNEL_ID"),
            generation_provider,
            openai_api_key,
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            ollama_host: get("OLLAMA_HOST")
                .unwrap_or_else(|| "http://localhost:11434".to_string()),
            ollama_model: get("OLLAMA_MODEL").unwrap_or_else(|| "llama3.2:3b".to_string()),
            generation_enabled,
            trainer_generation_enabled,
            generation_timeout: Duration::from_secs(generation_timeout),
            calendar,
            override_date,
            health_port,
            health_host: get("HEALTH_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Clock every schedule decision reads "now" from
    pub fn clock(&self) -> Arc<dyn Clock> {
        match self.override_date {
            Some(instant) => {
                info!("🧪 Test mode: using {instant} as the current date");
                Arc::new(FixedClock(instant))
            }
            None => Arc::new(SystemClock),
        }
    }

    pub fn generation_backend(&self) -> Option<Arc<dyn GenerationBackend>> {
        match self.generation_provider {
            GenerationProvider::Disabled => None,
            GenerationProvider::OpenAi => Some(Arc::new(OpenAiBackend::new(
                self.openai_model.clone(),
                self.generation_timeout,
            ))),
            GenerationProvider::Ollama => Some(Arc::new(OllamaBackend::new(
                self.ollama_host.clone(),
                self.ollama_model.clone(),
                self.generation_timeout,
            ))),
        }
    }

    pub fn group_compose_options(&self) -> ComposeOptions {
        ComposeOptions {
            use_generation: self.generation_enabled,
        }
    }

    pub fn trainer_options(&self) -> Option<TrainerOptions> {
        self.trainer_channel_id
            .as_ref()
            .map(|destination| TrainerOptions {
                destination: destination.clone(),
                use_generation: self.trainer_generation_enabled,
            })
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("{key} must be true or false, got '{other}'"),
    }
}

fn calendar_from_lookup<G>(get: &G) -> Result<SeasonCalendar, ScheduleError>
where
    G: Fn(&str) -> Option<String>,
{
    SeasonCalendar::new(
        regime_from_lookup(get, RegimeName::Winter, "09:15", "Park Arena", "2:20:30,6:20:30")?,
        regime_from_lookup(get, RegimeName::Summer, "05:20", "Beach Courts", "0:19:00,3:19:00")?,
    )
}

/// Reads `<REGIME>_START_DATE`, `<REGIME>_LOCATION` and `<REGIME>_PRACTICE_DAYS`
fn regime_from_lookup<G>(
    get: &G,
    name: RegimeName,
    start: &str,
    location: &str,
    days: &str,
) -> Result<RegimeConfig, ScheduleError>
where
    G: Fn(&str) -> Option<String>,
{
    let prefix = name.as_str().to_uppercase();
    let boundary: DateBoundary = get(&format!("{prefix}_START_DATE"))
        .as_deref()
        .unwrap_or(start)
        .parse()?;
    let location = get(&format!("{prefix}_LOCATION")).unwrap_or_else(|| location.to_string());
    let days = get(&format!("{prefix}_PRACTICE_DAYS")).unwrap_or_else(|| days.to_string());

    Ok(RegimeConfig {
        name,
        boundary,
        location,
        slots: WeeklySlot::parse_list(&days)?,
    })
}
