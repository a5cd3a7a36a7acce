//! # Health Feature
//!
//! Liveness checks for container orchestration: whether Discord is reachable
//! and which generation provider is active. Served over HTTP by [`server`].
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 1.0.0: Aggregate, Discord and generation checks

pub mod server;

pub use server::HealthServer;

use crate::features::delivery::Transport;
use crate::features::get_bot_version;
use crate::features::messages::MessageComposer;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Default listening port, overridden by `HEALTH_PORT`
pub const DEFAULT_HEALTH_PORT: u16 = 3004;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Connected,
    Disconnected,
    Disabled,
}

/// Result of checking one dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceCheck {
    pub service: &'static str,
    pub status: ServiceStatus,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceCheck {
    pub fn is_healthy(&self) -> bool {
        self.status == ServiceStatus::Connected
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub discord: ServiceCheck,
    pub generation: ServiceCheck,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

impl HealthReport {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Checks the transport and the generation backend on demand
#[derive(Clone)]
pub struct HealthChecker {
    transport: Arc<dyn Transport>,
    composer: MessageComposer,
    /// Generation was switched on, so a missing or failing provider is an error
    generation_required: bool,
    start_time: Instant,
}

impl HealthChecker {
    pub fn new(
        transport: Arc<dyn Transport>,
        composer: MessageComposer,
        generation_required: bool,
    ) -> Self {
        Self {
            transport,
            composer,
            generation_required,
            start_time: Instant::now(),
        }
    }

    pub async fn check_discord(&self) -> ServiceCheck {
        let started = Instant::now();
        let result = self.transport.check().await;
        let response_time_ms = elapsed_ms(started);

        match result {
            Ok(()) => ServiceCheck {
                service: "discord",
                status: ServiceStatus::Connected,
                response_time_ms,
                provider: None,
                error: None,
            },
            Err(e) => ServiceCheck {
                service: "discord",
                status: ServiceStatus::Disconnected,
                response_time_ms,
                provider: None,
                error: Some(e.to_string()),
            },
        }
    }

    pub async fn check_generation(&self) -> ServiceCheck {
        let started = Instant::now();
        let result = self.composer.check_backend().await;
        let response_time_ms = elapsed_ms(started);

        let (status, error) = match result {
            None => (ServiceStatus::Disabled, None),
            Some(Ok(())) => (ServiceStatus::Connected, None),
            Some(Err(e)) => (ServiceStatus::Disconnected, Some(e.to_string())),
        };
        ServiceCheck {
            service: "generation",
            status,
            response_time_ms,
            provider: Some(self.composer.provider_name()),
            error,
        }
    }

    /// Run every check. Discord must be connected; generation only counts
    /// when it was switched on.
    pub async fn report(&self) -> HealthReport {
        let discord = self.check_discord().await;
        let generation = self.check_generation().await;

        let mut errors = Vec::new();
        if let Some(e) = &discord.error {
            errors.push(format!("Discord: {e}"));
        }
        if self.generation_required && !generation.is_healthy() {
            let reason = generation.error.as_deref().unwrap_or("disabled");
            errors.push(format!("Generation: {reason}"));
        }

        HealthReport {
            status: if errors.is_empty() { "ok" } else { "error" },
            version: get_bot_version(),
            uptime_secs: self.start_time.elapsed().as_secs(),
            discord,
            generation,
            error: (!errors.is_empty()).then(|| errors.join("; ")),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
