//! # Message Composer
//!
//! Produces reminder text for the group channel and the trainer channel.
//! The template path always works; the generation path is tried only when
//! asked for and a backend is configured, and any failure falls back to the
//! template without reaching the caller.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Trainer-facing variant
//! - 1.0.0: Initial release

use super::backend::{GenerationBackend, GenerationParams};
use super::prompts::{self, PracticeDetails};
use super::sanitize::sanitize;
use crate::core::error::GenerationError;
use crate::features::seasons::{RegimeConfig, WeeklySlot};
use log::{info, warn};
use std::fmt;
use std::sync::Arc;

/// Where a composed message came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSource {
    Template,
    Generated,
}

impl fmt::Display for MessageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageSource::Template => f.write_str("template"),
            MessageSource::Generated => f.write_str("generated"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedMessage {
    pub text: String,
    pub source: MessageSource,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ComposeOptions {
    pub use_generation: bool,
}

impl ComposeOptions {
    pub fn generated() -> Self {
        Self {
            use_generation: true,
        }
    }

    pub fn template() -> Self {
        Self {
            use_generation: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Audience {
    Group,
    Trainer,
}

impl Audience {
    fn label(&self) -> &'static str {
        match self {
            Audience::Group => "group reminder",
            Audience::Trainer => "trainer request",
        }
    }

    fn template(&self, details: &PracticeDetails<'_>) -> String {
        match self {
            Audience::Group => prompts::group_template(details),
            Audience::Trainer => prompts::trainer_template(details),
        }
    }

    fn prompt(&self, details: &PracticeDetails<'_>) -> String {
        match self {
            Audience::Group => prompts::group_prompt(details),
            Audience::Trainer => prompts::trainer_prompt(details),
        }
    }
}

#[derive(Clone)]
pub struct MessageComposer {
    backend: Option<Arc<dyn GenerationBackend>>,
    params: GenerationParams,
}

impl MessageComposer {
    pub fn new(backend: Option<Arc<dyn GenerationBackend>>) -> Self {
        Self {
            backend,
            params: GenerationParams::default(),
        }
    }

    /// Composer with no generation backend
    pub fn templates_only() -> Self {
        Self::new(None)
    }

    /// Check the generation backend; `None` when running on templates only
    pub async fn check_backend(&self) -> Option<Result<(), GenerationError>> {
        match &self.backend {
            Some(backend) => Some(backend.check().await),
            None => None,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.backend
            .as_ref()
            .map(|backend| backend.provider_name())
            .unwrap_or("Templates")
    }

    /// Deterministic group reminder for a slot
    pub fn template_message(&self, regime: &RegimeConfig, slot: &WeeklySlot) -> ComposedMessage {
        let details = details_for(regime, slot);
        ComposedMessage {
            text: Audience::Group.template(&details),
            source: MessageSource::Template,
        }
    }

    /// Group reminder for the practice described by `slot`
    pub async fn compose(
        &self,
        regime: &RegimeConfig,
        slot: &WeeklySlot,
        options: ComposeOptions,
    ) -> ComposedMessage {
        self.compose_for(Audience::Group, regime, slot, options).await
    }

    /// Request asking trainers who can lead the practice
    pub async fn compose_trainer(
        &self,
        regime: &RegimeConfig,
        slot: &WeeklySlot,
        options: ComposeOptions,
    ) -> ComposedMessage {
        self.compose_for(Audience::Trainer, regime, slot, options).await
    }

    async fn compose_for(
        &self,
        audience: Audience,
        regime: &RegimeConfig,
        slot: &WeeklySlot,
        options: ComposeOptions,
    ) -> ComposedMessage {
        let details = details_for(regime, slot);
        let template = || ComposedMessage {
            text: audience.template(&details),
            source: MessageSource::Template,
        };

        if !options.use_generation {
            return template();
        }
        let Some(backend) = self.backend.as_ref() else {
            info!("No generation backend configured, using template {}", audience.label());
            return template();
        };

        match self.generate(backend.as_ref(), audience, &details).await {
            Ok(text) => {
                info!(
                    "Generated {} via {} ({} chars)",
                    audience.label(),
                    backend.provider_name(),
                    text.len()
                );
                ComposedMessage {
                    text,
                    source: MessageSource::Generated,
                }
            }
            Err(e) => {
                warn!(
                    "Generating {} failed: {e}. Falling back to template",
                    audience.label()
                );
                template()
            }
        }
    }

    async fn generate(
        &self,
        backend: &dyn GenerationBackend,
        audience: Audience,
        details: &PracticeDetails<'_>,
    ) -> Result<String, GenerationError> {
        let prompt = audience.prompt(details);
        let raw = backend.generate(&prompt, self.params).await?;
        let text = sanitize(&raw, details.location);
        if text.is_empty() {
            return Err(GenerationError::Empty);
        }
        Ok(text)
    }
}

fn details_for<'a>(regime: &'a RegimeConfig, slot: &'a WeeklySlot) -> PracticeDetails<'a> {
    PracticeDetails {
        regime: regime.name,
        location: regime.effective_location(slot),
        time: slot.time,
        day_name: slot.day_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::seasons::rules::tests::sample_calendar;
    use crate::features::seasons::RegimeName;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend returning a canned result and counting calls
    struct FakeBackend {
        reply: Result<&'static str, &'static str>,
        calls: AtomicUsize,
    }

    impl FakeBackend {
        fn ok(text: &'static str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(msg: &'static str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(msg),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl GenerationBackend for FakeBackend {
        fn provider_name(&self) -> &'static str {
            "Fake"
        }

        async fn generate(
            &self,
            _prompt: &str,
            _params: GenerationParams,
        ) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Ok(text) if text.trim().is_empty() => Err(GenerationError::Empty),
                Ok(text) => Ok(text.to_string()),
                Err(msg) => Err(GenerationError::Backend(msg.to_string())),
            }
        }
    }

    fn tuesday(regime: &RegimeConfig) -> &WeeklySlot {
        &regime.slots[0]
    }

    #[tokio::test]
    async fn test_template_path() {
        let calendar = sample_calendar();
        let winter = calendar.regime(RegimeName::Winter);
        let composer = MessageComposer::templates_only();

        let message = composer
            .compose(winter, tuesday(winter), ComposeOptions::generated())
            .await;
        assert_eq!(message.source, MessageSource::Template);
        assert!(message.text.contains("Park Arena"));
        assert!(message.text.contains("20:30"));
        assert_eq!(composer.provider_name(), "Templates");
    }

    #[tokio::test]
    async fn test_generation_disabled_skips_backend() {
        let calendar = sample_calendar();
        let winter = calendar.regime(RegimeName::Winter);
        let backend = FakeBackend::ok("Hey!");
        let composer = MessageComposer::new(Some(backend.clone()));

        let message = composer
            .compose(winter, tuesday(winter), ComposeOptions::template())
            .await;
        assert_eq!(message.source, MessageSource::Template);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generated_text_is_sanitized() {
        let calendar = sample_calendar();
        let winter = calendar.regime(RegimeName::Winter);
        let backend = FakeBackend::ok("\n🚀 Hey team, *Park Arena at 20:30!\n\n\n\nDrop a 👍\nThe more the merrier!\n");
        let composer = MessageComposer::new(Some(backend));

        let message = composer
            .compose(winter, tuesday(winter), ComposeOptions::generated())
            .await;
        assert_eq!(message.source, MessageSource::Generated);
        assert_eq!(
            message.text,
            "🚀 Hey team, Park Arena at 20:30!\n\nDrop a 👍\n\nThe more the merrier!"
        );
    }

    #[tokio::test]
    async fn test_backend_error_falls_back() {
        let calendar = sample_calendar();
        let winter = calendar.regime(RegimeName::Winter);
        let composer = MessageComposer::new(Some(FakeBackend::failing("connection refused")));

        let message = composer
            .compose(winter, tuesday(winter), ComposeOptions::generated())
            .await;
        assert_eq!(message, composer.template_message(winter, tuesday(winter)));
    }

    #[tokio::test]
    async fn test_empty_generation_falls_back() {
        let calendar = sample_calendar();
        let winter = calendar.regime(RegimeName::Winter);
        for reply in ["", "   \n\n  "] {
            let composer = MessageComposer::new(Some(FakeBackend::ok(reply)));
            let message = composer
                .compose(winter, tuesday(winter), ComposeOptions::generated())
                .await;
            assert_eq!(message.source, MessageSource::Template);
            assert!(!message.text.is_empty());
        }
    }

    #[tokio::test]
    async fn test_generated_text_restores_location_link() {
        let calendar = sample_calendar();
        let winter = calendar.regime(RegimeName::Winter);
        let slot = tuesday(winter)
            .clone()
            .with_location("[Sports Hall](https://maps.example/hall)");
        let composer = MessageComposer::new(Some(FakeBackend::ok("See you at Sports Hall!")));

        let message = composer
            .compose(winter, &slot, ComposeOptions::generated())
            .await;
        assert_eq!(
            message.text,
            "See you at [Sports Hall](https://maps.example/hall)!"
        );
    }

    #[tokio::test]
    async fn test_trainer_variant_falls_back_to_own_template() {
        let calendar = sample_calendar();
        let winter = calendar.regime(RegimeName::Winter);
        let composer = MessageComposer::new(Some(FakeBackend::failing("timeout")));

        let message = composer
            .compose_trainer(winter, tuesday(winter), ComposeOptions::generated())
            .await;
        assert_eq!(message.source, MessageSource::Template);
        assert!(message.text.contains("lead the session"));
        assert_ne!(message, composer.template_message(winter, tuesday(winter)));
    }
}
