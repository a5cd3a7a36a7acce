//! Reminder dispatch: compose the messages for one practice and hand them to
//! the transport.
//!
//! Delivery failures are logged and reported, never retried.

use crate::features::delivery::{SendOptions, Transport};
use crate::features::messages::{ComposeOptions, ComposedMessage, MessageComposer, MessageSource};
use crate::features::seasons::{ResolvedOccurrence, SeasonCalendar};
use log::{info, warn};
use std::sync::Arc;

/// Trainer channel settings; absent means no trainer message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainerOptions {
    pub destination: String,
    pub use_generation: bool,
}

/// Result of one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub destination: String,
    pub source: MessageSource,
    pub delivered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DispatchReport {
    pub group: Option<DeliveryOutcome>,
    pub trainer: Option<DeliveryOutcome>,
}

impl DispatchReport {
    pub fn delivered_count(&self) -> usize {
        [&self.group, &self.trainer]
            .into_iter()
            .flatten()
            .filter(|outcome| outcome.delivered)
            .count()
    }
}

#[derive(Clone)]
pub struct ReminderDispatcher {
    calendar: Arc<SeasonCalendar>,
    composer: MessageComposer,
    transport: Arc<dyn Transport>,
    group_destination: Option<String>,
    group_options: ComposeOptions,
    trainer: Option<TrainerOptions>,
}

impl ReminderDispatcher {
    pub fn new(
        calendar: Arc<SeasonCalendar>,
        composer: MessageComposer,
        transport: Arc<dyn Transport>,
        group_destination: Option<String>,
        group_options: ComposeOptions,
    ) -> Self {
        Self {
            calendar,
            composer,
            transport,
            group_destination,
            group_options,
            trainer: None,
        }
    }

    pub fn with_trainer(mut self, trainer: Option<TrainerOptions>) -> Self {
        self.trainer = trainer;
        self
    }

    pub fn composer(&self) -> &MessageComposer {
        &self.composer
    }

    pub fn group_destination(&self) -> Option<&str> {
        self.group_destination.as_deref()
    }

    pub fn group_options(&self) -> ComposeOptions {
        self.group_options
    }

    /// Compose and send the reminder(s) for `occurrence`
    pub async fn dispatch(&self, occurrence: &ResolvedOccurrence) -> DispatchReport {
        let regime = self.calendar.regime(occurrence.regime);
        let mut report = DispatchReport::default();

        match self.group_destination.as_deref() {
            Some(destination) => {
                let message = self
                    .composer
                    .compose(regime, &occurrence.slot, self.group_options)
                    .await;
                report.group = Some(self.deliver(destination, &message, "group reminder").await);
            }
            None => warn!(
                "⚠️ No reminder channel configured, skipping reminder for {}",
                occurrence.formatted_date()
            ),
        }

        if let Some(trainer) = &self.trainer {
            let options = ComposeOptions {
                use_generation: trainer.use_generation,
            };
            let message = self
                .composer
                .compose_trainer(regime, &occurrence.slot, options)
                .await;
            report.trainer =
                Some(self.deliver(&trainer.destination, &message, "trainer request").await);
        }

        report
    }

    async fn deliver(
        &self,
        destination: &str,
        message: &ComposedMessage,
        label: &str,
    ) -> DeliveryOutcome {
        let delivered = match self
            .transport
            .send(destination, &message.text, SendOptions::default())
            .await
        {
            Ok(()) => {
                info!("📨 Sent {label} ({}) to {destination}", message.source);
                true
            }
            Err(e) => {
                warn!("Failed to send {label} to {destination}: {e}");
                false
            }
        };

        DeliveryOutcome {
            destination: destination.to_string(),
            source: message.source,
            delivered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::delivery::tests::RecordingTransport;
    use crate::features::seasons::rules::tests::sample_calendar;
    use chrono::NaiveDate;

    fn tuesday_occurrence(calendar: &SeasonCalendar) -> ResolvedOccurrence {
        calendar
            .occurrence_on(NaiveDate::from_ymd_opt(2024, 1, 16).unwrap())
            .unwrap()
    }

    fn dispatcher(transport: Arc<RecordingTransport>) -> ReminderDispatcher {
        ReminderDispatcher::new(
            Arc::new(sample_calendar()),
            MessageComposer::templates_only(),
            transport,
            Some("111".to_string()),
            ComposeOptions::generated(),
        )
    }

    #[tokio::test]
    async fn test_dispatch_group_only() {
        let transport = Arc::new(RecordingTransport::default());
        let dispatcher = dispatcher(transport.clone());
        let occurrence = tuesday_occurrence(&sample_calendar());

        let report = dispatcher.dispatch(&occurrence).await;
        assert_eq!(report.delivered_count(), 1);
        assert!(report.trainer.is_none());

        let sent = transport.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "111");
        assert!(sent[0].1.contains("Park Arena"));
    }

    #[tokio::test]
    async fn test_dispatch_with_trainer() {
        let transport = Arc::new(RecordingTransport::default());
        let dispatcher = dispatcher(transport.clone()).with_trainer(Some(TrainerOptions {
            destination: "222".to_string(),
            use_generation: false,
        }));
        let occurrence = tuesday_occurrence(&sample_calendar());

        let report = dispatcher.dispatch(&occurrence).await;
        assert_eq!(report.delivered_count(), 2);
        assert_eq!(
            report.trainer.map(|t| t.source),
            Some(MessageSource::Template)
        );

        let sent = transport.sent.lock().await;
        let destinations: Vec<_> = sent.iter().map(|(d, _)| d.as_str()).collect();
        assert_eq!(destinations, vec!["111", "222"]);
    }

    #[tokio::test]
    async fn test_delivery_failure_is_reported_not_raised() {
        let transport = Arc::new(RecordingTransport::failing());
        let dispatcher = dispatcher(transport.clone());
        let occurrence = tuesday_occurrence(&sample_calendar());

        let report = dispatcher.dispatch(&occurrence).await;
        let group = report.group.as_ref().unwrap();
        assert!(!group.delivered);
        assert_eq!(report.delivered_count(), 0);
        assert!(transport.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_group_destination_skips() {
        let transport = Arc::new(RecordingTransport::default());
        let dispatcher = ReminderDispatcher::new(
            Arc::new(sample_calendar()),
            MessageComposer::templates_only(),
            transport.clone(),
            None,
            ComposeOptions::template(),
        );
        let occurrence = tuesday_occurrence(&sample_calendar());

        let report = dispatcher.dispatch(&occurrence).await;
        assert!(report.group.is_none());
        assert!(transport.sent.lock().await.is_empty());
    }
}
