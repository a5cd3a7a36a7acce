//! # Reminder Scheduler
//!
//! Background task driving the daily ticks. Each armed time gets its own
//! loop that sleeps until the next wall-clock occurrence of that time; a
//! midnight pass re-arms times needed by an upcoming season.
//!
//! - **Version**: 2.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.1.0: Sleeps measured on zoned instants across DST changes
//! - 2.0.0: Season-aware daily ticks replace the per-user reminder poller
//! - 1.0.0: Initial release

use super::dispatch::{DispatchReport, ReminderDispatcher};
use super::trigger::ReminderTrigger;
use crate::features::seasons::{Clock, SlotTime};
use chrono::{DateTime, Duration as ChronoDuration, Local, TimeZone};
use log::{debug, error, info};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Real time left until the next wall-clock occurrence of `time` strictly
/// after `now`.
///
/// A time skipped by a spring-forward gap fires an hour later; a repeated
/// time fires on its first occurrence.
pub fn duration_until<Tz: TimeZone>(now: &DateTime<Tz>, time: SlotTime) -> Duration {
    let zone = now.timezone();
    let mut date = now.date_naive();

    for _ in 0..3 {
        let local = date.and_time(time.to_naive_time());
        let target = zone.from_local_datetime(&local).earliest().or_else(|| {
            zone.from_local_datetime(&(local + ChronoDuration::hours(1)))
                .earliest()
        });
        if let Some(target) = target {
            if target > *now {
                return (target - now.clone()).to_std().unwrap_or_default();
            }
        }
        date = date + ChronoDuration::days(1);
    }
    Duration::from_secs(24 * 3600)
}

pub struct ReminderScheduler {
    trigger: ReminderTrigger,
    dispatcher: ReminderDispatcher,
    /// Decides which date a tick evaluates; may be a simulated clock
    clock: Arc<dyn Clock>,
    armed: Mutex<BTreeSet<SlotTime>>,
}

impl ReminderScheduler {
    pub fn new(
        trigger: ReminderTrigger,
        dispatcher: ReminderDispatcher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            trigger,
            dispatcher,
            clock,
            armed: Mutex::new(BTreeSet::new()),
        }
    }

    pub async fn armed_times(&self) -> Vec<SlotTime> {
        self.armed.lock().await.iter().copied().collect()
    }

    /// Arm every time needed today or tomorrow that isn't armed yet.
    /// Returns the newly armed times; existing timers are left alone.
    pub async fn arm(self: &Arc<Self>) -> Vec<SlotTime> {
        let wanted = self.trigger.armed_times(self.clock.today());
        let mut armed = self.armed.lock().await;

        let new_times: Vec<SlotTime> = wanted.difference(&armed).copied().collect();
        for time in &new_times {
            armed.insert(*time);
            let scheduler = Arc::clone(self);
            let time = *time;
            tokio::spawn(async move {
                scheduler.tick_loop(time).await;
            });
        }

        if !new_times.is_empty() {
            let listed: Vec<String> = armed.iter().map(|t| t.to_string()).collect();
            info!("⏰ Armed reminder times: {}", listed.join(", "));
        }
        new_times
    }

    /// Run forever: arm, then re-check the season every midnight
    pub async fn run(self: Arc<Self>) {
        info!("Reminder scheduler started");
        self.arm().await;
        self.log_next_reminder();

        loop {
            tokio::time::sleep(duration_until(&Local::now(), SlotTime::MIDNIGHT)).await;
            debug!("Daily season check");
            if !self.arm().await.is_empty() {
                self.log_next_reminder();
            }
        }
    }

    async fn tick_loop(self: Arc<Self>, time: SlotTime) {
        loop {
            tokio::time::sleep(duration_until(&Local::now(), time)).await;
            self.on_tick(time).await;
        }
    }

    /// Evaluate one tick at `time` and dispatch anything due
    pub async fn on_tick(&self, time: SlotTime) -> Vec<DispatchReport> {
        let today = self.clock.today();
        let due = self.trigger.due_on_tick(today, time);
        if due.is_empty() {
            debug!("Tick {time} on {today}: no practice tomorrow at this time");
            return Vec::new();
        }

        let mut reports = Vec::with_capacity(due.len());
        for occurrence in &due {
            info!(
                "🔔 Practice tomorrow ({} {} at {}), sending reminder",
                occurrence.day_name(),
                occurrence.formatted_date(),
                occurrence.slot.time
            );
            reports.push(self.dispatcher.dispatch(occurrence).await);
        }
        self.log_next_reminder();
        reports
    }

    fn log_next_reminder(&self) {
        match self.trigger.next_reminder_at(self.clock.now()) {
            Ok((at, occurrence)) => info!(
                "📅 Next reminder {} for {} training on {} at {}",
                at.format("%Y-%m-%d %H:%M"),
                occurrence.regime,
                occurrence.formatted_date(),
                occurrence.slot.time
            ),
            Err(e) => error!("Failed to compute next reminder: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::delivery::tests::RecordingTransport;
    use crate::features::messages::{ComposeOptions, MessageComposer};
    use crate::features::seasons::rules::tests::sample_calendar;
    use crate::features::seasons::FixedClock;
    use chrono::{FixedOffset, LocalResult, NaiveDate, NaiveDateTime};

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn time(s: &str) -> SlotTime {
        s.parse().unwrap()
    }

    fn scheduler(now: &str, transport: Arc<RecordingTransport>) -> Arc<ReminderScheduler> {
        let calendar = Arc::new(sample_calendar());
        let dispatcher = ReminderDispatcher::new(
            calendar.clone(),
            MessageComposer::templates_only(),
            transport,
            Some("111".to_string()),
            ComposeOptions::template(),
        );
        Arc::new(ReminderScheduler::new(
            ReminderTrigger::new(calendar),
            dispatcher,
            Arc::new(FixedClock(at(now))),
        ))
    }

    /// Central European rules for 2024: +01:00, +02:00 between the last
    /// Sundays of March and October
    #[derive(Debug, Clone, Copy)]
    struct CentralEurope2024;

    impl CentralEurope2024 {
        fn winter() -> FixedOffset {
            FixedOffset::east_opt(3600).unwrap()
        }

        fn summer() -> FixedOffset {
            FixedOffset::east_opt(7200).unwrap()
        }
    }

    impl TimeZone for CentralEurope2024 {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            CentralEurope2024
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            if *local >= at("2024-03-31 02:00") && *local < at("2024-03-31 03:00") {
                LocalResult::None
            } else if *local >= at("2024-10-27 02:00") && *local < at("2024-10-27 03:00") {
                LocalResult::Ambiguous(Self::summer(), Self::winter())
            } else if *local >= at("2024-03-31 03:00") && *local < at("2024-10-27 03:00") {
                LocalResult::Single(Self::summer())
            } else {
                LocalResult::Single(Self::winter())
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc >= at("2024-03-31 01:00") && *utc < at("2024-10-27 01:00") {
                Self::summer()
            } else {
                Self::winter()
            }
        }
    }

    fn zoned(s: &str) -> DateTime<CentralEurope2024> {
        CentralEurope2024.from_local_datetime(&at(s)).earliest().unwrap()
    }

    #[test]
    fn test_duration_until() {
        assert_eq!(
            duration_until(&zoned("2024-01-15 20:00"), time("20:30")),
            Duration::from_secs(30 * 60)
        );
        assert_eq!(
            duration_until(&zoned("2024-01-15 20:30"), time("20:30")),
            Duration::from_secs(24 * 3600)
        );
        assert_eq!(
            duration_until(&zoned("2024-01-15 21:00"), time("00:00")),
            Duration::from_secs(3 * 3600)
        );
    }

    #[test]
    fn test_duration_until_across_dst_changes() {
        // Clocks go forward overnight: the next 20:30 is 23 real hours away
        assert_eq!(
            duration_until(&zoned("2024-03-30 20:30"), time("20:30")),
            Duration::from_secs(23 * 3600)
        );
        // Clocks go back overnight: 25 real hours
        assert_eq!(
            duration_until(&zoned("2024-10-26 20:30"), time("20:30")),
            Duration::from_secs(25 * 3600)
        );
    }

    #[test]
    fn test_duration_until_skipped_and_repeated_times() {
        // 02:30 does not exist on 2024-03-31; fires at 03:30 summer time
        assert_eq!(
            duration_until(&zoned("2024-03-31 01:00"), time("02:30")),
            Duration::from_secs(90 * 60)
        );
        // 02:30 happens twice on 2024-10-27; the first one counts
        assert_eq!(
            duration_until(&zoned("2024-10-27 00:00"), time("02:30")),
            Duration::from_secs(150 * 60)
        );
    }

    #[tokio::test]
    async fn test_monday_tick_sends_once() {
        let transport = Arc::new(RecordingTransport::default());
        let scheduler = scheduler("2024-01-15 20:30", transport.clone());

        let reports = scheduler.on_tick(time("20:30")).await;
        assert_eq!(reports.len(), 1);
        // the other armed time stays quiet the same day
        assert!(scheduler.on_tick(time("21:00")).await.is_empty());
        assert_eq!(transport.sent.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_tuesday_tick_sends_nothing() {
        let transport = Arc::new(RecordingTransport::default());
        let scheduler = scheduler("2024-01-16 20:30", transport.clone());

        assert!(scheduler.on_tick(time("20:30")).await.is_empty());
        assert!(transport.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_arm_only_adds() {
        let transport = Arc::new(RecordingTransport::default());
        let scheduler = scheduler("2024-01-15 12:00", transport);

        let first = scheduler.arm().await;
        assert_eq!(first, vec![time("20:30"), time("21:00")]);
        assert!(scheduler.arm().await.is_empty());
        assert_eq!(scheduler.armed_times().await, first);
    }

    #[tokio::test]
    async fn test_arm_covers_next_season() {
        let transport = Arc::new(RecordingTransport::default());
        // Sunday before summer starts Monday 2024-05-20
        let scheduler = scheduler("2024-05-19 00:00", transport);

        let armed = scheduler.arm().await;
        assert_eq!(
            armed,
            vec![time("19:00"), time("19:30"), time("20:30"), time("21:00")]
        );
    }
}
