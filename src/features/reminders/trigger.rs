//! # Reminder Trigger
//!
//! Pure decision logic behind the daily ticks: which times are armed, which
//! practices a tick announces, and when the next reminder goes out.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Diagnostics for simulated dates
//! - 1.0.0: Initial release

use crate::core::error::ScheduleError;
use crate::features::seasons::{RegimeName, ResolvedOccurrence, SeasonCalendar, SlotTime};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Outcome of evaluating a simulated date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnosis {
    pub instant: NaiveDateTime,
    pub season: RegimeName,
    pub location: String,
    pub time: SlotTime,
    /// Practice tomorrow, i.e. a reminder goes out today
    pub tomorrow: Option<ResolvedOccurrence>,
    pub next: ResolvedOccurrence,
}

impl Diagnosis {
    pub fn should_send(&self) -> bool {
        self.tomorrow.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct ReminderTrigger {
    calendar: Arc<SeasonCalendar>,
}

impl ReminderTrigger {
    pub fn new(calendar: Arc<SeasonCalendar>) -> Self {
        Self { calendar }
    }

    pub fn calendar(&self) -> &SeasonCalendar {
        &self.calendar
    }

    /// Times that need a daily tick on `today`.
    ///
    /// Covers tomorrow's regime too, since a reminder fires the day before a
    /// practice that may already follow the next season's rules.
    pub fn armed_times(&self, today: NaiveDate) -> BTreeSet<SlotTime> {
        let mut times = self.calendar.regime_on(today).distinct_times();
        times.extend(self.calendar.regime_on(today + Duration::days(1)).distinct_times());
        times
    }

    /// Practices announced by the tick at `tick` on `today`.
    ///
    /// Only tomorrow's slots starting at the tick's own time are returned, so
    /// two armed times never announce the same practice twice.
    pub fn due_on_tick(&self, today: NaiveDate, tick: SlotTime) -> Vec<ResolvedOccurrence> {
        let tomorrow = today + Duration::days(1);
        let regime = self.calendar.regime_on(tomorrow);
        self.calendar
            .slots_on(tomorrow)
            .into_iter()
            .filter(|slot| slot.time == tick)
            .map(|slot| ResolvedOccurrence::new(tomorrow, regime, slot))
            .collect()
    }

    /// Whether any reminder goes out on `today`
    pub fn should_send(&self, today: NaiveDate) -> bool {
        self.calendar
            .has_occurrence_on(today + Duration::days(1))
            .is_some()
    }

    /// The practice to talk about right now: tomorrow's if there is one,
    /// otherwise the next one after `now`
    pub fn upcoming(&self, now: NaiveDateTime) -> Result<ResolvedOccurrence, ScheduleError> {
        match self.calendar.occurrence_on(now.date() + Duration::days(1)) {
            Some(occurrence) => Ok(occurrence),
            None => self.calendar.next_occurrence(now),
        }
    }

    /// When the next reminder will be sent: the day before the next practice,
    /// at the practice's time
    pub fn next_reminder_at(
        &self,
        now: NaiveDateTime,
    ) -> Result<(NaiveDateTime, ResolvedOccurrence), ScheduleError> {
        let mut after = now;
        loop {
            let occurrence = self.calendar.next_occurrence(after)?;
            let reminder = occurrence.starts_at() - Duration::days(1);
            if reminder > now {
                return Ok((reminder, occurrence));
            }
            after = occurrence.starts_at();
        }
    }

    pub fn diagnose(&self, instant: NaiveDateTime) -> Result<Diagnosis, ScheduleError> {
        let regime = self.calendar.regime(self.calendar.resolve(instant));
        let tomorrow = self
            .calendar
            .occurrence_on(instant.date() + Duration::days(1));
        let next = self.calendar.next_occurrence(instant)?;

        let time = tomorrow
            .as_ref()
            .map(|occurrence| occurrence.slot.time)
            .or_else(|| regime.slots.first().map(|slot| slot.time))
            .ok_or_else(|| {
                ScheduleError::config(format!("{} regime has no practice slots", regime.name))
            })?;

        let location = tomorrow
            .as_ref()
            .map(|occurrence| occurrence.effective_location.clone())
            .unwrap_or_else(|| regime.location.clone());

        Ok(Diagnosis {
            instant,
            season: regime.name,
            location,
            time,
            tomorrow,
            next,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::seasons::rules::tests::sample_calendar;

    fn trigger() -> ReminderTrigger {
        ReminderTrigger::new(Arc::new(sample_calendar()))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, 0).unwrap()
    }

    fn time(s: &str) -> SlotTime {
        s.parse().unwrap()
    }

    #[test]
    fn test_monday_tick_fires_for_tuesday() {
        let due = trigger().due_on_tick(date(2024, 1, 15), time("20:30"));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].date, date(2024, 1, 16));
        assert_eq!(due[0].day_name(), "Tuesday");
    }

    #[test]
    fn test_tuesday_tick_does_not_fire() {
        assert!(trigger().due_on_tick(date(2024, 1, 16), time("20:30")).is_empty());
        assert!(!trigger().should_send(date(2024, 1, 16)));
    }

    #[test]
    fn test_other_armed_time_does_not_duplicate() {
        // Monday: the 21:00 tick must not re-announce Tuesday 20:30
        assert!(trigger().due_on_tick(date(2024, 1, 15), time("21:00")).is_empty());
        // Friday 21:00 announces Saturday
        let due = trigger().due_on_tick(date(2024, 1, 19), time("21:00"));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].slot.day_of_week, 6);
    }

    #[test]
    fn test_should_send_known_days() {
        let t = trigger();
        assert!(t.should_send(date(2024, 1, 15)));
        assert!(t.should_send(date(2024, 1, 19)));
        assert!(!t.should_send(date(2024, 1, 20)));
        assert!(t.should_send(date(2024, 6, 22)));
        assert!(t.should_send(date(2024, 6, 25)));
    }

    #[test]
    fn test_uses_tomorrows_regime_at_boundary() {
        // Sat 2024-09-14 is summer, Sun 09-15 starts winter (no Sunday slot)
        let t = trigger();
        assert!(!t.should_send(date(2024, 9, 14)));
        // Sun 2024-05-19 is winter, Mon 05-20 starts summer (no Monday slot),
        // Tue 05-21 is summer (no Tuesday slot either)
        assert!(!t.should_send(date(2024, 5, 20)));
        // Sat 2024-09-14 summer -> the summer Sunday slot is gone tomorrow
        assert!(t.due_on_tick(date(2024, 9, 14), time("19:00")).is_empty());
    }

    #[test]
    fn test_armed_times_union_at_boundary() {
        let t = trigger();
        let mid_winter = t.armed_times(date(2024, 1, 15));
        assert_eq!(mid_winter.into_iter().collect::<Vec<_>>(), vec![time("20:30"), time("21:00")]);

        let eve_of_summer = t.armed_times(date(2024, 5, 19));
        assert_eq!(eve_of_summer.len(), 4);
        assert!(eve_of_summer.contains(&time("19:00")));
    }

    #[test]
    fn test_next_reminder_at() {
        let t = trigger();
        // Monday 12:00 -> reminder Monday 20:30 for Tuesday
        let (reminder, occurrence) = t.next_reminder_at(at(2024, 1, 15, 12, 0)).unwrap();
        assert_eq!(reminder, at(2024, 1, 15, 20, 30));
        assert_eq!(occurrence.date, date(2024, 1, 16));

        // Monday 21:00 -> Tuesday's reminder already went out; next is Friday 21:00
        let (reminder, occurrence) = t.next_reminder_at(at(2024, 1, 15, 21, 0)).unwrap();
        assert_eq!(reminder, at(2024, 1, 19, 21, 0));
        assert_eq!(occurrence.date, date(2024, 1, 20));
    }

    #[test]
    fn test_upcoming_prefers_tomorrow() {
        let t = trigger();
        let upcoming = t.upcoming(at(2024, 1, 15, 22, 0)).unwrap();
        assert_eq!(upcoming.date, date(2024, 1, 16));
        let upcoming = t.upcoming(at(2024, 1, 16, 22, 0)).unwrap();
        assert_eq!(upcoming.date, date(2024, 1, 20));
    }

    #[test]
    fn test_diagnose() {
        let t = trigger();
        let report = t.diagnose(at(2024, 1, 15, 0, 0)).unwrap();
        assert_eq!(report.season, RegimeName::Winter);
        assert_eq!(report.location, "Park Arena");
        assert!(report.should_send());
        assert_eq!(report.time, time("20:30"));
        assert_eq!(report.next.date, date(2024, 1, 16));

        let report = t.diagnose(at(2024, 7, 16, 0, 0)).unwrap();
        assert_eq!(report.season, RegimeName::Summer);
        assert!(report.should_send());
        let report = t.diagnose(at(2024, 7, 15, 0, 0)).unwrap();
        assert!(!report.should_send());
        assert_eq!(report.time, time("19:00"));
    }

    #[test]
    fn test_diagnose_uses_slot_location_override() {
        let sample = sample_calendar();
        let mut summer = sample.regime(RegimeName::Summer).clone();
        summer.slots[1] = summer.slots[1].clone().with_location("North Beach");
        let calendar =
            SeasonCalendar::new(sample.regime(RegimeName::Winter).clone(), summer).unwrap();
        let t = ReminderTrigger::new(Arc::new(calendar));

        // Tuesday: Wednesday's session is at the override location
        let report = t.diagnose(at(2024, 7, 16, 0, 0)).unwrap();
        assert_eq!(report.location, "North Beach");
        // Monday: nothing tomorrow, regime default
        let report = t.diagnose(at(2024, 7, 15, 0, 0)).unwrap();
        assert_eq!(report.location, "Beach Courts");
    }
}
