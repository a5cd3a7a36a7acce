//! # Occurrence Projector
//!
//! Turns weekly slots into dated practices: "is there one on this day?" and
//! "when is the next one after now?".
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Re-project candidates that land in the following regime
//! - 1.0.0: Initial release

use super::rules::{
    RegimeConfig, RegimeName, SeasonCalendar, WeeklySlot, DAY_NAMES, MONTH_NAMES_SHORT,
};
use crate::core::error::ScheduleError;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

/// A slot pinned to a concrete date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOccurrence {
    pub date: NaiveDate,
    pub day_of_week: u8,
    pub regime: RegimeName,
    pub slot: WeeklySlot,
    pub effective_location: String,
}

impl ResolvedOccurrence {
    pub(crate) fn new(date: NaiveDate, regime: &RegimeConfig, slot: &WeeklySlot) -> Self {
        Self {
            date,
            day_of_week: date.weekday().num_days_from_sunday() as u8,
            regime: regime.name,
            slot: slot.clone(),
            effective_location: regime.effective_location(slot).to_string(),
        }
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.slot.time.to_naive_time())
    }

    pub fn day_name(&self) -> &'static str {
        DAY_NAMES[self.day_of_week as usize]
    }

    /// e.g. `Jan 16, 2024`
    pub fn formatted_date(&self) -> String {
        format_date(self.date)
    }
}

pub fn format_date(date: NaiveDate) -> String {
    format!(
        "{} {}, {}",
        MONTH_NAMES_SHORT[date.month0() as usize],
        date.day(),
        date.year()
    )
}

impl SeasonCalendar {
    /// Every slot on `date` under the regime active that day, in configured order
    pub fn slots_on(&self, date: NaiveDate) -> Vec<&WeeklySlot> {
        let weekday = date.weekday();
        self.regime_on(date)
            .slots
            .iter()
            .filter(|slot| slot.matches(weekday))
            .collect()
    }

    /// First slot on `date` in configured order, if any
    pub fn has_occurrence_on(&self, date: NaiveDate) -> Option<&WeeklySlot> {
        self.slots_on(date).into_iter().next()
    }

    /// Like [`has_occurrence_on`](Self::has_occurrence_on) but resolved to a dated occurrence
    pub fn occurrence_on(&self, date: NaiveDate) -> Option<ResolvedOccurrence> {
        let regime = self.regime_on(date);
        self.has_occurrence_on(date)
            .map(|slot| ResolvedOccurrence::new(date, regime, slot))
    }

    /// Nearest occurrence strictly after `instant`.
    ///
    /// A slot at exactly `instant` counts as passed and rolls over a week.
    pub fn next_occurrence(&self, instant: NaiveDateTime) -> Result<ResolvedOccurrence, ScheduleError> {
        let mut regime = self.regime(self.resolve(instant));
        let mut from = instant;
        let mut inclusive = false;

        // At most one boundary can sit between `instant` and the next practice
        // unless a regime is shorter than a week, so two passes settle it.
        for _ in 0..3 {
            let (date, slot) = earliest_candidate(regime, from, inclusive)?;
            let candidate_regime = self.regime_on(date);

            if candidate_regime.name == regime.name {
                return Ok(ResolvedOccurrence::new(date, regime, slot));
            }

            // The candidate fell into the next regime; project its slots from
            // the start of that regime instead.
            let start = candidate_regime.boundary.latest_on_or_before(date);
            regime = candidate_regime;
            from = start.and_hms_opt(0, 0, 0).unwrap_or(instant).max(instant);
            inclusive = from > instant;
        }

        Err(ScheduleError::config(
            "regimes are too short to project a practice",
        ))
    }
}

/// Earliest slot start after `from` (or at `from` when `inclusive`)
fn earliest_candidate(
    regime: &RegimeConfig,
    from: NaiveDateTime,
    inclusive: bool,
) -> Result<(NaiveDate, &WeeklySlot), ScheduleError> {
    let today = from.date();
    let today_dow = i64::from(today.weekday().num_days_from_sunday());

    regime
        .slots
        .iter()
        .map(|slot| {
            let days_ahead = (i64::from(slot.day_of_week) - today_dow + 7) % 7;
            let mut date = today + Duration::days(days_ahead);
            let starts = date.and_time(slot.time.to_naive_time());
            let passed = if inclusive { starts < from } else { starts <= from };
            if passed {
                date += Duration::days(7);
            }
            (date.and_time(slot.time.to_naive_time()), date, slot)
        })
        .min_by_key(|(starts, _, _)| *starts)
        .map(|(_, date, slot)| (date, slot))
        .ok_or_else(|| {
            ScheduleError::config(format!("{} regime has no practice slots", regime.name))
        })
}
