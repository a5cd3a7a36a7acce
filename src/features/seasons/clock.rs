//! Source of "now" for the schedule engine.
//!
//! Test mode swaps the system clock for a fixed instant so season resolution,
//! projection and the reminder trigger all see the same simulated date.

use crate::core::error::ScheduleError;
use chrono::{Local, NaiveDate, NaiveDateTime};

pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Host local time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    pub fn parse(input: &str) -> Result<Self, ScheduleError> {
        parse_instant(input).map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Parse `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM` or `YYYY-MM-DDTHH:MM:SS` (space also accepted).
/// A bare date means midnight.
pub fn parse_instant(input: &str) -> Result<NaiveDateTime, ScheduleError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ScheduleError::invalid_date(input, "empty date"));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(instant) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(instant);
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|e| ScheduleError::invalid_date(input, e.to_string()))
        .and_then(|date| {
            date.and_hms_opt(0, 0, 0)
                .ok_or_else(|| ScheduleError::invalid_date(input, "no midnight"))
        })
}
