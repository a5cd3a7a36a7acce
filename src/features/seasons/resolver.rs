//! # Season Resolver
//!
//! Decides which regime governs a date. Both boundaries are re-anchored to the
//! date's year; the regime whose boundary comes later in the year also owns the
//! stretch from January 1st up to the other boundary.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use super::rules::{RegimeConfig, RegimeName, SeasonCalendar};
use chrono::{Datelike, NaiveDate, NaiveDateTime};

impl SeasonCalendar {
    /// Regime active at `instant`. Only the calendar date matters.
    pub fn resolve(&self, instant: NaiveDateTime) -> RegimeName {
        self.resolve_date(instant.date())
    }

    pub fn resolve_date(&self, date: NaiveDate) -> RegimeName {
        let year = date.year();
        let (later, earlier) = self.ordered_for(year);

        if date >= later.boundary.anchor(year) {
            later.name
        } else if date < earlier.boundary.anchor(year) {
            // wraparound: still in the season that started last year
            later.name
        } else {
            earlier.name
        }
    }

    /// Config of the regime active on `date`
    pub fn regime_on(&self, date: NaiveDate) -> &RegimeConfig {
        self.regime(self.resolve_date(date))
    }

    /// (later, earlier) regimes by boundary position within `year`
    fn ordered_for(&self, year: i32) -> (&RegimeConfig, &RegimeConfig) {
        let [winter, summer] = self.regimes();
        if winter.boundary.anchor(year) > summer.boundary.anchor(year) {
            (winter, summer)
        } else {
            (summer, winter)
        }
    }
}
