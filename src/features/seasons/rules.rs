//! # Calendar Rules
//!
//! Static description of the two training regimes: when each one starts, where
//! it trains by default, and its weekly practice slots.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: YAML schedule files via `SeasonCalendar::load`
//! - 1.0.0: Initial release

use crate::core::error::ScheduleError;
use anyhow::Result;
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub const MONTH_NAMES_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sept", "Oct", "Nov", "Dec",
];

/// Name of a training regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegimeName {
    Winter,
    Summer,
}

impl RegimeName {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegimeName::Winter => "winter",
            RegimeName::Summer => "summer",
        }
    }

    /// Capitalized form for user-facing text
    pub fn title(&self) -> &'static str {
        match self {
            RegimeName::Winter => "Winter",
            RegimeName::Summer => "Summer",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RegimeName::Winter => "🏔️",
            RegimeName::Summer => "🏖️",
        }
    }
}

impl fmt::Display for RegimeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Year-relative calendar point where a regime starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateBoundary {
    pub month: u32,
    pub day: u32,
}

impl DateBoundary {
    pub fn new(month: u32, day: u32) -> Result<Self, ScheduleError> {
        if !(1..=12).contains(&month) {
            return Err(ScheduleError::config(format!(
                "boundary month must be 1-12, got {month}"
            )));
        }
        // Validate against a leap year so Feb 29 is accepted
        if NaiveDate::from_ymd_opt(2024, month, day).is_none() {
            return Err(ScheduleError::config(format!(
                "boundary day {day} does not exist in month {month}"
            )));
        }
        Ok(Self { month, day })
    }

    /// Pin the boundary to a concrete year.
    ///
    /// Feb 29 falls back to Feb 28 outside leap years.
    pub fn anchor(&self, year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, self.month, self.day)
            .or_else(|| NaiveDate::from_ymd_opt(year, self.month, self.day - 1))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Most recent anchor of this boundary on or before `date`
    pub fn latest_on_or_before(&self, date: NaiveDate) -> NaiveDate {
        let this_year = self.anchor(date.year());
        if this_year <= date {
            this_year
        } else {
            self.anchor(date.year() - 1)
        }
    }

    /// Short display form, e.g. `Sept 15`
    pub fn format_short(&self) -> String {
        format!("{} {}", MONTH_NAMES_SHORT[(self.month - 1) as usize], self.day)
    }
}

impl FromStr for DateBoundary {
    type Err = ScheduleError;

    /// Parses `MM:DD` or `MM-DD`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (month, day) = s
            .split_once(':')
            .or_else(|| s.split_once('-'))
            .ok_or_else(|| ScheduleError::config(format!("boundary '{s}' must be MM:DD")))?;
        let month = month
            .trim()
            .parse::<u32>()
            .map_err(|_| ScheduleError::config(format!("boundary '{s}' has a bad month")))?;
        let day = day
            .trim()
            .parse::<u32>()
            .map_err(|_| ScheduleError::config(format!("boundary '{s}' has a bad day")))?;
        Self::new(month, day)
    }
}

/// Time of day of a practice slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotTime {
    hour: u32,
    minute: u32,
}

impl SlotTime {
    pub const MIDNIGHT: SlotTime = SlotTime { hour: 0, minute: 0 };

    pub fn new(hour: u32, minute: u32) -> Result<Self, ScheduleError> {
        if hour > 23 || minute > 59 {
            return Err(ScheduleError::config(format!(
                "time {hour}:{minute:02} is out of range"
            )));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn to_naive_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl FromStr for SlotTime {
    type Err = ScheduleError;

    /// Parses `H:MM` or `HH:MM`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (hour, minute) = s
            .split_once(':')
            .filter(|(h, m)| (1..=2).contains(&h.len()) && m.len() == 2)
            .ok_or_else(|| ScheduleError::config(format!("time '{s}' must be in HH:MM format")))?;
        let hour = hour
            .parse::<u32>()
            .map_err(|_| ScheduleError::config(format!("time '{s}' has a bad hour")))?;
        let minute = minute
            .parse::<u32>()
            .map_err(|_| ScheduleError::config(format!("time '{s}' has a bad minute")))?;
        Self::new(hour, minute)
    }
}

impl TryFrom<String> for SlotTime {
    type Error = ScheduleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SlotTime> for String {
    fn from(value: SlotTime) -> Self {
        value.to_string()
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// One weekly practice: weekday (0 = Sunday) and start time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySlot {
    #[serde(rename = "day")]
    pub day_of_week: u8,
    pub time: SlotTime,
    #[serde(rename = "location", default, skip_serializing_if = "Option::is_none")]
    pub location_override: Option<String>,
}

impl WeeklySlot {
    pub fn new(day_of_week: u8, time: SlotTime) -> Self {
        Self {
            day_of_week,
            time,
            location_override: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location_override = Some(location.into());
        self
    }

    pub fn day_name(&self) -> &'static str {
        DAY_NAMES[(self.day_of_week % 7) as usize]
    }

    pub fn matches(&self, weekday: Weekday) -> bool {
        u32::from(self.day_of_week) == weekday.num_days_from_sunday()
    }

    /// Parse a list like `2:20:30,6:21:00@[Hall](https://maps.example/hall)`
    pub fn parse_list(input: &str) -> Result<Vec<Self>, ScheduleError> {
        input
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(Self::parse_entry)
            .collect()
    }

    fn parse_entry(entry: &str) -> Result<Self, ScheduleError> {
        let (schedule, location) = match entry.split_once('@') {
            Some((schedule, location)) => (schedule.trim(), Some(location.trim())),
            None => (entry, None),
        };
        let (day, time) = schedule.split_once(':').ok_or_else(|| {
            ScheduleError::config(format!("practice '{entry}' must be DAY:HH:MM"))
        })?;
        let day_of_week = day
            .trim()
            .parse::<u8>()
            .map_err(|_| ScheduleError::config(format!("practice '{entry}' has a bad day")))?;
        let mut slot = Self::new(day_of_week, time.parse()?);
        if let Some(location) = location.filter(|l| !l.is_empty()) {
            slot = slot.with_location(location);
        }
        Ok(slot)
    }
}

/// A named regime: start boundary, default location and weekly slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeConfig {
    pub name: RegimeName,
    #[serde(rename = "start_date")]
    pub boundary: DateBoundary,
    pub location: String,
    #[serde(rename = "practices")]
    pub slots: Vec<WeeklySlot>,
}

impl RegimeConfig {
    /// Slot override if present, otherwise the regime location
    pub fn effective_location<'a>(&'a self, slot: &'a WeeklySlot) -> &'a str {
        slot.location_override
            .as_deref()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(&self.location)
    }

    /// Distinct slot times in ascending order
    pub fn distinct_times(&self) -> BTreeSet<SlotTime> {
        self.slots.iter().map(|slot| slot.time).collect()
    }

    /// Human-readable summary, e.g. `Tuesday at 20:30, Saturday at 21:00`
    pub fn training_days(&self) -> String {
        self.slots
            .iter()
            .map(|slot| format!("{} at {}", slot.day_name(), slot.time))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn validate(&self) -> Result<(), ScheduleError> {
        DateBoundary::new(self.boundary.month, self.boundary.day)?;
        if self.location.trim().is_empty() {
            return Err(ScheduleError::config(format!(
                "{} regime has no location",
                self.name
            )));
        }
        if self.slots.is_empty() {
            return Err(ScheduleError::config(format!(
                "{} regime has no practice slots",
                self.name
            )));
        }
        if let Some(slot) = self.slots.iter().find(|slot| slot.day_of_week > 6) {
            return Err(ScheduleError::config(format!(
                "{} regime has day_of_week {} (expected 0-6)",
                self.name, slot.day_of_week
            )));
        }
        Ok(())
    }
}

/// Schedule file layout (`schedule.yaml`)
#[derive(Debug, Clone, Deserialize, Serialize)]
struct CalendarFile {
    winter: RegimeFile,
    summer: RegimeFile,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct RegimeFile {
    start_date: DateBoundary,
    location: String,
    practices: Vec<WeeklySlot>,
}

impl RegimeFile {
    fn into_regime(self, name: RegimeName) -> RegimeConfig {
        RegimeConfig {
            name,
            boundary: self.start_date,
            location: self.location.trim().to_string(),
            slots: self.practices,
        }
    }
}

/// The pair of regimes that partitions the calendar year
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonCalendar {
    winter: RegimeConfig,
    summer: RegimeConfig,
}

impl SeasonCalendar {
    /// Build a validated calendar.
    ///
    /// Rejects empty slot lists, out-of-range weekdays and boundaries that
    /// coincide in any year.
    pub fn new(winter: RegimeConfig, summer: RegimeConfig) -> Result<Self, ScheduleError> {
        if winter.name != RegimeName::Winter || summer.name != RegimeName::Summer {
            return Err(ScheduleError::config(
                "calendar needs exactly one winter and one summer regime",
            ));
        }
        winter.validate()?;
        summer.validate()?;

        // 2023 catches a Feb 29 boundary collapsing onto Feb 28
        for year in [2023, 2024] {
            if winter.boundary.anchor(year) == summer.boundary.anchor(year) {
                return Err(ScheduleError::config(format!(
                    "winter and summer boundaries coincide ({} / {})",
                    winter.boundary.format_short(),
                    summer.boundary.format_short()
                )));
            }
        }

        Ok(Self { winter, summer })
    }

    /// Load both regimes from a YAML schedule file
    pub fn load(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let file: CalendarFile = serde_yaml::from_str(&contents)?;
        let calendar = Self::new(
            file.winter.into_regime(RegimeName::Winter),
            file.summer.into_regime(RegimeName::Summer),
        )?;
        Ok(calendar)
    }

    pub fn regime(&self, name: RegimeName) -> &RegimeConfig {
        match name {
            RegimeName::Winter => &self.winter,
            RegimeName::Summer => &self.summer,
        }
    }

    pub fn regimes(&self) -> [&RegimeConfig; 2] {
        [&self.winter, &self.summer]
    }
}
