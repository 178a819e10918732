//! Code for working with the simulation horizon and its hourly periods.
use crate::units::{Hours, Year};
use anyhow::{Context, Result, ensure};
use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta};
use serde::Deserialize;
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};

/// The length of one simulation period
pub const PERIOD_LENGTH: Hours = Hours(1.0);

/// Number of seconds in a (non-leap) year
const SECONDS_PER_YEAR: f64 = 365.0 * 24.0 * 3600.0;

/// An instant specified as a calendar date plus an hour of the day
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CalendarHour {
    /// The year
    pub year: i32,
    /// The month (1-12)
    pub month: u32,
    /// The day of the month (1-31)
    pub day: u32,
    /// The hour of the day (0-23)
    #[serde(default)]
    pub hour: u32,
}

impl CalendarHour {
    /// Convert to a timestamp, checking that the date and hour exist
    pub fn to_datetime(self) -> Result<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .and_then(|date| date.and_hms_opt(self.hour, 0, 0))
            .with_context(|| {
                format!(
                    "Invalid date: {}-{:02}-{:02} hour {}",
                    self.year, self.month, self.day, self.hour
                )
            })
    }
}

/// The bounds of the simulation horizon.
///
/// Periods are one hour long, start at `start` and every hour thereafter, and no period starts at
/// or after `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    /// The start of the first period
    pub start: NaiveDateTime,
    /// The exclusive end of the horizon
    pub end: NaiveDateTime,
}

impl TimeRange {
    /// Create a new [`TimeRange`], checking that `start` precedes `end`
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        ensure!(
            start < end,
            "Start of time range ({start}) must be before its end ({end})"
        );

        Ok(Self { start, end })
    }

    /// Iterate over the start times of each period in the horizon, in order
    pub fn iter_periods(&self) -> impl Iterator<Item = NaiveDateTime> + use<> {
        let end = self.end;
        std::iter::successors(Some(self.start), |period| {
            period.checked_add_signed(TimeDelta::hours(1))
        })
        .take_while(move |period| *period < end)
    }

    /// The number of periods in the horizon
    pub fn num_periods(&self) -> usize {
        let hours = (self.end - self.start).num_hours();
        let whole = usize::try_from(hours).unwrap_or_default();

        // A trailing partial hour still starts a period
        if self.start + TimeDelta::hours(hours) < self.end {
            whole + 1
        } else {
            whole
        }
    }

    /// The length of the horizon in (365-day) years
    pub fn duration_years(&self) -> Year {
        Year((self.end - self.start).num_seconds() as f64 / SECONDS_PER_YEAR)
    }
}

/// How closely a plant's ledger record must match a period to be used for it
#[derive(
    SerializeLabeledStringEnum, DeserializeLabeledStringEnum, Debug, Clone, Copy, PartialEq, Default,
)]
pub enum PeriodGranularity {
    /// Records must have exactly the same timestamp as the period
    #[default]
    #[string = "hourly"]
    Hourly,
    /// Records match any period in the same calendar month
    #[string = "monthly"]
    Monthly,
}

impl PeriodGranularity {
    /// Whether a ledger record with timestamp `record` applies to `period`
    pub fn matches(self, record: &NaiveDateTime, period: &NaiveDateTime) -> bool {
        match self {
            Self::Hourly => record == period,
            Self::Monthly => record.year() == period.year() && record.month() == period.month(),
        }
    }
}
