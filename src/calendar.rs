//! Calendar periods used as grouping keys along the time axis.

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::GroupError;

/// Season labels indexed by season code.
pub const SEASON_LABELS: [&str; 4] = ["DJF", "MAM", "JJA", "SON"];

/// A calendar sub-period of the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Month,
    Week,
    DayOfYear,
    Season,
}

impl Period {
    /// Accessor name, also used as the name of the grouped dimension.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Week => "week",
            Self::DayOfYear => "dayofyear",
            Self::Season => "season",
        }
    }

    /// Group key of a date: month 1-12, ISO week 1-53, day-of-year 1-366,
    /// season code 0-3.
    pub fn key(&self, date: NaiveDate) -> i64 {
        match self {
            Self::Month => i64::from(date.month()),
            Self::Week => i64::from(date.iso_week().week()),
            Self::DayOfYear => i64::from(date.ordinal()),
            Self::Season => i64::from(season_code(date.month())),
        }
    }

    /// Zero-based position of `date` inside its own period, with the period length.
    pub fn position(&self, date: NaiveDate) -> (u32, u32) {
        match self {
            Self::Month => (date.day0(), days_in_month(date.year(), date.month())),
            Self::Week => (date.weekday().num_days_from_monday(), 7),
            Self::DayOfYear => (0, 1),
            Self::Season => season_position(date),
        }
    }

    /// Upper bound on the number of distinct keys.
    pub fn max_keys(&self) -> usize {
        match self {
            Self::Month => 12,
            Self::Week => 53,
            Self::DayOfYear => 366,
            Self::Season => 4,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Period {
    type Err = GroupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "month" => Ok(Self::Month),
            "week" => Ok(Self::Week),
            "dayofyear" => Ok(Self::DayOfYear),
            "season" => Ok(Self::Season),
            other => Err(GroupError::config(format!(
                "unsupported calendar period '{other}'"
            ))),
        }
    }
}

/// Number of days in the given month, 0 for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(next_year, next_month, 1),
    ) {
        (Some(start), Some(end)) => end.signed_duration_since(start).num_days() as u32,
        _ => 0,
    }
}

/// Season code of a month: DJF=0, MAM=1, JJA=2, SON=3.
pub fn season_code(month: u32) -> u32 {
    match month {
        12 | 1 | 2 => 0,
        3..=5 => 1,
        6..=8 => 2,
        _ => 3,
    }
}

fn season_position(date: NaiveDate) -> (u32, u32) {
    let code = season_code(date.month());
    // DJF starts in December of the previous year for January and February.
    let (start_year, start_month) = match (code, date.month()) {
        (0, 12) => (date.year(), 12),
        (0, _) => (date.year() - 1, 12),
        (c, _) => (date.year(), 3 * c),
    };
    let (end_year, end_month) = if start_month == 12 {
        (start_year + 1, 3)
    } else {
        (start_year, start_month + 3)
    };
    match (
        NaiveDate::from_ymd_opt(start_year, start_month, 1),
        NaiveDate::from_ymd_opt(end_year, end_month, 1),
    ) {
        (Some(start), Some(end)) => (
            date.signed_duration_since(start).num_days() as u32,
            end.signed_duration_since(start).num_days() as u32,
        ),
        _ => (0, 1),
    }
}
