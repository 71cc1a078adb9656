//! Date-range windows for the dashboard filter.
//!
//! Windows are fixed day counts measured back from "now", not calendar
//! periods: `Month` is always 30 days regardless of the current month.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::defaults::{MONTH_DAYS, WEEK_DAYS, YEAR_DAYS};
use crate::error::Error;

/// Named recency window for works.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    /// No temporal restriction
    #[default]
    All,
    /// Last 7 days
    Week,
    /// Last 30 days
    Month,
    /// Last 365 days
    Year,
}

impl DateRange {
    /// Length of the window, or `None` for `All`.
    pub fn window(&self) -> Option<Duration> {
        match self {
            Self::All => None,
            Self::Week => Some(Duration::days(WEEK_DAYS)),
            Self::Month => Some(Duration::days(MONTH_DAYS)),
            Self::Year => Some(Duration::days(YEAR_DAYS)),
        }
    }

    /// Whether a timestamp falls inside the window ending at `now`.
    ///
    /// A work exactly at the window edge is included; future timestamps
    /// (clock skew) are always included.
    pub fn contains(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self.window() {
            None => true,
            Some(window) => now.signed_duration_since(created_at) <= window,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Week => write!(f, "week"),
            Self::Month => write!(f, "month"),
            Self::Year => write!(f, "year"),
        }
    }
}

impl FromStr for DateRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" | "" => Ok(Self::All),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(Error::InvalidInput(format!("Unknown date range: {}", s))),
        }
    }
}
