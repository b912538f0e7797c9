//! Chart lookback windows

use crate::error::ChartError;
use crate::types::Date;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed set of lookback windows offered by the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String")]
pub enum Timeframe {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    #[default]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "1Y")]
    OneYear,
}

impl Timeframe {
    /// Short identifier (`1D`, `1W`, ...)
    pub fn id(&self) -> &'static str {
        match self {
            Timeframe::OneDay => "1D",
            Timeframe::OneWeek => "1W",
            Timeframe::OneMonth => "1M",
            Timeframe::ThreeMonths => "3M",
            Timeframe::OneYear => "1Y",
        }
    }

    /// Calendar days of lookback
    pub fn days(&self) -> i64 {
        match self {
            Timeframe::OneDay => 1,
            Timeframe::OneWeek => 7,
            Timeframe::OneMonth => 30,
            Timeframe::ThreeMonths => 90,
            Timeframe::OneYear => 365,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::OneDay => "1 Day",
            Timeframe::OneWeek => "1 Week",
            Timeframe::OneMonth => "1 Month",
            Timeframe::ThreeMonths => "3 Months",
            Timeframe::OneYear => "1 Year",
        }
    }

    /// All timeframes, shortest first
    pub fn all() -> [Timeframe; 5] {
        [
            Timeframe::OneDay,
            Timeframe::OneWeek,
            Timeframe::OneMonth,
            Timeframe::ThreeMonths,
            Timeframe::OneYear,
        ]
    }

    /// Closed `(start, end)` date range ending on `today`
    pub fn date_range(&self, today: Date) -> (Date, Date) {
        (today - Duration::days(self.days()), today)
    }
}

impl FromStr for Timeframe {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().to_uppercase();
        Timeframe::all()
            .into_iter()
            .find(|tf| tf.id() == id)
            .ok_or_else(|| ChartError::UnknownTimeframe(s.to_string()))
    }
}

impl TryFrom<String> for Timeframe {
    type Error = ChartError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}
