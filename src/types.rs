//! Core types and constants

use crate::error::{ChartError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Calendar date of a daily rate observation
pub type Date = NaiveDate;

/// Exchange rate (units of the quote currency per one unit of the base)
pub type Rate = f64;

/// Date format used by rate providers and chart labels
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Minimum number of points a series needs for trend and indicator output
pub const MIN_SERIES_LEN: usize = 2;

/// A single dated exchange rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatePoint {
    pub date: Date,
    pub rate: Rate,
}

impl RatePoint {
    /// Create a new rate point
    pub fn new(date: Date, rate: Rate) -> Self {
        Self { date, rate }
    }

    /// Date as an ISO `YYYY-MM-DD` string
    pub fn label(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

/// Chronologically ordered, date-unique rate history for one currency pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateSeries {
    points: Vec<RatePoint>,
}

impl RateSeries {
    /// Build a series from unordered points.
    ///
    /// Points are sorted by date and deduplicated (the last point seen for a
    /// date wins). Negative or non-finite rates are a format error, and a
    /// series shorter than [`MIN_SERIES_LEN`] is rejected.
    pub fn new(mut points: Vec<RatePoint>) -> Result<Self> {
        if let Some(bad) = points.iter().find(|p| !p.rate.is_finite() || p.rate < 0.0) {
            return Err(ChartError::DataFormatError(format!(
                "invalid rate {} on {}",
                bad.rate,
                bad.label()
            )));
        }

        // Stable sort keeps arrival order among equal dates, so the last one is kept below
        points.sort_by_key(|p| p.date);
        let mut deduped: Vec<RatePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }

        if deduped.len() < MIN_SERIES_LEN {
            return Err(ChartError::InsufficientDataError {
                points: deduped.len(),
            });
        }

        Ok(Self { points: deduped })
    }

    /// Parse `(date, rate)` pairs with ISO date strings
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, Rate)>,
    {
        let points = pairs
            .into_iter()
            .map(|(date, rate)| {
                NaiveDate::parse_from_str(date, DATE_FORMAT)
                    .map(|date| RatePoint::new(date, rate))
                    .map_err(|e| ChartError::DataFormatError(format!("bad date '{}': {}", date, e)))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(points)
    }

    pub fn points(&self) -> &[RatePoint] {
        &self.points
    }

    /// Rate values in chronological order
    pub fn rates(&self) -> Vec<Rate> {
        self.points.iter().map(|p| p.rate).collect()
    }

    /// ISO date labels in chronological order
    pub fn labels(&self) -> Vec<String> {
        self.points.iter().map(RatePoint::label).collect()
    }

    pub fn first(&self) -> &RatePoint {
        &self.points[0]
    }

    pub fn last(&self) -> &RatePoint {
        &self.points[self.points.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
