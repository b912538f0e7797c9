//! Trend statistics over a rate series

use crate::error::{ChartError, Result};
use crate::types::MIN_SERIES_LEN;
use serde::Serialize;
use statrs::statistics::Statistics;
use std::fmt;

/// Direction of the move between the first and last rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    /// Line color for the primary series
    pub fn color(&self) -> &'static str {
        match self {
            Trend::Up => "#10B981",
            Trend::Down => "#EF4444",
        }
    }

    /// RGB components of [`Trend::color`], used for the area gradient
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            Trend::Up => (16, 185, 129),
            Trend::Down => (239, 68, 68),
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Up => "↑",
            Trend::Down => "↓",
        }
    }
}

/// Percentage change and range of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesStats {
    /// `(last - first) / first * 100`
    pub percentage_change: f64,
    pub high: f64,
    pub low: f64,
}

impl SeriesStats {
    /// Compute statistics over chronologically ordered rates
    pub fn compute(rates: &[f64]) -> Result<Self> {
        if rates.len() < MIN_SERIES_LEN {
            return Err(ChartError::InsufficientDataError {
                points: rates.len(),
            });
        }

        let first = rates[0];
        let last = rates[rates.len() - 1];
        if first == 0.0 {
            return Err(ChartError::InvalidBaselineError { baseline: first });
        }

        Ok(Self {
            percentage_change: (last - first) / first * 100.0,
            high: Statistics::max(rates),
            low: Statistics::min(rates),
        })
    }

    /// Zero change counts as up
    pub fn trend(&self) -> Trend {
        if self.percentage_change >= 0.0 {
            Trend::Up
        } else {
            Trend::Down
        }
    }

    /// High minus low
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// One-line summary, e.g. `↑ 1.23% • High: 1.2345 • Low: 1.2000`
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SeriesStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.2}% • High: {:.4} • Low: {:.4}",
            self.trend().arrow(),
            self.percentage_change.abs(),
            self.high,
            self.low
        )
    }
}
