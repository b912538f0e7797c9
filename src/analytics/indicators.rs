//! Moving-average overlays for rate series
//!
//! Batch functions return one value per input element. Positions without
//! enough history hold `None`, which the chart layer renders as a gap.

use crate::error::ChartError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// Lookback used by the dashboard overlays
pub const DEFAULT_PERIOD: usize = 7;

/// Simple Moving Average (SMA)
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    window: usize,
    values: VecDeque<f64>,
}

impl SimpleMovingAverage {
    /// Create new SMA with given window size.
    ///
    /// A zero window never produces a value.
    pub fn new(window: usize) -> Self {
        Self {
            window,
            values: VecDeque::with_capacity(window),
        }
    }

    /// Add a value and compute current SMA
    pub fn update(&mut self, value: f64) -> Option<f64> {
        if self.window == 0 {
            return None;
        }

        self.values.push_back(value);
        if self.values.len() > self.window {
            self.values.pop_front();
        }

        self.current()
    }

    /// Get current value (if window is full)
    pub fn current(&self) -> Option<f64> {
        if self.window > 0 && self.values.len() == self.window {
            // no running sum: recomputed from the window
            Some(self.values.iter().sum::<f64>() / self.window as f64)
        } else {
            None
        }
    }
}

/// Exponential Moving Average (EMA) seeded with the SMA of the first `span` values
#[derive(Debug, Clone)]
pub struct ExponentialMovingAverage {
    span: usize,
    multiplier: f64,
    seed: Vec<f64>,
    current_ema: Option<f64>,
}

impl ExponentialMovingAverage {
    /// Create new EMA with given span
    pub fn new(span: usize) -> Self {
        Self {
            span,
            multiplier: 2.0 / (span as f64 + 1.0),
            seed: Vec::with_capacity(span),
            current_ema: None,
        }
    }

    /// Smoothing factor `2 / (span + 1)`
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Update with new value; `None` until `span` values have been seen
    pub fn update(&mut self, value: f64) -> Option<f64> {
        if self.span == 0 {
            return None;
        }

        match self.current_ema {
            Some(prev_ema) => {
                let ema = (value - prev_ema) * self.multiplier + prev_ema;
                self.current_ema = Some(ema);
            }
            None => {
                self.seed.push(value);
                if self.seed.len() == self.span {
                    let mean = self.seed.iter().sum::<f64>() / self.span as f64;
                    self.current_ema = Some(mean);
                    self.seed.clear();
                }
            }
        }

        self.current_ema
    }

    /// Get current EMA value
    pub fn current(&self) -> Option<f64> {
        self.current_ema
    }
}

/// Indicator values aligned index-for-index with a rate series
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IndicatorSeries {
    values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    pub fn new(values: Vec<Option<f64>>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Option<f64>> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    /// At least one position has a value
    pub fn has_values(&self) -> bool {
        self.values.iter().any(Option::is_some)
    }

    /// Index of the first position with a value
    pub fn first_defined(&self) -> Option<usize> {
        self.values.iter().position(Option::is_some)
    }
}

/// Trailing simple moving average over `period` values.
///
/// Output length equals input length; the first `period - 1` entries are absent.
pub fn sma(data: &[f64], period: usize) -> IndicatorSeries {
    let mut sma = SimpleMovingAverage::new(period);
    IndicatorSeries::new(data.iter().map(|&v| sma.update(v)).collect())
}

/// Exponential moving average seeded with the mean of the first `period` values.
///
/// Series shorter than `period` come back entirely absent.
pub fn ema(data: &[f64], period: usize) -> IndicatorSeries {
    let mut ema = ExponentialMovingAverage::new(period);
    IndicatorSeries::new(data.iter().map(|&v| ema.update(v)).collect())
}

/// Moving-average flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorKind {
    Sma,
    Ema,
}

impl IndicatorKind {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            IndicatorKind::Sma => "SMA",
            IndicatorKind::Ema => "EMA",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            IndicatorKind::Sma => "Simple Moving Average",
            IndicatorKind::Ema => "Exponential Moving Average",
        }
    }

    /// Overlay line color
    pub fn color(&self) -> &'static str {
        match self {
            IndicatorKind::Sma => "#6366F1",
            IndicatorKind::Ema => "#F59E0B",
        }
    }

    pub fn compute(&self, data: &[f64], period: usize) -> IndicatorSeries {
        match self {
            IndicatorKind::Sma => sma(data, period),
            IndicatorKind::Ema => ema(data, period),
        }
    }
}

/// One overlay to draw: kind, lookback and color
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndicatorSpec {
    pub kind: IndicatorKind,
    pub period: usize,
    pub color: String,
}

impl IndicatorSpec {
    pub fn new(kind: IndicatorKind, period: usize) -> Self {
        Self {
            kind,
            period,
            color: kind.color().to_string(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Legend label, e.g. `SMA (7)`
    pub fn label(&self) -> String {
        format!("{} ({})", self.kind.abbreviation(), self.period)
    }

    pub fn compute(&self, data: &[f64]) -> IndicatorSeries {
        self.kind.compute(data, self.period)
    }
}

/// Overlay choice offered next to the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String")]
pub enum IndicatorSelection {
    #[default]
    None,
    #[serde(rename = "SMA")]
    Sma,
    #[serde(rename = "EMA")]
    Ema,
    Both,
}

impl IndicatorSelection {
    pub fn all() -> [IndicatorSelection; 4] {
        [
            IndicatorSelection::None,
            IndicatorSelection::Sma,
            IndicatorSelection::Ema,
            IndicatorSelection::Both,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorSelection::None => "None",
            IndicatorSelection::Sma => "SMA",
            IndicatorSelection::Ema => "EMA",
            IndicatorSelection::Both => "Both",
        }
    }

    pub fn includes(&self, kind: IndicatorKind) -> bool {
        matches!(
            (self, kind),
            (IndicatorSelection::Both, _)
                | (IndicatorSelection::Sma, IndicatorKind::Sma)
                | (IndicatorSelection::Ema, IndicatorKind::Ema)
        )
    }

    /// Overlays for this selection, always SMA before EMA
    pub fn specs(&self, period: usize) -> Vec<IndicatorSpec> {
        [IndicatorKind::Sma, IndicatorKind::Ema]
            .into_iter()
            .filter(|kind| self.includes(*kind))
            .map(|kind| IndicatorSpec::new(kind, period))
            .collect()
    }
}

impl FromStr for IndicatorSelection {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "" => Ok(IndicatorSelection::None),
            "sma" => Ok(IndicatorSelection::Sma),
            "ema" => Ok(IndicatorSelection::Ema),
            "both" => Ok(IndicatorSelection::Both),
            _ => Err(ChartError::UnknownIndicator(s.to_string())),
        }
    }
}

impl TryFrom<String> for IndicatorSelection {
    type Error = ChartError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for IndicatorSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
