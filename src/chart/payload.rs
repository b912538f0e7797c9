//! Display-ready chart data consumed by the renderer

use crate::analytics::{SeriesStats, Trend};
use crate::error::{ChartError, Result};
use serde::Serialize;

/// Legend label of the primary rate line
pub const PRIMARY_LABEL: &str = "Exchange Rate";

/// Line smoothing applied to every series
pub const LINE_TENSION: f64 = 0.4;

pub const BORDER_WIDTH: f64 = 2.0;

/// Marker radius on the first and last point of the primary line
pub const ENDPOINT_RADIUS: f64 = 4.0;

/// Vertical area fill under the primary line, fading to transparent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gradient {
    /// Color stop at the top of the chart
    pub top: String,
    /// Color stop at the bottom of the chart
    pub bottom: String,
}

impl Gradient {
    /// Fill matching the trend color
    pub fn for_trend(trend: Trend) -> Self {
        let (r, g, b) = trend.rgb();
        Self {
            top: format!("rgba({}, {}, {}, 0.2)", r, g, b),
            bottom: format!("rgba({}, {}, {}, 0)", r, g, b),
        }
    }
}

/// Point marker style
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointStyle {
    Hidden,
    /// Markers on the first and last point only
    Endpoints { radius: f64 },
}

impl PointStyle {
    /// Marker radius at `index` of a series of length `len`
    pub fn radius_at(&self, index: usize, len: usize) -> f64 {
        match self {
            PointStyle::Hidden => 0.0,
            PointStyle::Endpoints { radius } => {
                if len > 0 && (index == 0 || index == len - 1) {
                    *radius
                } else {
                    0.0
                }
            }
        }
    }
}

/// One named line on the chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    /// One value per label; `null` where the series has no value
    pub data: Vec<Option<f64>>,
    pub color: String,
    pub fill: bool,
    pub tension: f64,
    pub border_width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Gradient>,
    pub point_style: PointStyle,
}

impl Dataset {
    /// Primary rate line colored by trend
    pub fn primary(rates: &[f64], stats: &SeriesStats) -> Self {
        let trend = stats.trend();
        Self {
            label: PRIMARY_LABEL.to_string(),
            data: rates.iter().map(|&r| Some(r)).collect(),
            color: trend.color().to_string(),
            fill: true,
            tension: LINE_TENSION,
            border_width: BORDER_WIDTH,
            background: Some(Gradient::for_trend(trend)),
            point_style: PointStyle::Endpoints {
                radius: ENDPOINT_RADIUS,
            },
        }
    }

    /// Unfilled indicator overlay
    pub fn overlay(label: String, data: Vec<Option<f64>>, color: &str) -> Self {
        Self {
            label,
            data,
            color: color.to_string(),
            fill: false,
            tension: LINE_TENSION,
            border_width: BORDER_WIDTH,
            background: None,
            point_style: PointStyle::Hidden,
        }
    }

    /// Number of positions holding a value
    pub fn defined_count(&self) -> usize {
        self.data.iter().filter(|v| v.is_some()).count()
    }
}

/// Date labels plus one or more series, ready for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPayload {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartPayload {
    pub fn primary(&self) -> Option<&Dataset> {
        self.datasets.first()
    }

    pub fn dataset(&self, label: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.label == label)
    }

    pub fn series_labels(&self) -> Vec<&str> {
        self.datasets.iter().map(|d| d.label.as_str()).collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Export as CSV: a `date` column followed by one column per series.
    ///
    /// Absent values are written as empty cells and rates with 6 decimals.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        let mut header = vec!["date".to_string()];
        header.extend(self.datasets.iter().map(|d| d.label.clone()));
        writer
            .write_record(&header)
            .map_err(|e| ChartError::DataFormatError(format!("CSV write error: {}", e)))?;

        for (i, label) in self.labels.iter().enumerate() {
            let mut record = vec![label.clone()];
            record.extend(self.datasets.iter().map(|d| {
                d.data
                    .get(i)
                    .copied()
                    .flatten()
                    .map(|v| format!("{:.6}", v))
                    .unwrap_or_default()
            }));
            writer
                .write_record(&record)
                .map_err(|e| ChartError::DataFormatError(format!("CSV write error: {}", e)))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ChartError::DataFormatError(format!("CSV write error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| ChartError::DataFormatError(format!("CSV encoding error: {}", e)))
    }
}
