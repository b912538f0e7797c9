//! Assembly of rate series, statistics and overlays into a chart payload

use super::payload::{ChartPayload, Dataset};
use crate::analytics::{IndicatorSelection, IndicatorSeries, IndicatorSpec, SeriesStats, DEFAULT_PERIOD};
use crate::error::Result;
use crate::types::RateSeries;
use serde::Serialize;

/// Payload plus the statistics shown above the chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub payload: ChartPayload,
    pub stats: SeriesStats,
}

/// Builds the primary line and the selected indicator overlays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSeriesBuilder {
    selection: IndicatorSelection,
    period: usize,
}

impl ChartSeriesBuilder {
    pub fn new(selection: IndicatorSelection, period: usize) -> Self {
        Self { selection, period }
    }

    pub fn selection(&self) -> IndicatorSelection {
        self.selection
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Compute the selected overlays, SMA before EMA.
    ///
    /// Overlays without a single value are dropped so the legend never
    /// shows an empty series.
    pub fn overlays(&self, rates: &[f64]) -> Vec<(IndicatorSpec, IndicatorSeries)> {
        self.selection
            .specs(self.period)
            .into_iter()
            .map(|spec| {
                let series = spec.compute(rates);
                (spec, series)
            })
            .filter(|(spec, series)| {
                if !series.has_values() {
                    log::debug!(
                        "Dropping {} overlay: {} points is not enough history",
                        spec.label(),
                        rates.len()
                    );
                }
                series.has_values()
            })
            .collect()
    }

    /// Build the payload for `series` with precomputed `stats`
    pub fn build(&self, series: &RateSeries, stats: &SeriesStats) -> ChartPayload {
        let rates = series.rates();
        let overlays = self.overlays(&rates);
        Self::assemble(series, &rates, stats, overlays)
    }

    /// Compute statistics and overlays side by side, then assemble the payload
    pub fn build_view(&self, series: &RateSeries) -> Result<ChartView> {
        let rates = series.rates();
        let (stats, overlays) = rayon::join(
            || SeriesStats::compute(&rates),
            || self.overlays(&rates),
        );
        let stats = stats?;

        Ok(ChartView {
            payload: Self::assemble(series, &rates, &stats, overlays),
            stats,
        })
    }

    fn assemble(
        series: &RateSeries,
        rates: &[f64],
        stats: &SeriesStats,
        overlays: Vec<(IndicatorSpec, IndicatorSeries)>,
    ) -> ChartPayload {
        let mut datasets = Vec::with_capacity(1 + overlays.len());
        datasets.push(Dataset::primary(rates, stats));
        datasets.extend(overlays.into_iter().map(|(spec, values)| {
            Dataset::overlay(spec.label(), values.into_values(), &spec.color)
        }));

        ChartPayload {
            labels: series.labels(),
            datasets,
        }
    }
}

impl Default for ChartSeriesBuilder {
    fn default() -> Self {
        Self::new(IndicatorSelection::None, DEFAULT_PERIOD)
    }
}
