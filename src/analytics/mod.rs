//! Rate-series analytics
//!
//! - **indicators**: SMA/EMA overlays aligned with the source series
//! - **statistics**: percentage change, high and low

pub mod indicators;
pub mod statistics;

pub use indicators::{
    ema, sma, ExponentialMovingAverage, IndicatorKind, IndicatorSelection, IndicatorSeries,
    IndicatorSpec, SimpleMovingAverage, DEFAULT_PERIOD,
};
pub use statistics::{SeriesStats, Trend};
