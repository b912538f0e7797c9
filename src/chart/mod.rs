//! Chart series construction
//!
//! - **payload**: renderer-facing labels and datasets
//! - **builder**: primary line plus indicator overlays for a selection

pub mod builder;
pub mod payload;

pub use builder::{ChartSeriesBuilder, ChartView};
pub use payload::{ChartPayload, Dataset, Gradient, PointStyle, PRIMARY_LABEL};
