//! # Rusty-FXChart
//!
//! Exchange-rate charting core: fetches a rate history for a currency pair
//! and timeframe, derives SMA/EMA overlays and summary statistics, and
//! assembles a display-ready chart payload.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rusty_fxchart::prelude::*;
//!
//! # async fn run() -> rusty_fxchart::error::Result<()> {
//! let controller = ChartController::new(FrankfurterSource::new()?);
//! controller.set_indicator(IndicatorSelection::Both);
//! controller.refresh().await;
//!
//! if let Some(view) = controller.snapshot().view {
//!     println!("{}", view.stats);
//! }
//! # Ok(())
//! # }
//! ```

pub mod analytics;
pub mod chart;
pub mod config;
pub mod controller;
pub mod convert;
pub mod currency;
pub mod data;
pub mod error;
pub mod timeframe;
pub mod types;
pub mod watchlist;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::analytics::{ema, sma, IndicatorSelection, IndicatorSeries, SeriesStats, Trend};
    pub use crate::chart::{ChartPayload, ChartSeriesBuilder, ChartView, Dataset};
    pub use crate::config::Config;
    pub use crate::controller::{ChartController, ChartState, RefreshOutcome, Selection};
    pub use crate::convert::{Conversion, Converter};
    pub use crate::currency::CurrencyPair;
    pub use crate::data::{FrankfurterSource, InMemoryRateSource, RateProvider, RateSeriesFetcher};
    pub use crate::error::{ChartError, Result};
    pub use crate::timeframe::Timeframe;
    pub use crate::types::*;
    pub use crate::watchlist::{BlobStore, FileBlobStore, MemoryBlobStore, Watchlist};
}
