//! Exchange-rate providers
//!
//! - Frankfurter: free ECB reference rates over HTTP, no API key
//! - In-memory: pre-loaded rates (CSV or programmatic) for offline use and tests

pub mod frankfurter;
pub mod in_memory;

pub use frankfurter::FrankfurterSource;
pub use in_memory::InMemoryRateSource;

use crate::currency::CurrencyPair;
use crate::error::Result;
use crate::types::{Date, Rate, RatePoint};
use std::future::Future;

/// Trait for exchange-rate data sources
pub trait RateProvider: Send + Sync {
    /// Get the source name
    fn name(&self) -> &str;

    /// Fetch daily rates for `pair` over the closed range `start..=end`.
    ///
    /// Points may come back in any order; callers normalise them into a
    /// [`RateSeries`](crate::types::RateSeries).
    fn fetch_range(
        &self,
        pair: &CurrencyPair,
        start: Date,
        end: Date,
    ) -> impl Future<Output = Result<Vec<RatePoint>>> + Send;

    /// Fetch the most recent rate for `pair`
    fn fetch_latest(&self, pair: &CurrencyPair) -> impl Future<Output = Result<Rate>> + Send;
}

impl<P: RateProvider> RateProvider for std::sync::Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch_range(
        &self,
        pair: &CurrencyPair,
        start: Date,
        end: Date,
    ) -> impl Future<Output = Result<Vec<RatePoint>>> + Send {
        (**self).fetch_range(pair, start, end)
    }

    fn fetch_latest(&self, pair: &CurrencyPair) -> impl Future<Output = Result<Rate>> + Send {
        (**self).fetch_latest(pair)
    }
}
