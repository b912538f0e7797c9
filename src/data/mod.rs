//! Market data retrieval
//!
//! - **sources**: rate providers (HTTP and in-memory)
//! - **fetcher**: timeframe-driven series retrieval with validation

pub mod fetcher;
pub mod sources;

pub use fetcher::{RateSeriesFetcher, DEFAULT_FETCH_TIMEOUT};
pub use sources::{FrankfurterSource, InMemoryRateSource, RateProvider};
