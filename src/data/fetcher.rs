//! Historical rate series retrieval
//!
//! Turns a currency pair and a timeframe into a validated [`RateSeries`]:
//! computes the date window, asks the provider for it under a timeout and
//! normalises whatever comes back (sorting, deduplication, minimum length).

use super::sources::RateProvider;
use crate::currency::CurrencyPair;
use crate::error::{ChartError, Result};
use crate::timeframe::Timeframe;
use crate::types::{Date, RateSeries};
use chrono::Utc;
use std::time::Duration;

/// Fetch timeout applied when none is configured
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Retrieves rate series for a pair and timeframe from a [`RateProvider`]
#[derive(Debug, Clone)]
pub struct RateSeriesFetcher<P> {
    provider: P,
    timeout: Duration,
}

impl<P: RateProvider> RateSeriesFetcher<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch the series ending today (UTC).
    ///
    /// Returns `Ok(None)` without touching the provider when either currency
    /// code is empty.
    pub async fn fetch(
        &self,
        pair: &CurrencyPair,
        timeframe: Timeframe,
    ) -> Result<Option<RateSeries>> {
        self.fetch_as_of(pair, timeframe, Utc::now().date_naive())
            .await
    }

    /// Fetch the series for the window ending on `today`
    pub async fn fetch_as_of(
        &self,
        pair: &CurrencyPair,
        timeframe: Timeframe,
        today: Date,
    ) -> Result<Option<RateSeries>> {
        if !pair.is_complete() {
            log::debug!("Skipping fetch for incomplete pair '{}'", pair);
            return Ok(None);
        }

        let (start, end) = timeframe.date_range(today);
        log::debug!(
            "Fetching {} {} from {} ({} to {})",
            pair,
            timeframe,
            self.provider.name(),
            start,
            end
        );

        let points = tokio::time::timeout(
            self.timeout,
            self.provider.fetch_range(pair, start, end),
        )
        .await
        .map_err(|_| {
            ChartError::FetchError(format!(
                "request for {} timed out after {}s",
                pair,
                self.timeout.as_secs_f64()
            ))
        })??;

        let series = RateSeries::new(points)?;
        log::debug!("Fetched {} points for {}", series.len(), pair);
        Ok(Some(series))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sources::InMemoryRateSource;
    use chrono::NaiveDate;

    fn seeded_source(days: u32) -> InMemoryRateSource {
        let mut source = InMemoryRateSource::new();
        let pair = CurrencyPair::new("USD", "EUR");
        for d in 1..=days {
            let date = NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
            source.add_rate(&pair, date, 0.9 + d as f64 / 100.0).unwrap();
        }
        source
    }

    #[tokio::test]
    async fn test_fetch_window() {
        let fetcher = RateSeriesFetcher::new(seeded_source(31));
        let today = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
        let series = fetcher
            .fetch_as_of(&CurrencyPair::new("USD", "EUR"), Timeframe::OneWeek, today)
            .await
            .unwrap()
            .unwrap();

        // 13th..=20th inclusive
        assert_eq!(series.len(), 8);
        assert_eq!(series.labels()[0], "2024-01-13");
        assert_eq!(series.labels()[7], "2024-01-20");
    }

    #[tokio::test]
    async fn test_incomplete_pair_is_noop() {
        let fetcher = RateSeriesFetcher::new(seeded_source(5));
        let result = fetcher
            .fetch(&CurrencyPair::new("USD", ""), Timeframe::OneWeek)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_single_point_is_insufficient() {
        let fetcher = RateSeriesFetcher::new(seeded_source(31));
        let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        // 1D window covers Jan 31 and Feb 1; only Jan 31 is stored
        let err = fetcher
            .fetch_as_of(&CurrencyPair::new("USD", "EUR"), Timeframe::OneDay, today)
            .await
            .unwrap_err();
        assert!(matches!(err, ChartError::InsufficientDataError { points: 1 }));
    }
}
