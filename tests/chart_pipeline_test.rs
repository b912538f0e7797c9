//! End-to-end chart pipeline tests: provider -> fetcher -> analytics -> payload,
//! plus request sequencing in the controller.

use chrono::NaiveDate;
use rusty_fxchart::analytics::IndicatorSelection;
use rusty_fxchart::chart::ChartSeriesBuilder;
use rusty_fxchart::controller::{ChartController, RefreshOutcome};
use rusty_fxchart::currency::CurrencyPair;
use rusty_fxchart::data::sources::frankfurter::parse_range_body;
use rusty_fxchart::data::{InMemoryRateSource, RateProvider, RateSeriesFetcher};
use rusty_fxchart::error::{ChartError, Result};
use rusty_fxchart::timeframe::Timeframe;
use rusty_fxchart::types::{Date, Rate, RatePoint, RateSeries};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::oneshot;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn points(rates: &[f64]) -> Vec<RatePoint> {
    rates
        .iter()
        .enumerate()
        .map(|(i, &r)| RatePoint::new(day(i as u32 + 1), r))
        .collect()
}

/// Provider whose responses are released by the test, keyed by target currency
#[derive(Default)]
struct GatedProvider {
    gates: Mutex<HashMap<String, oneshot::Receiver<Result<Vec<RatePoint>>>>>,
}

impl GatedProvider {
    fn gate(&self, to: &str) -> oneshot::Sender<Result<Vec<RatePoint>>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(to.to_string(), rx);
        tx
    }
}

impl RateProvider for GatedProvider {
    fn name(&self) -> &str {
        "gated"
    }

    async fn fetch_range(
        &self,
        pair: &CurrencyPair,
        _start: Date,
        _end: Date,
    ) -> Result<Vec<RatePoint>> {
        let rx = self.gates.lock().unwrap().remove(&pair.to);
        match rx {
            Some(rx) => rx
                .await
                .map_err(|_| ChartError::FetchError("gate dropped".to_string()))?,
            None => Err(ChartError::FetchError(format!("no gate for {}", pair))),
        }
    }

    async fn fetch_latest(&self, pair: &CurrencyPair) -> Result<Rate> {
        Err(ChartError::FetchError(format!("no latest for {}", pair)))
    }
}

#[tokio::test]
async fn test_out_of_order_completion_keeps_latest() {
    let provider = GatedProvider::default();
    let release_a = provider.gate("EUR");
    let release_b = provider.gate("GBP");
    let controller = ChartController::new(provider);

    controller.set_pair(CurrencyPair::new("USD", "EUR"));
    let request_a = controller.refresh();
    controller.set_pair(CurrencyPair::new("USD", "GBP"));
    let request_b = controller.refresh();

    let (outcome_a, outcome_b) = tokio::join!(request_a, async {
        release_b.send(Ok(points(&[0.80, 0.81, 0.82]))).unwrap();
        let outcome = request_b.await;
        release_a.send(Ok(points(&[0.90, 0.91, 0.92]))).unwrap();
        outcome
    });

    assert!(outcome_b.is_applied());
    assert!(outcome_a.is_stale());

    let state = controller.snapshot();
    assert!(!state.loading);
    let primary = state.view.unwrap().payload.datasets[0].data.clone();
    assert_eq!(primary, vec![Some(0.80), Some(0.81), Some(0.82)]);
}

#[tokio::test]
async fn test_stale_failure_does_not_set_error() {
    let provider = GatedProvider::default();
    let release_a = provider.gate("EUR");
    let release_b = provider.gate("GBP");
    let controller = ChartController::new(provider);

    controller.set_pair(CurrencyPair::new("USD", "EUR"));
    let request_a = controller.refresh();
    controller.set_pair(CurrencyPair::new("USD", "GBP"));
    let request_b = controller.refresh();

    let (outcome_a, outcome_b) = tokio::join!(request_a, async {
        release_b.send(Ok(points(&[1.0, 1.1]))).unwrap();
        let outcome = request_b.await;
        release_a
            .send(Err(ChartError::FetchError("boom".to_string())))
            .unwrap();
        outcome
    });

    assert!(outcome_b.is_applied());
    assert!(outcome_a.is_stale());
    assert!(controller.snapshot().error.is_none());
}

#[tokio::test]
async fn test_loading_until_latest_completes() {
    let provider = GatedProvider::default();
    let release = provider.gate("EUR");
    let controller = ChartController::new(provider);

    let request = controller.refresh();
    assert!(controller.snapshot().loading);

    release.send(Ok(points(&[1.0, 1.2]))).unwrap();
    assert!(request.await.is_applied());
    assert!(!controller.snapshot().loading);
}

#[tokio::test]
async fn test_fetch_error_message() {
    let provider = GatedProvider::default();
    let release = provider.gate("EUR");
    let controller = ChartController::new(provider);

    let request = controller.refresh();
    release
        .send(Err(ChartError::FetchError("connection refused".to_string())))
        .unwrap();
    assert!(matches!(
        request.await,
        RefreshOutcome::Failed(ChartError::FetchError(_))
    ));

    let state = controller.snapshot();
    assert!(!state.loading);
    assert!(state.view.is_none());
    assert_eq!(
        state.error.as_deref(),
        Some("Failed to load chart data. Please try again later.")
    );
}

#[tokio::test]
async fn test_timeout_maps_to_fetch_error() {
    let provider = GatedProvider::default();
    let _release = provider.gate("EUR");
    let fetcher = RateSeriesFetcher::new(provider).with_timeout(Duration::from_millis(20));

    let err = fetcher
        .fetch(&CurrencyPair::new("USD", "EUR"), Timeframe::OneWeek)
        .await
        .unwrap_err();
    assert!(matches!(err, ChartError::FetchError(_)));
}

#[test]
fn test_single_date_response_is_insufficient() {
    let body = r#"{"amount":1.0,"base":"USD","rates":{"2024-03-01":{"EUR":0.92}}}"#;
    let points = parse_range_body(body, "EUR").unwrap();
    assert!(matches!(
        RateSeries::new(points),
        Err(ChartError::InsufficientDataError { points: 1 })
    ));
}

#[test]
fn test_both_on_short_series_is_primary_only() {
    let series = RateSeries::new(points(&[1.0, 1.01, 1.02])).unwrap();
    let view = ChartSeriesBuilder::new(IndicatorSelection::Both, 7)
        .build_view(&series)
        .unwrap();
    assert_eq!(view.payload.datasets.len(), 1);
}

#[test]
fn test_sma_on_ten_points() {
    let rates: Vec<f64> = (0..10).map(|i| 1.0 + i as f64 / 100.0).collect();
    let series = RateSeries::new(points(&rates)).unwrap();
    let view = ChartSeriesBuilder::new(IndicatorSelection::Sma, 7)
        .build_view(&series)
        .unwrap();
    assert_eq!(
        view.payload.series_labels(),
        vec!["Exchange Rate", "SMA (7)"]
    );
}

#[tokio::test]
async fn test_offline_csv_pipeline() {
    let csv = "date,from,to,rate\n\
               # three months of EUR/USD\n\
               2024-03-01,EUR,USD,1.08\n\
               2024-03-04,EUR,USD,1.09\n\
               2024-03-05,EUR,USD,1.085\n\
               2024-03-06,EUR,USD,1.10\n";
    let mut source = InMemoryRateSource::new();
    assert_eq!(source.load_from_csv(csv).unwrap(), 4);

    let fetcher = RateSeriesFetcher::new(source);
    let series = fetcher
        .fetch_as_of(&CurrencyPair::new("USD", "EUR"), Timeframe::OneWeek, day(6))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(series.len(), 4);
    // inverse of a rising EUR/USD is falling
    let view = ChartSeriesBuilder::default().build_view(&series).unwrap();
    assert!(view.stats.percentage_change < 0.0);
    assert_eq!(view.payload.labels[0], "2024-03-01");
}
