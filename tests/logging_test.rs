//! Log levels emitted by the controller for failed and discarded runs.

use chrono::Utc;
use log::{Level, LevelFilter, Log, Metadata, Record};
use rusty_fxchart::controller::{ChartController, RefreshOutcome};
use rusty_fxchart::currency::CurrencyPair;
use rusty_fxchart::data::InMemoryRateSource;
use std::sync::Mutex;

struct CaptureLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.records
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};

fn level_of(needle: &str) -> Option<Level> {
    LOGGER
        .records
        .lock()
        .unwrap()
        .iter()
        .find(|(_, msg)| msg.contains(needle))
        .map(|(level, _)| *level)
}

fn source() -> InMemoryRateSource {
    let mut source = InMemoryRateSource::new();
    let pair = CurrencyPair::new("USD", "EUR");
    let today = Utc::now().date_naive();
    for i in 0..10 {
        source
            .add_rate(&pair, today - chrono::Duration::days(i), 0.9)
            .unwrap();
    }
    source
}

#[tokio::test]
async fn test_failed_and_stale_runs_log_at_warn() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let controller = ChartController::new(source());

    let first = controller.refresh();
    let second = controller.refresh();
    assert!(first.await.is_stale());
    assert!(second.await.is_applied());

    controller.set_pair(CurrencyPair::new("USD", "JPY"));
    assert!(matches!(
        controller.refresh().await,
        RefreshOutcome::Failed(_)
    ));

    assert_eq!(level_of("Discarding stale result"), Some(Level::Warn));
    assert_eq!(level_of("Failed to load USD/JPY"), Some(Level::Warn));
    assert_eq!(level_of("Chart updated"), Some(Level::Info));
}
