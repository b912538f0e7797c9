//! Chart controller
//!
//! Owns the user's current selection and the displayed chart state, and turns
//! selection changes into fetch + compute runs. Each run gets a sequence number
//! when it is started; a finished run is applied only if no newer run was
//! started in the meantime, so a slow response for an old selection can never
//! overwrite the chart for the current one.

use crate::analytics::{IndicatorSelection, DEFAULT_PERIOD};
use crate::chart::{ChartSeriesBuilder, ChartView};
use crate::config::Config;
use crate::currency::CurrencyPair;
use crate::data::{RateProvider, RateSeriesFetcher};
use crate::error::{ChartError, Result};
use crate::timeframe::Timeframe;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// What the user has picked
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub pair: CurrencyPair,
    pub timeframe: Timeframe,
    pub indicator: IndicatorSelection,
}

impl Selection {
    pub fn new(pair: CurrencyPair, timeframe: Timeframe, indicator: IndicatorSelection) -> Self {
        Self {
            pair,
            timeframe,
            indicator,
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::new(
            CurrencyPair::new("USD", "EUR"),
            Timeframe::default(),
            IndicatorSelection::default(),
        )
    }
}

/// What is currently displayed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartState {
    /// Last successfully built chart
    pub view: Option<ChartView>,
    /// User-facing message of the last failed run
    pub error: Option<String>,
    pub loading: bool,
}

/// Result of one refresh run
#[derive(Debug)]
pub enum RefreshOutcome {
    /// Nothing to do (incomplete pair or unchanged selection)
    Skipped,
    /// The new chart is displayed
    Applied,
    /// The run failed; the previous chart is kept
    Failed(ChartError),
    /// A newer run was started before this one finished; result dropped
    Stale,
}

impl RefreshOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, RefreshOutcome::Applied)
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, RefreshOutcome::Stale)
    }
}

#[derive(Debug, Default)]
struct Inner {
    selection: Selection,
    state: ChartState,
    /// Sequence number of the most recently started run
    latest: u64,
}

/// A started run: its sequence number and the selection it was started for
#[derive(Debug, Clone)]
struct Ticket {
    seq: u64,
    selection: Selection,
}

pub struct ChartController<P> {
    fetcher: RateSeriesFetcher<P>,
    period: usize,
    inner: Mutex<Inner>,
}

impl<P: RateProvider> ChartController<P> {
    pub fn new(provider: P) -> Self {
        Self {
            fetcher: RateSeriesFetcher::new(provider),
            period: DEFAULT_PERIOD,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Controller using the config's timeout, period and default selection
    pub fn from_config(provider: P, config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(provider)
            .with_timeout(config.request_timeout())
            .with_period(config.indicator_period)
            .with_selection(Selection::new(
                config.default_pair(),
                config.default_timeframe,
                config.default_indicator,
            )))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.fetcher = self.fetcher.with_timeout(timeout);
        self
    }

    pub fn with_period(mut self, period: usize) -> Self {
        self.period = period;
        self
    }

    pub fn with_selection(self, selection: Selection) -> Self {
        self.lock().selection = selection;
        self
    }

    pub fn provider(&self) -> &P {
        self.fetcher.provider()
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn selection(&self) -> Selection {
        self.lock().selection.clone()
    }

    /// Copy of the displayed state
    pub fn snapshot(&self) -> ChartState {
        self.lock().state.clone()
    }

    pub fn set_pair(&self, pair: CurrencyPair) {
        self.lock().selection.pair = pair;
    }

    pub fn set_timeframe(&self, timeframe: Timeframe) {
        self.lock().selection.timeframe = timeframe;
    }

    pub fn set_indicator(&self, indicator: IndicatorSelection) {
        self.lock().selection.indicator = indicator;
    }

    /// Replace the selection and refresh if it changed.
    ///
    /// The run is registered before the returned future is first polled.
    pub fn select(&self, selection: Selection) -> impl Future<Output = RefreshOutcome> + '_ {
        let ticket = {
            let mut inner = self.lock();
            if inner.selection == selection {
                None
            } else {
                inner.selection = selection;
                Self::start(&mut inner)
            }
        };
        self.run(ticket)
    }

    /// Fetch and rebuild the chart for the current selection.
    ///
    /// The run is registered before the returned future is first polled, so
    /// the order of `refresh` calls (not completion order) decides which
    /// result ends up displayed.
    pub fn refresh(&self) -> impl Future<Output = RefreshOutcome> + '_ {
        let ticket = Self::start(&mut self.lock());
        self.run(ticket)
    }

    fn start(inner: &mut Inner) -> Option<Ticket> {
        if !inner.selection.pair.is_complete() {
            log::debug!("Not refreshing: pair '{}' is incomplete", inner.selection.pair);
            return None;
        }
        inner.latest += 1;
        inner.state.loading = true;
        Some(Ticket {
            seq: inner.latest,
            selection: inner.selection.clone(),
        })
    }

    async fn run(&self, ticket: Option<Ticket>) -> RefreshOutcome {
        let Some(ticket) = ticket else {
            return RefreshOutcome::Skipped;
        };

        let result = self.load(&ticket.selection).await;

        let mut inner = self.lock();
        if ticket.seq != inner.latest {
            log::warn!(
                "Discarding stale result #{} for {} {} (latest is #{})",
                ticket.seq,
                ticket.selection.pair,
                ticket.selection.timeframe,
                inner.latest
            );
            return RefreshOutcome::Stale;
        }

        inner.state.loading = false;
        match result {
            Ok(Some(view)) => {
                log::info!(
                    "Chart updated for {} {}: {}",
                    ticket.selection.pair,
                    ticket.selection.timeframe,
                    view.stats
                );
                inner.state.view = Some(view);
                inner.state.error = None;
                RefreshOutcome::Applied
            }
            Ok(None) => RefreshOutcome::Skipped,
            Err(e) => {
                log::warn!(
                    "Failed to load {} {}: {}",
                    ticket.selection.pair,
                    ticket.selection.timeframe,
                    e
                );
                inner.state.error = Some(e.user_message());
                RefreshOutcome::Failed(e)
            }
        }
    }

    async fn load(&self, selection: &Selection) -> Result<Option<ChartView>> {
        let Some(series) = self.fetcher.fetch(&selection.pair, selection.timeframe).await? else {
            return Ok(None);
        };
        ChartSeriesBuilder::new(selection.indicator, self.period)
            .build_view(&series)
            .map(Some)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
