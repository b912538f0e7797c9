//! In-memory rate source
//!
//! Holds daily rates per currency pair in ordered maps so range queries are
//! cheap. Rates can be added programmatically or loaded from CSV, which makes
//! this the source of choice for offline runs and tests.

use super::RateProvider;
use crate::currency::CurrencyPair;
use crate::error::{ChartError, Result};
use crate::types::{Date, Rate, RatePoint, DATE_FORMAT};
use chrono::NaiveDate;
use hashbrown::HashMap;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// In-memory rate storage: (from, to) -> (date -> rate)
///
/// # Example
/// ```
/// use rusty_fxchart::currency::CurrencyPair;
/// use rusty_fxchart::data::sources::InMemoryRateSource;
/// use chrono::NaiveDate;
///
/// let mut source = InMemoryRateSource::new();
/// let pair = CurrencyPair::new("EUR", "USD");
/// let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
///
/// // 1 EUR = 1.10 USD
/// source.add_rate(&pair, date, 1.10).unwrap();
/// assert_eq!(source.rate_on(&pair, date), Some(1.10));
///
/// // The inverse is derived on demand
/// let rate = source.rate_on(&pair.inverse(), date).unwrap();
/// assert!((rate - 1.0 / 1.10).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryRateSource {
    rates: HashMap<(String, String), BTreeMap<Date, Rate>>,
    /// Answer `B/A` queries from stored `A/B` rates
    auto_inverse: bool,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    from: String,
    to: String,
    rate: f64,
}

impl InMemoryRateSource {
    pub fn new() -> Self {
        Self {
            rates: HashMap::new(),
            auto_inverse: true,
        }
    }

    /// Disable or enable inverse lookups
    pub fn with_auto_inverse(mut self, auto_inverse: bool) -> Self {
        self.auto_inverse = auto_inverse;
        self
    }

    /// Add a single rate; later additions for the same date replace earlier ones
    pub fn add_rate(&mut self, pair: &CurrencyPair, date: Date, rate: Rate) -> Result<()> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ChartError::DataFormatError(format!(
                "rate must be positive, got {} for {} on {}",
                rate, pair, date
            )));
        }

        self.rates
            .entry((pair.from.clone(), pair.to.clone()))
            .or_default()
            .insert(date, rate);
        Ok(())
    }

    /// Load rates from CSV text with header `date,from,to,rate`.
    ///
    /// Lines starting with `#` are ignored. Returns the number of rates loaded.
    pub fn load_from_csv(&mut self, csv_data: &str) -> Result<usize> {
        let mut reader = csv::ReaderBuilder::new()
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(csv_data.as_bytes());

        let mut count = 0;
        for (index, row) in reader.deserialize::<CsvRow>().enumerate() {
            // Header is line 1
            let line = index + 2;
            let row = row.map_err(|e| {
                ChartError::DataFormatError(format!("CSV parse error at line {}: {}", line, e))
            })?;
            let date = NaiveDate::parse_from_str(&row.date, DATE_FORMAT).map_err(|e| {
                ChartError::DataFormatError(format!("Date parse error at line {}: {}", line, e))
            })?;
            self.add_rate(&CurrencyPair::new(&row.from, &row.to), date, row.rate)?;
            count += 1;
        }

        log::debug!("Loaded {} rates from CSV", count);
        Ok(count)
    }

    /// Load rates from a CSV file
    pub fn load_from_path(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let contents = std::fs::read_to_string(path)?;
        self.load_from_csv(&contents)
    }

    /// Pairs with stored rates
    pub fn pairs(&self) -> Vec<CurrencyPair> {
        let mut pairs: Vec<CurrencyPair> = self
            .rates
            .keys()
            .map(|(from, to)| CurrencyPair::new(from, to))
            .collect();
        pairs.sort_by(|a, b| a.to_string().cmp(&b.to_string()));
        pairs
    }

    /// Rate on an exact date
    pub fn rate_on(&self, pair: &CurrencyPair, date: Date) -> Option<Rate> {
        self.range(pair, date, date).into_iter().next().map(|p| p.rate)
    }

    fn direct(&self, pair: &CurrencyPair) -> Option<&BTreeMap<Date, Rate>> {
        self.rates.get(&(pair.from.clone(), pair.to.clone()))
    }

    fn range(&self, pair: &CurrencyPair, start: Date, end: Date) -> Vec<RatePoint> {
        if pair.is_identity() || start > end {
            return Vec::new();
        }
        if let Some(series) = self.direct(pair) {
            return series
                .range(start..=end)
                .map(|(date, rate)| RatePoint::new(*date, *rate))
                .collect();
        }
        if self.auto_inverse {
            if let Some(series) = self.direct(&pair.inverse()) {
                return series
                    .range(start..=end)
                    .map(|(date, rate)| RatePoint::new(*date, 1.0 / rate))
                    .collect();
            }
        }
        Vec::new()
    }

    fn latest(&self, pair: &CurrencyPair) -> Option<Rate> {
        if pair.is_identity() {
            return Some(1.0);
        }
        if let Some(series) = self.direct(pair) {
            return series.values().next_back().copied();
        }
        if self.auto_inverse {
            if let Some(series) = self.direct(&pair.inverse()) {
                return series.values().next_back().map(|rate| 1.0 / rate);
            }
        }
        None
    }
}

impl Default for InMemoryRateSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RateProvider for InMemoryRateSource {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn fetch_range(
        &self,
        pair: &CurrencyPair,
        start: Date,
        end: Date,
    ) -> Result<Vec<RatePoint>> {
        Ok(self.range(pair, start, end))
    }

    async fn fetch_latest(&self, pair: &CurrencyPair) -> Result<Rate> {
        self.latest(pair)
            .ok_or_else(|| ChartError::DataFormatError(format!("no rates stored for {}", pair)))
    }
}
