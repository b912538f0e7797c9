//! Amount conversion at the latest rate

use crate::currency::{currency_info, CurrencyPair};
use crate::data::RateProvider;
use crate::error::{ChartError, Result};
use crate::types::Rate;
use serde::Serialize;
use std::fmt;

/// Multiply `amount` by `rate`, rejecting negative or non-finite amounts
pub fn convert_amount(amount: f64, rate: Rate) -> Result<f64> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ChartError::InvalidAmount(amount.to_string()));
    }
    Ok(amount * rate)
}

/// A completed conversion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    pub pair: CurrencyPair,
    pub amount: f64,
    pub rate: Rate,
    pub converted: f64,
}

impl Conversion {
    /// `1 FROM = rate TO` line shown under the result
    pub fn rate_line(&self) -> String {
        format!("1 {} = {:.4} {}", self.pair.from, self.rate, self.pair.to)
    }

    /// Converted amount with the target currency symbol
    pub fn formatted(&self) -> String {
        format!("{}{:.2}", currency_info(&self.pair.to).symbol, self.converted)
    }
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2} {} = {:.2} {}",
            self.amount, self.pair.from, self.converted, self.pair.to
        )
    }
}

/// Converts amounts using a provider's latest rates
#[derive(Debug, Clone)]
pub struct Converter<P> {
    provider: P,
}

impl<P: RateProvider> Converter<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Latest rate for `pair`; identical currencies convert at 1.0 without a request
    pub async fn rate(&self, pair: &CurrencyPair) -> Result<Rate> {
        if !pair.is_complete() {
            return Err(ChartError::InvalidPair(pair.to_string()));
        }
        if pair.is_identity() {
            return Ok(1.0);
        }
        self.provider.fetch_latest(pair).await
    }

    pub async fn convert(&self, pair: &CurrencyPair, amount: f64) -> Result<Conversion> {
        // validate before spending a request
        convert_amount(amount, 1.0)?;
        let rate = self.rate(pair).await?;
        let converted = convert_amount(amount, rate)?;
        log::debug!("Converted {} {} at {}", amount, pair, rate);

        Ok(Conversion {
            pair: pair.clone(),
            amount,
            rate,
            converted,
        })
    }

    /// Convert in the opposite direction
    pub async fn swap(&self, pair: &CurrencyPair, amount: f64) -> Result<Conversion> {
        self.convert(&pair.inverse(), amount).await
    }
}
