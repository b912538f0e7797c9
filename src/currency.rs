//! Currency metadata and currency pairs

use crate::error::{ChartError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display metadata for a currency code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrencyInfo {
    pub code: String,
    pub name: String,
    pub symbol: String,
    pub flag: String,
}

/// Flag shown for codes missing from the table
pub const FALLBACK_FLAG: &str = "🏳️";

// (code, name, symbol, flag)
const CURRENCIES: &[(&str, &str, &str, &str)] = &[
    ("USD", "US Dollar", "$", "🇺🇸"),
    ("EUR", "Euro", "€", "🇪🇺"),
    ("GBP", "British Pound", "£", "🇬🇧"),
    ("JPY", "Japanese Yen", "¥", "🇯🇵"),
    ("THB", "Thai Baht", "฿", "🇹🇭"),
    ("PHP", "Philippine Peso", "₱", "🇵🇭"),
    ("AUD", "Australian Dollar", "A$", "🇦🇺"),
    ("CAD", "Canadian Dollar", "C$", "🇨🇦"),
    ("CHF", "Swiss Franc", "Fr", "🇨🇭"),
    ("CNY", "Chinese Yuan", "¥", "🇨🇳"),
    ("HKD", "Hong Kong Dollar", "HK$", "🇭🇰"),
    ("NZD", "New Zealand Dollar", "NZ$", "🇳🇿"),
    ("SEK", "Swedish Krona", "kr", "🇸🇪"),
    ("KRW", "South Korean Won", "₩", "🇰🇷"),
    ("SGD", "Singapore Dollar", "S$", "🇸🇬"),
    ("INR", "Indian Rupee", "₹", "🇮🇳"),
    ("MYR", "Malaysian Ringgit", "RM", "🇲🇾"),
    ("IDR", "Indonesian Rupiah", "Rp", "🇮🇩"),
];

/// Look up display metadata; unknown codes get a generic entry named after the code
pub fn currency_info(code: &str) -> CurrencyInfo {
    let upper = code.trim().to_uppercase();
    match CURRENCIES.iter().find(|(c, ..)| *c == upper) {
        Some(&(code, name, symbol, flag)) => CurrencyInfo {
            code: code.to_string(),
            name: name.to_string(),
            symbol: symbol.to_string(),
            flag: flag.to_string(),
        },
        None => CurrencyInfo {
            code: upper.clone(),
            name: upper.clone(),
            symbol: upper,
            flag: FALLBACK_FLAG.to_string(),
        },
    }
}

/// Whether the code has an entry in the metadata table
pub fn is_known(code: &str) -> bool {
    let upper = code.trim().to_uppercase();
    CURRENCIES.iter().any(|(c, ..)| *c == upper)
}

/// Known currency codes sorted by display name
pub fn supported_codes() -> Vec<&'static str> {
    let mut entries: Vec<&(&str, &str, &str, &str)> = CURRENCIES.iter().collect();
    entries.sort_by(|a, b| a.1.cmp(b.1));
    entries.into_iter().map(|(code, ..)| *code).collect()
}

/// Currency pair for exchange rates (`1 from = rate to`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub from: String,
    pub to: String,
}

impl CurrencyPair {
    /// Create new currency pair; codes are trimmed and upper-cased
    pub fn new(from: impl AsRef<str>, to: impl AsRef<str>) -> Self {
        Self {
            from: from.as_ref().trim().to_uppercase(),
            to: to.as_ref().trim().to_uppercase(),
        }
    }

    /// Both codes present
    pub fn is_complete(&self) -> bool {
        !self.from.is_empty() && !self.to.is_empty()
    }

    /// Get the inverse pair
    pub fn inverse(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.from == self.to
    }

    /// Human readable description, e.g. "US Dollar to Euro"
    pub fn describe(&self) -> String {
        format!(
            "{} to {}",
            currency_info(&self.from).name,
            currency_info(&self.to).name
        )
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.from, self.to)
    }
}

impl FromStr for CurrencyPair {
    type Err = ChartError;

    /// Parse from string (e.g., "EUR/USD" or "EURUSD")
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let pair = if let Some((from, to)) = s.split_once('/') {
            Self::new(from, to)
        } else if s.len() == 6 && s.is_ascii() {
            Self::new(&s[0..3], &s[3..6])
        } else {
            return Err(ChartError::InvalidPair(s.to_string()));
        };

        if !pair.is_complete() || pair.to.contains('/') {
            return Err(ChartError::InvalidPair(s.to_string()));
        }
        Ok(pair)
    }
}
