//! Saved currency pairs with their latest rates
//!
//! The list of pairs is persisted through a [`BlobStore`] under
//! [`WATCHLIST_KEY`] as a JSON array; rates are runtime-only and filled in by
//! [`Watchlist::refresh`].

use crate::currency::CurrencyPair;
use crate::data::RateProvider;
use crate::error::{ChartError, Result};
use crate::types::Rate;
use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Storage key of the saved pair list
pub const WATCHLIST_KEY: &str = "currencyWatchlist";

/// How often the CLI re-fetches watchlist rates in follow mode
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// String key-value persistence
pub trait BlobStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&self, key: &str, value: &str) -> Result<()>;
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(blobs.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key under a directory
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    /// The directory is created on first write
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ChartError::StoreError(format!("invalid key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl BlobStore for FileBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(path, value)?;
        Ok(())
    }
}

/// A watched pair and its most recently fetched rate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchlistEntry {
    pub pair: CurrencyPair,
    pub rate: Option<Rate>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl WatchlistEntry {
    fn new(pair: CurrencyPair) -> Self {
        Self {
            pair,
            rate: None,
            updated_at: None,
        }
    }
}

pub struct Watchlist<S> {
    store: S,
    entries: Vec<WatchlistEntry>,
}

impl<S: BlobStore> Watchlist<S> {
    /// Load the saved pairs, starting with USD/EUR when nothing is saved.
    ///
    /// A saved list that cannot be parsed is replaced by the default.
    pub fn load(store: S) -> Result<Self> {
        let pairs = match store.get(WATCHLIST_KEY)? {
            Some(json) => serde_json::from_str::<Vec<CurrencyPair>>(&json).unwrap_or_else(|e| {
                log::warn!("Discarding unreadable watchlist: {}", e);
                Self::default_pairs()
            }),
            None => Self::default_pairs(),
        };

        Ok(Self {
            store,
            entries: pairs.into_iter().map(WatchlistEntry::new).collect(),
        })
    }

    fn default_pairs() -> Vec<CurrencyPair> {
        vec![CurrencyPair::new("USD", "EUR")]
    }

    pub fn entries(&self) -> &[WatchlistEntry] {
        &self.entries
    }

    pub fn pairs(&self) -> Vec<CurrencyPair> {
        self.entries.iter().map(|e| e.pair.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, pair: &CurrencyPair) -> bool {
        self.entries.iter().any(|e| &e.pair == pair)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Add a pair and save; returns false if it was already watched
    pub fn add(&mut self, pair: CurrencyPair) -> Result<bool> {
        if !pair.is_complete() {
            return Err(ChartError::InvalidPair(pair.to_string()));
        }
        if self.contains(&pair) {
            log::debug!("{} already in watchlist", pair);
            return Ok(false);
        }
        self.entries.push(WatchlistEntry::new(pair));
        self.save()?;
        Ok(true)
    }

    /// Remove the pair at `index` and save
    pub fn remove(&mut self, index: usize) -> Result<Option<CurrencyPair>> {
        if index >= self.entries.len() {
            return Ok(None);
        }
        let entry = self.entries.remove(index);
        self.save()?;
        Ok(Some(entry.pair))
    }

    /// Fetch the latest rate for every pair, one request at a time.
    ///
    /// Failed pairs are logged and have their rate cleared. Returns the number
    /// of pairs updated.
    pub async fn refresh<P: RateProvider>(&mut self, provider: &P) -> usize {
        let mut updated = 0;
        for entry in &mut self.entries {
            match provider.fetch_latest(&entry.pair).await {
                Ok(rate) => {
                    entry.rate = Some(rate);
                    entry.updated_at = Some(Utc::now());
                    updated += 1;
                }
                Err(e) => {
                    log::warn!("Failed to refresh {}: {}", entry.pair, e);
                    entry.rate = None;
                }
            }
        }
        log::debug!("Refreshed {}/{} watchlist pairs", updated, self.entries.len());
        updated
    }

    fn save(&self) -> Result<()> {
        let json = serde_json::to_string(&self.pairs())?;
        self.store.put(WATCHLIST_KEY, &json)
    }
}
