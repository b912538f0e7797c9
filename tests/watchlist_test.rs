//! Watchlist persistence through the file-backed store

use chrono::NaiveDate;
use rusty_fxchart::currency::CurrencyPair;
use rusty_fxchart::data::InMemoryRateSource;
use rusty_fxchart::watchlist::{BlobStore, FileBlobStore, Watchlist, WATCHLIST_KEY};
use tempfile::TempDir;

#[test]
fn test_changes_survive_reload() {
    let dir = TempDir::new().unwrap();

    {
        let mut watchlist = Watchlist::load(FileBlobStore::new(dir.path())).unwrap();
        assert_eq!(watchlist.len(), 1);
        watchlist.add(CurrencyPair::new("EUR", "GBP")).unwrap();
        watchlist.add(CurrencyPair::new("USD", "THB")).unwrap();
        watchlist.remove(0).unwrap();
    }

    let watchlist = Watchlist::load(FileBlobStore::new(dir.path())).unwrap();
    assert_eq!(
        watchlist.pairs(),
        vec![CurrencyPair::new("EUR", "GBP"), CurrencyPair::new("USD", "THB")]
    );
    assert!(dir.path().join("currencyWatchlist.json").exists());
}

#[test]
fn test_missing_directory_created_on_save() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("state").join("fx");
    let mut watchlist = Watchlist::load(FileBlobStore::new(&nested)).unwrap();

    // nothing written until the first change
    assert!(!nested.exists());
    watchlist.add(CurrencyPair::new("JPY", "KRW")).unwrap();
    assert!(nested.join("currencyWatchlist.json").exists());
}

#[test]
fn test_empty_list_is_kept() {
    let dir = TempDir::new().unwrap();
    let store = FileBlobStore::new(dir.path());
    store.put(WATCHLIST_KEY, "[]").unwrap();

    let watchlist = Watchlist::load(store).unwrap();
    assert!(watchlist.is_empty());
}

#[tokio::test]
async fn test_refresh_from_offline_source() {
    let dir = TempDir::new().unwrap();
    let mut source = InMemoryRateSource::new();
    let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    source
        .add_rate(&CurrencyPair::new("EUR", "USD"), date, 1.25)
        .unwrap();

    let mut watchlist = Watchlist::load(FileBlobStore::new(dir.path())).unwrap();
    watchlist.add(CurrencyPair::new("EUR", "USD")).unwrap();

    assert_eq!(watchlist.refresh(&source).await, 2);
    let rates: Vec<Option<f64>> = watchlist.entries().iter().map(|e| e.rate).collect();
    assert_eq!(rates, vec![Some(0.8), Some(1.25)]);
}
