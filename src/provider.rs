//! Market-data collaborators
//!
//! The analytics core never performs I/O. Prices arrive through a
//! [`PriceSource`]; [`InMemoryPriceSource`] serves preloaded series and
//! [`CachedPriceSource`] memoizes any other source for a fixed TTL.

use crate::config::CacheConfig;
use crate::error::{AnalyticsError, Result};
use crate::series::{DateRange, PriceSeries};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of adjusted daily closes
pub trait PriceSource {
    /// Fetch adjusted closes for `ticker`, restricted to `range` when given
    ///
    /// # Errors
    ///
    /// `TickerNotFound` for an unknown ticker, `NoData` when the ticker is
    /// known but has no prices inside `range`, `Provider` for anything else.
    fn fetch_prices(&self, ticker: &str, range: Option<DateRange>) -> Result<PriceSeries>;
}

impl<S: PriceSource + ?Sized> PriceSource for &S {
    fn fetch_prices(&self, ticker: &str, range: Option<DateRange>) -> Result<PriceSeries> {
        (**self).fetch_prices(ticker, range)
    }
}

impl<S: PriceSource + ?Sized> PriceSource for Arc<S> {
    fn fetch_prices(&self, ticker: &str, range: Option<DateRange>) -> Result<PriceSeries> {
        (**self).fetch_prices(ticker, range)
    }
}

impl<S: PriceSource + ?Sized> PriceSource for Box<S> {
    fn fetch_prices(&self, ticker: &str, range: Option<DateRange>) -> Result<PriceSeries> {
        (**self).fetch_prices(ticker, range)
    }
}

/// Canonical ticker form: trimmed and upper-cased
pub fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

/// Price source backed by series held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceSource {
    series: HashMap<String, PriceSeries>,
}

impl InMemoryPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with_series(mut self, ticker: &str, series: PriceSeries) -> Self {
        self.insert(ticker, series);
        self
    }

    /// Register `series` under `ticker`, replacing any previous one
    pub fn insert(&mut self, ticker: &str, series: PriceSeries) {
        self.series.insert(normalize_ticker(ticker), series);
    }

    /// Known tickers, sorted
    pub fn tickers(&self) -> Vec<String> {
        let mut tickers: Vec<String> = self.series.keys().cloned().collect();
        tickers.sort();
        tickers
    }
}

impl PriceSource for InMemoryPriceSource {
    fn fetch_prices(&self, ticker: &str, range: Option<DateRange>) -> Result<PriceSeries> {
        let key = normalize_ticker(ticker);
        let series = self
            .series
            .get(&key)
            .ok_or_else(|| AnalyticsError::TickerNotFound(key.clone()))?;

        let prices = match range {
            Some(range) => series.slice(&range),
            None => series.clone(),
        };

        if prices.is_empty() {
            return Err(AnalyticsError::NoData(format!(
                "no prices for {} in {:?}",
                key, range
            )));
        }

        Ok(prices)
    }
}

struct CacheEntry {
    fetched_at: Instant,
    prices: PriceSeries,
}

/// TTL cache in front of another price source
///
/// Keyed by normalized ticker and requested range. Failed fetches are not
/// cached, and expired entries are dropped whenever a new one is stored.
/// A disabled cache passes every request straight to the inner source.
pub struct CachedPriceSource<S> {
    inner: S,
    ttl: Duration,
    enabled: bool,
    entries: Mutex<HashMap<(String, Option<DateRange>), CacheEntry>>,
}

impl<S: PriceSource> CachedPriceSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            enabled: true,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cache configured from `config`, bypassed when `config.enabled` is false
    pub fn from_config(inner: S, config: &CacheConfig) -> Self {
        Self {
            enabled: config.enabled,
            ..Self::new(inner, config.ttl())
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored entries, including expired ones not yet evicted
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop every cached entry
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl<S: PriceSource> PriceSource for CachedPriceSource<S> {
    fn fetch_prices(&self, ticker: &str, range: Option<DateRange>) -> Result<PriceSeries> {
        let key = (normalize_ticker(ticker), range);

        if !self.enabled {
            return self.inner.fetch_prices(&key.0, range);
        }

        {
            let entries = self.entries.lock();
            if let Some(entry) = entries.get(&key) {
                if entry.fetched_at.elapsed() < self.ttl {
                    tracing::trace!(ticker = %key.0, "price cache hit");
                    return Ok(entry.prices.clone());
                }
            }
        }

        // The lock is not held while the inner source is queried.
        let prices = self.inner.fetch_prices(&key.0, range)?;
        tracing::debug!(ticker = %key.0, points = prices.len(), "price cache fill");

        let ttl = self.ttl;
        let mut entries = self.entries.lock();
        entries.retain(|_, entry| entry.fetched_at.elapsed() < ttl);
        entries.insert(
            key,
            CacheEntry {
                fetched_at: Instant::now(),
                prices: prices.clone(),
            },
        );

        Ok(prices)
    }
}
