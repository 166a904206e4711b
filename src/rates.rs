//! USD rate table provider.
//!
//! Serves the cached table while it is less than a day old and otherwise
//! refreshes it from the rate source, rewriting the cache file. A failed
//! refresh falls back to the stale cache when there is one.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::RateCache;
use crate::types::*;

pub struct RateProvider {
    cache: RateCache,
    source: Arc<dyn RateSource>,
}

impl RateProvider {
    pub fn new(cache: RateCache, source: Arc<dyn RateSource>) -> Self {
        Self { cache, source }
    }

    /// Rate table valid for `today`
    pub async fn usd_rates(&self, today: NaiveDate) -> Result<RateTable> {
        let cached = match self.cache.load() {
            Ok(cached) => cached,
            Err(e) => {
                warn!("Ignoring unreadable rate cache {}: {}", self.cache.path().display(), e);
                None
            }
        };

        if let Some(table) = &cached {
            if table.is_fresh(today) {
                info!("Using cached rates from {}", table.updated());
                return Ok(table.clone());
            }
        }

        match self.refresh(today).await {
            Ok(table) => Ok(table),
            Err(e) => match cached {
                Some(stale) => {
                    warn!(
                        "Rate refresh from {} failed ({}), using rates from {}",
                        self.source.name(),
                        e,
                        stale.updated()
                    );
                    Ok(stale)
                }
                None => Err(e),
            },
        }
    }

    /// Fetch new rates and rewrite the cache file.
    ///
    /// A cache write failure is logged; the fetched table is still returned.
    pub async fn refresh(&self, today: NaiveDate) -> Result<RateTable> {
        let rates = self.source.latest_rates().await?;
        let table = RateTable::new(today, rates);
        match self.cache.store(&table) {
            Ok(()) => info!(
                "Refreshed {} rates from {} into {}",
                table.len(),
                self.source.name(),
                self.cache.path().display()
            ),
            Err(e) => warn!(
                "Refreshed {} rates from {} but could not write {}: {}",
                table.len(),
                self.source.name(),
                self.cache.path().display(),
                e
            ),
        }
        Ok(table)
    }
}
