//! Runtime settings
//!
//! Read from `GRANTS_*` environment variables (a `.env` file is honoured),
//! falling back to the defaults below.

use config::{Config, Environment, Source};
use serde::Deserialize;
use std::path::PathBuf;

use crate::sources::exchange_rates::ExchangeRateClient;
use crate::sources::wos::{WosClient, MAX_PAGE_SIZE};
use crate::types::*;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Web of Science Expanded API key
    #[serde(default)]
    pub api_key: String,
    pub wos_base_url: String,
    pub rates_url: String,
    pub page_size: u32,
    pub rate_cache: PathBuf,
    pub download_dir: PathBuf,
}

impl Settings {
    /// Load from `.env` and the process environment
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_source(
            Environment::with_prefix("GRANTS")
                .try_parsing(true)
                .ignore_empty(true),
        )
    }

    /// Defaults overlaid with `source`
    pub fn from_source<S>(source: S) -> Result<Self>
    where
        S: Source + Send + Sync + 'static,
    {
        let settings: Settings = Config::builder()
            .set_default("wos_base_url", WosClient::DEFAULT_BASE_URL)
            .and_then(|b| b.set_default("rates_url", ExchangeRateClient::DEFAULT_URL))
            .and_then(|b| b.set_default("page_size", MAX_PAGE_SIZE as i64))
            .and_then(|b| b.set_default("rate_cache", "currencies.csv"))
            .and_then(|b| b.set_default("download_dir", "downloads"))
            .map_err(|e| GrantsError::Config(e.to_string()))?
            .add_source(source)
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| GrantsError::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        for (key, value) in [("wos_base_url", &self.wos_base_url), ("rates_url", &self.rates_url)] {
            url::Url::parse(value)
                .map_err(|e| GrantsError::Config(format!("{} {:?}: {}", key, value, e)))?;
        }

        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(GrantsError::Config(format!(
                "page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        Ok(())
    }

    /// API key, required by every metadata request
    pub fn require_api_key(&self) -> Result<&str> {
        if self.api_key.trim().is_empty() {
            return Err(GrantsError::Config(
                "GRANTS_API_KEY is not set".to_string(),
            ));
        }
        Ok(&self.api_key)
    }
}
