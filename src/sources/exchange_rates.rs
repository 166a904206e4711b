use crate::types::*;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::info;

/// Free USD-based rates from open.er-api.com (no API key required)
pub struct ExchangeRateClient {
    client: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct ExchangeRateApiResponse {
    result: String,
    #[serde(default)]
    rates: BTreeMap<String, f64>,
}

impl ExchangeRateClient {
    pub const DEFAULT_URL: &'static str = "https://open.er-api.com/v6/latest/USD";

    pub fn new(url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GrantsError::ApiError(e.to_string()))?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Get all rates quoted against USD
    pub async fn get_rates(&self) -> Result<BTreeMap<String, f64>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| GrantsError::ApiError(format!("Failed to fetch exchange rates: {}", e)))?;

        if !response.status().is_success() {
            return Err(GrantsError::ApiError(format!(
                "Exchange rate API error: {}",
                response.status()
            )));
        }

        let data: ExchangeRateApiResponse = response
            .json()
            .await
            .map_err(|e| GrantsError::InvalidResponse(e.to_string()))?;

        if data.result != "success" {
            return Err(GrantsError::ApiError(format!(
                "Exchange rate API returned result {:?}",
                data.result
            )));
        }

        info!("Fetched {} exchange rates", data.rates.len());

        Ok(data.rates)
    }
}

#[async_trait::async_trait]
impl RateSource for ExchangeRateClient {
    async fn latest_rates(&self) -> Result<BTreeMap<String, f64>> {
        self.get_rates().await
    }

    fn name(&self) -> &str {
        "open-er-api"
    }
}
