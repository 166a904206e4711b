use crate::record::RawRecord;
use crate::types::*;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::debug;

/// Grants Index database identifier
const DATABASE_ID: &str = "GRANTS";

/// Largest page the search endpoint serves
pub const MAX_PAGE_SIZE: u32 = 100;

/// Web of Science Expanded API client, restricted to the Grants Index
pub struct WosClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WosClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://wos-api.clarivate.com/api/wos";

    pub fn new(api_key: impl Into<String>, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GrantsError::ApiError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    async fn search(&self, query: &str, count: u32, first_record: u64) -> Result<SearchResponse> {
        let request_start = Instant::now();

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("databaseId", DATABASE_ID.to_string()),
                ("usrQuery", query.to_string()),
                ("count", count.to_string()),
                ("firstRecord", first_record.to_string()),
            ])
            .header("X-ApiKey", &self.api_key)
            .send()
            .await
            .map_err(|e| GrantsError::ApiError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GrantsError::ApiError(format!(
                "Web of Science API error ({}): {}",
                status, text
            )));
        }

        let body = response
            .json::<SearchResponse>()
            .await
            .map_err(|e| GrantsError::InvalidResponse(e.to_string()))?;

        debug!(
            "Search page at record {} answered in {}ms",
            first_record,
            request_start.elapsed().as_millis()
        );

        Ok(body)
    }

    /// Number of grant records the query matches, without fetching any
    pub async fn validate_query(&self, query: &str) -> Result<u64> {
        let response = self.search(query, 0, 1).await?;
        Ok(response.query_result.records_found)
    }

    /// Fetch one page of raw records
    pub async fn fetch_page(&self, query: &str, count: u32, first_record: u64) -> Result<SearchPage> {
        let response = self.search(query, count, first_record).await?;
        let records_found = response.query_result.records_found;

        let records = response
            .into_records()
            .into_iter()
            .map(RawRecord::from_value)
            .collect::<Result<Vec<_>>>()?;

        Ok(SearchPage {
            records_found,
            records,
        })
    }

    pub fn name(&self) -> &str {
        "wos"
    }
}

// Response types for the search endpoint
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "QueryResult")]
    query_result: QueryResult,
    #[serde(rename = "Data", default)]
    data: Option<SearchData>,
}

impl SearchResponse {
    fn into_records(self) -> Vec<serde_json::Value> {
        match self.data.map(|d| d.records.records) {
            Some(RecordList::Populated { rec: OneOrMany::Many(records) }) => records,
            Some(RecordList::Populated { rec: OneOrMany::One(record) }) => vec![record],
            Some(RecordList::Empty(_)) | None => Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(rename = "RecordsFound")]
    records_found: u64,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    #[serde(rename = "Records")]
    records: RecordsEnvelope,
}

#[derive(Debug, Deserialize)]
struct RecordsEnvelope {
    records: RecordList,
}

/// An empty result set arrives as `"records": ""`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordList {
    Populated {
        #[serde(rename = "REC")]
        rec: OneOrMany<serde_json::Value>,
    },
    Empty(String),
}

#[async_trait::async_trait]
impl MetadataSource for WosClient {
    async fn fetch_page(&self, query: &str, count: u32, first_record: u64) -> Result<SearchPage> {
        WosClient::fetch_page(self, query, count, first_record).await
    }

    fn name(&self) -> &str {
        "wos"
    }
}
