use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::record::RawRecord;

/// Reference currency every amount is normalized into
pub const REFERENCE_CURRENCY: &str = "USD";

/// Marker used upstream to flag the canonical entry among alternates
pub const PREFERRED: &str = "Y";

/// A sub-structure that is a single object when it has one entry and a list otherwise.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    /// Number of entries regardless of shape
    pub fn len(&self) -> usize {
        match self {
            OneOrMany::Many(items) => items.len(),
            OneOrMany::One(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries in source order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            OneOrMany::Many(items) => items.iter(),
            OneOrMany::One(item) => std::slice::from_ref(item).iter(),
        }
    }
}

/// Scalar leaf value; upstream sends the same field as a string or a number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    /// Finite numeric view. The empty string is the "no value" sentinel.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Scalar::Int(n) => Some(*n as f64),
            Scalar::Float(n) => Some(*n),
            Scalar::Text(s) => s.trim().parse().ok(),
            Scalar::Bool(_) => None,
        };
        value.filter(|n: &f64| n.is_finite())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Int(n) => write!(f, "{}", n),
            Scalar::Float(n) => write!(f, "{}", n),
            Scalar::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Either the expected structure or whatever arrived instead.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Lenient<T> {
    Parsed(T),
    Unexpected(serde_json::Value),
}

/// Column headers of the tabular export, in row field order
pub const COLUMNS: [&str; 18] = [
    "UT",
    "Publication Year",
    "Financial Year",
    "Principal Investigator",
    "Other Names",
    "Document Type",
    "Document Title",
    "Keywords",
    "Grant Description",
    "Related WoS Records",
    "Related WoS Records Count",
    "Funding Agency",
    "Funding Country",
    "Grant Source",
    "Principal Investigator Institution",
    "Grant Amount",
    "Currency",
    "Grant Amount, USD",
];

/// Flat, fixed-schema row produced from one raw grant record.
///
/// Every field is always present; absent upstream values become the empty
/// string, a zero count, or an empty amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow {
    #[serde(rename = "UT")]
    pub ut: String,
    #[serde(rename = "Publication Year")]
    pub publication_year: String,
    #[serde(rename = "Financial Year")]
    pub financial_year: String,
    #[serde(rename = "Principal Investigator")]
    pub principal_investigator: String,
    #[serde(rename = "Other Names")]
    pub other_names: String,
    #[serde(rename = "Document Type")]
    pub document_type: String,
    #[serde(rename = "Document Title")]
    pub document_title: String,
    #[serde(rename = "Keywords")]
    pub keywords: String,
    #[serde(rename = "Grant Description")]
    pub grant_description: String,
    #[serde(rename = "Related WoS Records")]
    pub related_records: String,
    #[serde(rename = "Related WoS Records Count")]
    pub related_records_count: usize,
    #[serde(rename = "Funding Agency")]
    pub funding_agency: String,
    #[serde(rename = "Funding Country")]
    pub funding_country: String,
    #[serde(rename = "Grant Source")]
    pub grant_source: String,
    #[serde(rename = "Principal Investigator Institution")]
    pub pi_institution: String,
    /// Award amount as sent upstream
    #[serde(rename = "Grant Amount")]
    pub grant_amount: String,
    #[serde(rename = "Currency")]
    pub currency: String,
    #[serde(rename = "Grant Amount, USD")]
    pub grant_amount_usd: Option<f64>,
}

/// Units of each currency per one USD, stamped with the day it was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    updated: NaiveDate,
    rates: BTreeMap<String, f64>,
}

impl RateTable {
    pub fn new(updated: NaiveDate, rates: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self {
            updated,
            rates: rates
                .into_iter()
                .map(|(code, rate)| (code.to_uppercase(), rate))
                .collect(),
        }
    }

    pub fn get(&self, currency: &str) -> Option<f64> {
        self.rates.get(currency).copied()
    }

    pub fn updated(&self) -> NaiveDate {
        self.updated
    }

    /// Rates are refreshed at most once per day
    pub fn is_fresh(&self, today: NaiveDate) -> bool {
        today - self.updated < Duration::days(1)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.rates.iter().map(|(code, rate)| (code.as_str(), *rate))
    }
}

/// One page of search results
#[derive(Debug, Clone)]
pub struct SearchPage {
    /// Total matches for the query, not just this page
    pub records_found: u64,
    pub records: Vec<RawRecord>,
}

/// Error types for grant retrieval
#[derive(Debug, thiserror::Error)]
pub enum GrantsError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Record {uid}: {reason}")]
    SchemaShape { uid: String, reason: String },

    #[error("Record {uid}: unsupported shape for {field}")]
    UnsupportedShape { uid: String, field: &'static str },

    #[error("Rate cache error: {0}")]
    Cache(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for GrantsError {
    fn from(e: csv::Error) -> Self {
        GrantsError::Export(e.to_string())
    }
}

/// Result type for grant retrieval operations
pub type Result<T> = std::result::Result<T, GrantsError>;

/// Paginated search endpoint for raw grant records
#[async_trait::async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetch `count` records starting at the 1-based `first_record`
    async fn fetch_page(&self, query: &str, count: u32, first_record: u64) -> Result<SearchPage>;

    /// Source name
    fn name(&self) -> &str;
}

/// Upstream exchange-rate feed quoted against the reference currency
#[async_trait::async_trait]
pub trait RateSource: Send + Sync {
    async fn latest_rates(&self) -> Result<BTreeMap<String, f64>>;

    fn name(&self) -> &str;
}
