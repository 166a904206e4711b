pub mod types;
pub mod record;
pub mod sources {
    pub mod exchange_rates;
    pub mod wos;
}
pub mod normalizers;
pub mod aggregators;
pub mod cache;
pub mod rates;
pub mod export;
pub mod settings;

#[cfg(test)]
mod fixtures;

pub use types::*;
pub use aggregators::reports::Report;
pub use aggregators::{GrantCollector, PagePlan};
pub use normalizers::{convert_to_usd, normalize};
pub use rates::RateProvider;
pub use settings::Settings;
pub use sources::exchange_rates::ExchangeRateClient;
pub use sources::wos::WosClient;

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of one query run
#[derive(Debug, Clone)]
pub struct QueryRun {
    pub rows: Vec<NormalizedRow>,
    pub export_path: PathBuf,
    pub report: Report,
    /// Rows with an amount that has no USD value
    pub unconverted: usize,
}

/// Query validation, collection, export and reporting wired to one set of sources
pub struct GrantsService {
    wos: Arc<WosClient>,
    rates: RateProvider,
    collector: GrantCollector,
    download_dir: PathBuf,
}

impl GrantsService {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let wos = Arc::new(WosClient::new(
            settings.require_api_key()?,
            &settings.wos_base_url,
        )?);
        let rate_source = Arc::new(ExchangeRateClient::new(&settings.rates_url)?);

        Ok(Self {
            collector: GrantCollector::new(wos.clone(), settings.page_size)?,
            rates: RateProvider::new(cache::RateCache::new(&settings.rate_cache), rate_source),
            wos,
            download_dir: settings.download_dir.clone(),
        })
    }

    /// Number of records a query matches
    pub async fn validate(&self, query: &str) -> Result<u64> {
        let found = self.wos.validate_query(query).await?;
        info!("Records found for {:?}: {}", query, found);
        Ok(found)
    }

    /// Collect every record for `query`, export it and build the report series
    pub async fn run(&self, query: &str, today: NaiveDate) -> Result<QueryRun> {
        let rates = self.rates.usd_rates(today).await?;
        let rows = self.collector.collect(query, &rates).await?;

        let unconverted = rows
            .iter()
            .filter(|row| !row.grant_amount.is_empty() && row.grant_amount_usd.is_none())
            .count();
        if unconverted > 0 {
            warn!(
                "{} of {} grants have amounts with no USD value; they count as zero in the report",
                unconverted,
                rows.len()
            );
        }

        let export_path = self
            .download_dir
            .join(export::export_file_name(query, today));
        export::write_rows(&export_path, &rows)?;

        Ok(QueryRun {
            report: Report::build(&rows),
            rows,
            export_path,
            unconverted,
        })
    }
}

/// Rebuild the report series from a previously exported file
pub fn report_from_file(path: &Path) -> Result<Report> {
    let rows = export::read_rows(path)?;
    Ok(Report::build(&rows))
}
