// Exchange-rate cache file
//
// Layout:
//   Updated,MM/DD/YYYY
//   <blank>
//   Currency,Rate VS USD
//   EUR,0.92
//   ...
use crate::types::*;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

const UPDATED_KEY: &str = "Updated";
const DATE_FORMAT: &str = "%m/%d/%Y";

#[derive(Debug, Serialize, Deserialize)]
struct RateRow {
    #[serde(rename = "Currency")]
    currency: String,
    #[serde(rename = "Rate VS USD")]
    rate: f64,
}

pub struct RateCache {
    path: PathBuf,
}

impl RateCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached table. `None` when no cache file exists yet.
    pub fn load(&self) -> Result<Option<RateTable>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut lines = content.lines();
        let updated = parse_updated(lines.next().unwrap_or_default())?;
        let table: Vec<&str> = lines.skip_while(|line| line.trim().is_empty()).collect();
        let table = table.join("\n");

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(table.as_bytes());

        let mut rates = Vec::new();
        for row in reader.deserialize::<RateRow>() {
            let row = row.map_err(|e| GrantsError::Cache(e.to_string()))?;
            rates.push((row.currency, row.rate));
        }

        debug!("Loaded {} cached rates from {}", rates.len(), self.path.display());

        Ok(Some(RateTable::new(updated, rates)))
    }

    /// Rewrite the whole cache file with `table`
    pub fn store(&self, table: &RateTable) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = fs::File::create(&self.path)?;
        write!(
            file,
            "{},{}\n\n",
            UPDATED_KEY,
            table.updated().format(DATE_FORMAT)
        )?;

        let mut writer = csv::Writer::from_writer(file);
        for (currency, rate) in table.iter() {
            writer
                .serialize(RateRow {
                    currency: currency.to_string(),
                    rate,
                })
                .map_err(|e| GrantsError::Cache(e.to_string()))?;
        }
        writer.flush()?;

        debug!("Stored {} rates in {}", table.len(), self.path.display());
        Ok(())
    }
}

fn parse_updated(line: &str) -> Result<NaiveDate> {
    let (key, value) = line
        .split_once(',')
        .ok_or_else(|| GrantsError::Cache(format!("Missing update header: {:?}", line)))?;

    if key.trim() != UPDATED_KEY {
        return Err(GrantsError::Cache(format!("Unexpected header key: {:?}", key)));
    }

    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|e| GrantsError::Cache(format!("Bad update date {:?}: {}", value, e)))
}
