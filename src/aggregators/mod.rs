// Paged collection of normalized grant rows
pub mod reports;

use crate::normalizers::normalize;
use crate::sources::wos::MAX_PAGE_SIZE;
use crate::types::*;
use std::sync::Arc;
use tracing::{debug, info};

/// Page arithmetic for a query with `total` matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePlan {
    total: u64,
    page_size: u32,
}

impl PagePlan {
    pub fn new(total: u64, page_size: u32) -> Self {
        Self { total, page_size }
    }

    /// ceil(total / page_size)
    pub fn pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.page_size))
    }

    /// 1-based offset of the first record on page `index` (0-based)
    pub fn first_record(&self, index: u64) -> u64 {
        index * u64::from(self.page_size) + 1
    }

    /// Offsets of every page after the first
    pub fn remaining_offsets(&self) -> impl Iterator<Item = u64> + '_ {
        (1..self.pages()).map(|index| self.first_record(index))
    }
}

/// Pages through a metadata source and normalizes every record
pub struct GrantCollector {
    source: Arc<dyn MetadataSource>,
    page_size: u32,
}

impl GrantCollector {
    pub fn new(source: Arc<dyn MetadataSource>, page_size: u32) -> Result<Self> {
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(GrantsError::Config(format!(
                "page size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, page_size
            )));
        }
        Ok(Self { source, page_size })
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Collect every row matching `query`, one page at a time.
    ///
    /// Any failed fetch or unnormalizable record aborts the whole run.
    pub async fn collect(&self, query: &str, rates: &RateTable) -> Result<Vec<NormalizedRow>> {
        let first = self.source.fetch_page(query, self.page_size, 1).await?;
        let plan = PagePlan::new(first.records_found, self.page_size);
        let pages = plan.pages();

        info!(
            "{} matches for {:?}, {} requests to {} required",
            first.records_found,
            query,
            pages,
            self.source.name()
        );

        let mut rows = Vec::new();
        append_page(&mut rows, &first, rates)?;

        for (done, first_record) in plan.remaining_offsets().enumerate() {
            let page = self.source.fetch_page(query, self.page_size, first_record).await?;
            append_page(&mut rows, &page, rates)?;
            info!("Request {} of {} complete", done + 2, pages);
        }

        Ok(rows)
    }
}

fn append_page(rows: &mut Vec<NormalizedRow>, page: &SearchPage, rates: &RateTable) -> Result<()> {
    for record in &page.records {
        rows.push(normalize(record, rates)?);
    }
    debug!("Accumulated {} rows", rows.len());
    Ok(())
}
