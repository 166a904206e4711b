//! Aggregate series behind the grant charts.
//!
//! Amounts that could not be expressed in USD count as zero. Rankings keep
//! the first-seen order between equal values.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::types::NormalizedRow;

/// Entries kept in each ranking
pub const TOP_N: usize = 50;

const UNAVAILABLE: &str = "(name unavailable)";
const LABEL_CHARS: usize = 30;
const TITLE_CHARS: usize = 120;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    /// Axis label, shortened for display
    pub label: String,
    pub full_label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearAverage {
    pub year: String,
    pub total: f64,
    pub grants: usize,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedRecordsBar {
    pub ut: String,
    pub title: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub funding_by_year: Vec<Bar>,
    pub top_institutions: Vec<Bar>,
    pub top_funders: Vec<Bar>,
    pub top_countries: Vec<Bar>,
    pub average_by_year: Vec<YearAverage>,
    pub top_by_related_records: Vec<RelatedRecordsBar>,
}

impl Report {
    pub fn build(rows: &[NormalizedRow]) -> Self {
        Self {
            funding_by_year: funding_by_year(rows),
            top_institutions: top_by_funding(rows, |r| &r.pi_institution, Some(LABEL_CHARS)),
            top_funders: top_by_funding(rows, |r| &r.funding_agency, Some(LABEL_CHARS)),
            top_countries: top_by_funding(rows, |r| &r.funding_country, None),
            average_by_year: average_by_year(rows),
            top_by_related_records: top_by_related_records(rows),
        }
    }
}

fn usd(row: &NormalizedRow) -> f64 {
    row.grant_amount_usd.unwrap_or(0.0)
}

fn by_year(rows: &[NormalizedRow]) -> BTreeMap<&str, (f64, usize)> {
    let mut years: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for row in rows {
        let entry = years.entry(row.publication_year.as_str()).or_default();
        entry.0 += usd(row);
        entry.1 += 1;
    }
    years
}

/// Total USD funding per publication year, oldest first
pub fn funding_by_year(rows: &[NormalizedRow]) -> Vec<Bar> {
    by_year(rows)
        .into_iter()
        .map(|(year, (total, _))| Bar {
            label: year.to_string(),
            full_label: year.to_string(),
            value: total,
        })
        .collect()
}

/// Mean grant size per publication year, oldest first
pub fn average_by_year(rows: &[NormalizedRow]) -> Vec<YearAverage> {
    by_year(rows)
        .into_iter()
        .map(|(year, (total, grants))| YearAverage {
            year: year.to_string(),
            total,
            grants,
            average: total / grants as f64,
        })
        .collect()
}

/// Largest USD totals grouped by `key`, at most [`TOP_N`]
pub fn top_by_funding<'a, F>(rows: &'a [NormalizedRow], key: F, shorten: Option<usize>) -> Vec<Bar>
where
    F: Fn(&'a NormalizedRow) -> &'a String,
{
    let mut groups: Vec<(&str, f64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        let name = match key(row).as_str() {
            "" => UNAVAILABLE,
            name => name,
        };
        match index.get(name) {
            Some(&at) => groups[at].1 += usd(row),
            None => {
                index.insert(name, groups.len());
                groups.push((name, usd(row)));
            }
        }
    }

    groups.sort_by(|a, b| b.1.total_cmp(&a.1));
    groups
        .into_iter()
        .take(TOP_N)
        .map(|(name, total)| Bar {
            label: match shorten {
                Some(limit) => truncate(name, limit),
                None => name.to_string(),
            },
            full_label: name.to_string(),
            value: total,
        })
        .collect()
}

/// Grants with the most cross-referenced documents, at most [`TOP_N`]
pub fn top_by_related_records(rows: &[NormalizedRow]) -> Vec<RelatedRecordsBar> {
    let mut ranked: Vec<&NormalizedRow> = rows.iter().collect();
    ranked.sort_by(|a, b| b.related_records_count.cmp(&a.related_records_count));
    ranked
        .into_iter()
        .take(TOP_N)
        .map(|row| RelatedRecordsBar {
            ut: row.ut.clone(),
            title: truncate(&row.document_title, TITLE_CHARS),
            count: row.related_records_count,
        })
        .collect()
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        format!("{}...", text.chars().take(limit).collect::<String>())
    } else {
        text.to_string()
    }
}
