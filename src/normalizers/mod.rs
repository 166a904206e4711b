// Flattening of nested grant records into fixed-schema rows
pub mod currency;

pub use currency::convert_to_usd;

use crate::record::*;
use crate::types::*;
use tracing::{debug, warn};

const PRINCIPAL_INVESTIGATOR: &str = "principal_investigator";
const ITEM_TITLE: &str = "item";
const SEPARATOR: &str = ", ";
const ABSTRACT_SEPARATOR: &str = "\n\n";

/// Grant description, one string per abstract entry
#[derive(Debug, Clone, PartialEq)]
pub enum Abstract {
    Absent,
    Single(String),
    Multiple(Vec<String>),
}

impl Abstract {
    /// Collapse to the single text cell of the row
    pub fn into_text(self) -> String {
        match self {
            Abstract::Absent => String::new(),
            Abstract::Single(text) => text,
            Abstract::Multiple(texts) => texts.join(ABSTRACT_SEPARATOR),
        }
    }
}

/// Normalize one raw record into a flat row
pub fn normalize(record: &RawRecord, rates: &RateTable) -> Result<NormalizedRow> {
    let summary = &record.static_data.summary;
    let item = &record.static_data.item;
    let metadata = &record.static_data.fullrecord_metadata;

    let grant = match &metadata.fund_ack.grants.grant {
        OneOrMany::One(grant) => grant,
        OneOrMany::Many(_) => {
            return Err(GrantsError::UnsupportedShape {
                uid: record.uid.clone(),
                field: "fund_ack.grants.grant",
            })
        }
    };
    let grant_item = &grant.grant_data.item;

    let (principal_investigator, other_names) = participant_names(&summary.names);
    let (related_records, related_records_count) = related_records(metadata.related_records.as_ref());
    let (grant_amount, amount) = award_amount(&record.uid, grant_item.total_award_amount.as_ref());
    let currency = grant_item.currency.clone();
    let grant_amount_usd = convert_to_usd(amount, &currency, rates);

    debug!("Normalized record {}", record.uid);

    Ok(NormalizedRow {
        ut: record.uid.clone(),
        publication_year: summary.pub_info.pubyear.to_string(),
        financial_year: financial_year(item),
        principal_investigator,
        other_names,
        document_type: join(summary.doctypes.doctype.iter().map(Scalar::to_string)),
        document_title: document_title(&record.uid, &summary.titles)?,
        keywords: keywords(metadata.keywords.as_ref()),
        grant_description: grant_abstract(metadata.abstracts.as_ref()).into_text(),
        related_records,
        related_records_count,
        funding_agency: funding_agency(grant.grant_agency_names.as_ref()),
        funding_country: funding_country(item),
        grant_source: grant
            .grant_source
            .as_ref()
            .map(Scalar::to_string)
            .unwrap_or_default(),
        pi_institution: pi_institution(grant_item),
        grant_amount,
        currency,
        grant_amount_usd,
    })
}

/// Award amount text as sent, plus its numeric value for conversion
pub fn award_amount(uid: &str, amount: Option<&Scalar>) -> (String, Option<f64>) {
    let text = amount.map(Scalar::to_string).unwrap_or_default();
    let value = amount.and_then(Scalar::as_f64);
    if value.is_none() && !text.trim().is_empty() {
        warn!("Record {}: award amount {:?} is not a number", uid, text);
    }
    (text, value)
}

/// Split participants into the principal investigator and everybody else
pub fn participant_names(names: &Names) -> (String, String) {
    let entries = match (&names.name, names.count) {
        (_, Some(0)) | (None, _) => return (String::new(), String::new()),
        (Some(entries), _) => entries,
    };

    match entries {
        OneOrMany::One(name) if name.role == PRINCIPAL_INVESTIGATOR => {
            (name.full_name.clone(), String::new())
        }
        OneOrMany::One(name) => (String::new(), name.full_name.clone()),
        OneOrMany::Many(list) => {
            let mut principal = String::new();
            let mut others = Vec::new();
            for name in list {
                if name.role == PRINCIPAL_INVESTIGATOR {
                    principal = name.full_name.clone();
                } else {
                    others.push(name.full_name.as_str());
                }
            }
            (principal, others.join(SEPARATOR))
        }
    }
}

/// Preferred funder names. A lone funder object is taken as is, flag or not.
pub fn funding_agency(names: Option<&OneOrMany<AgencyName>>) -> String {
    match names {
        None => String::new(),
        Some(OneOrMany::One(name)) => name.content.to_string(),
        Some(OneOrMany::Many(list)) => join_unique(
            list.iter()
                .filter(|name| name.pref.as_deref() == Some(PREFERRED))
                .map(|name| name.content.to_string()),
        ),
    }
}

/// Distinct funder country codes
pub fn funding_country(item: &Item) -> String {
    match item.grant_agencies.as_ref().map(|a| &a.grant_agency) {
        None => String::new(),
        Some(OneOrMany::One(agency)) => agency.country.clone(),
        Some(OneOrMany::Many(list)) => {
            let countries: std::collections::BTreeSet<&str> = list
                .iter()
                .map(|agency| agency.country.as_str())
                .filter(|code| !code.is_empty())
                .collect();
            join(countries.into_iter().map(str::to_string))
        }
    }
}

/// Preferred institutions of the principal investigator
pub fn pi_institution(grant_item: &GrantDataItem) -> String {
    let groups = match &grant_item.principal_investigators {
        Some(Lenient::Parsed(investigators)) => match &investigators.institutions {
            Some(groups) => groups,
            None => return String::new(),
        },
        Some(Lenient::Unexpected(value)) => {
            debug!("Ignoring principalInvestigators of unexpected shape: {}", value);
            return String::new();
        }
        None => return String::new(),
    };

    join_unique(
        groups
            .iter()
            .flat_map(|group| group.entries.iter())
            .filter(|institution| institution.pref.as_deref() == Some(PREFERRED))
            .map(|institution| institution.content.to_string()),
    )
}

pub fn financial_year(item: &Item) -> String {
    item.financial_year
        .as_ref()
        .map(Scalar::to_string)
        .unwrap_or_default()
}

/// Cross-referenced document ids and their count
pub fn related_records(related: Option<&RelatedRecords>) -> (String, usize) {
    match related.and_then(|r| r.record.as_ref()) {
        None => (String::new(), 0),
        Some(OneOrMany::One(record)) => (record.uid.clone(), 1),
        Some(OneOrMany::Many(list)) => (
            join(list.iter().map(|record| record.uid.clone())),
            list.len(),
        ),
    }
}

/// Canonical title: the entry typed `item` when several titles are present
pub fn document_title(uid: &str, titles: &Titles) -> Result<String> {
    match &titles.title {
        OneOrMany::One(title) => Ok(title.content.to_string()),
        OneOrMany::Many(list) => list
            .iter()
            .find(|title| title.kind == ITEM_TITLE)
            .map(|title| title.content.to_string())
            .ok_or_else(|| GrantsError::SchemaShape {
                uid: uid.to_string(),
                reason: format!("no title of type {:?}", ITEM_TITLE),
            }),
    }
}

pub fn keywords(keywords: Option<&Keywords>) -> String {
    match keywords.and_then(|k| k.keyword.as_ref()) {
        None => String::new(),
        Some(OneOrMany::One(keyword)) => keyword
            .content
            .as_ref()
            .map(Scalar::to_string)
            .unwrap_or_default(),
        Some(OneOrMany::Many(list)) => join(
            list.iter()
                .filter_map(|keyword| keyword.content.as_ref())
                .map(Scalar::to_string),
        ),
    }
}

pub fn grant_abstract(abstracts: Option<&Abstracts>) -> Abstract {
    match abstracts.and_then(|a| a.entries.as_ref()) {
        None => Abstract::Absent,
        Some(OneOrMany::One(entry)) => Abstract::Single(paragraphs(entry)),
        Some(OneOrMany::Many(list)) => Abstract::Multiple(list.iter().map(paragraphs).collect()),
    }
}

fn paragraphs(entry: &AbstractEntry) -> String {
    join(entry.abstract_text.p.iter().map(Scalar::to_string))
}

fn join(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join(SEPARATOR)
}

/// Join, dropping repeats but keeping first-seen order
fn join_unique(items: impl Iterator<Item = String>) -> String {
    let mut seen: Vec<String> = Vec::new();
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen.join(SEPARATOR)
}
