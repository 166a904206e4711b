//! Raw grant record as returned by the Web of Science Grants Index.
//!
//! Upstream collapses one-element lists into bare objects, so every
//! repeatable sub-structure is an [`OneOrMany`]. Optional sub-structures are
//! `Option`s; only the paths the normalizer reads are modelled.

use serde::Deserialize;

use crate::types::{GrantsError, Lenient, OneOrMany, Result, Scalar};

#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "UID")]
    pub uid: String,
    pub static_data: StaticData,
}

impl RawRecord {
    /// Decode one entry of `Data.Records.records.REC`
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let uid = value
            .get("UID")
            .and_then(|v| v.as_str())
            .unwrap_or("<unknown>")
            .to_string();

        serde_json::from_value(value).map_err(|e| GrantsError::SchemaShape {
            uid,
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaticData {
    pub summary: Summary,
    #[serde(default)]
    pub item: Item,
    pub fullrecord_metadata: FullRecordMetadata,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Summary {
    pub pub_info: PubInfo,
    pub names: Names,
    pub doctypes: DocTypes,
    pub titles: Titles,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PubInfo {
    pub pubyear: Scalar,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Names {
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub name: Option<OneOrMany<Name>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Name {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocTypes {
    pub doctype: OneOrMany<Scalar>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Titles {
    pub title: OneOrMany<Title>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Title {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub content: Scalar,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub financial_year: Option<Scalar>,
    #[serde(default)]
    pub grant_agencies: Option<GrantAgencies>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrantAgencies {
    pub grant_agency: OneOrMany<GrantAgency>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrantAgency {
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FullRecordMetadata {
    #[serde(default)]
    pub keywords: Option<Keywords>,
    #[serde(default)]
    pub abstracts: Option<Abstracts>,
    #[serde(default)]
    pub related_records: Option<RelatedRecords>,
    pub fund_ack: FundAck,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Keywords {
    #[serde(default)]
    pub keyword: Option<OneOrMany<Keyword>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Keyword {
    #[serde(default)]
    pub content: Option<Scalar>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Abstracts {
    #[serde(rename = "abstract", default)]
    pub entries: Option<OneOrMany<AbstractEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AbstractEntry {
    pub abstract_text: AbstractText,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AbstractText {
    pub p: OneOrMany<Scalar>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelatedRecords {
    #[serde(default)]
    pub record: Option<OneOrMany<RelatedRecord>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelatedRecord {
    pub uid: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FundAck {
    pub grants: Grants,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Grants {
    pub grant: OneOrMany<Grant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Grant {
    #[serde(default)]
    pub grant_agency_names: Option<OneOrMany<AgencyName>>,
    #[serde(default)]
    pub grant_source: Option<Scalar>,
    pub grant_data: GrantData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgencyName {
    #[serde(default)]
    pub pref: Option<String>,
    pub content: Scalar,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrantData {
    #[serde(rename = "grantDataItem")]
    pub item: GrantDataItem,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrantDataItem {
    #[serde(rename = "principalInvestigators", default)]
    pub principal_investigators: Option<Lenient<PrincipalInvestigators>>,
    #[serde(rename = "totalAwardAmount", default)]
    pub total_award_amount: Option<Scalar>,
    #[serde(default)]
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrincipalInvestigators {
    #[serde(rename = "principalInvestigatorInstitutions", default)]
    pub institutions: Option<OneOrMany<InstitutionGroup>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstitutionGroup {
    #[serde(rename = "principalInvestigatorInstitution")]
    pub entries: OneOrMany<Institution>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Institution {
    #[serde(default)]
    pub pref: Option<String>,
    pub content: Scalar,
}
