use anyhow::Context;
use chrono::Local;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use grants_retrieval::{
    cache::RateCache, report_from_file, ExchangeRateClient, GrantsService, RateProvider, Report,
    Settings,
};

/// `validate` - print how many records a query matches
pub async fn validate(settings: &Settings, query: &str) -> anyhow::Result<()> {
    let service = GrantsService::from_settings(settings)?;
    let found = service.validate(query).await?;
    println!("Records found: {}", found);
    Ok(())
}

/// `run` - collect, export and report one query
pub async fn run(settings: &Settings, query: &str, report_path: Option<&Path>) -> anyhow::Result<()> {
    let service = GrantsService::from_settings(settings)?;
    let outcome = service
        .run(query, Local::now().date_naive())
        .await
        .with_context(|| format!("Query {:?} failed", query))?;

    println!(
        "Exported {} grants to {}",
        outcome.rows.len(),
        outcome.export_path.display()
    );
    if outcome.unconverted > 0 {
        println!(
            "{} grants could not be converted to USD (unknown currency or amount)",
            outcome.unconverted
        );
    }

    print_report(&outcome.report, report_path)
}

/// `report` - rebuild the series from an exported file
pub fn report(file: &Path) -> anyhow::Result<()> {
    let report = report_from_file(file)
        .with_context(|| format!("Cannot build report from {}", file.display()))?;
    print_report(&report, None)
}

/// `rates` - show the USD rate table
pub async fn rates(settings: &Settings, refresh: bool) -> anyhow::Result<()> {
    let provider = RateProvider::new(
        RateCache::new(&settings.rate_cache),
        Arc::new(ExchangeRateClient::new(&settings.rates_url)?),
    );
    let today = Local::now().date_naive();

    let table = if refresh {
        provider.refresh(today).await?
    } else {
        provider.usd_rates(today).await?
    };

    println!("Updated,{}", table.updated().format("%m/%d/%Y"));
    for (currency, rate) in table.iter() {
        println!("{},{}", currency, rate);
    }
    Ok(())
}

fn print_report(report: &Report, path: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    match path {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("Cannot write report to {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
