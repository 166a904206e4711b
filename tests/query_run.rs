//! End-to-end query run against mocked metadata and rate services

use chrono::NaiveDate;
use config::{File, FileFormat};
use grants_retrieval::{export, report_from_file, GrantsService, Settings};
use serde_json::{json, Value};
use std::path::Path;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn grant(uid: &str, year: u32, amount: Value, currency: &str, institution: &str) -> Value {
    json!({
        "UID": uid,
        "static_data": {
            "summary": {
                "pub_info": {"pubyear": year},
                "names": {"count": 2, "name": [
                    {"role": "principal_investigator", "full_name": "Lead, Lee"},
                    {"role": "coinvestigator", "full_name": "Helper, Hal"}
                ]},
                "doctypes": {"doctype": "Grant"},
                "titles": {"title": {"type": "item", "content": format!("Project {}", uid)}}
            },
            "fullrecord_metadata": {
                "fund_ack": {"grants": {"grant": {
                    "grant_agency_names": [{"pref": "Y", "content": "Funder"}],
                    "grant_source": "Source",
                    "grant_data": {"grantDataItem": {
                        "principalInvestigators": {"principalInvestigatorInstitutions": {
                            "principalInvestigatorInstitution": {"pref": "Y", "content": institution}
                        }},
                        "totalAwardAmount": amount,
                        "currency": currency
                    }}
                }}}
            }
        }
    })
}

fn page(total: u64, records: Vec<Value>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "QueryResult": {"RecordsFound": total},
        "Data": {"Records": {"records": {"REC": records}}}
    }))
}

fn settings(wos: &MockServer, rates: &MockServer, dir: &Path) -> Settings {
    let json = json!({
        "api_key": "secret",
        "wos_base_url": format!("{}/api/wos", wos.uri()),
        "rates_url": format!("{}/v6/latest/USD", rates.uri()),
        "page_size": 2,
        "rate_cache": dir.join("currencies.csv"),
        "download_dir": dir.join("downloads"),
    });
    Settings::from_source(File::from_str(&json.to_string(), FileFormat::Json)).unwrap()
}

#[tokio::test]
async fn test_run_collects_exports_and_reports() {
    let wos = MockServer::start().await;
    let rates = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/wos"))
        .and(query_param("firstRecord", "1"))
        .respond_with(page(
            3,
            vec![
                grant("G1", 2020, json!(100), "EUR", "Uni A"),
                grant("G2", 2021, json!(50), "USD", "Uni B"),
            ],
        ))
        .expect(1)
        .mount(&wos)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/wos"))
        .and(query_param("firstRecord", "3"))
        .respond_with(page(3, vec![grant("G3", 2021, json!(10), "ZZZ", "Uni A")]))
        .expect(1)
        .mount(&wos)
        .await;
    Mock::given(method("GET"))
        .and(path("/v6/latest/USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "success",
            "rates": {"USD": 1, "EUR": 0.5}
        })))
        .expect(1)
        .mount(&rates)
        .await;

    let settings = settings(&wos, &rates, dir.path());
    let service = GrantsService::from_settings(&settings).unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();

    let outcome = service.run("TS=(\"soil\")", today).await.unwrap();

    let uts: Vec<&str> = outcome.rows.iter().map(|r| r.ut.as_str()).collect();
    assert_eq!(uts, vec!["G1", "G2", "G3"]);
    assert_eq!(outcome.rows[0].grant_amount_usd, Some(200.0));
    assert_eq!(outcome.rows[0].principal_investigator, "Lead, Lee");
    assert_eq!(outcome.rows[0].other_names, "Helper, Hal");
    assert_eq!(outcome.rows[2].grant_amount_usd, None);
    assert_eq!(outcome.unconverted, 1);

    assert_eq!(
        outcome.export_path,
        dir.path().join("downloads").join("TS=(soil) - 2024-07-01.csv")
    );
    assert_eq!(export::read_rows(&outcome.export_path).unwrap(), outcome.rows);

    let years: Vec<(&str, f64)> = outcome
        .report
        .funding_by_year
        .iter()
        .map(|b| (b.label.as_str(), b.value))
        .collect();
    assert_eq!(years, vec![("2020", 200.0), ("2021", 50.0)]);
    assert_eq!(outcome.report.top_institutions[0].full_label, "Uni A");

    assert_eq!(report_from_file(&outcome.export_path).unwrap(), outcome.report);
    assert!(dir.path().join("currencies.csv").exists());
}

#[tokio::test]
async fn test_failing_page_aborts_without_export() {
    let wos = MockServer::start().await;
    let rates = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(query_param("firstRecord", "1"))
        .respond_with(page(4, vec![
            grant("G1", 2020, json!(1), "USD", "Uni"),
            grant("G2", 2020, json!(1), "USD", "Uni"),
        ]))
        .mount(&wos)
        .await;
    Mock::given(method("GET"))
        .and(query_param("firstRecord", "3"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&wos)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "success",
            "rates": {"USD": 1}
        })))
        .mount(&rates)
        .await;

    let service = GrantsService::from_settings(&settings(&wos, &rates, dir.path())).unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();

    assert!(service.run("q", today).await.is_err());
    assert!(!dir.path().join("downloads").exists());
}

#[test]
fn test_service_requires_api_key() {
    let settings = Settings::from_source(File::from_str("{}", FileFormat::Json)).unwrap();
    assert!(GrantsService::from_settings(&settings).is_err());
}
