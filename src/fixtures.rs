// Raw record builders shared by unit tests
use serde_json::{json, Value};

pub fn grant_record(uid: &str, year: u32, amount: Value, currency: &str) -> Value {
    json!({
        "UID": uid,
        "static_data": {
            "summary": {
                "pub_info": {"pubyear": year},
                "names": {
                    "count": 1,
                    "name": {"role": "principal_investigator", "full_name": "Smith, Ann"}
                },
                "doctypes": {"doctype": "Grant"},
                "titles": {"title": {"type": "item", "content": format!("Title of {}", uid)}}
            },
            "item": {"grant_agencies": {"grant_agency": {"country": "US"}}},
            "fullrecord_metadata": {
                "related_records": {"record": {"uid": format!("WOS:{}", uid)}},
                "fund_ack": {"grants": {"grant": {
                    "grant_agency_names": {"content": "NIH"},
                    "grant_source": "NIH RePORTER",
                    "grant_data": {"grantDataItem": {
                        "totalAwardAmount": amount,
                        "currency": currency
                    }}
                }}}
            }
        }
    })
}

pub fn search_envelope(records_found: u64, records: Vec<Value>) -> Value {
    json!({
        "QueryResult": {"RecordsFound": records_found},
        "Data": {"Records": {"records": {"REC": records}}}
    })
}
