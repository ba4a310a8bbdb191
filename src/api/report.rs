//! Purpose: Serialize parse outcomes into stable JSON envelopes.
//! Exports: `scan_json`, `failure_json`, `record_json`, `candidates_json`.
//! Role: Shared contract between the CLI, batch output, and embedding callers.
//! Invariants: Success envelopes carry `"ok": true`; failures carry `"ok": false`.
//! Invariants: Missing record fields serialize as the sentinel, never as null.

use serde_json::{Map, Value, json};

use crate::core::parse::{ParseFailure, Scan};
use crate::core::record::{Candidate, IdentityRecord};

pub fn record_json(record: &IdentityRecord) -> Value {
    let mut map = Map::new();
    map.insert(
        "document_number".to_string(),
        json!(record.document_number()),
    );
    map.insert("surname".to_string(), json!(record.surname()));
    map.insert("given_name".to_string(), json!(record.given_name()));
    map.insert("sex_code".to_string(), json!(record.sex_code_str()));
    map.insert("birth_date".to_string(), json!(record.birth_date()));
    Value::Object(map)
}

pub fn candidates_json(candidates: &[Candidate]) -> Value {
    let items = candidates
        .iter()
        .map(|candidate| {
            json!({
                "value": candidate.value,
                "provenance": candidate.provenance.label(),
                "selected": candidate.selected,
            })
        })
        .collect::<Vec<_>>();
    Value::Array(items)
}

pub fn scan_json(scan: &Scan) -> Value {
    let mut map = Map::new();
    map.insert("ok".to_string(), json!(true));
    map.insert("scheme".to_string(), json!(scan.scheme.label()));
    map.insert("record".to_string(), record_json(&scan.record));
    map.insert(
        "birth_date_iso".to_string(),
        json!(scan.record.birth_date_iso()),
    );
    map.insert("candidates".to_string(), candidates_json(&scan.candidates));
    Value::Object(map)
}

pub fn failure_json(failure: &ParseFailure) -> Value {
    let kind = failure.kind();
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(kind.label()));
    inner.insert("message".to_string(), json!(kind.message()));
    inner.insert("hint".to_string(), json!(kind.hint()));
    inner.insert("excerpt".to_string(), json!(failure.excerpt()));
    inner.insert("truncated".to_string(), json!(failure.truncated()));
    if let Some(offending) = failure.offending() {
        inner.insert("offending".to_string(), json!(offending));
    }
    if let Some(scheme) = failure.scheme() {
        inner.insert("scheme".to_string(), json!(scheme.label()));
    }
    inner.insert(
        "candidates".to_string(),
        candidates_json(failure.candidates()),
    );

    let mut outer = Map::new();
    outer.insert("ok".to_string(), json!(false));
    outer.insert("failure".to_string(), Value::Object(inner));
    Value::Object(outer)
}
