//! Parser for the normalized JSON traffic format: a top-level array of
//! already-mostly-normalized request/response objects.
//!
//! Grounded in `_normalize_entry` in the reference implementation: `method`,
//! `path`, and `status` are required (a missing or unparseable one drops the
//! entry); everything else is read as-is, with one fallback — if no
//! `request_json` was supplied but `request_text` was, and no content type
//! is declared, sniff the text for a leading `{`/`[`.

use super::record::{Presence, QueryValue, TrafficRecord};
use super::util::{normalize_headers, sniff_json};
use serde_json::Value;
use std::collections::BTreeMap;

fn normalize_query(value: Option<&Value>) -> BTreeMap<String, QueryValue> {
    let Some(obj) = value.and_then(Value::as_object) else {
        return BTreeMap::new();
    };
    obj.iter()
        .map(|(k, v)| {
            let qv = match v {
                Value::Array(items) => QueryValue::Multi(items.iter().filter_map(|i| i.as_str().map(str::to_string)).collect()),
                Value::String(s) => QueryValue::Single(s.clone()),
                other => QueryValue::Single(other.to_string()),
            };
            (k.clone(), qv)
        })
        .collect()
}

fn normalize_entry(entry: &Value) -> Option<TrafficRecord> {
    let method = entry.get("method")?.as_str()?.to_ascii_uppercase();
    let path = crate::spec::normalize_path(entry.get("path")?.as_str()?);
    let status = entry.get("status")?.as_u64()? as u16;

    let response_json = match entry.get("response_json") {
        None => Presence::Absent,
        Some(Value::Null) => Presence::Null,
        Some(v) => Presence::Present(v.clone()),
    };

    let query = normalize_query(entry.get("query"));

    let headers = entry
        .get("headers")
        .and_then(Value::as_object)
        .map(|m| normalize_headers(m.iter().map(|(k, v)| (k.clone(), value_as_header(v)))))
        .unwrap_or_default();

    let request_content_type = entry.get("request_content_type").and_then(Value::as_str).map(str::to_string);
    let request_text = entry.get("request_text").and_then(Value::as_str).map(str::to_string);

    let mut request_json = match entry.get("request_json") {
        None => Presence::Absent,
        Some(Value::Null) => Presence::Null,
        Some(v) => Presence::Present(v.clone()),
    };

    if request_json.is_absent() && request_content_type.is_none() {
        if let Some(text) = &request_text {
            if let Some(sniffed) = sniff_json(text) {
                request_json = Presence::Present(sniffed);
            }
        }
    }

    Some(TrafficRecord {
        method,
        path,
        status: Some(status),
        response_json,
        query,
        headers,
        request_json,
        request_text,
        request_content_type,
    })
}

fn value_as_header(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub fn parse_json_list(value: &Value) -> anyhow::Result<Vec<TrafficRecord>> {
    let entries = value
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("expected a JSON array of traffic entries"))?;
    Ok(entries.iter().filter_map(normalize_entry).collect())
}
