//! HAR 1.2 traffic parser.
//!
//! Grounded in `_parse_har` in the reference implementation: walks
//! `log.entries[].request`/`.response`, base64-decodes a `content.text` when
//! `content.encoding == "base64"`, and only treats a response body as JSON
//! when its MIME type contains "json". Request bodies go through the same
//! JSON/text split every other format uses, keyed off `postData.mimeType`
//! (falling back to the `Content-Type` request header).
//!
//! Entries missing a method or a status are dropped silently, matching the
//! reference's `if method and status is not None`.
//!
//! Query parameters come solely from the request URL (`_parse_query(url)`
//! in the reference); `request.queryString` is never consulted, so a
//! parameter present only there is treated as absent.

use super::record::{Presence, TrafficRecord};
use super::util::{split_body_json_text, sniff_json};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;
use std::collections::BTreeMap;

fn headers_from_har(list: &[Value]) -> BTreeMap<String, String> {
    list.iter()
        .filter_map(|h| {
            let name = h.get("name")?.as_str()?.trim().to_ascii_lowercase();
            if name.is_empty() {
                return None;
            }
            let value = h.get("value").and_then(Value::as_str).unwrap_or("").to_string();
            Some((name, value))
        })
        .collect()
}

/// `request.postData`: JSON-decode `text` when `mimeType` (or the fallback
/// request content type) names JSON; otherwise sniff a leading `{`/`[` only
/// when no content type at all is known.
fn parse_request_body(post_data: Option<&Value>, fallback_content_type: Option<&str>) -> (Presence<Value>, Option<String>) {
    let Some(post_data) = post_data.and_then(Value::as_object) else {
        return (Presence::Absent, None);
    };
    let Some(text) = post_data.get("text").and_then(Value::as_str) else {
        return (Presence::Absent, None);
    };

    let mime = post_data
        .get("mimeType")
        .and_then(Value::as_str)
        .or(fallback_content_type);
    split_body_json_text(text, mime)
}

/// `response.content`: only ever treated as JSON when the MIME type itself
/// contains "json" (unlike the request side, there's no content-type-less
/// sniffing fallback for responses — matches `_parse_har`).
fn parse_response_body(content: Option<&Value>) -> Presence<Value> {
    let Some(content) = content else {
        return Presence::Absent;
    };
    let mime = content.get("mimeType").and_then(Value::as_str).unwrap_or("").to_ascii_lowercase();
    let Some(text) = content.get("text").and_then(Value::as_str) else {
        return Presence::Absent;
    };
    if !mime.contains("json") {
        return Presence::Absent;
    }

    let encoding = content.get("encoding").and_then(Value::as_str);
    let decoded = if encoding == Some("base64") {
        BASE64.decode(text).ok().and_then(|bytes| String::from_utf8(bytes).ok())
    } else {
        Some(text.to_string())
    };

    match decoded.and_then(|t| serde_json::from_str(&t).ok().or_else(|| sniff_json(&t))) {
        Some(parsed) => Presence::Present(parsed),
        None => Presence::Absent,
    }
}

pub fn parse_har(value: &Value) -> anyhow::Result<Vec<TrafficRecord>> {
    let entries = value
        .pointer("/log/entries")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow::anyhow!("HAR document has no log.entries array"))?;

    let mut records = Vec::with_capacity(entries.len());
    for entry in entries {
        let request = entry.get("request").cloned().unwrap_or(Value::Null);
        let response = entry.get("response").cloned().unwrap_or(Value::Null);

        let method = request
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_ascii_uppercase();
        if method.is_empty() {
            continue;
        }

        let Some(status) = response.get("status").and_then(Value::as_u64).map(|s| s as u16) else {
            continue;
        };

        let url = request.get("url").and_then(Value::as_str).unwrap_or("/");
        let (path, query) = super::util::parse_path_and_query(url);

        let headers = request
            .get("headers")
            .and_then(Value::as_array)
            .map(|h| headers_from_har(h))
            .unwrap_or_default();
        let request_content_type = headers.get("content-type").cloned();

        let (request_json, request_text) = parse_request_body(request.get("postData"), request_content_type.as_deref());

        let response_json = parse_response_body(response.get("content"));

        records.push(TrafficRecord {
            method,
            path,
            status: Some(status),
            response_json,
            query,
            headers,
            request_json,
            request_text,
            request_content_type,
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_plain_text_json_body() {
        let har = json!({
            "log": {"entries": [{
                "request": {
                    "method": "post",
                    "url": "http://api.example.com/users",
                    "headers": [{"name": "Content-Type", "value": "application/json"}],
                    "postData": {"mimeType": "application/json", "text": "{\"name\":\"a\"}"}
                },
                "response": {
                    "status": 201,
                    "content": {"mimeType": "application/json", "text": "{\"id\":1}"}
                }
            }]}
        });
        let records = parse_har(&har).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].request_json.as_value(), Some(&json!({"name": "a"})));
        assert_eq!(records[0].response_json.as_value(), Some(&json!({"id": 1})));
        assert_eq!(records[0].status, Some(201));
    }

    #[test]
    fn decodes_base64_encoded_body() {
        let payload = BASE64.encode("{\"id\":42}");
        let har = json!({
            "log": {"entries": [{
                "request": {"method": "get", "url": "http://api.example.com/items/42"},
                "response": {
                    "status": 200,
                    "content": {"mimeType": "application/json", "text": payload, "encoding": "base64"}
                }
            }]}
        });
        let records = parse_har(&har).unwrap();
        assert_eq!(records[0].response_json.as_value(), Some(&json!({"id": 42})));
    }

    #[test]
    fn non_json_mime_yields_no_response_json() {
        let har = json!({
            "log": {"entries": [{
                "request": {"method": "get", "url": "http://api.example.com/x"},
                "response": {
                    "status": 200,
                    "content": {"mimeType": "text/plain", "text": "hello"}
                }
            }]}
        });
        let records = parse_har(&har).unwrap();
        assert!(records[0].response_json.is_absent());
    }

    #[test]
    fn entry_missing_status_is_dropped() {
        let har = json!({
            "log": {"entries": [
                {"request": {"method": "get", "url": "http://a/x"}, "response": {}},
                {"request": {"method": "get", "url": "http://a/y"}, "response": {"status": 200}}
            ]}
        });
        let records = parse_har(&har).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, "/y");
    }

    #[test]
    fn missing_log_entries_errors() {
        assert!(parse_har(&json!({})).is_err());
    }

    #[test]
    fn query_string_field_is_ignored_in_favor_of_the_url() {
        let har = json!({
            "log": {"entries": [{
                "request": {
                    "method": "get",
                    "url": "http://api.example.com/x",
                    "queryString": [{"name": "active", "value": "true"}]
                },
                "response": {"status": 200}
            }]}
        });
        let records = parse_har(&har).unwrap();
        assert!(records[0].query.get("active").is_none());
    }
}
