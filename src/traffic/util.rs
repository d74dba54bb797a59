//! Shared helpers used by more than one traffic format parser.

use super::record::{Presence, QueryValue};
use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

/// Lower-case header names, last value wins on duplicates (matches how a
/// `BTreeMap` naturally folds a header list).
pub fn normalize_headers(pairs: impl IntoIterator<Item = (String, String)>) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), v))
        .collect()
}

/// Parse a request line's path + query string into (path, query map). A
/// single occurrence of a query key stays a scalar string; repeated keys
/// collect into a list. The path itself is run through the same
/// [`crate::spec::normalize_path`] the operation resolver uses, so ingestion
/// and resolution agree on what "the path" is.
pub fn parse_path_and_query(raw: &str) -> (String, BTreeMap<String, QueryValue>) {
    let base = Url::parse("http://placeholder.invalid")
        .expect("static base url")
        .join(raw);

    let Ok(url) = base else {
        return (crate::spec::normalize_path(raw), BTreeMap::new());
    };

    let mut query: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (k, v) in url.query_pairs() {
        query.entry(k.into_owned()).or_default().push(v.into_owned());
    }

    let collapsed = query
        .into_iter()
        .map(|(k, mut v)| {
            if v.len() == 1 {
                (k, QueryValue::Single(v.remove(0)))
            } else {
                (k, QueryValue::Multi(v))
            }
        })
        .collect();

    (crate::spec::normalize_path(url.path()), collapsed)
}

/// A body looks like JSON if, after trimming whitespace, it starts with `{`
/// or `[`. Used when a content-type header is absent or ambiguous. Grounded
/// in `_sniff_json` in the reference implementation.
pub fn sniff_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() || !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return None;
    }
    match serde_json::from_str(trimmed) {
        Ok(v @ Value::Object(_)) | Ok(v @ Value::Array(_)) => Some(v),
        _ => None,
    }
}

/// Split a raw request/response body into its decoded-JSON and raw-text
/// forms, the way every traffic-format parser needs to: if the content type
/// names JSON, parse it (falling back to `request_text`-only on a parse
/// failure); otherwise, when no content type is known at all, sniff for a
/// leading `{`/`[` before trying to parse.
pub fn split_body_json_text(text: &str, content_type: Option<&str>) -> (Presence<Value>, Option<String>) {
    let is_json_ct = content_type.map(|ct| ct.to_ascii_lowercase().contains("json")).unwrap_or(false);

    if is_json_ct {
        let parsed = serde_json::from_str(text).ok();
        return (presence_from_option(parsed), Some(text.to_string()));
    }

    if content_type.is_none() {
        if let Some(parsed) = sniff_json(text) {
            return (Presence::Present(parsed), Some(text.to_string()));
        }
    }

    (Presence::Absent, Some(text.to_string()))
}

fn presence_from_option(value: Option<Value>) -> Presence<Value> {
    match value {
        Some(v) => Presence::Present(v),
        None => Presence::Absent,
    }
}

/// Drop a single leading HTTP header block, terminated by a blank line
/// (`\r\n\r\n` or `\n\n`), leaving only the body.
pub fn strip_http_headers(text: &str) -> &str {
    if let Some(idx) = text.find("\r\n\r\n") {
        return &text[idx + 4..];
    }
    if let Some(idx) = text.find("\n\n") {
        return &text[idx + 2..];
    }
    text
}
