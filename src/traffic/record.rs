//! The normalized traffic record shape every loader (HAR, curl log, JSON
//! list) converges on before the validator sees it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Distinguishes a field that's absent from one that's explicitly JSON
/// `null`. A missing request/response body and an empty-but-present `null`
/// body are different observations about the traffic, and the validator
/// treats them differently (the former skips the body check, the latter is
/// a value to validate against the schema).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Presence<T> {
    Present(T),
    Null,
    Absent,
}

impl<T> Presence<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Presence::Absent)
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Presence::Present(_))
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Presence::Present(v) => Some(v),
            _ => None,
        }
    }
}

impl<T> Default for Presence<T> {
    fn default() -> Self {
        Presence::Absent
    }
}

/// One normalized request/response pair, regardless of the capture format
/// it came from. Field names mirror the reference implementation's
/// normalized dict shape (`method`, `path`, `status`, `response_json`,
/// `query`, `headers`, `request_json`, `request_text`,
/// `request_content_type`) so the validator reads the same way against any
/// source.
#[derive(Debug, Clone, Default)]
pub struct TrafficRecord {
    pub method: String,
    pub path: String,
    pub status: Option<u16>,
    pub response_json: Presence<Value>,
    pub query: BTreeMap<String, QueryValue>,
    pub headers: BTreeMap<String, String>,
    pub request_json: Presence<Value>,
    pub request_text: Option<String>,
    pub request_content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Single(String),
    Multi(Vec<String>),
}

impl QueryValue {
    pub fn first(&self) -> &str {
        match self {
            QueryValue::Single(s) => s,
            QueryValue::Multi(v) => v.first().map(|s| s.as_str()).unwrap_or(""),
        }
    }
}
