//! Breaking-change detection between two OpenAPI specifications.
//!
//! Grounded in `diff_specs`/`_hash_schema` in the reference implementation:
//! a thin use of the same schema-hashing primitive the validator's compiled-
//! validator cache already relies on (canonical sorted-key, no-whitespace
//! JSON, SHA-256 hex digest). Three kinds of change are reported as
//! breaking: an operation removed, a response status removed, or a
//! response's `application/json` schema hash changed.

use crate::spec::iter_operations;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

fn canonical_json(value: &Value) -> String {
    fn sort(value: &Value) -> Value {
        match value {
            Value::Object(map) => {
                let mut sorted: Vec<_> = map.iter().collect();
                sorted.sort_by(|a, b| a.0.cmp(b.0));
                Value::Object(sorted.into_iter().map(|(k, v)| (k.clone(), sort(v))).collect())
            }
            Value::Array(items) => Value::Array(items.iter().map(sort).collect()),
            other => other.clone(),
        }
    }
    serde_json::to_string(&sort(value)).unwrap_or_default()
}

/// Empty string for a missing schema, matching `_hash_schema(None) == ""` in
/// the reference implementation — an absent schema hashes differently from
/// any schema that would produce the empty-string digest itself.
fn hash_schema(schema: Option<&Value>) -> String {
    let Some(schema) = schema else {
        return String::new();
    };
    let digest = Sha256::digest(canonical_json(schema).as_bytes());
    hex::encode(digest)
}

fn response_json_schema(response: &Value) -> Option<Value> {
    response.get("content")?.get("application/json")?.get("schema").cloned()
}

pub struct SpecDiff {
    pub breaking_changes: Vec<String>,
}

pub fn diff_specs(old_spec: &Value, new_spec: &Value) -> SpecDiff {
    let old_ops: BTreeMap<(String, String), Value> = iter_operations(old_spec)
        .into_iter()
        .map(|(method, path, op, _)| ((path, method), op))
        .collect();
    let new_ops: BTreeMap<(String, String), Value> = iter_operations(new_spec)
        .into_iter()
        .map(|(method, path, op, _)| ((path, method), op))
        .collect();

    let mut breaking = Vec::new();

    for (path, method) in old_ops.keys() {
        if !new_ops.contains_key(&(path.clone(), method.clone())) {
            breaking.push(format!("Removed operation {} {}", method.to_ascii_uppercase(), path));
        }
    }

    for ((path, method), old_op) in &old_ops {
        let Some(new_op) = new_ops.get(&(path.clone(), method.clone())) else {
            continue;
        };

        let empty = Value::Object(Default::default());
        let old_responses = old_op.get("responses").unwrap_or(&empty).as_object().cloned().unwrap_or_default();
        let new_responses = new_op.get("responses").unwrap_or(&empty).as_object().cloned().unwrap_or_default();

        for status in old_responses.keys() {
            if !new_responses.contains_key(status) {
                breaking.push(format!("Removed response {} {} {status}", method.to_ascii_uppercase(), path));
                continue;
            }

            let old_json = old_responses.get(status).and_then(response_json_schema);
            let new_json = new_responses.get(status).and_then(response_json_schema);

            if hash_schema(old_json.as_ref()) != hash_schema(new_json.as_ref()) {
                breaking.push(format!(
                    "Schema changed {} {} {status} (potential break)",
                    method.to_ascii_uppercase(),
                    path
                ));
            }
        }
    }

    SpecDiff { breaking_changes: breaking }
}
