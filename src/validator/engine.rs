//! The per-record validation algorithm.
//!
//! Grounded line-for-line in `validate_traffic_against_spec` in the
//! reference implementation: for every traffic record, resolve the
//! operation it targets, check its parameters, check its request body (if
//! declared), and check its response body against the schema for the
//! observed status class. Early-stops once `max_errors` findings have been
//! recorded.

use super::cache::{CompiledValidatorCache, ResolvedSchemaCache};
use super::coerce::coerce_value;
use super::issue::ValidationReport;
use crate::spec::{openapi_schema_to_jsonschema, resolve_operation, resolve_schema};
use crate::traffic::{Presence, QueryValue, TrafficRecord};
use serde_json::Value;
use std::sync::Arc;

const MAX_REF_DEPTH: u32 = 20;

#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    pub max_errors: Option<u32>,
    pub ignore_unknown: bool,
}

/// Bundles the spec document with the two caches every schema lookup goes
/// through: resolved-`$ref` lookups, then compiled-validator lookups keyed
/// by the canonical serialization of the resolved-and-translated schema.
struct Engines<'a> {
    spec: &'a Value,
    resolved: ResolvedSchemaCache,
    compiled: CompiledValidatorCache,
}

impl Engines<'_> {
    /// Returns the post-translation JSON Schema alongside its compiled
    /// validator; callers that need to coerce a raw string value read the
    /// schema back off this pair rather than the original (possibly
    /// `$ref`-only) schema node.
    fn validator_for(&self, ref_key: &str, schema: &Value) -> (Value, Option<Arc<jsonschema::JSONSchema>>) {
        let resolved = self
            .resolved
            .get_or_resolve(ref_key, || resolve_schema(self.spec, schema, MAX_REF_DEPTH));
        let translated = openapi_schema_to_jsonschema(&resolved);
        let compiled = self.compiled.get_or_compile(&translated);
        (translated, compiled)
    }
}

fn schema_ref_key(schema: &Value, fallback: &str) -> String {
    schema
        .get("$ref")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

fn pick_json_content_schema(content: &Value) -> Option<Value> {
    let obj = content.as_object()?;
    if let Some(schema) = obj.get("application/json").and_then(|entry| entry.get("schema")) {
        return Some(schema.clone());
    }
    obj.iter()
        .find(|(ct, _)| ct.to_ascii_lowercase().contains("json"))
        .and_then(|(_, entry)| entry.get("schema").cloned())
}

fn pick_response_schema(operation: &Value, status: u16) -> Option<Value> {
    let responses = operation.get("responses")?.as_object()?;
    let exact = status.to_string();
    let response = responses
        .get(&exact)
        .or_else(|| responses.get(&format!("{}XX", exact.as_bytes()[0] as char)))
        .or_else(|| responses.get("default"))?;
    pick_json_content_schema(response.get("content").unwrap_or(&Value::Null))
}

/// Merge `path_item.parameters` with `operation.parameters`, keyed by
/// (name, in); the operation's own declaration wins over the path item's.
fn merge_parameters(path_item: &Value, operation: &Value) -> Vec<Value> {
    let mut merged: Vec<(String, String, Value)> = Vec::new();

    let mut push_all = |params: &Value, overwrite: bool| {
        let Some(list) = params.as_array() else { return };
        for p in list {
            let Some(name) = p.get("name").and_then(Value::as_str) else { continue };
            let Some(location) = p.get("in").and_then(Value::as_str) else { continue };
            let key = (name.to_string(), location.to_string());
            if let Some(existing) = merged.iter_mut().find(|(n, l, _)| *n == key.0 && *l == key.1) {
                if overwrite {
                    existing.2 = p.clone();
                }
            } else {
                merged.push((key.0, key.1, p.clone()));
            }
        }
    };

    push_all(&path_item["parameters"], false);
    push_all(&operation["parameters"], true);

    merged.into_iter().map(|(_, _, p)| p).collect()
}

enum ParamRaw<'a> {
    Single(&'a str),
    Multi(&'a [String]),
}

fn raw_param_value<'a>(
    record: &'a TrafficRecord,
    location: &str,
    name: &str,
    path_params: &'a [(String, String)],
) -> Option<ParamRaw<'a>> {
    match location {
        "path" => path_params.iter().find(|(n, _)| n == name).map(|(_, v)| ParamRaw::Single(v)),
        "query" => record.query.get(name).map(|v| match v {
            QueryValue::Single(s) => ParamRaw::Single(s),
            QueryValue::Multi(items) => ParamRaw::Multi(items),
        }),
        "header" => record.headers.get(&name.to_ascii_lowercase()).map(|v| ParamRaw::Single(v)),
        // Cookie parameters are declared-but-unhandled: no supported traffic
        // format observes cookies, so there's nothing to coerce or check.
        _ => None,
    }
}

fn coerce_param(raw: &ParamRaw, schema: &Value) -> Value {
    match raw {
        ParamRaw::Single(s) => coerce_value(s, schema),
        ParamRaw::Multi(items) => {
            if schema.get("type").and_then(Value::as_str) == Some("array") {
                let item_schema = schema.get("items").unwrap_or(&Value::Null);
                Value::Array(items.iter().map(|s| coerce_value(s, item_schema)).collect())
            } else {
                // A repeated query key against a non-array schema stays a
                // list and is handed to the validator as-is, which will
                // then raise a type mismatch — surfaced via the hint system
                // rather than silently picking the first value.
                Value::Array(items.iter().map(Value::from).collect())
            }
        }
    }
}

/// Null for an absent/null body, otherwise the present value — matches the
/// reference implementation treating a present-but-JSON-null body and an
/// absent one as the same `None` when handed to the validator.
fn as_validation_value(presence: &Presence<Value>) -> Value {
    presence.as_value().cloned().unwrap_or(Value::Null)
}

pub fn validate_traffic_against_spec(spec: &Value, records: &[TrafficRecord], options: &ValidateOptions) -> ValidationReport {
    let engines = Engines {
        spec,
        resolved: ResolvedSchemaCache::new(),
        compiled: CompiledValidatorCache::new(true),
    };
    let mut report = ValidationReport::new();

    'records: for record in records {
        report.record_check();
        let method = &record.method;
        let path = &record.path;

        let Some(resolved) = resolve_operation(spec, method, path) else {
            if !options.ignore_unknown {
                report.add_error("operation.missing", format!("No operation for {method} {path}"), None);
                if report.over_limit(options.max_errors) {
                    report.stopped_early = true;
                    break 'records;
                }
            }
            continue;
        };

        let group_path = &resolved.template;

        let Some(status) = record.status else {
            report.add_error(
                format!("response.invalid_status|{method}|{path}"),
                format!("Invalid status for {method} {path}: missing"),
                None,
            );
            if report.over_limit(options.max_errors) {
                report.stopped_early = true;
                break 'records;
            }
            continue;
        };

        for param in merge_parameters(&resolved.path_item, &resolved.operation) {
            let Some(name) = param.get("name").and_then(Value::as_str) else { continue };
            let Some(location) = param.get("in").and_then(Value::as_str) else { continue };
            let required = param.get("required").and_then(Value::as_bool).unwrap_or(false);

            let raw = raw_param_value(record, location, name, &resolved.path_params);
            let Some(raw) = raw else {
                if required {
                    report.add_error(
                        format!("request.param.missing|{method}|{group_path}"),
                        format!("Missing {location} parameter '{name}' for {method} {group_path}"),
                        None,
                    );
                    if report.over_limit(options.max_errors) {
                        report.stopped_early = true;
                        break 'records;
                    }
                }
                continue;
            };

            let Some(param_schema) = param.get("schema").filter(|s| s.is_object()) else {
                continue;
            };
            let ref_key = schema_ref_key(param_schema, &format!("{method}|{group_path}|param:{name}"));
            let (translated, validator) = engines.validator_for(&ref_key, param_schema);
            let Some(validator) = validator else { continue };
            let coerced = coerce_param(&raw, &translated);
            if validator.validate(&coerced).is_err() {
                report.add_error(
                    format!("request.param.invalid|{method}|{group_path}"),
                    format!("Invalid {location} parameter '{name}' for {method} {group_path}"),
                    None,
                );
                if report.over_limit(options.max_errors) {
                    report.stopped_early = true;
                    break 'records;
                }
            }
        }
        if report.stopped_early {
            break 'records;
        }

        if let Some(request_body) = resolved.operation.get("requestBody").filter(|b| b.is_object()) {
            let required = request_body.get("required").and_then(Value::as_bool).unwrap_or(false);
            let schema = request_body.get("content").and_then(pick_json_content_schema);

            let request_json_given = !record.request_json.is_absent();
            let mut is_json = record
                .request_content_type
                .as_deref()
                .map(|ct| ct.to_ascii_lowercase().contains("json"))
                .unwrap_or(false);
            if request_json_given {
                is_json = true;
            }

            if required && !request_json_given && record.request_text.is_none() {
                report.add_error(
                    format!("request.body.missing|{method}|{group_path}"),
                    format!("Missing request body for {method} {group_path}"),
                    None,
                );
            } else if let (Some(schema), true) = (&schema, is_json) {
                if !request_json_given && record.request_text.is_some() {
                    report.add_error(
                        format!("request.body.invalid_json|{method}|{group_path}"),
                        format!("Invalid JSON request body for {method} {group_path}"),
                        None,
                    );
                } else {
                    let ref_key = schema_ref_key(schema, &format!("{method}|{group_path}|requestBody"));
                    let (_, validator) = engines.validator_for(&ref_key, schema);
                    if let Some(validator) = validator {
                        if validator.validate(&as_validation_value(&record.request_json)).is_err() {
                            report.add_error(
                                format!("request.body.schema|{method}|{group_path}"),
                                format!("Request body schema mismatch for {method} {group_path}"),
                                None,
                            );
                        }
                    }
                }
            } else if request_json_given && schema.is_none() {
                report.add_error(
                    format!("request.body.schema_missing|{method}|{group_path}"),
                    format!("No request schema for {method} {group_path}"),
                    None,
                );
            }
            if report.over_limit(options.max_errors) {
                report.stopped_early = true;
                break 'records;
            }
        }

        match pick_response_schema(&resolved.operation, status) {
            None => {
                if record.response_json.is_present() || !matches!(status, 204 | 304) {
                    report.add_error(
                        format!("response.schema_missing|{method}|{group_path}|{status}"),
                        format!("No response schema for {method} {group_path} {status}"),
                        None,
                    );
                    if report.over_limit(options.max_errors) {
                        report.stopped_early = true;
                        break 'records;
                    }
                }
            }
            Some(schema) => {
                let ref_key = schema_ref_key(&schema, &format!("{method}|{group_path}|response:{status}"));
                let (_, validator) = engines.validator_for(&ref_key, &schema);
                if let Some(validator) = validator {
                    if validator.validate(&as_validation_value(&record.response_json)).is_err() {
                        report.add_error(
                            format!("response.schema_mismatch|{method}|{group_path}|{status}"),
                            format!("Schema mismatch for {method} {group_path} {status}"),
                            None,
                        );
                        if report.over_limit(options.max_errors) {
                            report.stopped_early = true;
                            break 'records;
                        }
                    }
                }
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec() -> Value {
        json!({
            "paths": {
                "/users/{id}": {
                    "get": {
                        "operationId": "getUser",
                        "parameters": [
                            {"name": "id", "in": "path", "required": true, "schema": {"type": "integer"}}
                        ],
                        "responses": {
                            "200": {"content": {"application/json": {"schema": {
                                "type": "object",
                                "required": ["id"],
                                "properties": {"id": {"type": "integer"}}
                            }}}}
                        }
                    },
                    "post": {
                        "operationId": "createUser",
                        "requestBody": {
                            "required": true,
                            "content": {"application/json": {"schema": {
                                "type": "object",
                                "required": ["name"],
                                "properties": {"name": {"type": "string"}}
                            }}}
                        },
                        "responses": {"201": {"content": {"application/json": {"schema": {"type": "object"}}}}}
                    }
                }
            }
        })
    }

    #[test]
    fn valid_traffic_produces_no_errors() {
        let records = vec![TrafficRecord {
            method: "GET".into(),
            path: "/users/42".into(),
            status: Some(200),
            response_json: Presence::Present(json!({"id": 42})),
            ..Default::default()
        }];
        let report = validate_traffic_against_spec(&spec(), &records, &ValidateOptions::default());
        assert_eq!(report.error_count, 0);
    }

    #[test]
    fn response_schema_violation_is_reported_with_canonical_group_key() {
        let records = vec![TrafficRecord {
            method: "GET".into(),
            path: "/users/42".into(),
            status: Some(200),
            response_json: Presence::Present(json!({"id": "not-an-integer"})),
            ..Default::default()
        }];
        let report = validate_traffic_against_spec(&spec(), &records, &ValidateOptions::default());
        assert_eq!(report.error_count, 1);
        assert!(report.errors_grouped.contains_key("response.schema_mismatch|GET|/users/{id}|200"));
    }

    #[test]
    fn missing_required_request_body_is_reported() {
        let records = vec![TrafficRecord {
            method: "POST".into(),
            path: "/users/42".into(),
            status: Some(201),
            ..Default::default()
        }];
        let report = validate_traffic_against_spec(&spec(), &records, &ValidateOptions::default());
        assert_eq!(report.error_count, 1);
        assert!(report.errors_grouped.contains_key("request.body.missing|POST|/users/{id}"));
    }

    #[test]
    fn unresolved_operation_is_reported_unless_ignored() {
        let records = vec![TrafficRecord {
            method: "GET".into(),
            path: "/nope".into(),
            status: Some(200),
            ..Default::default()
        }];
        let report = validate_traffic_against_spec(&spec(), &records, &ValidateOptions::default());
        assert_eq!(report.error_count, 1);

        let ignored = validate_traffic_against_spec(
            &spec(),
            &records,
            &ValidateOptions {
                ignore_unknown: true,
                ..Default::default()
            },
        );
        assert_eq!(ignored.error_count, 0);
    }

    #[test]
    fn missing_status_is_reported_as_invalid_status() {
        let records = vec![TrafficRecord {
            method: "GET".into(),
            path: "/users/42".into(),
            status: None,
            ..Default::default()
        }];
        let report = validate_traffic_against_spec(&spec(), &records, &ValidateOptions::default());
        assert_eq!(report.error_count, 1);
        assert!(report.errors_grouped.keys().next().unwrap().starts_with("response.invalid_status"));
    }

    #[test]
    fn no_content_response_without_body_is_not_flagged_missing_schema() {
        let mut s = spec();
        s["paths"]["/users/{id}"]["delete"] = json!({
            "operationId": "deleteUser",
            "parameters": [{"name": "id", "in": "path", "required": true, "schema": {"type": "integer"}}],
            "responses": {"204": {}}
        });
        let records = vec![TrafficRecord {
            method: "DELETE".into(),
            path: "/users/42".into(),
            status: Some(204),
            ..Default::default()
        }];
        let report = validate_traffic_against_spec(&s, &records, &ValidateOptions::default());
        assert_eq!(report.error_count, 0);
    }

    #[test]
    fn request_body_present_without_declared_schema_is_schema_missing() {
        let mut s = spec();
        s["paths"]["/users/{id}"]["put"] = json!({
            "operationId": "replaceUser",
            "requestBody": {"content": {}},
            "responses": {"200": {}}
        });
        let records = vec![TrafficRecord {
            method: "PUT".into(),
            path: "/users/42".into(),
            status: Some(200),
            request_json: Presence::Present(json!({"name": "a"})),
            ..Default::default()
        }];
        let report = validate_traffic_against_spec(&s, &records, &ValidateOptions::default());
        assert_eq!(report.error_count, 1);
        assert!(report.errors_grouped.contains_key("request.body.schema_missing|PUT|/users/{id}"));
    }

    #[test]
    fn text_body_that_failed_to_parse_as_json_is_invalid_json() {
        let records = vec![TrafficRecord {
            method: "POST".into(),
            path: "/users/42".into(),
            status: Some(201),
            request_text: Some("{not valid".into()),
            request_content_type: Some("application/json".into()),
            ..Default::default()
        }];
        let report = validate_traffic_against_spec(&spec(), &records, &ValidateOptions::default());
        assert_eq!(report.error_count, 1);
        assert!(report.errors_grouped.contains_key("request.body.invalid_json|POST|/users/{id}"));
    }

    #[test]
    fn stops_early_once_max_errors_reached() {
        let records: Vec<_> = (0..10)
            .map(|_| TrafficRecord {
                method: "GET".into(),
                path: "/missing".into(),
                status: Some(200),
                ..Default::default()
            })
            .collect();
        let report = validate_traffic_against_spec(
            &spec(),
            &records,
            &ValidateOptions {
                max_errors: Some(3),
                ignore_unknown: false,
            },
        );
        assert_eq!(report.error_count, 3);
        assert!(report.stopped_early);
    }
}
