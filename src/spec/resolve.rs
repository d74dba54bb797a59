//! Path-template operation resolution and `$ref` resolution.
//!
//! Grounded in the reference implementation's `openapi.py` (`get_operation`,
//! `_match_template_score`, `resolve_schema`) and, for the matching idiom,
//! the teacher's `router/router.rs` (routes compared by specificity rather
//! than matched by a single greedy regex).

use serde_json::Value;
use std::collections::HashSet;

const HTTP_METHODS: [&str; 7] = ["get", "put", "post", "delete", "options", "head", "patch"];

/// A resolved operation: its HTTP method, the path template it matched, and
/// the path parameters extracted from the concrete request path.
#[derive(Debug, Clone)]
pub struct ResolvedOperation {
    pub method: String,
    pub template: String,
    pub operation: Value,
    pub path_item: Value,
    pub path_params: Vec<(String, String)>,
}

/// Strip query string/fragment, ensure a leading slash, and drop exactly one
/// trailing slash (but never the root `/`).
pub fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or("");
    let mut path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    if path.len() > 1 && path.ends_with('/') {
        path.pop();
    }
    path
}

pub fn split_path(path: &str) -> Vec<&str> {
    path.trim_matches('/').split('/').collect()
}

/// Score a concrete path's segments against a template's segments.
///
/// `None` if the segment counts differ or a literal segment doesn't match
/// exactly. Otherwise the number of literal (non-`{param}`) segments that
/// matched, used as a specificity tie-breaker: more literal matches wins.
fn match_template_score(template_segments: &[&str], path_segments: &[&str]) -> Option<u32> {
    if template_segments.len() != path_segments.len() {
        return None;
    }
    let mut score = 0u32;
    for (t, p) in template_segments.iter().zip(path_segments.iter()) {
        if t.starts_with('{') && t.ends_with('}') {
            continue;
        }
        if t != p {
            return None;
        }
        score += 1;
    }
    Some(score)
}

fn extract_path_params(template_segments: &[&str], path_segments: &[&str]) -> Vec<(String, String)> {
    template_segments
        .iter()
        .zip(path_segments.iter())
        .filter_map(|(t, p)| {
            if t.starts_with('{') && t.ends_with('}') {
                Some((t[1..t.len() - 1].to_string(), p.to_string()))
            } else {
                None
            }
        })
        .collect()
}

fn get_paths(spec: &Value) -> Option<&serde_json::Map<String, Value>> {
    spec.get("paths")?.as_object()
}

/// Iterate every (method, path template, operation, path item) in the spec,
/// in the document's own key order.
pub fn iter_operations(spec: &Value) -> Vec<(String, String, Value, Value)> {
    let mut out = Vec::new();
    let Some(paths) = get_paths(spec) else {
        return out;
    };
    for (template, path_item) in paths {
        let Some(item_obj) = path_item.as_object() else {
            continue;
        };
        for method in HTTP_METHODS {
            if let Some(op) = item_obj.get(method) {
                out.push((method.to_string(), template.clone(), op.clone(), path_item.clone()));
            }
        }
    }
    out
}

/// Resolve the operation that should handle `method`/`request_path`.
///
/// Tries a direct (unparameterized) template match first, then scans every
/// templated path for the highest-scoring match. Ties are broken by
/// document order (first template wins), matching the reference
/// implementation's stable scan.
pub fn resolve_operation(spec: &Value, method: &str, request_path: &str) -> Option<ResolvedOperation> {
    let method = method.to_ascii_lowercase();
    let normalized = normalize_path(request_path);
    let paths = get_paths(spec)?;

    if let Some(path_item) = paths.get(&normalized) {
        if let Some(op) = path_item.as_object().and_then(|o| o.get(&method)) {
            return Some(ResolvedOperation {
                method,
                template: normalized,
                operation: op.clone(),
                path_item: path_item.clone(),
                path_params: Vec::new(),
            });
        }
    }

    let path_segments = split_path(&normalized);
    let mut best: Option<(u32, String, Value, Value)> = None;

    for (template, path_item) in paths {
        let Some(op) = path_item.as_object().and_then(|o| o.get(&method)) else {
            continue;
        };
        let template_segments = split_path(template);
        let Some(score) = match_template_score(&template_segments, &path_segments) else {
            continue;
        };
        let better = match &best {
            Some((best_score, _, _, _)) => score > *best_score,
            None => true,
        };
        if better {
            best = Some((score, template.clone(), op.clone(), path_item.clone()));
        }
    }

    best.map(|(_, template, op, path_item)| {
        let template_segments = split_path(&template);
        let path_params = extract_path_params(&template_segments, &path_segments);
        ResolvedOperation {
            method,
            template,
            operation: op,
            path_item,
            path_params,
        }
    })
}

/// Resolve a `$ref` string (document-local `#/...` pointers only) against the
/// root spec document, following chained refs up to `max_depth` and
/// rejecting cycles.
pub fn resolve_schema(spec: &Value, schema: &Value, max_depth: u32) -> Value {
    let mut seen = HashSet::new();
    resolve_schema_inner(spec, schema, max_depth, &mut seen)
}

fn resolve_schema_inner(spec: &Value, schema: &Value, max_depth: u32, seen: &mut HashSet<String>) -> Value {
    let Some(r) = schema.get("$ref").and_then(Value::as_str) else {
        return schema.clone();
    };

    if max_depth == 0 || seen.contains(r) {
        return schema.clone();
    }
    seen.insert(r.to_string());

    let Some(pointer) = r.strip_prefix('#') else {
        return schema.clone();
    };

    match spec.pointer(pointer) {
        Some(target) => resolve_schema_inner(spec, target, max_depth - 1, seen),
        None => schema.clone(),
    }
}
