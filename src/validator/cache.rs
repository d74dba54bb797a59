//! Two-tier caching for schema resolution and validator compilation.
//!
//! Grounded in the teacher's `validator_cache.rs`: an `Arc<RwLock<HashMap>>`
//! guarded by a read-then-upgrade-to-write double-check, so concurrent
//! lookups for an already-cached entry never block each other. Two caches
//! exist here because the two things being cached are keyed differently:
//! resolved schemas by their `$ref` string, compiled validators by the
//! canonical serialization of the (already-resolved) schema they compile.

use jsonschema::JSONSchema;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Clone, Default)]
pub struct ResolvedSchemaCache {
    cache: Arc<RwLock<HashMap<String, Value>>>,
}

impl ResolvedSchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_resolve(&self, key: &str, resolve: impl FnOnce() -> Value) -> Value {
        if let Some(hit) = self.cache.read().expect("resolved schema cache lock poisoned").get(key) {
            return hit.clone();
        }
        let resolved = resolve();
        let mut cache = self.cache.write().expect("resolved schema cache lock poisoned");
        cache.entry(key.to_string()).or_insert_with(|| resolved.clone());
        resolved
    }

    pub fn size(&self) -> usize {
        self.cache.read().expect("resolved schema cache lock poisoned").len()
    }
}

/// Canonical cache key for a schema: sorted-key, whitespace-free JSON.
/// Two structurally-identical schemas reached via different `$ref` paths
/// compile to the same validator and share one cache entry.
fn canonical_key(schema: &Value) -> String {
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
    serde_json::to_string(&sort(schema)).unwrap_or_default()
}

#[derive(Clone, Default)]
pub struct CompiledValidatorCache {
    cache: Arc<RwLock<HashMap<String, Arc<JSONSchema>>>>,
    enabled: bool,
}

impl CompiledValidatorCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            enabled,
        }
    }

    pub fn get_or_compile(&self, schema: &Value) -> Option<Arc<JSONSchema>> {
        if !self.enabled {
            return compile(schema);
        }

        let key = canonical_key(schema);
        {
            let cache = self.cache.read().expect("validator cache lock poisoned");
            if let Some(validator) = cache.get(&key) {
                return Some(Arc::clone(validator));
            }
        }

        let compiled = compile(schema)?;
        let mut cache = self.cache.write().expect("validator cache lock poisoned");
        let entry = cache.entry(key).or_insert_with(|| compiled.clone());
        Some(Arc::clone(entry))
    }

    pub fn size(&self) -> usize {
        self.cache.read().expect("validator cache lock poisoned").len()
    }
}

fn compile(schema: &Value) -> Option<Arc<JSONSchema>> {
    match JSONSchema::options()
        .with_draft(jsonschema::Draft::Draft7)
        .compile(schema)
    {
        Ok(compiled) => Some(Arc::new(compiled)),
        Err(e) => {
            tracing::warn!(error = %e, "schema failed to compile, skipping this check");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolved_schema_cache_hits_on_same_key() {
        let cache = ResolvedSchemaCache::new();
        let mut calls = 0;
        let first = cache.get_or_resolve("#/a", || {
            calls += 1;
            json!({"type": "string"})
        });
        let second = cache.get_or_resolve("#/a", || {
            calls += 1;
            json!({"type": "string"})
        });
        assert_eq!(first, second);
        assert_eq!(calls, 1);
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn compiled_validator_cache_shares_structurally_identical_schemas() {
        let cache = CompiledValidatorCache::new(true);
        let a = cache.get_or_compile(&json!({"type": "string", "minLength": 1}));
        let b = cache.get_or_compile(&json!({"minLength": 1, "type": "string"}));
        assert!(a.is_some() && b.is_some());
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn disabled_cache_still_compiles() {
        let cache = CompiledValidatorCache::new(false);
        assert!(cache.get_or_compile(&json!({"type": "string"})).is_some());
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn invalid_schema_yields_none() {
        let cache = CompiledValidatorCache::new(true);
        assert!(cache
            .get_or_compile(&json!({"properties": "not-an-object"}))
            .is_none());
    }
}
