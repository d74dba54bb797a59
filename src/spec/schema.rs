//! Translation of OpenAPI 3.0's JSON-Schema dialect into something the
//! `jsonschema` crate's Draft 7 validator accepts.
//!
//! Grounded in `_openapi_schema_to_jsonschema` in the reference
//! implementation: OpenAPI 3.0 predates `type: [T, "null"]` unions, so
//! `nullable: true` is rewritten into an `anyOf` branch, and a schema with
//! `properties` but no explicit `type` is treated as an implicit object.
//! Only the top-level node is translated — nested schemas under
//! `properties`/`items`/combinators are left as-is, matching the reference,
//! which does not recurse.

use serde_json::{json, Value};

pub fn openapi_schema_to_jsonschema(schema: &Value) -> Value {
    let Some(obj) = schema.as_object() else {
        return schema.clone();
    };

    let mut out = obj.clone();
    let nullable = out.remove("nullable").and_then(|v| v.as_bool()).unwrap_or(false);

    if !out.contains_key("type") && out.contains_key("properties") {
        out.insert("type".to_string(), json!("object"));
    }

    let mut value = Value::Object(out);
    if nullable {
        let without_null = value.clone();
        value = json!({"anyOf": [without_null, {"type": "null"}]});
    }
    value
}
