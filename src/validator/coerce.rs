//! String-to-typed coercion for path/query/header parameter values.
//!
//! Traffic records carry parameter values as strings (that's what's actually
//! on the wire); the declared schema says what type they're supposed to be.
//! Grounded in `_coerce_value` in the reference implementation.

use serde_json::Value;

pub fn coerce_value(raw: &str, schema: &Value) -> Value {
    match schema.get("type").and_then(Value::as_str) {
        Some("array") => {
            let items: Vec<Value> = raw
                .split(',')
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_string()))
                .collect();
            Value::Array(items)
        }
        Some("integer") => raw
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        Some("number") => raw
            .parse::<f64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        Some("boolean") => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Value::Bool(true),
            "false" | "0" | "no" => Value::Bool(false),
            _ => Value::String(raw.to_string()),
        },
        _ => Value::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn array_splits_on_comma_and_drops_empties() {
        let out = coerce_value("a,,b,", &json!({"type": "array"}));
        assert_eq!(out, json!(["a", "b"]));
    }

    #[test]
    fn integer_parses_or_falls_back() {
        assert_eq!(coerce_value("42", &json!({"type": "integer"})), json!(42));
        assert_eq!(
            coerce_value("nope", &json!({"type": "integer"})),
            json!("nope")
        );
    }

    #[test]
    fn boolean_accepts_common_spellings() {
        for truthy in ["true", "1", "yes", "TRUE", "Yes"] {
            assert_eq!(coerce_value(truthy, &json!({"type": "boolean"})), json!(true));
        }
        for falsy in ["false", "0", "no"] {
            assert_eq!(coerce_value(falsy, &json!({"type": "boolean"})), json!(false));
        }
    }

    #[test]
    fn unrecognized_type_stays_string() {
        assert_eq!(coerce_value("x", &json!({"type": "string"})), json!("x"));
        assert_eq!(coerce_value("x", &json!({})), json!("x"));
    }
}
