//! Remediation hints keyed off a finding's grouping-key prefix.
//!
//! Grounded in `_default_hint` in the reference implementation. Checks run
//! in the same order as the reference, which means `request.body.schema`
//! is tested before `request.body.schema_missing` — since the former is a
//! prefix of the latter, a `request.body.schema_missing|...` key actually
//! matches the `request.body.schema` branch and gets its hint instead.
//! Preserved verbatim rather than "fixed": it's a harmless quirk, and
//! deviating would no longer be grounded in anything.
pub fn default_hint(key: &str) -> Option<&'static str> {
    if key.starts_with("operation.missing") {
        Some("Add the endpoint/method to the OpenAPI spec or filter this traffic.")
    } else if key.starts_with("request.param.missing") {
        Some("Add the required parameter to the request or mark it optional in the spec.")
    } else if key.starts_with("request.param.invalid") {
        Some("Ensure the parameter value matches the schema type/format.")
    } else if key.starts_with("request.body.missing") {
        Some("Send a request body or mark it optional in the spec.")
    } else if key.starts_with("request.body.invalid_json") {
        Some("Send valid JSON for this request or adjust the content type.")
    } else if key.starts_with("request.body.schema") {
        Some("Update the request body to match the schema or adjust the schema.")
    } else if key.starts_with("response.schema_missing") {
        Some("Add a response schema for this status code in the spec.")
    } else if key.starts_with("response.schema_mismatch") {
        Some("Compare the response payload to the schema and fix fields/types.")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_prefixes_return_hints() {
        assert!(default_hint("operation.missing").is_some());
        assert!(default_hint("request.param.missing|GET|/x").is_some());
        assert!(default_hint("response.schema_mismatch|GET|/x|200").is_some());
    }

    #[test]
    fn schema_missing_matches_the_broader_schema_prefix_first() {
        let hint = default_hint("request.body.schema_missing|GET|/x").unwrap();
        assert_eq!(hint, "Update the request body to match the schema or adjust the schema.");
    }

    #[test]
    fn unknown_prefix_returns_none() {
        assert!(default_hint("operation.invalid_traffic_entry").is_none());
    }
}
