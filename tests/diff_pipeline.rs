#![allow(clippy::unwrap_used, clippy::expect_used)]

use contract_tester::diff::diff_specs;
use contract_tester::load_spec;
use std::io::Write;

fn write_temp(content: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(f, "{content}").unwrap();
    f
}

#[test]
fn end_to_end_diff_flags_removed_operation_and_schema_change() {
    let old = write_temp(
        r#"{"paths":{
            "/users/{id}": {"get": {"responses": {"200": {"content": {"application/json": {"schema": {
                "type": "object", "properties": {"id": {"type": "integer"}}
            }}}}}}},
            "/users": {"get": {"responses": {"200": {}}}}
        }}"#,
    );
    let new = write_temp(
        r#"{"paths":{
            "/users/{id}": {"get": {"responses": {"200": {"content": {"application/json": {"schema": {
                "type": "object", "properties": {"id": {"type": "string"}}
            }}}}}}}
        }}"#,
    );

    let old_spec = load_spec(old.path()).unwrap();
    let new_spec = load_spec(new.path()).unwrap();
    let diff = diff_specs(&old_spec, &new_spec);

    assert!(diff.breaking_changes.iter().any(|c| c.contains("Removed operation GET /users")));
    assert!(diff.breaking_changes.iter().any(|c| c.contains("Schema changed GET /users/{id} 200")));
}

#[test]
fn end_to_end_diff_of_identical_specs_loaded_from_yaml_is_clean() {
    let mut old = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    write!(old, "paths:\n  /x:\n    get:\n      responses:\n        '200': {{}}\n").unwrap();
    let mut new = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    write!(new, "paths:\n  /x:\n    get:\n      responses:\n        '200': {{}}\n").unwrap();

    let old_spec = load_spec(old.path()).unwrap();
    let new_spec = load_spec(new.path()).unwrap();
    let diff = diff_specs(&old_spec, &new_spec);

    assert!(diff.breaking_changes.is_empty());
}
