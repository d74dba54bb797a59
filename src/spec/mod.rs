//! OpenAPI 3.0 spec loading, operation resolution, and `$ref`/JSON-Schema
//! translation.
//!
//! The spec tree is kept as a generic [`serde_json::Value`] rather than a
//! typed OpenAPI object model: the operation resolver and schema translator
//! both need to tolerate shapes (cyclic `$ref`s, a missing `type`, non-JSON
//! response status keys like `4XX`) that a strict parser would reject or
//! normalize away before we ever saw them.

mod load;
mod resolve;
mod schema;

pub use load::load_spec;
pub use resolve::{
    iter_operations, normalize_path, resolve_operation, resolve_schema, split_path,
    ResolvedOperation,
};
pub use schema::openapi_schema_to_jsonschema;
