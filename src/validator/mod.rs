//! The schema validation engine: caching, parameter coercion, remediation
//! hints, and the per-record validation algorithm.

mod cache;
mod coerce;
mod engine;
mod hints;
mod issue;

pub use cache::{CompiledValidatorCache, ResolvedSchemaCache};
pub use engine::{validate_traffic_against_spec, ValidateOptions};
pub use issue::{ErrorDetail, ValidationReport};
