//! Traffic ingestion: normalizes HAR archives, curl-command logs, and a
//! plain JSON list into a single [`TrafficRecord`] shape the validator
//! consumes.

mod curl;
mod har;
mod json_list;
mod loader;
mod record;
mod util;

pub use loader::load_traffic;
pub use record::{Presence, QueryValue, TrafficRecord};
