//! # contract-tester
//!
//! A local, offline contract-testing tool for OpenAPI 3.0 services: it
//! validates observed HTTP traffic against a spec, and diffs two spec
//! versions for breaking changes. Everything runs as a single synchronous
//! process against files on disk — no network calls, no daemon.
//!
//! ## Architecture
//!
//! - **[`spec`]** — OpenAPI 3.0 loading, operation resolution (path-template
//!   matching), and `$ref`/JSON-Schema translation.
//! - **[`traffic`]** — normalizes HAR archives, curl-command logs, and a
//!   plain JSON list into one [`traffic::TrafficRecord`] shape.
//! - **[`validator`]** — the schema validation engine: per-record parameter,
//!   request-body, and response-body checks against the resolved operation.
//! - **[`diff`]** — breaking-change detection between two spec versions via
//!   response-schema hashing.
//! - **[`license`]** — offline license-token verification and demo-mode
//!   fallbacks.
//! - **[`report`]** — HTML report rendering.
//! - **[`cli`]** — argument parsing and subcommand dispatch for the
//!   `contract-tester` binary.
//!
//! ## Quick start
//!
//! ```no_run
//! use contract_tester::spec::load_spec;
//! use contract_tester::traffic::load_traffic;
//! use contract_tester::validator::{validate_traffic_against_spec, ValidateOptions};
//!
//! let spec = load_spec("openapi.yaml").expect("failed to load spec");
//! let traffic = load_traffic("traffic.json").expect("failed to load traffic");
//! let report = validate_traffic_against_spec(&spec, &traffic, &ValidateOptions::default());
//! println!("{} checks, {} errors", report.total_checks, report.error_count);
//! ```

pub mod cli;
pub mod diff;
pub mod error;
pub mod license;
pub mod logging;
pub mod output;
pub mod report;
pub mod spec;
pub mod traffic;
pub mod validator;

pub use error::CliError;
pub use license::LicenseStatus;
pub use spec::load_spec;
pub use traffic::{load_traffic, TrafficRecord};
pub use validator::{validate_traffic_against_spec, ValidateOptions, ValidationReport};
