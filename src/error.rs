//! Operational error types.
//!
//! Mirrors the two-family error model: a small set of expected, named
//! failures the CLI can report with a clean exit code, versus everything
//! else bubbled up through `anyhow` as an "unexpected error".

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("spec file not found: {0}")]
    SpecNotFound(PathBuf),

    #[error("traffic file not found: {0}")]
    TrafficNotFound(PathBuf),

    #[error("failed to parse spec {path}: {source}")]
    SpecParse {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("spec has no top-level 'paths' object")]
    SpecMissingPaths,

    #[error("unsupported traffic format: {0}")]
    UnsupportedTrafficFormat(String),

    #[error("--max-errors must be a positive integer")]
    InvalidMaxErrors,

    #[error("too many paths ({found}) for the demo license (limit {limit})")]
    DemoPathLimitExceeded { found: usize, limit: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
