//! # CLI module
//!
//! Command-line surface for the contract tester: argument parsing (via
//! `clap`), and the `validate`/`diff` subcommand implementations.
//!
//! ## Commands
//!
//! - `validate --spec PATH --traffic PATH [--ignore-unknown] [--report [PATH]]
//!   [--max-errors N] [--no-color] [--json]` — validates observed traffic
//!   against an OpenAPI spec, exit `0`/`1`/`2`.
//! - `diff --old PATH --new PATH [--no-color] [--json]` — compares two specs
//!   for breaking changes, exit `0`/`1`/`2`.
//!
//! Top-level flags `--version`, `--license-status` (optional
//! `--license-json`) short-circuit subcommand dispatch.

mod commands;


pub use commands::{run_cli, Cli, Commands};
