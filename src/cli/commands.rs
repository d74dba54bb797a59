//! `validate` and `diff` subcommands, plus the top-level `--version` /
//! `--license-status` flags.
//!
//! Grounded in `cli.py`'s `build_parser`/`_cmd_validate`/`_cmd_diff`/`main`:
//! same flag names, same demo-mode gating order, same exit codes, same
//! text/JSON output shapes.

use crate::error::CliError;
use crate::license::{exceeds_path_limit, get_license_status, truncate_traffic, DEMO_MAX_TRAFFIC};
use crate::output::{err, ok, strong, supports_color, warn};
use crate::report::build_html_report;
use crate::spec::load_spec;
use crate::traffic::load_traffic;
use crate::validator::{validate_traffic_against_spec, ValidateOptions};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "contract-tester", about = "Local API Contract Tester (MVP)", disable_version_flag = true)]
pub struct Cli {
    /// Print version and exit
    #[arg(long)]
    pub version: bool,

    /// Print license status and exit
    #[arg(long = "license-status")]
    pub license_status: bool,

    /// Output license status as JSON (use with --license-status)
    #[arg(long = "license-json")]
    pub license_json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate traffic against an OpenAPI spec
    Validate {
        /// Path to OpenAPI JSON/YAML
        #[arg(long)]
        spec: PathBuf,

        /// Path to HAR or normalized traffic JSON
        #[arg(long)]
        traffic: PathBuf,

        /// Ignore traffic entries that don't match any operation
        #[arg(long = "ignore-unknown")]
        ignore_unknown: bool,

        /// Write an HTML report to this path (default: report.html)
        #[arg(long, num_args = 0..=1, default_missing_value = "report.html")]
        report: Option<PathBuf>,

        /// Stop after this many errors (useful for large logs)
        #[arg(long = "max-errors")]
        max_errors: Option<i64>,

        /// Disable ANSI colors
        #[arg(long = "no-color")]
        no_color: bool,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Compare two OpenAPI specs for breaking changes
    Diff {
        /// Old spec
        #[arg(long)]
        old: PathBuf,

        /// New spec
        #[arg(long)]
        new: PathBuf,

        /// Disable ANSI colors
        #[arg(long = "no-color")]
        no_color: bool,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}

fn path_count(spec: &Value) -> usize {
    spec.get("paths").and_then(Value::as_object).map(|m| m.len()).unwrap_or(0)
}

fn cmd_validate(
    spec: PathBuf,
    traffic: PathBuf,
    ignore_unknown: bool,
    report: Option<PathBuf>,
    max_errors: Option<i64>,
    no_color: bool,
    as_json: bool,
) -> anyhow::Result<i32> {
    let color = supports_color() && !no_color;

    if let Some(n) = max_errors {
        if n <= 0 {
            return Err(CliError::InvalidMaxErrors.into());
        }
    }

    let spec_value = load_spec(&spec)?;
    let mut records = load_traffic(&traffic)?;
    let license_status = get_license_status();

    if !license_status.valid {
        println!("{}", warn(&format!("Demo mode: limiting traffic to {DEMO_MAX_TRAFFIC} entries."), color));
        truncate_traffic(&mut records);
        if exceeds_path_limit(path_count(&spec_value)) {
            eprintln!(
                "{}",
                err(
                    &format!("Demo mode: spec has more than {} paths. Add a license to run.", crate::license::DEMO_MAX_PATHS),
                    color
                )
            );
            return Ok(2);
        }
    }

    let options = ValidateOptions {
        max_errors: max_errors.map(|n| n as u32),
        ignore_unknown,
    };
    let result = validate_traffic_against_spec(&spec_value, &records, &options);

    if as_json {
        let mut value = serde_json::to_value(&result)?;
        if let Value::Object(map) = &mut value {
            map.insert("license_status".to_string(), serde_json::to_value(&license_status)?);
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{} {}", strong("Total checks:", color), result.total_checks);
        println!("{} {}", strong("Errors:", color), result.error_count);
        if result.stopped_early {
            println!("{}", warn("Stopped early due to max error limit.", color));
        }
        if result.error_count > 0 {
            if !result.errors_grouped.is_empty() {
                println!("\nTop error groups:");
                for (key, count) in result.top_groups(5) {
                    println!("- {key} ({count})");
                }
            }
            println!("\nTop errors:");
            for item in result.top_details(10) {
                match &item.hint {
                    Some(hint) => println!("- {} (hint: {})", item.message, hint),
                    None => println!("- {}", item.message),
                }
            }
        }
    }

    if let Some(path) = &report {
        let generated_at = chrono::Utc::now().to_rfc3339();
        let html = build_html_report(&result, &license_status, &generated_at);
        std::fs::write(path, html)?;
        if !as_json {
            println!("\nReport written to {}", path.display());
        }
    }

    Ok(if result.error_count > 0 { 1 } else { 0 })
}

fn cmd_diff(old: PathBuf, new: PathBuf, no_color: bool, as_json: bool) -> anyhow::Result<i32> {
    let color = supports_color() && !no_color;

    let old_spec = load_spec(&old)?;
    let new_spec = load_spec(&new)?;
    let license_status = get_license_status();

    if !license_status.valid {
        let old_paths = path_count(&old_spec);
        let new_paths = path_count(&new_spec);
        if exceeds_path_limit(old_paths.max(new_paths)) {
            eprintln!(
                "{}",
                err(
                    &format!("Demo mode: specs have more than {} paths. Add a license to run.", crate::license::DEMO_MAX_PATHS),
                    color
                )
            );
            return Ok(2);
        }
        println!(
            "{}",
            warn(
                &format!("Demo mode: limited to specs with up to {} paths.", crate::license::DEMO_MAX_PATHS),
                color
            )
        );
    }

    let diff = crate::diff::diff_specs(&old_spec, &new_spec);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&json!({"breaking_changes": diff.breaking_changes}))?);
    } else {
        println!("{}", strong("Breaking changes:", color));
        if diff.breaking_changes.is_empty() {
            println!("- {}", ok("None", color));
        } else {
            for item in &diff.breaking_changes {
                println!("- {item}");
            }
        }
    }

    Ok(if diff.breaking_changes.is_empty() { 0 } else { 1 })
}

fn cmd_license_status(as_json: bool, color: bool) -> i32 {
    let status = get_license_status();
    if as_json {
        println!("{}", serde_json::to_string_pretty(&status).unwrap_or_default());
        return if status.valid { 0 } else { 1 };
    }
    if status.valid {
        let suffix = status.expires_on.as_deref().map(|e| format!(" (expires {e})")).unwrap_or_default();
        println!("{}", ok(&format!("License: valid{suffix}"), color));
        return 0;
    }
    println!("{}", warn(&format!("License: demo mode [{}] {}", status.code, status.message), color));
    1
}

/// Runs the parsed CLI to completion and returns the process exit code.
///
/// Operational failures (`Err`) are left for the caller to map to exit code
/// 2; this function only returns an `Ok` exit code for conditions the CLI
/// itself decides on (no errors / errors found / demo-cap refusal).
pub fn run_cli(cli: Cli) -> anyhow::Result<i32> {
    let color = supports_color() && !matches!(&cli.command, Some(Commands::Validate { no_color: true, .. }) | Some(Commands::Diff { no_color: true, .. }));

    if cli.version {
        let status = get_license_status();
        let tag = if status.valid { "licensed" } else { "demo" };
        println!("contract-tester {} ({tag})", env!("CARGO_PKG_VERSION"));
        return Ok(0);
    }

    if cli.license_status {
        return Ok(cmd_license_status(cli.license_json, color));
    }

    match cli.command {
        Some(Commands::Validate {
            spec,
            traffic,
            ignore_unknown,
            report,
            max_errors,
            no_color,
            json,
        }) => cmd_validate(spec, traffic, ignore_unknown, report, max_errors, no_color, json),
        Some(Commands::Diff { old, new, no_color, json }) => cmd_diff(old, new, no_color, json),
        None => {
            eprintln!("{}", err("error: the following arguments are required: command", color));
            Ok(2)
        }
    }
}
