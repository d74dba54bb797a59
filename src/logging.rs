//! Structured logging setup.
//!
//! A synchronous, single-shot CLI doesn't need the teacher repo's full
//! OpenTelemetry pipeline (exporters, sampling, redaction, async
//! non-blocking writers) — there's no inbound traffic to redact and no
//! long-lived process to export from. What's kept is the same
//! `EnvFilter`-driven verbosity knob via `RUST_LOG`.

use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,contract_tester=info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .try_init();
}
