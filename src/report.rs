//! HTML report rendering.
//!
//! Grounded in `build_html_report` in the reference implementation. Kept as
//! a single `write!`-driven string builder rather than pulling in a
//! template engine (askama, minijinja, ...): the markup is fixed and small
//! enough that a template crate would add indirection without buying
//! anything the teacher's own string-formatting style doesn't already give
//! us (see `output.rs`'s ANSI wrapping for the same preference).

use crate::license::LicenseStatus;
use crate::validator::ValidationReport;
use std::fmt::Write as _;

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

/// `generated_at` is an ISO-8601 UTC timestamp string the caller stamps in
/// (the workflow around this module treats wall-clock time as an input, not
/// something computed deep inside a pure formatter).
pub fn build_html_report(report: &ValidationReport, license_status: &LicenseStatus, generated_at: &str) -> String {
    let demo_mode = !license_status.valid;

    let mut group_rows = String::new();
    for (key, messages) in &report.errors_grouped {
        let _ = writeln!(group_rows, "<li><strong>{}</strong> ({})</li>", escape_html(key), messages.len());
    }
    if group_rows.is_empty() {
        group_rows.push_str("<li>None</li>");
    }

    let mut rows = String::new();
    if !report.error_details.is_empty() {
        for item in &report.error_details {
            let _ = write!(rows, "<li>{}", escape_html(&item.message));
            if let Some(hint) = &item.hint {
                let _ = write!(rows, "<div class=\"hint\">Hint: {}</div>", escape_html(hint));
            }
            rows.push_str("</li>\n");
        }
    } else {
        for message in &report.errors {
            let _ = writeln!(rows, "<li>{}</li>", escape_html(message));
        }
    }
    if rows.is_empty() {
        rows.push_str("<li>None</li>");
    }

    let banner = if demo_mode {
        "<div class=\"banner\"><strong>Demo mode:</strong> report limited by license restrictions.</div>\n\
         <div class=\"promo\"><strong>Upgrade to Pro</strong>Remove demo limits, unlock unlimited reports, and export full results.</div>"
    } else {
        ""
    };

    format!(
        r#"<!doctype html>
<html>
<head>
  <meta charset="utf-8">
  <title>Contract Tester Report</title>
  <style>
    body {{ font-family: Arial, sans-serif; margin: 24px; color: #222; }}
    h1 {{ margin-bottom: 8px; }}
    .meta {{ margin-bottom: 16px; color: #555; }}
    .pill {{ display: inline-block; padding: 2px 8px; border-radius: 12px; background: #eee; }}
    .err {{ color: #b00020; }}
    .hint {{ color: #555; font-size: 0.9em; margin-top: 4px; }}
    .banner {{ padding: 10px 12px; border-radius: 6px; background: #fff3cd; color: #6b4f00; margin: 12px 0; }}
    .promo {{ padding: 12px; border-radius: 6px; background: #eef6ff; color: #123a6b; margin: 12px 0; }}
    .promo strong {{ display: block; margin-bottom: 4px; }}
  </style>
</head>
<body>
  <h1>Contract Tester Report</h1>
  {banner}
  <div class="meta">
    <span class="pill">Generated: {generated}Z</span>
  </div>
  <p><strong>Total checks:</strong> {total}</p>
  <p><strong>Errors:</strong> <span class="err">{error_count}</span></p>
  <p><strong>Stopped early:</strong> {stopped_early}</p>
  <h2>Error groups</h2>
  <ol>
    {group_rows}
  </ol>
  <h2>Errors</h2>
  <ol>
    {rows}
  </ol>
</body>
</html>
"#,
        banner = banner,
        generated = escape_html(generated_at),
        total = report.total_checks,
        error_count = report.error_count,
        stopped_early = report.stopped_early,
        group_rows = group_rows,
        rows = rows,
    )
}
