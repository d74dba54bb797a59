//! Curl-log traffic parser.
//!
//! Grounded in `_parse_curl_log` in the reference implementation: the log
//! is a sequence of blocks, each starting with a line beginning `curl `,
//! optionally followed by raw response lines and a sentinel line reporting
//! the status code (`HTTPSTATUS:200` or `STATUS: 200`). A block without a
//! status sentinel or a URL is dropped silently.

use super::record::{Presence, TrafficRecord};
use super::util::{parse_path_and_query, split_body_json_text, strip_http_headers};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

fn status_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(HTTPSTATUS|STATUS):\s*(\d{3})").expect("valid regex"))
}

struct CurlCommand {
    method: String,
    url: String,
    headers: BTreeMap<String, String>,
    body: Option<String>,
}

/// Tokens from `shell_words::split`. Only `-X/--request` sets the method
/// (default `GET`); there is no data-implies-POST inference, matching the
/// reference implementation.
fn parse_curl_command(tokens: &[String]) -> Option<CurlCommand> {
    let mut method = "GET".to_string();
    let mut url = None;
    let mut headers = BTreeMap::new();
    let mut body: Option<String> = None;

    let mut i = 0;
    while i < tokens.len() {
        match tokens[i].as_str() {
            "-X" | "--request" => {
                if let Some(m) = tokens.get(i + 1) {
                    method = m.to_ascii_uppercase();
                }
                i += 2;
            }
            "-H" | "--header" => {
                if let Some(h) = tokens.get(i + 1) {
                    if let Some((k, v)) = h.split_once(':') {
                        let k = k.trim().to_ascii_lowercase();
                        if !k.is_empty() {
                            headers.insert(k, v.trim().to_string());
                        }
                    }
                }
                i += 2;
            }
            "-d" | "--data" | "--data-raw" | "--data-binary" => {
                if let Some(d) = tokens.get(i + 1) {
                    body = Some(d.clone());
                }
                i += 2;
            }
            "curl" => {
                i += 1;
            }
            other if other.starts_with("http://") || other.starts_with("https://") => {
                if url.is_none() {
                    url = Some(other.to_string());
                }
                i += 1;
            }
            _ => {
                i += 1;
            }
        }
    }

    url.map(|url| CurlCommand { method, url, headers, body })
}

pub fn parse_curl_log(text: &str) -> anyhow::Result<Vec<TrafficRecord>> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    for line in text.lines() {
        if line.trim_start().starts_with("curl ") {
            blocks.push(vec![line]);
        } else if let Some(block) = blocks.last_mut() {
            block.push(line);
        }
    }

    if blocks.is_empty() {
        anyhow::bail!("no curl commands found in traffic log");
    }

    let mut records = Vec::with_capacity(blocks.len());
    for block in blocks {
        let command_line = block[0];
        let body_lines = &block[1..];

        let Ok(tokens) = shell_words::split(command_line) else {
            continue;
        };
        let Some(command) = parse_curl_command(&tokens) else {
            continue;
        };

        // Keep the *last* matching sentinel line, matching the reference's
        // loop that reassigns `status`/`status_idx` on every match rather
        // than stopping at the first one.
        let mut status: Option<u16> = None;
        let mut status_idx: Option<usize> = None;
        for (i, line) in body_lines.iter().enumerate() {
            if let Some(m) = status_regex().captures(line) {
                if let Some(parsed) = m.get(2).and_then(|g| g.as_str().parse::<u16>().ok()) {
                    status = Some(parsed);
                    status_idx = Some(i);
                }
            }
        }
        let Some(status) = status else {
            continue;
        };
        let status_idx = status_idx.expect("status_idx set alongside status");

        let body_joined = body_lines[..status_idx].join("\n");
        let body_section = strip_http_headers(body_joined.trim());
        let trimmed_body = body_section.trim();
        let response_json = if trimmed_body.is_empty() {
            Presence::Absent
        } else {
            serde_json::from_str(trimmed_body).map(Presence::Present).unwrap_or(Presence::Absent)
        };

        let (path, query) = parse_path_and_query(&command.url);
        let request_content_type = command.headers.get("content-type").cloned();
        let (request_json, request_text) = match &command.body {
            None => (Presence::Absent, None),
            Some(raw) => split_body_json_text(raw, request_content_type.as_deref()),
        };

        records.push(TrafficRecord {
            method: command.method,
            path,
            status: Some(status),
            response_json,
            query,
            headers: command.headers,
            request_json,
            request_text,
            request_content_type,
        });
    }
    Ok(records)
}
