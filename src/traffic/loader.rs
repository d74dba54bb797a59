//! Traffic format dispatch.
//!
//! Grounded in `load_traffic` in the reference implementation: a `.har`
//! extension goes straight to the HAR parser; otherwise the file is tried
//! as a normalized JSON list first, then as a curl log, and an
//! unrecognized shape is a hard error.

use super::curl::parse_curl_log;
use super::har::parse_har;
use super::json_list::parse_json_list;
use super::record::TrafficRecord;
use crate::error::CliError;
use std::path::Path;

pub fn load_traffic(path: impl AsRef<Path>) -> anyhow::Result<Vec<TrafficRecord>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            anyhow::Error::new(CliError::TrafficNotFound(path.to_path_buf()))
        } else {
            anyhow::Error::new(e)
        }
    })?;

    let is_har = path.extension().and_then(|e| e.to_str()) == Some("har");
    if is_har {
        let value: serde_json::Value = serde_json::from_str(&content)?;
        let records = parse_har(&value)?;
        tracing::info!(count = records.len(), format = "har", "traffic loaded");
        return Ok(records);
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&content) {
        if value.is_array() {
            let records = parse_json_list(&value)?;
            tracing::info!(count = records.len(), format = "json", "traffic loaded");
            return Ok(records);
        }
    }

    if let Ok(records) = parse_curl_log(&content) {
        tracing::info!(count = records.len(), format = "curl-log", "traffic loaded");
        return Ok(records);
    }

    Err(CliError::UnsupportedTrafficFormat(path.display().to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn dispatches_json_list_by_content() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"[{{"method":"get","path":"/x","status":200}}]"#).unwrap();
        let records = load_traffic(f.path()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn dispatches_har_by_extension() {
        let mut f = tempfile::Builder::new().suffix(".har").tempfile().unwrap();
        write!(
            f,
            r#"{{"log":{{"entries":[{{"request":{{"method":"get","url":"http://a/x"}},"response":{{"status":200}}}}]}}}}"#
        )
        .unwrap();
        let records = load_traffic(f.path()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn dispatches_curl_log_as_fallback() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "curl http://a/x\nSTATUS: 200").unwrap();
        let records = load_traffic(f.path()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn unrecognized_shape_errors() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "not traffic at all").unwrap();
        let err = load_traffic(f.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::UnsupportedTrafficFormat(_))
        ));
    }
}
