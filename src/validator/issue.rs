//! The validation report shape returned by [`super::validate_traffic_against_spec`].
//!
//! Mirrors the reference implementation's return dict exactly: `errors` is a
//! flat list of human messages in traffic-record order; `errors_grouped`
//! fans the same messages out by grouping key, preserving first-seen key
//! order; `error_details` carries one structured record per error (key,
//! message, optional remediation hint) in the same order as `errors`.

use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub key: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub total_checks: usize,
    pub error_count: usize,
    pub errors: Vec<String>,
    pub errors_grouped: IndexMap<String, Vec<String>>,
    pub error_details: Vec<ErrorDetail>,
    pub stopped_early: bool,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_check(&mut self) {
        self.total_checks += 1;
    }

    /// Record one error under `key`, attaching `hint` if given, or else the
    /// canonical hint for `key`'s prefix.
    pub fn add_error(&mut self, key: impl Into<String>, message: impl Into<String>, hint: Option<String>) {
        let key = key.into();
        let message = message.into();
        let hint = hint.or_else(|| super::hints::default_hint(&key).map(str::to_string));

        self.errors.push(message.clone());
        self.errors_grouped.entry(key.clone()).or_default().push(message.clone());
        self.error_details.push(ErrorDetail { key, message, hint });
        self.error_count += 1;
    }

    pub fn over_limit(&self, max_errors: Option<u32>) -> bool {
        max_errors.map(|limit| self.error_count as u32 >= limit).unwrap_or(false)
    }

    /// The first `n` grouping keys in first-seen order, each paired with its
    /// error count, for summary output — matches the reference CLI's
    /// `list(grouped.keys())[:n]`, which does not re-sort by count.
    pub fn top_groups(&self, n: usize) -> Vec<(&String, usize)> {
        self.errors_grouped.iter().take(n).map(|(k, v)| (k, v.len())).collect()
    }

    pub fn top_details(&self, n: usize) -> &[ErrorDetail] {
        let end = self.error_details.len().min(n);
        &self.error_details[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouped_values_concatenated_equal_errors_as_a_multiset() {
        let mut report = ValidationReport::new();
        report.add_error("operation.missing", "a", None);
        report.add_error("request.param.missing|GET|/x", "b", None);
        report.add_error("operation.missing", "c", None);

        let mut grouped_flat: Vec<&String> = report.errors_grouped.values().flatten().collect();
        let mut errors_flat: Vec<&String> = report.errors.iter().collect();
        grouped_flat.sort();
        errors_flat.sort();
        assert_eq!(grouped_flat, errors_flat);
        assert_eq!(report.errors_grouped.keys().next().unwrap(), "operation.missing");
    }

    #[test]
    fn every_error_gets_a_detail_entry() {
        let mut report = ValidationReport::new();
        report.add_error("response.schema_mismatch|GET|/users/{id}|200", "mismatch", None);
        assert_eq!(report.error_details.len(), 1);
        assert_eq!(
            report.error_details[0].hint.as_deref(),
            Some("Compare the response payload to the schema and fix fields/types.")
        );
    }
}
