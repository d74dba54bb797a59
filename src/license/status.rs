//! License key discovery and status resolution.
//!
//! Grounded in `load_license_key`/`verify_license_key`/`get_license_status`
//! in the reference implementation. Resolution order for the raw token: an
//! env var carrying the token text, then an env var naming a file, then
//! `./license.key`, then `~/.contract_tester/license.key`. Revocation is
//! checked before expiry — an explicit Open Question resolution, since a
//! revoked-but-not-yet-expired token must still be rejected.

use super::revocation::load_revocations;
use super::token::{verify_token, LicensePayload, TokenError};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;

const ENV_LICENSE_TOKEN: &str = "CONTRACT_TESTER_LICENSE";
const ENV_LICENSE_FILE: &str = "CONTRACT_TESTER_LICENSE_FILE";
const LICENSE_FILE: &str = "license.key";
const ENV_PUBLIC_KEY: &str = "CONTRACT_TESTER_LICENSE_PUBLIC_KEY";

/// Ships with the binary so a license can always be checked offline.
/// Replace with your own P-256 public key when deploying for real.
const DEFAULT_PUBLIC_KEY_PEM: &str = "-----BEGIN PUBLIC KEY-----\n\
MFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAEQPHe9hx05EchvtxXxT0KDfehNGAI\n\
oLEwmJKj3r2Atv4bG0O3i6PqsmsfYaY5wOhQLNn2NqXJ6nafzqUMykRlEA==\n\
-----END PUBLIC KEY-----\n";

fn public_key_pem() -> String {
    std::env::var(ENV_PUBLIC_KEY).unwrap_or_else(|_| DEFAULT_PUBLIC_KEY_PEM.to_string())
}

#[derive(Debug, Clone, Serialize)]
pub struct LicenseStatus {
    pub valid: bool,
    pub code: String,
    pub message: String,
    pub source: Option<String>,
    pub key: Option<String>,
    pub expires_on: Option<String>,
    pub subject: Option<String>,
    pub plan: Option<String>,
}

impl LicenseStatus {
    fn new(valid: bool, code: &str, message: impl Into<String>) -> Self {
        Self {
            valid,
            code: code.to_string(),
            message: message.into(),
            source: None,
            key: None,
            expires_on: None,
            subject: None,
            plan: None,
        }
    }

    fn with_expiry(mut self, expires_on: Option<String>) -> Self {
        self.expires_on = expires_on;
        self
    }
}

fn license_locations() -> Vec<PathBuf> {
    let mut locations = vec![PathBuf::from(LICENSE_FILE)];
    if let Some(home) = dirs::home_dir() {
        locations.push(home.join(".contract_tester").join(LICENSE_FILE));
    }
    locations
}

fn read_key(path: &std::path::Path) -> Option<String> {
    let raw = std::fs::read_to_string(path).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Returns (token text, source label) for diagnostics. `source` is `"env"`
/// when the token text or the path naming it came from the environment,
/// `"file"` when it was found on disk via the fixed fallback locations.
fn load_license_key() -> (Option<String>, Option<String>) {
    if let Ok(token) = std::env::var(ENV_LICENSE_TOKEN) {
        let trimmed = token.trim();
        if !trimmed.is_empty() {
            return (Some(trimmed.to_string()), Some("env".to_string()));
        }
    }

    if let Ok(path) = std::env::var(ENV_LICENSE_FILE) {
        if let Some(key) = read_key(std::path::Path::new(&path)) {
            return (Some(key), Some("file".to_string()));
        }
    }

    for path in license_locations() {
        if let Some(key) = read_key(&path) {
            return (Some(key), Some("file".to_string()));
        }
    }

    (None, None)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn verify_license_key(key: Option<&str>) -> LicenseStatus {
    let Some(token) = key else {
        return LicenseStatus::new(false, "missing_key", "No license key found. Running in demo mode.");
    };

    let payload: LicensePayload = match verify_token(token, &public_key_pem()) {
        Ok(payload) => payload,
        Err(TokenError::MalformedToken) => {
            return LicenseStatus::new(false, "malformed", "License key format is invalid.");
        }
        Err(TokenError::BadSignature) => {
            return LicenseStatus::new(false, "bad_signature", "License signature verification failed.");
        }
        Err(TokenError::InvalidPublicKey) => {
            return LicenseStatus::new(false, "invalid_public_key", "License verifier key is misconfigured.");
        }
        Err(TokenError::InvalidPayload) => {
            return LicenseStatus::new(false, "invalid_payload", "License payload is invalid JSON.");
        }
    };

    let revocations = load_revocations();
    let fingerprint = super::token::token_fingerprint(token);
    let revoked = revocations.contains(&fingerprint)
        || payload.jti.as_ref().map(|jti| revocations.contains(jti)).unwrap_or(false);
    if revoked {
        return LicenseStatus::new(false, "revoked", "License has been revoked.");
    }

    let Some(exp_date) = payload.exp.as_deref().and_then(parse_date) else {
        return LicenseStatus::new(false, "invalid_payload", "License missing required expiry date.");
    };

    let nbf_date = match payload.nbf.as_deref() {
        None => None,
        Some(nbf) => match parse_date(nbf) {
            Some(d) => Some(d),
            None => return LicenseStatus::new(false, "invalid_payload", "License start date must use YYYY-MM-DD."),
        },
    };

    let today = chrono::Utc::now().date_naive();
    let exp_iso = exp_date.format("%Y-%m-%d").to_string();

    if let Some(nbf_date) = nbf_date {
        if today < nbf_date {
            return LicenseStatus::new(
                false,
                "not_yet_valid",
                format!("License starts on {}.", nbf_date.format("%Y-%m-%d")),
            )
            .with_expiry(Some(exp_iso));
        }
    }

    if today > exp_date {
        return LicenseStatus::new(false, "expired", format!("License expired on {exp_iso}.")).with_expiry(Some(exp_iso));
    }

    LicenseStatus {
        valid: true,
        code: "ok".to_string(),
        message: "License is valid.".to_string(),
        source: None,
        key: None,
        expires_on: Some(exp_iso),
        subject: payload.subject,
        plan: payload.plan,
    }
}

pub fn get_license_status() -> LicenseStatus {
    let (key, source) = load_license_key();
    let mut status = verify_license_key(key.as_deref());
    status.source = source;
    status.key = if status.valid { key } else { None };
    status
}
