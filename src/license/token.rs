//! License token wire format and cryptographic verification.
//!
//! Token shape: `CT1.<payload_b64url>.<sig_b64url>`, both halves URL-safe
//! base64 without padding. The signature covers the ASCII bytes of the
//! *encoded* payload string (not the decoded JSON bytes) — grounded in
//! `verify_license_key` in the reference implementation, which signs/verifies
//! over `payload_b64.encode("ascii")`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use base64::Engine;
use p256::ecdsa::signature::Verifier;
use p256::ecdsa::{Signature, VerifyingKey};
use p256::pkcs8::DecodePublicKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const LICENSE_PREFIX: &str = "CT1";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LicensePayload {
    #[serde(rename = "sub")]
    pub subject: Option<String>,
    pub plan: Option<String>,
    pub exp: Option<String>,
    pub nbf: Option<String>,
    pub jti: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    MalformedToken,
    BadSignature,
    InvalidPublicKey,
    InvalidPayload,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            TokenError::MalformedToken => "malformed license token",
            TokenError::BadSignature => "bad_signature",
            TokenError::InvalidPublicKey => "license verifier key is misconfigured",
            TokenError::InvalidPayload => "invalid license payload",
        };
        write!(f, "{msg}")
    }
}

/// SHA-256 hex digest of the full token string, used to match entries in a
/// revocation list that name tokens by fingerprint rather than `jti`.
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(digest)
}

/// Verify `token`'s structure and signature against `public_key_pem`,
/// returning the decoded payload on success.
pub fn verify_token(token: &str, public_key_pem: &str) -> Result<LicensePayload, TokenError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 || parts[0] != LICENSE_PREFIX {
        return Err(TokenError::MalformedToken);
    }
    let (payload_b64, sig_b64) = (parts[1], parts[2]);

    let sig_bytes = B64.decode(sig_b64).map_err(|_| TokenError::MalformedToken)?;
    let signature = Signature::from_slice(&sig_bytes).map_err(|_| TokenError::MalformedToken)?;

    let verifying_key = VerifyingKey::from_public_key_pem(public_key_pem)
        .map_err(|_| TokenError::InvalidPublicKey)?;

    verifying_key
        .verify(payload_b64.as_bytes(), &signature)
        .map_err(|_| TokenError::BadSignature)?;

    let payload_bytes = B64.decode(payload_b64).map_err(|_| TokenError::InvalidPayload)?;
    let payload: serde_json::Value =
        serde_json::from_slice(&payload_bytes).map_err(|_| TokenError::InvalidPayload)?;
    if !payload.is_object() {
        return Err(TokenError::InvalidPayload);
    }
    serde_json::from_value(payload).map_err(|_| TokenError::InvalidPayload)
}

#[cfg(test)]
pub mod test_support {
    //! Internal-only helpers for generating and signing test tokens.
    //! Not exposed outside the test suite: key generation and signing are
    //! deliberately kept off the CLI surface.

    use super::*;
    use p256::ecdsa::signature::Signer;
    use p256::ecdsa::{SigningKey, VerifyingKey};
    use p256::pkcs8::{EncodePrivateKey, EncodePublicKey};
    use rand_core::OsRng;

    pub struct TestKeypair {
        pub signing_key: SigningKey,
        pub public_key_pem: String,
    }

    pub fn generate_keypair() -> TestKeypair {
        let signing_key = SigningKey::random(&mut OsRng);
        let verifying_key = VerifyingKey::from(&signing_key);
        let public_key_pem = verifying_key
            .to_public_key_pem(Default::default())
            .expect("encode public key");
        TestKeypair {
            signing_key,
            public_key_pem,
        }
    }

    pub fn sign_payload(signing_key: &SigningKey, payload: &serde_json::Value) -> String {
        let payload_json = serde_json::to_vec(payload).expect("serialize payload");
        let payload_b64 = B64.encode(payload_json);
        let signature: p256::ecdsa::Signature = signing_key.sign(payload_b64.as_bytes());
        let sig_b64 = B64.encode(signature.to_bytes());
        format!("{LICENSE_PREFIX}.{payload_b64}.{sig_b64}")
    }

    #[allow(dead_code)]
    pub fn private_key_pem(signing_key: &SigningKey) -> String {
        signing_key
            .to_pkcs8_pem(Default::default())
            .expect("encode private key")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trips_a_valid_token() {
        let kp = generate_keypair();
        let token = sign_payload(&kp.signing_key, &json!({"sub": "acme", "plan": "pro"}));
        let payload = verify_token(&token, &kp.public_key_pem).unwrap();
        assert_eq!(payload.subject.as_deref(), Some("acme"));
    }

    #[test]
    fn tampered_payload_fails_signature_check() {
        let kp = generate_keypair();
        let token = sign_payload(&kp.signing_key, &json!({"sub": "acme"}));
        let mut parts: Vec<&str> = token.split('.').collect();
        let tampered_payload = B64.encode(br#"{"subject":"evil-corp"}"#);
        parts[1] = &tampered_payload;
        let tampered = parts.join(".");
        let err = verify_token(&tampered, &kp.public_key_pem).unwrap_err();
        assert_eq!(err, TokenError::BadSignature);
    }

    #[test]
    fn wrong_prefix_is_malformed() {
        let kp = generate_keypair();
        let token = sign_payload(&kp.signing_key, &json!({}));
        let bad = token.replacen("CT1", "XX1", 1);
        assert_eq!(verify_token(&bad, &kp.public_key_pem).unwrap_err(), TokenError::MalformedToken);
    }

    #[test]
    fn fingerprint_is_stable() {
        let a = token_fingerprint("CT1.abc.def");
        let b = token_fingerprint("CT1.abc.def");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }
}
