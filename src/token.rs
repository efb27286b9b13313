// src/token.rs
// Pass token mint/verify and identifier-fragment sanitization. A token
// proves one completed verification pass to the redirect assembler; the
// fragment is the tracking identifier carried across the hop.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

/// Everything except unreserved URL characters gets percent-encoded.
const FRAGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PassToken {
    pub client_id: String,
    pub issued_at: u64,
    pub expires_at: u64,
    pub nonce: u64,
}

fn gate_token_secret() -> String {
    std::env::var("GATE_TOKEN_SECRET").unwrap_or_else(|_| "changeme-gate-secret".to_string())
}

fn sign_payload(payload: &str) -> Vec<u8> {
    let secret = gate_token_secret();
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(payload.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

fn verify_signature(payload: &str, sig: &[u8]) -> bool {
    let secret = gate_token_secret();
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(payload.as_bytes());
    mac.verify_slice(sig).is_ok()
}

/// Mints a signed `payload_b64.sig_b64` token for a passed verification.
pub fn mint_pass_token(client_id: &str, ttl_seconds: u64) -> String {
    mint_pass_token_at(client_id, ttl_seconds, now_ms())
}

pub(crate) fn mint_pass_token_at(client_id: &str, ttl_seconds: u64, now_ms: u64) -> String {
    let token = PassToken {
        client_id: client_id.to_string(),
        issued_at: now_ms,
        expires_at: now_ms + ttl_seconds * 1000,
        nonce: rand::thread_rng().gen(),
    };
    let payload_json = match serde_json::to_string(&token) {
        Ok(json) => json,
        Err(_) => return String::new(),
    };
    let sig = sign_payload(&payload_json);
    let payload_b64 = general_purpose::STANDARD.encode(payload_json.as_bytes());
    let sig_b64 = general_purpose::STANDARD.encode(sig);
    format!("{}.{}", payload_b64, sig_b64)
}

/// Parses and verifies a pass token: shape, signature, then expiry.
pub fn verify_pass_token(token: &str) -> Result<PassToken, &'static str> {
    verify_pass_token_at(token, now_ms())
}

pub(crate) fn verify_pass_token_at(token: &str, now_ms: u64) -> Result<PassToken, &'static str> {
    let mut parts = token.splitn(2, '.');
    let payload_b64 = parts.next().ok_or("missing payload")?;
    let sig_b64 = parts.next().ok_or("missing signature")?;
    let payload_bytes = general_purpose::STANDARD
        .decode(payload_b64.as_bytes())
        .map_err(|_| "invalid payload")?;
    let sig = general_purpose::STANDARD
        .decode(sig_b64.as_bytes())
        .map_err(|_| "invalid signature")?;
    let payload_json = String::from_utf8(payload_bytes).map_err(|_| "invalid payload")?;

    if !verify_signature(&payload_json, &sig) {
        return Err("signature mismatch");
    }

    let token: PassToken =
        serde_json::from_str(&payload_json).map_err(|_| "invalid payload")?;
    if now_ms >= token.expires_at {
        return Err("token expired");
    }
    Ok(token)
}

/// Sanitizes the carried identifier fragment: trimmed, length-capped, then
/// percent-encoded so it can ride a URL fragment untouched. `None` means
/// "carry nothing" rather than an error.
pub fn sanitize_identifier_fragment(raw: &str, max_len: usize) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().count() > max_len {
        return None;
    }
    Some(utf8_percent_encode(trimmed, FRAGMENT_ENCODE_SET).to_string())
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
