//! HMAC-SHA256 signature and replay-window verification (spec §4.5).
//!
//! Grounded on `sa-gateway::api::webhooks::trigger_webhook`'s
//! `sha256=<hex>` header convention and constant-time comparison; extended
//! with the spec's required timestamp replay window.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Accepted,
    /// Secret is configured as empty on purpose; verification skipped.
    SkippedNoSecret,
    BadSignature,
    StaleTimestamp,
}

/// Verifies `x-livekit-signature: sha256=<hex>` over the raw body, and,
/// when present, rejects a `x-livekit-timestamp` older than
/// `max_event_age_secs` (spec §4.5 replay protection).
pub fn verify(
    secret: &str,
    signature_header: Option<&str>,
    timestamp_header: Option<&str>,
    body: &[u8],
    max_event_age_secs: i64,
) -> VerifyOutcome {
    if secret.is_empty() {
        return VerifyOutcome::SkippedNoSecret;
    }

    let Some(sig_header) = signature_header else {
        return VerifyOutcome::BadSignature;
    };
    let sig_hex = sig_header.strip_prefix("sha256=").unwrap_or(sig_header);

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return VerifyOutcome::BadSignature;
    };
    mac.update(body);
    let computed = hex::encode(mac.finalize().into_bytes());

    if computed.as_bytes().ct_eq(sig_hex.as_bytes()).unwrap_u8() != 1 {
        return VerifyOutcome::BadSignature;
    }

    if let Some(ts_header) = timestamp_header {
        match ts_header.parse::<i64>() {
            Ok(ts) => {
                let age = Utc::now().timestamp() - ts;
                if age.abs() > max_event_age_secs {
                    return VerifyOutcome::StaleTimestamp;
                }
            }
            Err(_) => return VerifyOutcome::BadSignature,
        }
    }

    VerifyOutcome::Accepted
}
