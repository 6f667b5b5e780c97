//! Wire encoding for bearer tokens: `base64(json claims).hex(hmac-sha256)`.
//!
//! Grounded on the HMAC-SHA256 + constant-time-compare pattern in
//! `sa-gateway::api::webhooks::trigger_webhook`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use gw_domain::{Error, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::claims::TokenClaims;

type HmacSha256 = Hmac<Sha256>;

pub fn encode(claims: &TokenClaims, secret: &[u8]) -> Result<String> {
    let json = serde_json::to_vec(claims)?;
    let payload = URL_SAFE_NO_PAD.encode(&json);

    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|e| Error::Internal(e.to_string()))?;
    mac.update(payload.as_bytes());
    let sig = hex::encode(mac.finalize().into_bytes());

    Ok(format!("{payload}.{sig}"))
}

pub fn decode(token: &str, secret: &[u8]) -> Result<TokenClaims> {
    let (payload, sig_hex) = token
        .split_once('.')
        .ok_or_else(|| Error::Authentication("malformed token".into()))?;

    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|e| Error::Internal(e.to_string()))?;
    mac.update(payload.as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    if expected.as_bytes().ct_eq(sig_hex.as_bytes()).unwrap_u8() != 1 {
        return Err(Error::Authentication("invalid token signature".into()));
    }

    let json = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| Error::Authentication(format!("malformed token payload: {e}")))?;
    let claims: TokenClaims = serde_json::from_slice(&json)?;
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gw_domain::model::TokenType;

    #[test]
    fn round_trips_claims() {
        let claims = TokenClaims::new(
            TokenType::Participant,
            "agent-1",
            Some("voice-ai-call-1".into()),
            chrono::Duration::hours(1),
            true,
        );
        let token = encode(&claims, b"secret").unwrap();
        let decoded = decode(&token, b"secret").unwrap();
        assert_eq!(decoded.jti, claims.jti);
        assert_eq!(decoded.identity, "agent-1");
    }

    #[test]
    fn rejects_tampered_signature() {
        let claims = TokenClaims::new(TokenType::ViewOnly, "viewer", None, chrono::Duration::hours(1), false);
        let mut token = encode(&claims, b"secret").unwrap();
        token.push('0');
        assert!(decode(&token, b"secret").is_err());
    }

    #[test]
    fn rejects_wrong_secret() {
        let claims = TokenClaims::new(TokenType::Admin, "op", None, chrono::Duration::hours(1), false);
        let token = encode(&claims, b"secret-a").unwrap();
        assert!(decode(&token, b"secret-b").is_err());
    }
}
