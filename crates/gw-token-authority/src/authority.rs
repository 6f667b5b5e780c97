use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use gw_domain::config::TokenAuthorityConfig;
use gw_domain::model::{Grant, TokenType};
use gw_domain::{Error, Result, TraceEvent};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::claims::TokenClaims;
use crate::signer;

/// The result of a successful `validate` call (spec §4.1).
#[derive(Debug, Clone)]
pub struct ValidatedToken {
    pub identity: String,
    pub room_name: Option<String>,
    pub grants: std::collections::HashSet<Grant>,
    pub issued_at: chrono::DateTime<Utc>,
    pub expires_at: chrono::DateTime<Utc>,
}

struct StoredToken {
    claims: TokenClaims,
    token_string: String,
}

/// Mints, validates, and auto-renews capability tokens (spec §4.1).
///
/// Tokens are self-contained signed bearers (HMAC-SHA256), but the
/// authority additionally keeps a live-token store so it can answer
/// `tokens_by_room`, honor `revoke`, and drive auto-renewal — a revoked or
/// unknown `jti` fails validation even if the signature still checks out.
pub struct TokenAuthority {
    secret: Vec<u8>,
    config: TokenAuthorityConfig,
    live: RwLock<HashMap<Uuid, StoredToken>>,
}

impl TokenAuthority {
    pub fn new(secret: Vec<u8>, config: TokenAuthorityConfig) -> Arc<Self> {
        Arc::new(Self {
            secret,
            config,
            live: RwLock::new(HashMap::new()),
        })
    }

    pub fn mint(
        &self,
        token_type: TokenType,
        identity: &str,
        room_name: Option<String>,
        ttl_secs: Option<i64>,
        auto_renew: bool,
    ) -> Result<String> {
        let ttl = chrono::Duration::seconds(ttl_secs.unwrap_or(self.config.default_ttl_secs));
        let claims = TokenClaims::new(token_type, identity, room_name.clone(), ttl, auto_renew);
        let token_string = signer::encode(&claims, &self.secret)?;

        self.live.write().insert(
            claims.jti,
            StoredToken {
                claims: claims.clone(),
                token_string: token_string.clone(),
            },
        );

        tracing::info!(identity, room = ?room_name, jti = %claims.jti, "minted capability token");
        Ok(token_string)
    }

    pub fn validate(&self, token: &str) -> Result<ValidatedToken> {
        let claims = signer::decode(token, &self.secret)?;

        let live = self.live.read();
        let stored = live
            .get(&claims.jti)
            .ok_or_else(|| Error::Authentication("token has been revoked".into()))?;

        if stored.claims.is_expired(Utc::now()) {
            return Err(Error::Authentication("token has expired".into()));
        }

        // A renewal reissues the same `jti` with a fresh `issued_at`; a
        // presented token whose `issued_at` no longer matches the live
        // record is a stale copy from before rotation.
        if stored.claims.issued_at != claims.issued_at {
            return Err(Error::Authentication("token has been superseded by renewal".into()));
        }

        Ok(ValidatedToken {
            identity: stored.claims.identity.clone(),
            room_name: stored.claims.room_name.clone(),
            grants: stored.claims.grants.clone(),
            issued_at: stored.claims.issued_at,
            expires_at: stored.claims.expires_at,
        })
    }

    pub fn check_access(
        &self,
        token: &str,
        required_grants: &[Grant],
        room: Option<&str>,
    ) -> Result<()> {
        let validated = self.validate(token)?;

        if let Some(room) = room {
            if validated.room_name.as_deref() != Some(room) {
                return Err(Error::Authentication("token not scoped to this room".into()));
            }
        }

        let missing = !required_grants
            .iter()
            .all(|g| validated.grants.contains(g));
        if missing {
            return Err(Error::Authentication("token missing required grant".into()));
        }
        Ok(())
    }

    pub fn revoke(&self, identity: &str) {
        let mut live = self.live.write();
        live.retain(|_, t| t.claims.identity != identity);
        tracing::info!(identity, "revoked all tokens for identity");
    }

    pub fn tokens_by_room(&self, room_name: &str) -> Vec<String> {
        self.live
            .read()
            .values()
            .filter(|t| t.claims.room_name.as_deref() == Some(room_name))
            .map(|t| t.token_string.clone())
            .collect()
    }

    /// Runs one renewal pass: every live token within `renewal_headroom_minutes`
    /// of expiry and marked `auto_renew` is reminted in place (spec §4.1).
    /// Intended to be driven by a `tokio::time::interval` every
    /// `renewal_check_interval_secs`.
    pub fn renew_tick(&self) {
        let now = Utc::now();
        let due: Vec<Uuid> = self
            .live
            .read()
            .iter()
            .filter(|(_, t)| t.claims.needs_renewal(now, self.config.renewal_headroom_minutes))
            .map(|(jti, _)| *jti)
            .collect();

        for jti in due {
            let mut live = self.live.write();
            let Some(stored) = live.get(&jti) else { continue };

            let ttl = chrono::Duration::seconds(self.config.default_ttl_secs);
            let mut new_claims = stored.claims.clone();
            new_claims.issued_at = now;
            new_claims.expires_at = now + ttl;

            match signer::encode(&new_claims, &self.secret) {
                Ok(token_string) => {
                    let identity = new_claims.identity.clone();
                    let room = new_claims.room_name.clone();
                    live.insert(
                        jti,
                        StoredToken {
                            claims: new_claims,
                            token_string,
                        },
                    );
                    TraceEvent::TokenRenewed { identity, room }.emit();
                }
                Err(e) => {
                    TraceEvent::TokenRenewalFailed {
                        identity: stored.claims.identity.clone(),
                        reason: e.to_string(),
                    }
                    .emit();
                }
            }
        }

        live_gc(&self.live, now);
    }

    pub fn live_count(&self) -> usize {
        self.live.read().len()
    }

    /// Spawns the background renewal loop at `renewal_check_interval_secs`
    /// (spec §4.1: "every minute"), grounded on the periodic background
    /// tasks `sa-gateway::main` spawns at startup.
    pub fn spawn_renewal_loop(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let interval_secs = self.config.renewal_check_interval_secs;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
            loop {
                ticker.tick().await;
                self.renew_tick();
            }
        })
    }
}

/// Garbage-collect expired tokens that were never renewed (spec §4.1:
/// "expired tokens with no renewal are garbage-collected").
fn live_gc(live: &RwLock<HashMap<Uuid, StoredToken>>, now: chrono::DateTime<Utc>) {
    live.write().retain(|_, t| !t.claims.is_expired(now));
}

#[cfg(test)]
mod tests {
    use super::*;
    use gw_domain::config::TokenAuthorityConfig;

    fn authority() -> Arc<TokenAuthority> {
        TokenAuthority::new(b"test-secret".to_vec(), TokenAuthorityConfig::default())
    }

    #[test]
    fn mint_and_validate_round_trips() {
        let ta = authority();
        let token = ta
            .mint(TokenType::Participant, "agent-1", Some("voice-ai-call-1".into()), None, true)
            .unwrap();
        let validated = ta.validate(&token).unwrap();
        assert_eq!(validated.identity, "agent-1");
        assert!(validated.grants.contains(&Grant::CanPublish));
    }

    #[test]
    fn revoked_token_fails_validation() {
        let ta = authority();
        let token = ta.mint(TokenType::Admin, "op", None, None, false).unwrap();
        ta.revoke("op");
        assert!(ta.validate(&token).is_err());
    }

    #[test]
    fn check_access_enforces_room_scope() {
        let ta = authority();
        let token = ta
            .mint(TokenType::Participant, "agent-1", Some("voice-ai-call-1".into()), None, false)
            .unwrap();
        assert!(ta.check_access(&token, &[Grant::CanPublish], Some("voice-ai-call-1")).is_ok());
        assert!(ta.check_access(&token, &[Grant::CanPublish], Some("voice-ai-call-2")).is_err());
    }

    #[test]
    fn check_access_enforces_missing_grant() {
        let ta = authority();
        let token = ta.mint(TokenType::ViewOnly, "viewer", None, None, false).unwrap();
        assert!(ta.check_access(&token, &[Grant::CanPublish], None).is_err());
    }

    #[test]
    fn tokens_by_room_returns_matching_tokens() {
        let ta = authority();
        ta.mint(TokenType::Participant, "a", Some("room-1".into()), None, false)
            .unwrap();
        ta.mint(TokenType::Participant, "b", Some("room-2".into()), None, false)
            .unwrap();
        assert_eq!(ta.tokens_by_room("room-1").len(), 1);
        assert_eq!(ta.tokens_by_room("room-2").len(), 1);
        assert_eq!(ta.tokens_by_room("room-3").len(), 0);
    }

    #[test]
    fn renew_tick_reissues_tokens_within_headroom() {
        let mut config = TokenAuthorityConfig::default();
        config.renewal_headroom_minutes = 120; // force all tokens to qualify
        let ta = TokenAuthority::new(b"secret".to_vec(), config);
        let old_token = ta
            .mint(TokenType::Participant, "agent-1", None, Some(3600), true)
            .unwrap();

        ta.renew_tick();

        assert!(ta.validate(&old_token).is_err(), "stale token string should no longer verify against the renewed record");
        let room_tokens = ta.tokens_by_room_for_identity_test("agent-1");
        assert_eq!(room_tokens.len(), 1);
    }

    impl TokenAuthority {
        /// Test-only helper: list live token strings for an identity.
        fn tokens_by_room_for_identity_test(&self, identity: &str) -> Vec<String> {
            self.live
                .read()
                .values()
                .filter(|t| t.claims.identity == identity)
                .map(|t| t.token_string.clone())
                .collect()
        }
    }
}
