use std::collections::HashSet;

use chrono::{DateTime, Utc};
use gw_domain::model::{Grant, PublishSource, TokenType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The signed payload carried by a bearer token (spec §3 `CapabilityToken`,
/// plus the `jti` needed to look the live record up in the authority's store).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub jti: Uuid,
    pub identity: String,
    pub room_name: Option<String>,
    pub grants: HashSet<Grant>,
    pub publish_sources: HashSet<PublishSource>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub auto_renew: bool,
}

impl TokenClaims {
    pub fn new(
        token_type: TokenType,
        identity: impl Into<String>,
        room_name: Option<String>,
        ttl: chrono::Duration,
        auto_renew: bool,
    ) -> Self {
        let grant_set = token_type.grant_set();
        let now = Utc::now();
        Self {
            jti: Uuid::new_v4(),
            identity: identity.into(),
            room_name,
            grants: grant_set.grants,
            publish_sources: grant_set.publish_sources,
            issued_at: now,
            expires_at: now + ttl,
            auto_renew,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn needs_renewal(&self, now: DateTime<Utc>, headroom_minutes: i64) -> bool {
        self.auto_renew && self.expires_at - now <= chrono::Duration::minutes(headroom_minutes)
    }

    pub fn has_all_grants(&self, required: &[Grant]) -> bool {
        required.iter().all(|g| self.grants.contains(g))
    }
}
