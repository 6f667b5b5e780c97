use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single capability a token may carry (spec §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grant {
    RoomJoin,
    RoomCreate,
    RoomList,
    RoomAdmin,
    RoomRecord,
    IngressAdmin,
    CanPublish,
    CanSubscribe,
    CanPublishData,
    CanUpdateOwnMetadata,
}

/// Audio/video sources a participant may publish (spec §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishSource {
    Microphone,
    Camera,
}

/// Token-type presets that compose grants (spec §4.1 table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Participant,
    Admin,
    ViewOnly,
    CameraOnly,
    MicOnly,
}

/// The resolved set of grants + allowed publish sources for a `TokenType`.
#[derive(Debug, Clone)]
pub struct GrantSet {
    pub grants: HashSet<Grant>,
    pub publish_sources: HashSet<PublishSource>,
}

impl TokenType {
    /// Expand a token type into its composed grant set, per the spec §4.1
    /// preset table.
    pub fn grant_set(self) -> GrantSet {
        use Grant::*;
        use PublishSource::*;

        let (grants, sources): (Vec<Grant>, Vec<PublishSource>) = match self {
            TokenType::Participant => (
                vec![CanPublish, CanSubscribe, CanPublishData],
                vec![Microphone, Camera],
            ),
            TokenType::Admin => (
                vec![
                    RoomCreate,
                    RoomAdmin,
                    CanPublish,
                    CanSubscribe,
                    CanPublishData,
                ],
                vec![Microphone, Camera],
            ),
            TokenType::ViewOnly => (vec![CanSubscribe], vec![]),
            TokenType::CameraOnly => (
                vec![CanPublish, CanSubscribe, CanPublishData],
                vec![Camera],
            ),
            TokenType::MicOnly => (
                vec![CanPublish, CanSubscribe, CanPublishData],
                vec![Microphone],
            ),
        };

        GrantSet {
            grants: grants.into_iter().collect(),
            publish_sources: sources.into_iter().collect(),
        }
    }
}

/// A cryptographically-signed bearer representing grants over a room
/// (spec §3, §4.1). The signed wire form is opaque to callers; this struct
/// is the claims payload before/after signing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityToken {
    pub identity: String,
    pub room_name: Option<String>,
    pub grants: HashSet<Grant>,
    pub publish_sources: HashSet<PublishSource>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub auto_renew: bool,
}

impl CapabilityToken {
    /// Invariant from spec §3: a token in active use must always have at
    /// least two minutes of remaining validity.
    pub fn has_sufficient_headroom(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now + chrono::Duration::minutes(2)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn has_grant(&self, grant: Grant) -> bool {
        self.grants.contains(&grant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_preset_grants() {
        let gs = TokenType::Participant.grant_set();
        assert!(gs.grants.contains(&Grant::CanPublish));
        assert!(gs.grants.contains(&Grant::CanSubscribe));
        assert!(!gs.grants.contains(&Grant::RoomAdmin));
        assert_eq!(gs.publish_sources.len(), 2);
    }

    #[test]
    fn view_only_has_no_publish_sources() {
        let gs = TokenType::ViewOnly.grant_set();
        assert!(!gs.grants.contains(&Grant::CanPublish));
        assert!(gs.publish_sources.is_empty());
    }

    #[test]
    fn admin_has_room_admin_and_create() {
        let gs = TokenType::Admin.grant_set();
        assert!(gs.grants.contains(&Grant::RoomAdmin));
        assert!(gs.grants.contains(&Grant::RoomCreate));
    }

    #[test]
    fn headroom_invariant() {
        let now = Utc::now();
        let token = CapabilityToken {
            identity: "agent".into(),
            room_name: Some("voice-ai-call-1".into()),
            grants: HashSet::new(),
            publish_sources: HashSet::new(),
            issued_at: now,
            expires_at: now + chrono::Duration::minutes(1),
            auto_renew: true,
        };
        assert!(!token.has_sufficient_headroom(now));

        let fresh = CapabilityToken {
            expires_at: now + chrono::Duration::minutes(10),
            ..token
        };
        assert!(fresh.has_sufficient_headroom(now));
    }
}
