use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Info about one published media track within a room (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioTrackInfo {
    pub track_sid: String,
    pub participant_identity: String,
    pub source: String,
    pub muted: bool,
}

/// The webhook ingestor's correlation record for one live room (spec §3).
///
/// Owned exclusively by WI's single event-consumer task — see spec §5
/// ("single-writer model").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSession {
    pub call_id: String,
    pub room_name: String,
    pub participants: HashSet<String>,
    pub audio_tracks: HashMap<String, AudioTrackInfo>,
    pub opened_at: DateTime<Utc>,
}

impl RoomSession {
    pub fn new(call_id: String, room_name: String) -> Self {
        Self {
            call_id,
            room_name,
            participants: HashSet::new(),
            audio_tracks: HashMap::new(),
            opened_at: Utc::now(),
        }
    }

    pub fn is_stale(&self, now: DateTime<Utc>, max_age: chrono::Duration) -> bool {
        now - self.opened_at > max_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_after_max_age() {
        let mut session = RoomSession::new("c1".into(), "voice-ai-call-c1".into());
        session.opened_at = Utc::now() - chrono::Duration::hours(25);
        assert!(session.is_stale(Utc::now(), chrono::Duration::hours(24)));
    }

    #[test]
    fn fresh_session_is_not_stale() {
        let session = RoomSession::new("c1".into(), "voice-ai-call-c1".into());
        assert!(!session.is_stale(Utc::now(), chrono::Duration::hours(24)));
    }
}
