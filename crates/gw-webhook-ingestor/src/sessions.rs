//! RoomSession correlation table (spec §4.5, §5: "single-writer model" —
//! only the event consumer mutates this table).
//!
//! Grounded on `sa-sessions::store::SessionStore`'s in-memory map with a
//! `resolve_or_create`/`touch`/`list` shape, adapted to the room-keyed
//! entity this system tracks instead of chat sessions, and dropping the
//! JSON-file persistence (RoomSession state is recoverable from the media
//! server and is not journaled).

use std::collections::HashMap;

use chrono::{Duration, Utc};
use gw_domain::model::{AudioTrackInfo, RoomSession};
use parking_lot::RwLock;

/// `RoomSessions` owned by WI's single consumer task.
pub struct RoomSessionTable {
    sessions: RwLock<HashMap<String, RoomSession>>,
}

impl Default for RoomSessionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomSessionTable {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, room_name: &str) -> Option<RoomSession> {
        self.sessions.read().get(room_name).cloned()
    }

    pub fn insert(&self, session: RoomSession) {
        self.sessions.write().insert(session.room_name.clone(), session);
    }

    pub fn remove(&self, room_name: &str) -> Option<RoomSession> {
        self.sessions.write().remove(room_name)
    }

    pub fn record_join(&self, room_name: &str, participant_identity: &str) {
        if let Some(session) = self.sessions.write().get_mut(room_name) {
            session.participants.insert(participant_identity.to_string());
        }
    }

    pub fn record_leave(&self, room_name: &str, participant_identity: &str) {
        if let Some(session) = self.sessions.write().get_mut(room_name) {
            session.participants.remove(participant_identity);
        }
    }

    pub fn record_track_published(&self, room_name: &str, track: AudioTrackInfo) {
        if let Some(session) = self.sessions.write().get_mut(room_name) {
            session.audio_tracks.insert(track.track_sid.clone(), track);
        }
    }

    pub fn record_track_unpublished(&self, room_name: &str, track_sid: &str) {
        if let Some(session) = self.sessions.write().get_mut(room_name) {
            session.audio_tracks.remove(track_sid);
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes RoomSessions older than `max_age_hours` (spec §4.5
    /// "Stale-session cleanup"). Returns the removed room names.
    pub fn sweep_stale(&self, max_age_hours: i64) -> Vec<String> {
        let max_age = Duration::hours(max_age_hours);
        let now = Utc::now();
        let mut sessions = self.sessions.write();
        let stale: Vec<String> = sessions
            .values()
            .filter(|s| s.is_stale(now, max_age))
            .map(|s| s.room_name.clone())
            .collect();
        for room_name in &stale {
            sessions.remove(room_name);
        }
        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get_round_trips() {
        let table = RoomSessionTable::new();
        table.insert(RoomSession::new("c1".into(), "voice-ai-call-c1".into()));
        assert!(table.get("voice-ai-call-c1").is_some());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn participant_join_and_leave_update_the_set() {
        let table = RoomSessionTable::new();
        table.insert(RoomSession::new("c1".into(), "voice-ai-call-c1".into()));
        table.record_join("voice-ai-call-c1", "caller");
        assert!(table.get("voice-ai-call-c1").unwrap().participants.contains("caller"));
        table.record_leave("voice-ai-call-c1", "caller");
        assert!(!table.get("voice-ai-call-c1").unwrap().participants.contains("caller"));
    }

    #[test]
    fn sweep_stale_removes_only_expired_sessions() {
        let table = RoomSessionTable::new();
        let mut old = RoomSession::new("old".into(), "voice-ai-call-old".into());
        old.opened_at = Utc::now() - Duration::hours(25);
        table.insert(old);
        table.insert(RoomSession::new("fresh".into(), "voice-ai-call-fresh".into()));

        let removed = table.sweep_stale(24);
        assert_eq!(removed, vec!["voice-ai-call-old".to_string()]);
        assert_eq!(table.len(), 1);
        assert!(table.get("voice-ai-call-fresh").is_some());
    }
}
