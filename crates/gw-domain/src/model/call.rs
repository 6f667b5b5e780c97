use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-call state machine states (spec §4.4).
///
/// `INITIALIZING` is the only non-terminal state reachable at construction;
/// `COMPLETED`/`FAILED`/`REJECTED` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Initializing,
    Active,
    Processing,
    Ending,
    Completed,
    Failed,
    Rejected,
}

impl CallStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Rejected)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Active => "active",
            Self::Processing => "processing",
            Self::Ending => "ending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Rejected => "rejected",
        }
    }
}

/// Audio substate tracked alongside `CallStatus` while a call is live
/// (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioSubstate {
    Idle,
    Receiving,
    Processing,
    Responding,
    Error,
}

/// Identity of one call, owned end-to-end by the call orchestrator (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallContext {
    pub call_id: String,
    pub caller_number: String,
    pub called_number: String,
    pub trunk_name: String,
    pub room_name: String,
    pub start_time: DateTime<Utc>,
    pub answer_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: CallStatus,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl CallContext {
    /// Builds the room name convention used to correlate webhook events
    /// back to a call (spec §3, §4.5): `"voice-ai-call-" + call_id`.
    pub fn room_name_for(call_id: &str) -> String {
        format!("{ROOM_PREFIX}{call_id}")
    }

    pub fn new(call_id: String, caller_number: String, called_number: String, trunk_name: String) -> Self {
        let room_name = Self::room_name_for(&call_id);
        Self {
            call_id,
            caller_number,
            called_number,
            trunk_name,
            room_name,
            start_time: Utc::now(),
            answer_time: None,
            end_time: None,
            status: CallStatus::Initializing,
            metadata: HashMap::new(),
        }
    }
}

/// Room-name prefix identifying rooms owned by this gateway (spec §4.5).
pub const ROOM_PREFIX: &str = "voice-ai-call-";

/// Extract the `call_id` suffix from an owned room name, or `None` if the
/// room does not carry the gateway's prefix.
pub fn call_id_from_room_name(room_name: &str) -> Option<&str> {
    room_name.strip_prefix(ROOM_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_name_round_trips_call_id() {
        let ctx = CallContext::new(
            "abc123".into(),
            "+1234567890".into(),
            "+0987654321".into(),
            "novofon".into(),
        );
        assert_eq!(ctx.room_name, "voice-ai-call-abc123");
        assert_eq!(call_id_from_room_name(&ctx.room_name), Some("abc123"));
    }

    #[test]
    fn unowned_room_name_returns_none() {
        assert_eq!(call_id_from_room_name("some-other-room"), None);
    }

    #[test]
    fn terminal_states() {
        assert!(CallStatus::Completed.is_terminal());
        assert!(CallStatus::Failed.is_terminal());
        assert!(CallStatus::Rejected.is_terminal());
        assert!(!CallStatus::Active.is_terminal());
        assert!(!CallStatus::Initializing.is_terminal());
    }
}
