use serde::Serialize;

/// Structured trace events emitted across the gateway's crates.
///
/// Every high-signal lifecycle transition gets its own variant so a single
/// `tracing::info!` call carries a machine-parseable payload instead of a
/// free-form message — mirrors the teacher's `TraceEvent` convention.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    CallOpened {
        call_id: String,
        trunk_name: String,
        room_name: String,
    },
    CallAdmissionRejected {
        call_id: String,
        reason: String,
    },
    CallStateChanged {
        call_id: String,
        from: String,
        to: String,
    },
    CallClosed {
        call_id: String,
        reason: Option<String>,
        duration_ms: u64,
    },
    TurnCompleted {
        call_id: String,
        sequence_number: i64,
        stt_latency_ms: u64,
        llm_latency_ms: u64,
        tts_latency_ms: u64,
    },
    TurnFailed {
        call_id: String,
        consecutive_failures: u32,
        reason: String,
    },
    TurnDroppedLowConfidence {
        call_id: String,
        confidence: f32,
    },
    TrunkStateChanged {
        trunk: String,
        from: String,
        to: String,
    },
    TrunkReconnectAttempt {
        trunk: String,
        attempt: u32,
    },
    WebhookRejected {
        reason: String,
    },
    WebhookEventIgnored {
        event_type: String,
        room_name: Option<String>,
        reason: String,
    },
    RoomSessionCorrelated {
        call_id: String,
        room_name: String,
    },
    TokenRenewed {
        identity: String,
        room: Option<String>,
    },
    TokenRenewalFailed {
        identity: String,
        reason: String,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "gw_event");
    }
}
