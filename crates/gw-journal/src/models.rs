use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Row shape of the `calls` table (spec §3 `CallContext`, §6 persistent
/// schema). Unlike the in-process `gw_domain::model::CallContext`, this is
/// the durable record: owned by the journal, keyed by `call_id` (unique).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CallRow {
    pub call_id: String,
    pub caller_number: String,
    pub called_number: String,
    pub trunk_name: String,
    pub room_name: String,
    pub status: String,
    pub start_time: DateTime<Utc>,
    pub answer_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub end_reason: Option<String>,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ConversationRow {
    pub conversation_id: Uuid,
    pub call_id: String,
    pub model: String,
    pub system_prompt: Option<String>,
    pub summary: Option<String>,
    pub topic: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MessageRow {
    pub message_id: Uuid,
    pub conversation_id: Uuid,
    pub sequence_number: i64,
    pub role: String,
    pub content: String,
    pub processing_ms: Option<i64>,
    pub stt_meta: Option<Value>,
    pub llm_meta: Option<Value>,
    pub tts_meta: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// Per-conversation aggregate metrics, recomputed on `end_conversation`
/// (spec §4.7).
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct ConversationMetricsRow {
    pub conversation_id: Uuid,
    pub user_message_count: i64,
    pub assistant_message_count: i64,
    pub avg_processing_ms: f64,
    pub min_processing_ms: i64,
    pub max_processing_ms: i64,
    pub sum_processing_ms: i64,
    pub total_llm_tokens_in: i64,
    pub total_llm_tokens_out: i64,
    pub total_cost_usd: f64,
    pub total_tts_cost_usd: f64,
    pub total_stt_cost_usd: f64,
    pub mean_stt_confidence: f64,
    pub total_audio_seconds: f64,
    pub sla_violation_count: i64,
    pub error_count: i64,
    pub retry_count: i64,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SystemEventRow {
    pub event_id: Uuid,
    pub event_type: String,
    pub severity: String,
    pub message: String,
    pub component: Option<String>,
    pub call_id: Option<String>,
    pub conversation_id: Option<Uuid>,
    pub metadata: Option<Value>,
    pub stack_trace: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-message metadata passed to `add_message` (spec §4.7).
#[derive(Debug, Clone, Default)]
pub struct MessageMeta {
    pub processing_ms: Option<i64>,
    pub stt_meta: Option<Value>,
    pub llm_meta: Option<Value>,
    pub tts_meta: Option<Value>,
}

/// `log_event` severity (spec §4.7, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl EventSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}
