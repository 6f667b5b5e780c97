//! Pure aggregation logic for `end_conversation`'s metrics recompute
//! (spec §4.7). Factored out of the SQL layer so it can be unit-tested
//! without a database.

use serde_json::Value;
use uuid::Uuid;

use crate::models::{ConversationMetricsRow, MessageRow};

const SLA_THRESHOLD_MS: i64 = 1_500;

fn meta_f64(meta: &Option<Value>, field: &str) -> Option<f64> {
    meta.as_ref()?.get(field)?.as_f64()
}

fn meta_i64(meta: &Option<Value>, field: &str) -> Option<i64> {
    meta.as_ref()?.get(field)?.as_i64()
}

fn meta_bool(meta: &Option<Value>, field: &str) -> bool {
    meta.as_ref()
        .and_then(|m| m.get(field))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Aggregates a conversation's messages into its `ConversationMetricsRow`
/// (spec §4.7: "counts per role; avg/min/max/sum of processing time;
/// total input/output LLM tokens and USD cost; total TTS/STT cost; mean
/// STT confidence; total audio seconds; SLA violations; error and retry
/// counts").
pub fn recompute(conversation_id: Uuid, messages: &[MessageRow]) -> ConversationMetricsRow {
    let mut metrics = ConversationMetricsRow {
        conversation_id,
        ..Default::default()
    };

    let mut processing_samples: Vec<i64> = Vec::new();
    let mut confidence_samples: Vec<f64> = Vec::new();

    for msg in messages {
        match msg.role.as_str() {
            "user" => metrics.user_message_count += 1,
            "assistant" => metrics.assistant_message_count += 1,
            _ => {}
        }

        if let Some(ms) = msg.processing_ms {
            processing_samples.push(ms);
            metrics.sum_processing_ms += ms;
            if ms > SLA_THRESHOLD_MS {
                metrics.sla_violation_count += 1;
            }
        }

        if let Some(confidence) = meta_f64(&msg.stt_meta, "confidence") {
            confidence_samples.push(confidence);
        }
        if let Some(seconds) = meta_f64(&msg.stt_meta, "audio_seconds") {
            metrics.total_audio_seconds += seconds;
        }
        if let Some(cost) = meta_f64(&msg.stt_meta, "cost_usd") {
            metrics.total_stt_cost_usd += cost;
        }
        if meta_bool(&msg.stt_meta, "error") {
            metrics.error_count += 1;
        }

        if let Some(tokens_in) = meta_i64(&msg.llm_meta, "tokens_in") {
            metrics.total_llm_tokens_in += tokens_in;
        }
        if let Some(tokens_out) = meta_i64(&msg.llm_meta, "tokens_out") {
            metrics.total_llm_tokens_out += tokens_out;
        }
        if let Some(cost) = meta_f64(&msg.llm_meta, "cost_usd") {
            metrics.total_cost_usd += cost;
        }
        if meta_bool(&msg.llm_meta, "error") {
            metrics.error_count += 1;
        }
        if let Some(retries) = meta_i64(&msg.llm_meta, "retries") {
            metrics.retry_count += retries;
        }

        if let Some(cost) = meta_f64(&msg.tts_meta, "cost_usd") {
            metrics.total_tts_cost_usd += cost;
        }
        if meta_bool(&msg.tts_meta, "error") {
            metrics.error_count += 1;
        }
    }

    if !processing_samples.is_empty() {
        metrics.avg_processing_ms = metrics.sum_processing_ms as f64 / processing_samples.len() as f64;
        metrics.min_processing_ms = *processing_samples.iter().min().unwrap();
        metrics.max_processing_ms = *processing_samples.iter().max().unwrap();
    }

    if !confidence_samples.is_empty() {
        metrics.mean_stt_confidence =
            confidence_samples.iter().sum::<f64>() / confidence_samples.len() as f64;
    }

    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn message(role: &str, processing_ms: Option<i64>, stt_meta: Option<Value>, llm_meta: Option<Value>) -> MessageRow {
        MessageRow {
            message_id: Uuid::new_v4(),
            conversation_id: Uuid::nil(),
            sequence_number: 1,
            role: role.into(),
            content: "x".into(),
            processing_ms,
            stt_meta,
            llm_meta,
            tts_meta: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn counts_roles_and_sla_violations() {
        let messages = vec![
            message("user", Some(1600), None, None),
            message("assistant", Some(900), None, None),
        ];
        let m = recompute(Uuid::nil(), &messages);
        assert_eq!(m.user_message_count, 1);
        assert_eq!(m.assistant_message_count, 1);
        assert_eq!(m.sla_violation_count, 1);
        assert_eq!(m.sum_processing_ms, 2500);
        assert_eq!(m.avg_processing_ms, 1250.0);
        assert_eq!(m.min_processing_ms, 900);
        assert_eq!(m.max_processing_ms, 1600);
    }

    #[test]
    fn sla_boundary_is_strictly_greater_than() {
        let messages = vec![message("assistant", Some(1500), None, None)];
        let m = recompute(Uuid::nil(), &messages);
        assert_eq!(m.sla_violation_count, 0);

        let messages = vec![message("assistant", Some(1501), None, None)];
        let m = recompute(Uuid::nil(), &messages);
        assert_eq!(m.sla_violation_count, 1);
    }

    #[test]
    fn aggregates_llm_and_stt_meta() {
        let messages = vec![message(
            "assistant",
            Some(100),
            Some(serde_json::json!({"confidence": 0.9, "audio_seconds": 2.5, "cost_usd": 0.001})),
            Some(serde_json::json!({"tokens_in": 10, "tokens_out": 20, "cost_usd": 0.02})),
        )];
        let m = recompute(Uuid::nil(), &messages);
        assert_eq!(m.mean_stt_confidence, 0.9);
        assert_eq!(m.total_audio_seconds, 2.5);
        assert_eq!(m.total_stt_cost_usd, 0.001);
        assert_eq!(m.total_llm_tokens_in, 10);
        assert_eq!(m.total_llm_tokens_out, 20);
        assert_eq!(m.total_cost_usd, 0.02);
    }

    #[test]
    fn empty_conversation_yields_zeroed_metrics() {
        let m = recompute(Uuid::nil(), &[]);
        assert_eq!(m.sum_processing_ms, 0);
        assert_eq!(m.avg_processing_ms, 0.0);
        assert_eq!(m.mean_stt_confidence, 0.0);
    }

    #[test]
    fn error_flags_across_all_three_metas_are_counted() {
        let messages = vec![message(
            "assistant",
            Some(100),
            Some(serde_json::json!({"error": true})),
            Some(serde_json::json!({"error": true, "retries": 2})),
        )];
        let m = recompute(Uuid::nil(), &messages);
        assert_eq!(m.error_count, 2);
        assert_eq!(m.retry_count, 2);
    }
}
