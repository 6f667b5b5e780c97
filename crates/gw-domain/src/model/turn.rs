use serde::{Deserialize, Serialize};

/// One (user utterance, assistant response) pair (spec §3).
///
/// `sequence_number` is strictly monotonic and gap-free per call — it is
/// the unit the journal's `(conversation_id, sequence_number)` uniqueness
/// constraint and the turn-ordering invariant (spec §8, invariant 1) hang
/// off of.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub sequence_number: i64,
    pub user_text: String,
    pub assistant_text: String,
    pub stt_latency_ms: u64,
    pub llm_latency_ms: u64,
    pub tts_latency_ms: u64,
    pub stt_confidence: f32,
    pub llm_tokens_in: u32,
    pub llm_tokens_out: u32,
    pub cost_usd: f64,
}

impl ConversationTurn {
    /// Total processing time, used to decide SLA violations (spec §4.7:
    /// `processing_ms > 1500`).
    pub fn processing_ms(&self) -> u64 {
        self.stt_latency_ms + self.llm_latency_ms + self.tts_latency_ms
    }

    pub fn is_sla_violation(&self) -> bool {
        self.processing_ms() > 1500
    }
}

/// Minimum STT confidence required to proceed past turn step 3 (spec §4.4).
/// Confidence exactly at the boundary drops the turn — the comparison is
/// strict `<`, never `<=`.
pub const MIN_STT_CONFIDENCE: f32 = 0.5;

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(stt: u64, llm: u64, tts: u64) -> ConversationTurn {
        ConversationTurn {
            sequence_number: 1,
            user_text: "hello".into(),
            assistant_text: "hi there".into(),
            stt_latency_ms: stt,
            llm_latency_ms: llm,
            tts_latency_ms: tts,
            stt_confidence: 0.9,
            llm_tokens_in: 10,
            llm_tokens_out: 5,
            cost_usd: 0.001,
        }
    }

    #[test]
    fn sla_violation_boundary_is_strict() {
        let t = turn(500, 500, 500); // exactly 1500
        assert_eq!(t.processing_ms(), 1500);
        assert!(!t.is_sla_violation());

        let t2 = turn(500, 500, 501); // 1501
        assert!(t2.is_sla_violation());
    }

    #[test]
    fn confidence_boundary_at_exactly_half_drops_turn() {
        // Strict less-than: 0.5 does NOT count as low confidence.
        assert!(!(0.5_f32 < MIN_STT_CONFIDENCE));
        assert!(0.49_f32 < MIN_STT_CONFIDENCE);
    }
}
