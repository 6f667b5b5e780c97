use serde::{Deserialize, Serialize};

/// Call orchestrator tunables (spec §4.4, §9 Open Questions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallConfig {
    #[serde(default = "d_max_concurrent_calls")]
    pub max_concurrent_calls: usize,
    /// Number of buffered audio chunks that triggers a turn even without an
    /// end-of-utterance signal from STT. Spec §9 Open Question (a): no
    /// justification is given in the source for "10" — kept as a tunable
    /// with that default.
    #[serde(default = "d_audio_flush_chunk_count")]
    pub audio_flush_chunk_count: usize,
    #[serde(default = "d_response_timeout_sec")]
    pub response_timeout_sec: u64,
    #[serde(default = "d_context_window_size")]
    pub context_window_size: usize,
    /// Spec §9 Open Question (b): this spec chooses "three consecutive
    /// turn failures are fatal", not "any failure is tolerated".
    #[serde(default = "d_max_consecutive_turn_failures")]
    pub max_consecutive_turn_failures: u32,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            max_concurrent_calls: d_max_concurrent_calls(),
            audio_flush_chunk_count: d_audio_flush_chunk_count(),
            response_timeout_sec: d_response_timeout_sec(),
            context_window_size: d_context_window_size(),
            max_consecutive_turn_failures: d_max_consecutive_turn_failures(),
        }
    }
}

impl CallConfig {
    /// Number of prior turns to include in the LLM prompt (spec §4.4 step 4):
    /// `N = context_window_size / 100`.
    pub fn context_turns(&self) -> usize {
        self.context_window_size / 100
    }
}

fn d_max_concurrent_calls() -> usize {
    10
}
fn d_audio_flush_chunk_count() -> usize {
    10
}
fn d_response_timeout_sec() -> u64 {
    30
}
fn d_context_window_size() -> usize {
    800
}
fn d_max_consecutive_turn_failures() -> u32 {
    3
}
