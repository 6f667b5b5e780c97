//! The seven-step audio turn algorithm (spec §4.4 "Audio turn algorithm"),
//! phase-structured the way the teacher's `runtime::turn` splits
//! preparation, execution, and finalization into separate functions rather
//! than one long linear block.

use std::sync::Arc;
use std::time::{Duration, Instant};

use gw_domain::model::{AudioSubstate, ConversationTurn, MIN_STT_CONFIDENCE};
use gw_domain::{Error, Result};
use gw_journal::models::MessageMeta;
use gw_journal::Journal;
use gw_media_client::MediaClient;
use gw_providers::{LlmProvider, LlmRequest, SttProvider, SttRequest, TtsProvider, TtsRequest};

use crate::cancel::CancelToken;
use crate::state::CallState;

/// Collaborators a turn needs, bundled so `run_turn`'s signature stays
/// readable as more providers are added.
pub struct TurnDeps {
    pub stt: Arc<dyn SttProvider>,
    pub llm: Arc<dyn LlmProvider>,
    pub tts: Arc<dyn TtsProvider>,
    pub media: Arc<MediaClient>,
    pub journal: Arc<Journal>,
}

/// Why a turn did not produce a `ConversationTurn` (spec §4.4 step 3 and
/// "Errors at any step").
#[derive(Debug)]
pub enum TurnFailure {
    /// Empty transcript or confidence below [`MIN_STT_CONFIDENCE`] — not a
    /// call-fatal error, just an aborted turn (spec step 3).
    LowConfidence(f32),
    Cancelled,
    TimedOut,
    Provider(Error),
}

impl std::fmt::Display for TurnFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LowConfidence(c) => write!(f, "low confidence transcript ({c})"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::TimedOut => write!(f, "response timeout exceeded"),
            Self::Provider(e) => write!(f, "provider error: {e}"),
        }
    }
}

/// Runs one turn end to end under the caller's per-call lock. Returns the
/// committed [`ConversationTurn`] on success.
///
/// Must be called with the call's run lock held and the call's substate
/// already `Processing` (spec step 1 — the caller owns the transition so
/// it can be observed even if this function is cancelled before starting).
pub async fn run_turn(
    deps: &TurnDeps,
    call: &CallState,
    call_id: &str,
    audio: Vec<u8>,
    context_turns: usize,
    response_timeout: Duration,
    cancel: CancelToken,
) -> std::result::Result<ConversationTurn, TurnFailure> {
    let run = async {
        // Step 2: submit buffered audio to STT.
        let stt_start = Instant::now();
        let stt = deps
            .stt
            .transcribe(SttRequest {
                call_id: call_id.to_string(),
                audio,
                sample_rate: 16_000,
            })
            .await
            .map_err(TurnFailure::Provider)?;
        let stt_latency_ms = stt_start.elapsed().as_millis() as u64;

        if cancel.is_cancelled() {
            return Err(TurnFailure::Cancelled);
        }

        // Step 3: abort on empty or low-confidence transcription.
        if stt.text.trim().is_empty() || stt.confidence < MIN_STT_CONFIDENCE {
            return Err(TurnFailure::LowConfidence(stt.confidence));
        }

        // Step 4: compose the LLM prompt from the last `context_turns`
        // turns and invoke the LLM.
        let history: Vec<(String, String)> = {
            let inner = call.inner.lock();
            inner
                .history
                .iter()
                .rev()
                .take(context_turns)
                .rev()
                .cloned()
                .collect()
        };

        let llm_start = Instant::now();
        let llm = deps
            .llm
            .generate(LlmRequest {
                call_id: call_id.to_string(),
                history,
                user_text: stt.text.clone(),
            })
            .await
            .map_err(TurnFailure::Provider)?;
        let llm_latency_ms = llm_start.elapsed().as_millis() as u64;

        if cancel.is_cancelled() {
            return Err(TurnFailure::Cancelled);
        }

        // Step 5/6: synthesize and deliver to the agent's published track.
        // Substate flips to Responding for the rest of the turn so new
        // caller audio arriving during synthesis/delivery is recognized
        // as a barge-in (spec §4.4 "Interruption") rather than silently
        // buffered.
        call.inner.lock().substate = AudioSubstate::Responding;

        let tts_start = Instant::now();
        let tts = deps
            .tts
            .synthesize(TtsRequest {
                call_id: call_id.to_string(),
                text: llm.text.clone(),
            })
            .await
            .map_err(TurnFailure::Provider)?;
        let tts_latency_ms = tts_start.elapsed().as_millis() as u64;

        if cancel.is_cancelled() {
            return Err(TurnFailure::Cancelled);
        }

        deliver_audio(deps, call, call_id, &tts.audio)
            .await
            .map_err(TurnFailure::Provider)?;

        let sequence_number = {
            let mut inner = call.inner.lock();
            let seq = inner.next_sequence;
            inner.next_sequence += 1;
            inner.history.push_back((stt.text.clone(), llm.text.clone()));
            while inner.history.len() > context_turns.max(1) {
                inner.history.pop_front();
            }
            seq
        };

        Ok(ConversationTurn {
            sequence_number,
            user_text: stt.text,
            assistant_text: llm.text,
            stt_latency_ms,
            llm_latency_ms,
            tts_latency_ms,
            stt_confidence: stt.confidence,
            llm_tokens_in: llm.tokens_in,
            llm_tokens_out: llm.tokens_out,
            cost_usd: 0.0,
        })
    };

    let outcome = match tokio::time::timeout(response_timeout, run).await {
        Ok(result) => result,
        Err(_) => {
            cancel.cancel();
            Err(TurnFailure::TimedOut)
        }
    };

    if let Ok(turn) = &outcome {
        journal_turn(deps, call, call_id, turn).await;
    }

    outcome
}

/// Ship synthesized audio to the media server over the data channel bound
/// to the agent's participant identity, once known (spec §4.4 step 5;
/// spec §1 Non-goals excludes RTP transcoding, so delivery is abstracted
/// through the media server's data-send RPC rather than a raw media
/// plane).
async fn deliver_audio(deps: &TurnDeps, call: &CallState, call_id: &str, audio: &[u8]) -> Result<()> {
    let room_name = call.inner.lock().ctx.room_name.clone();
    deps.media.send_data(&room_name, audio, Vec::new()).await?;
    tracing::debug!(call_id, bytes = audio.len(), "delivered synthesized audio");
    Ok(())
}

/// Step 7: journal the completed turn (spec §4.4, §4.7).
async fn journal_turn(deps: &TurnDeps, call: &CallState, call_id: &str, turn: &ConversationTurn) {
    let conversation_id = call.inner.lock().conversation_id;
    let Some(conversation_id) = conversation_id else {
        tracing::warn!(call_id, "turn completed with no open conversation, dropping journal entry");
        return;
    };

    let meta = MessageMeta {
        processing_ms: Some(turn.processing_ms() as i64),
        stt_meta: Some(serde_json::json!({ "confidence": turn.stt_confidence, "latency_ms": turn.stt_latency_ms })),
        llm_meta: Some(serde_json::json!({
            "tokens_in": turn.llm_tokens_in,
            "tokens_out": turn.llm_tokens_out,
            "latency_ms": turn.llm_latency_ms,
        })),
        tts_meta: Some(serde_json::json!({ "latency_ms": turn.tts_latency_ms })),
    };

    if let Err(err) = deps
        .journal
        .add_message(conversation_id, "user", &turn.user_text, MessageMeta::default())
        .await
    {
        tracing::error!(call_id, error = %err, "failed to journal user message");
    }
    if let Err(err) = deps
        .journal
        .add_message(conversation_id, "assistant", &turn.assistant_text, meta)
        .await
    {
        tracing::error!(call_id, error = %err, "failed to journal assistant message");
    }

    if turn.is_sla_violation() {
        metrics::counter!("voice_turn_sla_violations_total").increment(1);
    }
}

/// Observable substate for a turn outcome, used by the orchestrator to
/// decide the next `AudioSubstate` (spec §4.4).
pub fn substate_after(result: &std::result::Result<ConversationTurn, TurnFailure>) -> AudioSubstate {
    match result {
        Ok(_) => AudioSubstate::Idle,
        Err(TurnFailure::LowConfidence(_)) => AudioSubstate::Idle,
        Err(_) => AudioSubstate::Error,
    }
}
