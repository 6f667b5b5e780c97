//! Per-call in-memory state owned by the orchestrator.

use std::collections::VecDeque;

use gw_domain::model::{AudioSubstate, AudioTrackInfo, CallContext, CallStatus};
use parking_lot::Mutex;

/// One call's mutable state, behind a single lock so status transitions
/// and audio buffering never race each other (the per-call semaphore in
/// [`crate::session_lock::CallLockMap`] additionally serializes turns).
pub struct CallState {
    pub inner: Mutex<Inner>,
}

pub struct Inner {
    pub ctx: CallContext,
    pub substate: AudioSubstate,
    pub audio_buffer: Vec<u8>,
    /// Number of chunks accumulated into `audio_buffer` since the last
    /// flush, compared against `audio_flush_chunk_count` (spec §9 Open
    /// Question (a): the threshold counts chunks, not bytes).
    pub buffered_chunk_count: usize,
    pub consecutive_failures: u32,
    pub interruptions: u32,
    pub failed_turns: u32,
    /// The agent's own published audio track, once known, used to target
    /// TTS delivery via the media server.
    pub agent_track: Option<AudioTrackInfo>,
    /// `(user_text, assistant_text)` history, bounded to `context_turns()`.
    pub history: VecDeque<(String, String)>,
    pub conversation_id: Option<uuid::Uuid>,
    pub next_sequence: i64,
}

impl CallState {
    pub fn new(ctx: CallContext) -> Self {
        Self {
            inner: Mutex::new(Inner {
                ctx,
                substate: AudioSubstate::Idle,
                audio_buffer: Vec::new(),
                buffered_chunk_count: 0,
                consecutive_failures: 0,
                interruptions: 0,
                failed_turns: 0,
                agent_track: None,
                history: VecDeque::new(),
                conversation_id: None,
                next_sequence: 1,
            }),
        }
    }

    pub fn status(&self) -> CallStatus {
        self.inner.lock().ctx.status
    }

    pub fn set_status(&self, status: CallStatus) -> CallStatus {
        let mut inner = self.inner.lock();
        let from = inner.ctx.status;
        inner.ctx.status = status;
        from
    }
}
