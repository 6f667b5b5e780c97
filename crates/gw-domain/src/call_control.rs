//! Non-owning handle from the webhook ingestor into the call orchestrator
//! (spec §4.5, §9 "cyclic reference risk"): WI calls into CO, CO never
//! calls WI, so the dependency is expressed as a trait object rather than
//! a direct crate dependency in either direction.

use async_trait::async_trait;

use crate::model::AudioTrackInfo;
use crate::Result;

/// Implemented by the call orchestrator; invoked by the webhook ingestor's
/// single event consumer as it correlates room events to calls.
#[async_trait]
pub trait CallControl: Send + Sync {
    /// A room owned by this system has started (spec §4.5 `room_started`).
    async fn open_call(
        &self,
        call_id: &str,
        room_name: &str,
        room_metadata: Option<serde_json::Value>,
    ) -> Result<()>;

    /// A participant joined or left the room.
    async fn update_participants(&self, call_id: &str, participant_identity: &str, joined: bool);

    /// An audio/microphone track was published; start the turn pipeline.
    async fn start_audio_processing(
        &self,
        call_id: &str,
        track: &AudioTrackInfo,
    ) -> Result<()>;

    /// A track was unpublished; end the associated STT session if any.
    async fn stop_audio_processing(&self, call_id: &str, track_sid: &str);

    /// The room finished; tear the call down (spec §4.5 `room_finished`).
    async fn close_call(&self, call_id: &str, reason: &str) -> Result<()>;
}
