//! Bounded queue + single consumer (spec §4.5 "Ingestion pipeline").
//!
//! Grounded on `sa-gateway::runtime::tasks`'s background-worker shape
//! (spawn one consumer loop per `AppState`, drain a channel, dispatch by
//! variant) combined with `sa-gateway::runtime::cancel`'s pattern of a
//! `CancellationToken` used to stop the loop on shutdown.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use gw_domain::config::WebhookConfig;
use gw_domain::{CallControl, TraceEvent};
use gw_media_client::MediaClient;
use metrics::counter;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::events::{self, is_microphone_audio, Event};
use crate::sessions::RoomSessionTable;
use crate::verify::{self, VerifyOutcome};

/// Result handed back to the HTTP layer immediately on enqueue (spec §6:
/// 200 `{status, event_id, timestamp, processing_time}`).
#[derive(Debug, Clone)]
pub struct AckReply {
    pub event_id: Uuid,
    pub timestamp: chrono::DateTime<Utc>,
    pub processing_time_ms: u128,
}

#[derive(Debug)]
pub enum IngestError {
    InvalidJson,
    BadSignature,
    StaleTimestamp,
    QueueFull,
}

struct QueuedEvent {
    event_id: Uuid,
    received_at: chrono::DateTime<Utc>,
    event: Event,
}

/// Owns the bounded queue, the RoomSession table, and a non-owning handle
/// to the call orchestrator. Exactly one task drains the queue (spec §5:
/// "WI's active-sessions map — single-writer model").
pub struct Ingestor {
    tx: mpsc::Sender<QueuedEvent>,
    secret: String,
    config: WebhookConfig,
    sessions: Arc<RoomSessionTable>,
}

impl Ingestor {
    /// Spawns the consumer loop and returns the handle used by the HTTP
    /// layer to enqueue incoming webhook deliveries.
    pub fn spawn(
        secret: String,
        config: WebhookConfig,
        call_control: Arc<dyn CallControl>,
        media_client: Arc<MediaClient>,
        shutdown: CancellationToken,
    ) -> Arc<Self> {
        let (tx, rx) = mpsc::channel(config.queue_capacity);
        let sessions = Arc::new(RoomSessionTable::new());

        let consumer_sessions = sessions.clone();
        tokio::spawn(consume_loop(rx, consumer_sessions, call_control, media_client, shutdown));

        Arc::new(Self {
            tx,
            secret,
            config,
            sessions,
        })
    }

    pub fn sessions(&self) -> Arc<RoomSessionTable> {
        self.sessions.clone()
    }

    /// Verifies, parses, and enqueues one webhook delivery. The queue send
    /// is the only blocking-shaped step and is bounded: a full queue
    /// surfaces as `QueueFull` so the HTTP layer can return 503 (spec §5
    /// backpressure).
    pub async fn ingest(
        &self,
        signature_header: Option<&str>,
        timestamp_header: Option<&str>,
        body: &[u8],
    ) -> Result<AckReply, IngestError> {
        let start = Instant::now();

        match verify::verify(
            &self.secret,
            signature_header,
            timestamp_header,
            body,
            self.config.max_event_age_secs,
        ) {
            VerifyOutcome::Accepted => {}
            VerifyOutcome::SkippedNoSecret => {
                warn!("webhook signature verification skipped: no secret configured");
            }
            VerifyOutcome::BadSignature => {
                counter!("webhook_rejected_total", "reason" => "bad_signature").increment(1);
                TraceEvent::WebhookRejected {
                    reason: "bad_signature".into(),
                }
                .emit();
                return Err(IngestError::BadSignature);
            }
            VerifyOutcome::StaleTimestamp => {
                counter!("webhook_rejected_total", "reason" => "stale_timestamp").increment(1);
                TraceEvent::WebhookRejected {
                    reason: "stale_timestamp".into(),
                }
                .emit();
                return Err(IngestError::StaleTimestamp);
            }
        }

        let event = events::parse(body).map_err(|_| IngestError::InvalidJson)?;

        if matches!(event, Event::Unknown { .. }) {
            counter!("webhook_events_ignored_total").increment(1);
            TraceEvent::WebhookEventIgnored {
                event_type: event.kind().into(),
                room_name: event.room_name().map(str::to_string),
                reason: "unrecognized event type".into(),
            }
            .emit();
        }

        if let Some(room_name) = event.room_name() {
            if gw_domain::model::call_id_from_room_name(room_name).is_none() {
                counter!("webhook_events_ignored_total").increment(1);
                TraceEvent::WebhookEventIgnored {
                    event_type: event.kind().into(),
                    room_name: Some(room_name.to_string()),
                    reason: "unowned room".into(),
                }
                .emit();
            }
        }

        let event_id = Uuid::new_v4();
        let received_at = Utc::now();

        self.tx
            .send(QueuedEvent {
                event_id,
                received_at,
                event,
            })
            .await
            .map_err(|_| IngestError::QueueFull)?;

        Ok(AckReply {
            event_id,
            timestamp: received_at,
            processing_time_ms: start.elapsed().as_millis(),
        })
    }
}

async fn consume_loop(
    mut rx: mpsc::Receiver<QueuedEvent>,
    sessions: Arc<RoomSessionTable>,
    call_control: Arc<dyn CallControl>,
    media_client: Arc<MediaClient>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("webhook consumer loop stopping");
                break;
            }
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(queued) => {
                        handle_event(&sessions, &call_control, &media_client, queued).await;
                    }
                    None => break,
                }
            }
        }
    }
}

async fn handle_event(
    sessions: &RoomSessionTable,
    call_control: &Arc<dyn CallControl>,
    media_client: &Arc<MediaClient>,
    queued: QueuedEvent,
) {
    let QueuedEvent { event_id, event, .. } = queued;

    let Some(room_name) = event.room_name() else {
        return;
    };

    let Some(call_id) = gw_domain::model::call_id_from_room_name(room_name) else {
        warn!(room_name, "webhook event on unowned room, skipping");
        return;
    };
    let call_id = call_id.to_string();

    match event {
        Event::RoomStarted { room_metadata, .. } => {
            sessions.insert(gw_domain::model::RoomSession::new(call_id.clone(), room_name.to_string()));
            TraceEvent::RoomSessionCorrelated {
                call_id: call_id.clone(),
                room_name: room_name.to_string(),
            }
            .emit();
            if let Err(err) = call_control.open_call(&call_id, room_name, room_metadata).await {
                warn!(event_id = %event_id, call_id, %err, "open_call failed");
            }
        }
        Event::ParticipantJoined {
            participant_identity, ..
        } => {
            sessions.record_join(room_name, &participant_identity);
            call_control.update_participants(&call_id, &participant_identity, true).await;
        }
        Event::ParticipantLeft {
            participant_identity, ..
        } => {
            sessions.record_leave(room_name, &participant_identity);
            call_control.update_participants(&call_id, &participant_identity, false).await;
        }
        Event::TrackPublished {
            track, track_type, ..
        } => {
            sessions.record_track_published(room_name, track.clone());
            if is_microphone_audio(&track, &track_type) {
                if call_control.start_audio_processing(&call_id, &track).await.is_err() {
                    // Single retry after a short delay, fallback disabled
                    // to prevent loops (spec §4.5 "Fallbacks").
                    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                    if let Err(err) = call_control.start_audio_processing(&call_id, &track).await {
                        warn!(event_id = %event_id, call_id, %err, "start_audio_processing failed after retry");
                    }
                }
            }
        }
        Event::TrackUnpublished { track_sid, .. } => {
            sessions.record_track_unpublished(room_name, &track_sid);
            call_control.stop_audio_processing(&call_id, &track_sid).await;
        }
        Event::RoomFinished { .. } => {
            if sessions.get(room_name).is_none() {
                warn!(room_name, "room_finished with no correlated RoomSession, synthesizing one");
            }
            sessions.remove(room_name);
            if let Err(err) = call_control.close_call(&call_id, "room_finished").await {
                warn!(event_id = %event_id, call_id, %err, "close_call failed");
            }
            if let Err(err) = media_client.delete_room(room_name).await {
                warn!(event_id = %event_id, call_id, %err, "delete_room failed");
            }
        }
        Event::RecordingStarted { .. } | Event::RecordingFinished { .. } => {
            // Recording lifecycle is observational only; no action needed
            // beyond what RoomSession tracking already records.
        }
        Event::Unknown { .. } => {}
    }
}

/// Spawns the stale-session cleanup background task (spec §4.5).
pub fn spawn_stale_session_sweeper(
    sessions: Arc<RoomSessionTable>,
    max_age_hours: i64,
    shutdown: CancellationToken,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(3600));
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    let removed = sessions.sweep_stale(max_age_hours);
                    if !removed.is_empty() {
                        info!(count = removed.len(), "swept stale room sessions");
                    }
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration as StdDuration;

    use gw_domain::config::RetryPolicyConfig;
    use gw_domain::config::TokenAuthorityConfig;
    use gw_domain::model::AudioTrackInfo;
    use gw_token_authority::TokenAuthority;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct RecordingCallControl {
        opened: std::sync::Mutex<Vec<String>>,
        closed: std::sync::Mutex<Vec<String>>,
        audio_started: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl CallControl for RecordingCallControl {
        async fn open_call(
            &self,
            call_id: &str,
            _room_name: &str,
            _room_metadata: Option<serde_json::Value>,
        ) -> gw_domain::Result<()> {
            self.opened.lock().unwrap().push(call_id.to_string());
            Ok(())
        }

        async fn update_participants(&self, _call_id: &str, _participant_identity: &str, _joined: bool) {}

        async fn start_audio_processing(&self, _call_id: &str, _track: &AudioTrackInfo) -> gw_domain::Result<()> {
            self.audio_started.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn stop_audio_processing(&self, _call_id: &str, _track_sid: &str) {}

        async fn close_call(&self, call_id: &str, _reason: &str) -> gw_domain::Result<()> {
            self.closed.lock().unwrap().push(call_id.to_string());
            Ok(())
        }
    }

    async fn media_client_against(server: &MockServer) -> Arc<MediaClient> {
        let authority = TokenAuthority::new(b"test-secret".to_vec(), TokenAuthorityConfig::default());
        Arc::new(MediaClient::new(server.uri(), authority, RetryPolicyConfig::default()))
    }

    fn config() -> WebhookConfig {
        WebhookConfig {
            secret_env: String::new(),
            max_event_age_secs: 300,
            queue_capacity: 16,
            stale_session_max_age_hours: 24,
        }
    }

    #[tokio::test]
    async fn room_started_correlates_and_opens_the_call() {
        let server = MockServer::start().await;
        let media_client = media_client_against(&server).await;
        let call_control = Arc::new(RecordingCallControl::default());
        let shutdown = CancellationToken::new();

        let ingestor = Ingestor::spawn(
            String::new(),
            config(),
            call_control.clone(),
            media_client,
            shutdown.clone(),
        );

        let body = br#"{"event":"room_started","room":{"name":"voice-ai-call-abc"}}"#;
        let ack = ingestor.ingest(None, None, body).await.unwrap();
        assert!(!ack.event_id.is_nil());

        tokio::time::sleep(StdDuration::from_millis(50)).await;
        assert_eq!(call_control.opened.lock().unwrap().as_slice(), &["abc".to_string()]);
        assert!(ingestor.sessions().get("voice-ai-call-abc").is_some());

        shutdown.cancel();
    }

    #[tokio::test]
    async fn room_finished_deletes_the_room_and_closes_the_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.RoomService/DeleteRoom"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;
        let media_client = media_client_against(&server).await;
        let call_control = Arc::new(RecordingCallControl::default());
        let shutdown = CancellationToken::new();

        let ingestor = Ingestor::spawn(
            String::new(),
            config(),
            call_control.clone(),
            media_client,
            shutdown.clone(),
        );

        ingestor
            .ingest(None, None, br#"{"event":"room_started","room":{"name":"voice-ai-call-xyz"}}"#)
            .await
            .unwrap();
        ingestor
            .ingest(None, None, br#"{"event":"room_finished","room":{"name":"voice-ai-call-xyz"}}"#)
            .await
            .unwrap();

        tokio::time::sleep(StdDuration::from_millis(50)).await;
        assert_eq!(call_control.closed.lock().unwrap().as_slice(), &["xyz".to_string()]);
        assert!(ingestor.sessions().get("voice-ai-call-xyz").is_none());

        shutdown.cancel();
    }

    #[tokio::test]
    async fn unowned_room_is_skipped_without_touching_call_control() {
        let server = MockServer::start().await;
        let media_client = media_client_against(&server).await;
        let call_control = Arc::new(RecordingCallControl::default());
        let shutdown = CancellationToken::new();

        let ingestor = Ingestor::spawn(String::new(), config(), call_control.clone(), media_client, shutdown.clone());

        ingestor
            .ingest(None, None, br#"{"event":"room_started","room":{"name":"some-other-room"}}"#)
            .await
            .unwrap();

        tokio::time::sleep(StdDuration::from_millis(50)).await;
        assert!(call_control.opened.lock().unwrap().is_empty());

        shutdown.cancel();
    }

    #[tokio::test]
    async fn bad_signature_is_rejected_before_reaching_the_queue() {
        let server = MockServer::start().await;
        let media_client = media_client_against(&server).await;
        let call_control = Arc::new(RecordingCallControl::default());
        let shutdown = CancellationToken::new();

        let ingestor = Ingestor::spawn(
            "real-secret".into(),
            config(),
            call_control,
            media_client,
            shutdown.clone(),
        );

        let result = ingestor
            .ingest(Some("sha256=deadbeef"), None, br#"{"event":"room_started"}"#)
            .await;
        assert!(matches!(result, Err(IngestError::BadSignature)));

        shutdown.cancel();
    }
}
