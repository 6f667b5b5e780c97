use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use gw_domain::config::RetryPolicyConfig;
use gw_domain::model::TokenType;
use gw_domain::{BackoffPolicy, Error, Result};
use gw_token_authority::TokenAuthority;
use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};

use crate::error_map;
use crate::metrics::ClientMetrics;
use crate::types::*;

struct CachedAdminToken {
    token: String,
    expires_at: chrono::DateTime<Utc>,
}

/// Typed RPC client to the media server's Twirp-style control plane
/// (spec §4.2). All retryable errors are retried under `RetryPolicyConfig`;
/// non-retryable errors surface on the first attempt.
pub struct MediaClient {
    http: reqwest::Client,
    base_url: String,
    token_authority: Arc<TokenAuthority>,
    retry: RetryPolicyConfig,
    admin_token: RwLock<Option<CachedAdminToken>>,
    pub metrics: ClientMetrics,
}

impl MediaClient {
    pub fn new(base_url: impl Into<String>, token_authority: Arc<TokenAuthority>, retry: RetryPolicyConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token_authority,
            retry,
            admin_token: RwLock::new(None),
            metrics: ClientMetrics::default(),
        }
    }

    /// Returns a cached admin bearer token, minting (or re-minting) one
    /// when absent or within 5 minutes of expiry (spec §4.2).
    fn admin_token(&self) -> Result<String> {
        let now = Utc::now();
        if let Some(cached) = self.admin_token.read().as_ref() {
            if cached.expires_at > now + chrono::Duration::minutes(5) {
                return Ok(cached.token.clone());
            }
        }

        let ttl_secs = 3600;
        let token = self
            .token_authority
            .mint(TokenType::Admin, "media-client", None, Some(ttl_secs), false)?;
        *self.admin_token.write() = Some(CachedAdminToken {
            token: token.clone(),
            expires_at: now + chrono::Duration::seconds(ttl_secs),
        });
        Ok(token)
    }

    async fn call<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        endpoint: &str,
        req: &Req,
    ) -> Result<Resp> {
        let backoff = BackoffPolicy::new(
            Duration::from_millis(self.retry.base_delay_ms),
            Duration::from_millis(self.retry.max_delay_ms),
            self.retry.multiplier,
            self.retry.jitter,
        );

        let mut attempt: u32 = 0;
        loop {
            let started = Instant::now();
            let result = self.call_once::<Req, Resp>(endpoint, req).await;
            let retried = attempt > 0;

            match &result {
                Ok(_) => {
                    self.metrics.record_attempt(endpoint, started.elapsed(), true, retried);
                    return result;
                }
                Err(err) => {
                    self.metrics.record_attempt(endpoint, started.elapsed(), false, retried);
                    let is_last = backoff.should_give_up(attempt + 1, self.retry.max_attempts);
                    if !err.is_retryable() || is_last {
                        return result;
                    }
                    let delay = backoff.delay_for_attempt(attempt);
                    tracing::warn!(endpoint, attempt, delay_ms = delay.as_millis() as u64, error = %err, "retrying media server call");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn call_once<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        endpoint: &str,
        req: &Req,
    ) -> Result<Resp> {
        let url = format!("{}/twirp/livekit.RoomService/{endpoint}", self.base_url);
        let token = self.admin_token()?;

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {token}"))
            .header("Content-Type", "application/json")
            .json(req)
            .send()
            .await
            .map_err(error_map::from_reqwest)?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(error_map::from_status(status, body));
        }

        response.json::<Resp>().await.map_err(error_map::from_reqwest)
    }

    pub async fn create_room(
        &self,
        name: &str,
        empty_timeout: u32,
        departure_timeout: u32,
        max_participants: u32,
        metadata: serde_json::Value,
    ) -> Result<Room> {
        let req = CreateRoomRequest {
            name: name.to_string(),
            empty_timeout,
            departure_timeout,
            max_participants,
            metadata: metadata.to_string(),
            node_id: None,
            egress: None,
        };
        match self.call("CreateRoom", &req).await {
            // `CreateRoom` is name-keyed: retrying a request for a room
            // that already exists returns a Validation error mapped by the
            // media server, not a duplicate room (spec §8 idempotence law).
            Err(Error::Validation(msg)) if msg.contains("already exists") => {
                self.get_room(name).await
            }
            other => other,
        }
    }

    async fn get_room(&self, name: &str) -> Result<Room> {
        let rooms = self.list_rooms(vec![name.to_string()]).await?;
        rooms
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("room {name} not found after create conflict")))
    }

    pub async fn list_rooms(&self, names: Vec<String>) -> Result<Vec<Room>> {
        let req = ListRoomsRequest { names };
        let resp: ListRoomsResponse = self.call("ListRooms", &req).await?;
        Ok(resp.rooms)
    }

    /// Idempotent: deleting an already-deleted room returns `NotFound`,
    /// which callers (WI's `room_finished` handler) treat as success.
    pub async fn delete_room(&self, room: &str) -> Result<()> {
        let req = DeleteRoomRequest { room: room.to_string() };
        match self.call::<_, serde_json::Value>("DeleteRoom", &req).await {
            Ok(_) => Ok(()),
            Err(Error::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub async fn list_participants(&self, room: &str) -> Result<Vec<ParticipantInfo>> {
        let req = ListParticipantsRequest { room: room.to_string() };
        let resp: ListParticipantsResponse = self.call("ListParticipants", &req).await?;
        Ok(resp.participants)
    }

    pub async fn get_participant(&self, room: &str, identity: &str) -> Result<ParticipantInfo> {
        let req = RoomParticipantRequest {
            room: room.to_string(),
            identity: identity.to_string(),
        };
        self.call("GetParticipant", &req).await
    }

    pub async fn remove_participant(&self, room: &str, identity: &str) -> Result<()> {
        let req = RoomParticipantRequest {
            room: room.to_string(),
            identity: identity.to_string(),
        };
        self.call::<_, serde_json::Value>("RemoveParticipant", &req).await?;
        Ok(())
    }

    pub async fn update_participant(
        &self,
        room: &str,
        identity: &str,
        metadata: Option<String>,
    ) -> Result<ParticipantInfo> {
        let req = UpdateParticipantRequest {
            room: room.to_string(),
            identity: identity.to_string(),
            metadata,
            permission: None,
        };
        self.call("UpdateParticipant", &req).await
    }

    pub async fn mute_published_track(
        &self,
        room: &str,
        identity: &str,
        track_sid: &str,
        muted: bool,
    ) -> Result<()> {
        let req = MuteTrackRequest {
            room: room.to_string(),
            identity: identity.to_string(),
            track_sid: track_sid.to_string(),
            muted,
        };
        self.call::<_, serde_json::Value>("MutePublishedTrack", &req).await?;
        Ok(())
    }

    pub async fn update_subscriptions(
        &self,
        room: &str,
        identity: &str,
        track_sids: Vec<String>,
        subscribe: bool,
    ) -> Result<()> {
        let req = UpdateSubscriptionsRequest {
            room: room.to_string(),
            identity: identity.to_string(),
            track_sids,
            subscribe,
        };
        self.call::<_, serde_json::Value>("UpdateSubscriptions", &req).await?;
        Ok(())
    }

    pub async fn send_data(&self, room: &str, data: &[u8], destination_identities: Vec<String>) -> Result<()> {
        use base64::engine::general_purpose::STANDARD;
        use base64::Engine;
        let req = SendDataRequest {
            room: room.to_string(),
            data: STANDARD.encode(data),
            destination_identities,
        };
        self.call::<_, serde_json::Value>("SendData", &req).await?;
        Ok(())
    }

    pub async fn update_room_metadata(&self, room: &str, metadata: serde_json::Value) -> Result<Room> {
        let req = UpdateRoomMetadataRequest {
            room: room.to_string(),
            metadata: metadata.to_string(),
        };
        self.call("UpdateRoomMetadata", &req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gw_domain::config::TokenAuthorityConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn authority() -> Arc<TokenAuthority> {
        TokenAuthority::new(b"test-secret".to_vec(), TokenAuthorityConfig::default())
    }

    #[tokio::test]
    async fn create_room_succeeds_on_first_try() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.RoomService/CreateRoom"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "voice-ai-call-1", "sid": "RM_1", "creation_time": 1
            })))
            .mount(&server)
            .await;

        let client = MediaClient::new(server.uri(), authority(), RetryPolicyConfig::default());
        let room = client
            .create_room("voice-ai-call-1", 300, 20, 2, serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(room.sid, "RM_1");
    }

    #[tokio::test]
    async fn retries_on_server_error_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.RoomService/CreateRoom"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.RoomService/CreateRoom"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "voice-ai-call-2", "sid": "RM_2", "creation_time": 1
            })))
            .mount(&server)
            .await;

        let mut retry = RetryPolicyConfig::default();
        retry.base_delay_ms = 1;
        let client = MediaClient::new(server.uri(), authority(), retry);
        let room = client
            .create_room("voice-ai-call-2", 300, 20, 2, serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(room.sid, "RM_2");
        let snap = client.metrics.snapshot("CreateRoom");
        assert_eq!(snap.retries, 1);
    }

    #[tokio::test]
    async fn validation_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.RoomService/CreateRoom"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
            .expect(1)
            .mount(&server)
            .await;

        let client = MediaClient::new(server.uri(), authority(), RetryPolicyConfig::default());
        let err = client
            .create_room("voice-ai-call-3", 300, 20, 2, serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn delete_room_is_idempotent_on_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.RoomService/DeleteRoom"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = MediaClient::new(server.uri(), authority(), RetryPolicyConfig::default());
        assert!(client.delete_room("voice-ai-call-4").await.is_ok());
    }
}
