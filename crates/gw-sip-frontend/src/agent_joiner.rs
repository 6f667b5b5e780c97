//! The agent process is an external collaborator the gateway arranges to
//! join a room (spec §4.6 step 3) but does not itself run — mirrors the
//! STT/LLM/TTS provider boundary in `gw-providers`.

use async_trait::async_trait;
use gw_domain::Result;
use serde::Serialize;

/// Signals the external agent runtime to connect to a room using a minted
/// participant token, and confirms it actually joined.
#[async_trait]
pub trait AgentJoiner: Send + Sync {
    async fn join(&self, room_name: &str, identity: &str, token: &str) -> Result<()>;
}

#[derive(Serialize)]
struct JoinRequest<'a> {
    room_name: &'a str,
    identity: &'a str,
    token: &'a str,
}

/// Production [`AgentJoiner`]: posts the join request to the agent
/// runtime's HTTP control endpoint, the same `reqwest`-over-JSON shape
/// `gw-media-client` uses against the media server's REST API.
///
/// The agent process itself is an external collaborator (spec §1); this
/// is only the thin RPC that tells it which room to join.
pub struct HttpAgentJoiner {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAgentJoiner {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl AgentJoiner for HttpAgentJoiner {
    async fn join(&self, room_name: &str, identity: &str, token: &str) -> Result<()> {
        let url = format!("{}/agents/join", self.base_url.trim_end_matches('/'));
        let resp = self
            .http
            .post(&url)
            .json(&JoinRequest { room_name, identity, token })
            .send()
            .await
            .map_err(gw_media_client::error_map::from_reqwest)?;

        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Err(gw_media_client::error_map::from_status(status, body))
        }
    }
}

#[cfg(test)]
pub mod test_double {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use gw_domain::{Error, Result};

    use super::AgentJoiner;

    /// Fails the first `fail_times` calls, then succeeds — exercises the
    /// SIP front-end's retry loop (spec §4.6: "retried up to 3× with 1 s
    /// delay").
    pub struct FlakyAgentJoiner {
        fail_times: usize,
        attempts: AtomicUsize,
    }

    impl FlakyAgentJoiner {
        pub fn new(fail_times: usize) -> Self {
            Self { fail_times, attempts: AtomicUsize::new(0) }
        }

        pub fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AgentJoiner for FlakyAgentJoiner {
        async fn join(&self, _room_name: &str, _identity: &str, _token: &str) -> Result<()> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt <= self.fail_times {
                Err(Error::Connection("agent worker unreachable".into()))
            } else {
                Ok(())
            }
        }
    }

    /// Always succeeds, used when a test only cares about routing/admission.
    pub struct AlwaysJoins;

    #[async_trait]
    impl AgentJoiner for AlwaysJoins {
        async fn join(&self, _room_name: &str, _identity: &str, _token: &str) -> Result<()> {
            Ok(())
        }
    }

    /// Always fails, used to exercise the "agent-join failure rejects the
    /// call" path.
    pub struct NeverJoins;

    #[async_trait]
    impl AgentJoiner for NeverJoins {
        async fn join(&self, _room_name: &str, _identity: &str, _token: &str) -> Result<()> {
            Err(Error::Connection("agent worker unreachable".into()))
        }
    }
}
