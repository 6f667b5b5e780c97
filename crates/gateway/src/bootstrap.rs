use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use gw_domain::config::Config;
use gw_journal::Journal;
use gw_media_client::MediaClient;
use gw_orchestrator::CallOrchestrator;
use gw_providers::test_double::{EchoLlmProvider, EchoSttProvider, SilentTtsProvider};
use gw_providers::{LlmProvider, SttProvider, TtsProvider};
use gw_sip_frontend::agent_joiner::HttpAgentJoiner;
use gw_sip_frontend::{AgentJoiner, SipFrontend};
use gw_token_authority::TokenAuthority;
use gw_trunk_supervisor::{TcpProber, TrunkSupervisor};
use gw_webhook_ingestor::Ingestor;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

fn require_env(var: &str) -> Result<String> {
    std::env::var(var).with_context(|| format!("required environment variable {var} is unset"))
}

/// Ordered composition root: TA -> MC -> CJ -> TS -> CO -> WI -> SF
/// (spec §9). Each stage resolves its own secrets from the environment
/// variable named in the corresponding config section, the same
/// `env_var`-indirection convention `gw_domain::config` uses elsewhere.
pub async fn build(config: Arc<Config>, shutdown: CancellationToken) -> Result<AppState> {
    // ── Token Authority ──────────────────────────────────────────────
    let signing_secret = require_env(&config.token_authority.signing_secret_env)
        .context("token authority signing secret")?;
    let token_authority = TokenAuthority::new(
        signing_secret.into_bytes(),
        config.token_authority.clone(),
    );
    token_authority.clone().spawn_renewal_loop();
    tracing::info!("token authority ready");

    // ── Media API Client ─────────────────────────────────────────────
    // `api_key_env`/`api_secret_env` are resolved here for symmetry with
    // every other env-indirected secret even though the current Twirp
    // RPC surface authenticates with a TA-minted admin bearer token
    // rather than the raw key pair.
    let _ = std::env::var(&config.media_server.api_key_env);
    let _ = std::env::var(&config.media_server.api_secret_env);
    let media = Arc::new(MediaClient::new(
        config.media_server.base_url.clone(),
        token_authority.clone(),
        config.media_server.retry.clone(),
    ));
    tracing::info!(base_url = %config.media_server.base_url, "media client ready");

    // ── Conversation Journal ──────────────────────────────────────────
    let journal = Arc::new(
        Journal::connect(&config.journal)
            .await
            .context("connecting to journal database")?,
    );
    let applied = journal
        .migrate_to_latest()
        .await
        .context("running journal migrations")?;
    tracing::info!(migrations_applied = applied.len(), "journal ready");
    spawn_journal_retention_sweep(journal.clone(), config.journal.retention_days, shutdown.clone());

    // ── Trunk Supervisor ──────────────────────────────────────────────
    let prober = Arc::new(TcpProber);
    let trunks = TrunkSupervisor::new(config.sip_trunks.clone(), prober);
    trunks.spawn_probe_loops();
    tracing::info!(trunk_count = config.sip_trunks.len(), "trunk supervisor ready");

    // ── Call Orchestrator ──────────────────────────────────────────────
    // Concrete STT/LLM/TTS adapters are external collaborators explicitly
    // out of scope (spec §1); the in-memory test doubles are wired here
    // as the shipped default so the binary runs end-to-end out of the
    // box. Swap these for real provider clients by constructing
    // `CallOrchestrator` with adapters satisfying the same traits.
    tracing::warn!(
        "wiring in-memory echo STT/LLM/TTS providers — replace with real \
         provider adapters before handling production traffic"
    );
    let stt: Arc<dyn SttProvider> = Arc::new(EchoSttProvider::new(String::new(), 0.0));
    let llm: Arc<dyn LlmProvider> = Arc::new(EchoLlmProvider);
    let tts: Arc<dyn TtsProvider> = Arc::new(SilentTtsProvider::default());
    let orchestrator = Arc::new(CallOrchestrator::new(
        config.call.clone(),
        stt,
        llm,
        tts,
        media.clone(),
        journal.clone(),
    ));
    tracing::info!(max_concurrent_calls = config.call.max_concurrent_calls, "call orchestrator ready");

    // ── Webhook Ingestor ──────────────────────────────────────────────
    let webhook_secret = std::env::var(&config.webhook.secret_env).unwrap_or_default();
    if webhook_secret.is_empty() {
        tracing::warn!("webhook secret env var unset or empty — signature verification disabled");
    }
    let ingestor = Ingestor::spawn(
        webhook_secret,
        config.webhook.clone(),
        orchestrator.clone(),
        media.clone(),
        shutdown.clone(),
    );
    gw_webhook_ingestor::ingestor::spawn_stale_session_sweeper(
        ingestor.sessions(),
        config.webhook.stale_session_max_age_hours,
        shutdown.clone(),
    );
    tracing::info!("webhook ingestor ready");

    // ── SIP Front-End ──────────────────────────────────────────────────
    let agent_joiner: Arc<dyn AgentJoiner> = Arc::new(HttpAgentJoiner::new(config.media_server.base_url.clone()));
    let sip_frontend = Arc::new(SipFrontend::new(
        config.clone(),
        media.clone(),
        token_authority.clone(),
        orchestrator.clone(),
        agent_joiner,
    ));
    tracing::info!(routing_rules = config.routing_rules.len(), "sip front-end ready");

    Ok(AppState {
        config,
        token_authority,
        media,
        journal,
        trunks,
        orchestrator,
        ingestor,
        sip_frontend,
        started_at: Instant::now(),
    })
}

fn spawn_journal_retention_sweep(journal: Arc<Journal>, retention_days: u32, shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(86_400));
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    match journal.cleanup(retention_days).await {
                        Ok(removed) => {
                            if removed > 0 {
                                tracing::info!(removed, "journal retention sweep removed old rows");
                            }
                        }
                        Err(err) => tracing::warn!(error = %err, "journal retention sweep failed"),
                    }
                }
            }
        }
    });
}
