use std::sync::Arc;
use std::time::Instant;

use gw_domain::config::Config;
use gw_journal::Journal;
use gw_media_client::MediaClient;
use gw_orchestrator::CallOrchestrator;
use gw_sip_frontend::SipFrontend;
use gw_token_authority::TokenAuthority;
use gw_trunk_supervisor::TrunkSupervisor;
use gw_webhook_ingestor::Ingestor;

/// Handles to every component composed at startup (spec §9 ordering).
/// Holds only `Arc`s — no business logic lives here, matching
/// `sa_gateway::state::AppState`'s role as a pure composition record.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub token_authority: Arc<TokenAuthority>,
    pub media: Arc<MediaClient>,
    pub journal: Arc<Journal>,
    pub trunks: Arc<TrunkSupervisor>,
    pub orchestrator: Arc<CallOrchestrator>,
    pub ingestor: Arc<Ingestor>,
    pub sip_frontend: Arc<SipFrontend>,
    pub started_at: Instant,
}
