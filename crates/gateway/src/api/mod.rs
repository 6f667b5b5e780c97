//! HTTP surface (spec §6): webhook ingestion plus a handful of read-only
//! operator endpoints. Router assembly, CORS, and rate-limiting follow
//! `sa_gateway::main`'s conventions, trimmed to this gateway's routes.

pub mod webhooks;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};

use gw_domain::config::CorsConfig;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/webhooks/:tag", post(webhooks::receive))
        .route("/webhooks/health", get(webhooks::webhook_health))
        .route("/webhooks/calls", get(webhooks::list_calls))
        .route("/webhooks/calls/:call_id", get(webhooks::get_call))
        .route("/webhooks/cleanup", post(webhooks::cleanup))
        .route("/health", get(webhooks::health))
        .with_state(state)
}

/// Builds a [`CorsLayer`] from the configured allowed origins. Origins may
/// end in `:*` to match any port on that host; a single literal `"*"`
/// allows everything (logged loudly, not recommended in production).
/// Grounded on `sa_gateway::main::build_cors_layer`.
pub fn build_cors_layer(cors: &CorsConfig) -> CorsLayer {
    if cors.allowed_origins.len() == 1 && cors.allowed_origins[0] == "*" {
        tracing::warn!("CORS configured with wildcard \"*\" — all origins allowed");
        return CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
    }

    let mut exact: Vec<HeaderValue> = Vec::new();
    let mut wildcard_prefixes: Vec<String> = Vec::new();

    for origin in &cors.allowed_origins {
        if let Some(prefix) = origin.strip_suffix('*') {
            wildcard_prefixes.push(prefix.to_string());
        } else if let Ok(hv) = origin.parse::<HeaderValue>() {
            exact.push(hv);
        } else {
            tracing::warn!(origin = %origin, "invalid CORS origin, skipping");
        }
    }

    let allow_origin = if wildcard_prefixes.is_empty() {
        AllowOrigin::list(exact)
    } else {
        AllowOrigin::predicate(move |origin, _| {
            let origin_str = origin.to_str().unwrap_or("");
            if exact.iter().any(|e| e.as_bytes() == origin.as_bytes()) {
                return true;
            }
            wildcard_prefixes.iter().any(|prefix| {
                origin_str
                    .strip_prefix(prefix.as_str())
                    .map(|port| !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()))
                    .unwrap_or(false)
            })
        })
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
