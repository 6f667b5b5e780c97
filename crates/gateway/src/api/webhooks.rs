use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json};
use serde_json::json;

use gw_webhook_ingestor::IngestError;

use crate::state::AppState;

const SIGNATURE_HEADER: &str = "x-livekit-signature";
const TIMESTAMP_HEADER: &str = "x-livekit-timestamp";

/// `POST /webhooks/<media-server-tag>` (spec §6). The tag segment only
/// disambiguates the route in multi-tenant deployments; every tag is
/// verified and ingested identically.
pub async fn receive(
    State(state): State<AppState>,
    Path(_tag): Path<String>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> impl IntoResponse {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    let timestamp = headers.get(TIMESTAMP_HEADER).and_then(|v| v.to_str().ok());

    match state.ingestor.ingest(signature, timestamp, &body).await {
        Ok(ack) => (
            StatusCode::OK,
            Json(json!({
                "status": "received",
                "event_id": ack.event_id,
                "timestamp": ack.timestamp,
                "processing_time": ack.processing_time_ms,
            })),
        )
            .into_response(),
        Err(IngestError::InvalidJson) => {
            (StatusCode::BAD_REQUEST, Json(json!({"error": "invalid JSON body"}))).into_response()
        }
        Err(IngestError::BadSignature) | Err(IngestError::StaleTimestamp) => {
            (StatusCode::UNAUTHORIZED, Json(json!({"error": "signature verification failed"})))
                .into_response()
        }
        Err(IngestError::QueueFull) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "webhook ingestion queue is full"})),
        )
            .into_response(),
    }
}

/// `GET /webhooks/health` (spec §6): ingestion-pipeline liveness plus the
/// active room-session count.
pub async fn webhook_health(State(state): State<AppState>) -> impl IntoResponse {
    let sessions = state.ingestor.sessions();
    Json(json!({
        "status": "ok",
        "active_sessions": sessions.len(),
    }))
}

/// `GET /webhooks/calls` (spec §6): most recent calls from the journal.
pub async fn list_calls(State(state): State<AppState>) -> impl IntoResponse {
    match state.journal.list_recent_calls(100).await {
        Ok(calls) => Json(json!({ "calls": calls })).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "list_recent_calls failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": err.to_string()}))).into_response()
        }
    }
}

/// `GET /webhooks/calls/{call_id}` (spec §6).
pub async fn get_call(State(state): State<AppState>, Path(call_id): Path<String>) -> impl IntoResponse {
    match state.journal.get_call(&call_id).await {
        Ok(Some(call)) => Json(call).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, Json(json!({"error": "call not found"}))).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "get_call failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": err.to_string()}))).into_response()
        }
    }
}

#[derive(serde::Deserialize)]
pub struct CleanupParams {
    max_age_hours: Option<i64>,
}

/// `POST /webhooks/cleanup?max_age_hours=N` (spec §6): sweeps stale
/// room-session correlations the consumer loop never saw a closing event
/// for.
pub async fn cleanup(State(state): State<AppState>, Query(params): Query<CleanupParams>) -> impl IntoResponse {
    let max_age_hours = params.max_age_hours.unwrap_or(state.config.webhook.stale_session_max_age_hours);
    let removed = state.ingestor.sessions().sweep_stale(max_age_hours);
    Json(json!({ "removed": removed.len(), "call_ids": removed }))
}

/// `GET /health` (spec §6): process-wide liveness and a one-line summary
/// of each component's readiness.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "calls_in_use": state.orchestrator.calls_in_use(),
        "trunks": state.trunks.health_status(),
        "sip_calls_tracked": state.sip_frontend.tracked_call_count(),
    }))
}
