use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

// ── GET /healthz ─────────────────────────────────────────────────────────────

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

// ── GET /readyz ──────────────────────────────────────────────────────────────

pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    match state.db.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
