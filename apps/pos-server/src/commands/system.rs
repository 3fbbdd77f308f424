//! # System Handlers
//!
//! Liveness and the client-facing slice of the configuration.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use sgventas_core::OversellPolicy;

use crate::state::{ConfigState, DbState, SessionState};

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub active_sessions: usize,
    pub version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigResponse {
    pub store_name: String,
    pub currency_symbol: String,
    pub oversell_policy: OversellPolicy,
}

/// `GET /api/health`: 200 when the database answers, 503 otherwise.
pub async fn health(
    State(db): State<DbState>,
    State(sessions): State<SessionState>,
) -> (StatusCode, Json<HealthResponse>) {
    let database = db.inner().health_check().await;
    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if database { "ok" } else { "degraded" },
            database,
            active_sessions: sessions.count().await,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

pub async fn config(State(config): State<ConfigState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        store_name: config.store.name.clone(),
        currency_symbol: config.store.currency_symbol.clone(),
        oversell_policy: config.sales.oversell_policy,
    })
}
