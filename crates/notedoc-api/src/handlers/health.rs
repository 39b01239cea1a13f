//! Liveness endpoint.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

/// Service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "notedoc-backend";

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    /// `UP`, or `DOWN` when the database does not answer.
    #[schema(example = "UP")]
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    #[schema(example = "notedoc-backend")]
    pub service: &'static str,
    pub version: &'static str,
    /// Database reachability; absent with in-memory storage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<&'static str>,
}

/// Report service status.
#[utoipa::path(get, path = "/api/health", tag = "System",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match &state.db {
        None => None,
        Some(db) => match db.ping().await {
            Ok(()) => Some("UP"),
            Err(e) => {
                warn!(subsystem = "api", component = "health", error = %e, "Database ping failed");
                Some("DOWN")
            }
        },
    };

    let up = database != Some("DOWN");
    let body = HealthResponse {
        status: if up { "UP" } else { "DOWN" },
        timestamp: Utc::now(),
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        database,
    };
    let status = if up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}
