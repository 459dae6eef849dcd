//! Health check and service info endpoints.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct Health {
    pub status: String,
    pub relay_connections: usize,
}

#[derive(Serialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub endpoints: Vec<String>,
}

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        relay_connections: state.relay.connection_count(),
    })
}

/// Service banner, also used by the phone as a connectivity probe.
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: "Senior Helper WOZ API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: ["/message", "/log", "/sessions", "/frequentResponse", "/ws"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    })
}
