//! Session transcript and event log routes.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use woz_store::session::now_iso;
use woz_store::MessageEntry;

use crate::error::{ApiError, Result};
use crate::extract::AppJson;
use crate::state::AppState;

/// Reply sent back to the phone for user messages. The wizard answers later.
pub const USER_ACK: &str = "Message received. A wizard will respond shortly.";

/// Message posted by the phone (`user`) or the wizard console.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub session_id: String,
    pub role: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub reply: String,
    pub session_id: String,
    pub timestamp: String,
}

/// Client-side event to record in the server log.
#[derive(Debug, Deserialize)]
pub struct LogRequest {
    pub session_id: String,
    pub event_type: String,
    #[serde(default)]
    pub event_data: Option<serde_json::Value>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogResponse {
    pub status: String,
    pub logged_at: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub messages: Vec<MessageEntry>,
}

#[derive(Debug, Serialize)]
pub struct SessionList {
    pub sessions: Vec<String>,
    pub count: usize,
}

/// Append a message to its session transcript.
pub async fn post_message(
    State(state): State<AppState>,
    AppJson(req): AppJson<MessageRequest>,
) -> Json<MessageResponse> {
    state
        .sessions
        .append(&req.session_id, &req.role, &req.text)
        .await;

    let reply = if req.role == "user" {
        USER_ACK
    } else {
        "Message sent"
    };

    Json(MessageResponse {
        reply: reply.to_string(),
        session_id: req.session_id,
        timestamp: now_iso(),
    })
}

/// Record a client event. Events only go to the log output.
pub async fn post_log(AppJson(req): AppJson<LogRequest>) -> Json<LogResponse> {
    let logged_at = req.timestamp.unwrap_or_else(now_iso);
    let event_data = req
        .event_data
        .unwrap_or_else(|| serde_json::Value::Object(Default::default()));

    info!(
        session_id = %req.session_id,
        event_type = %req.event_type,
        event_data = %event_data,
        timestamp = %logged_at,
        "Event logged"
    );

    Json(LogResponse {
        status: "logged".to_string(),
        logged_at,
    })
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>> {
    let messages = state
        .sessions
        .get(&session_id)
        .await
        .ok_or_else(|| {
            debug!(session_id = %session_id, "No transcript for session");
            ApiError::SessionNotFound
        })?;

    Ok(Json(SessionResponse {
        session_id,
        messages,
    }))
}

pub async fn list_sessions(State(state): State<AppState>) -> Json<SessionList> {
    let sessions = state.sessions.list_ids().await;
    Json(SessionList {
        count: sessions.len(),
        sessions,
    })
}
