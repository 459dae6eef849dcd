//! Frequent response routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use woz_store::{Deleted, FrequentResponse, FrequentResponseInput};

use crate::error::Result;
use crate::extract::AppJson;
use crate::state::AppState;

/// List all frequent responses in storage order.
pub async fn list(State(state): State<AppState>) -> Json<Vec<FrequentResponse>> {
    Json(state.frequent_responses.list().await)
}

/// Fetch one frequent response.
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<FrequentResponse>> {
    let response = state.frequent_responses.get(&id).await?;
    Ok(Json(response))
}

/// Add a frequent response, optionally at a given rank.
pub async fn create(
    State(state): State<AppState>,
    AppJson(req): AppJson<FrequentResponseInput>,
) -> Result<(StatusCode, Json<FrequentResponse>)> {
    let created = state.frequent_responses.create(req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Edit a frequent response, moving it if a rank or new group is given.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<FrequentResponseInput>,
) -> Result<Json<FrequentResponse>> {
    let updated = state.frequent_responses.update(&id, req).await?;
    Ok(Json(updated))
}

/// Delete a frequent response.
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Deleted>> {
    let deleted = state.frequent_responses.delete(&id).await?;
    Ok(Json(deleted))
}
