//! Task classification routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use woz_store::{Deleted, TaskClassification, TaskClassificationInput};

use crate::error::Result;
use crate::extract::AppJson;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Json<Vec<TaskClassification>> {
    Json(state.task_classifications.list().await)
}

pub async fn create(
    State(state): State<AppState>,
    AppJson(req): AppJson<TaskClassificationInput>,
) -> Result<(StatusCode, Json<TaskClassification>)> {
    let created = state.task_classifications.create(req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<TaskClassificationInput>,
) -> Result<Json<TaskClassification>> {
    let updated = state.task_classifications.update(&id, req).await?;
    Ok(Json(updated))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Deleted>> {
    let deleted = state.task_classifications.delete(&id).await?;
    Ok(Json(deleted))
}
