//! Library routes
//!
//! CRUD over the clip library. Bulk operations answer with added/skipped
//! counts instead of failing on duplicates.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use adpanel_core::models::{Clip, ClipId, Priority};
use adpanel_core::service::BulkOutcome;

use crate::{AppResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/clips", get(list).post(add).delete(clear))
        .route("/clips/bulk", post(add_bulk))
        .route("/clips/import", post(import))
        .route("/clips/{id}", delete(remove))
        .route("/clips/{id}/priority", put(set_priority))
}

#[derive(Debug, Deserialize)]
struct AddClipRequest {
    filename: String,
    #[serde(default)]
    priority: Priority,
}

#[derive(Debug, Deserialize)]
struct BulkAddRequest {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ImportRequest {
    filenames: Vec<String>,
    #[serde(default)]
    priority: Priority,
}

#[derive(Debug, Deserialize)]
struct SetPriorityRequest {
    priority: Priority,
}

#[derive(Debug, Serialize)]
struct ClipListResponse {
    clips: Vec<Clip>,
    count: usize,
}

#[derive(Debug, Serialize)]
struct ClearResponse {
    removed: usize,
}

/// Clips sorted the way operators see them: priority high to low, then
/// filename.
async fn list(State(state): State<AppState>) -> Json<ClipListResponse> {
    let mut clips = state.library.snapshot();
    clips.sort_by(|a, b| {
        u8::from(b.priority)
            .cmp(&u8::from(a.priority))
            .then_with(|| a.filename.to_lowercase().cmp(&b.filename.to_lowercase()))
    });
    let count = clips.len();
    Json(ClipListResponse { clips, count })
}

async fn add(
    State(state): State<AppState>,
    Json(request): Json<AddClipRequest>,
) -> AppResult<(StatusCode, Json<Clip>)> {
    let clip = state.library.add(&request.filename, request.priority)?;
    Ok((StatusCode::CREATED, Json(clip)))
}

async fn add_bulk(
    State(state): State<AppState>,
    Json(request): Json<BulkAddRequest>,
) -> AppResult<Json<BulkOutcome>> {
    let outcome = state.library.add_bulk(&request.text)?;
    Ok(Json(outcome))
}

async fn import(
    State(state): State<AppState>,
    Json(request): Json<ImportRequest>,
) -> AppResult<Json<BulkOutcome>> {
    let outcome = state
        .library
        .add_names(request.filenames.iter(), request.priority)?;
    Ok(Json(outcome))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Clip>> {
    let clip = state.library.remove(&ClipId::from(id))?;
    Ok(Json(clip))
}

async fn set_priority(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SetPriorityRequest>,
) -> AppResult<Json<Clip>> {
    let clip = state
        .library
        .set_priority(&ClipId::from(id), request.priority)?;
    Ok(Json(clip))
}

async fn clear(State(state): State<AppState>) -> AppResult<Json<ClearResponse>> {
    let removed = state.library.clear()?;
    Ok(Json(ClearResponse { removed }))
}
