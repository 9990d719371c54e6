//! Playlist routes
//!
//! Preview generation, outbound send/clear/trim, and the parsed status of
//! the configured playlist input.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use adpanel_core::models::{Clip, ConnectionSettings};
use adpanel_core::playlist::{generate_weighted_selection, slot_count, SLOT_SECONDS};
use adpanel_core::vmix::{PlaylistView, SendReport, VmixState, VmixTarget};

use crate::{AppError, AppResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/playlist/preview", post(preview))
        .route("/playlist/send", post(send))
        .route("/playlist/clear", post(clear))
        .route("/playlist/end", post(end))
        .route("/playlist/status", get(status))
}

#[derive(Debug, Deserialize)]
struct PreviewRequest {
    duration_seconds: Option<u64>,
    count: Option<usize>,
}

#[derive(Debug, Serialize)]
struct PreviewItem {
    /// Transient identifier for reorder UIs; no generation semantics.
    preview_id: u64,
    clip: Clip,
}

#[derive(Debug, Serialize)]
struct PreviewResponse {
    items: Vec<PreviewItem>,
    count: usize,
    duration_seconds: u64,
}

async fn preview(
    State(state): State<AppState>,
    Json(request): Json<PreviewRequest>,
) -> AppResult<Json<PreviewResponse>> {
    let count = match (request.count, request.duration_seconds) {
        (Some(count), _) => count,
        (None, Some(duration)) => slot_count(duration),
        (None, None) => {
            return Err(AppError::bad_request(
                "either count or duration_seconds is required",
            ))
        }
    };

    let snapshot = state.library.snapshot();
    let selection = generate_weighted_selection(&snapshot, count);
    let items: Vec<PreviewItem> = selection
        .into_iter()
        .enumerate()
        .map(|(index, clip)| PreviewItem {
            preview_id: index as u64 + 1,
            clip: clip.clone(),
        })
        .collect();

    Ok(Json(PreviewResponse {
        count: items.len(),
        duration_seconds: items.len() as u64 * SLOT_SECONDS,
        items,
    }))
}

#[derive(Debug, Deserialize)]
struct SendRequest {
    /// Clip ids or filenames, in send order.
    items: Vec<String>,
    /// Replace the live playlist (clear first) or append to it.
    #[serde(default = "default_replace")]
    replace: bool,
}

const fn default_replace() -> bool {
    true
}

async fn send(
    State(state): State<AppState>,
    Json(request): Json<SendRequest>,
) -> AppResult<Json<SendReport>> {
    if request.items.is_empty() {
        return Err(AppError::bad_request("no ads in the outgoing playlist"));
    }

    let settings = state.settings.get();
    require_configured(&settings)?;
    let target = VmixTarget::from_settings(&settings)?;

    let mut clips = Vec::with_capacity(request.items.len());
    for item in &request.items {
        let clip = state
            .library
            .find(item)
            .ok_or_else(|| AppError::bad_request(format!("unknown clip: \"{item}\"")))?;
        clips.push(clip);
    }

    let cancel = CancellationToken::new();
    let report = if request.replace {
        state
            .dispatcher
            .replace_playlist(&target, &settings.folder_path, &clips, &cancel)
            .await
    } else {
        state
            .dispatcher
            .send_playlist(&target, &settings.folder_path, &clips, &cancel)
            .await
    };

    Ok(Json(report))
}

#[derive(Debug, Serialize)]
struct ClearPlaylistResponse {
    cleared: bool,
}

async fn clear(State(state): State<AppState>) -> AppResult<Json<ClearPlaylistResponse>> {
    let settings = state.settings.get();
    require_connection(&settings)?;
    let target = VmixTarget::from_settings(&settings)?;

    state.dispatcher.clear_playlist(&target).await?;
    Ok(Json(ClearPlaylistResponse { cleared: true }))
}

#[derive(Debug, Deserialize)]
struct EndRequest {
    /// Last position to keep (1-based).
    keep: usize,
    /// Total item count currently in the playlist.
    total: usize,
}

#[derive(Debug, Serialize)]
struct EndResponse {
    removed: usize,
}

async fn end(
    State(state): State<AppState>,
    Json(request): Json<EndRequest>,
) -> AppResult<Json<EndResponse>> {
    if request.keep == 0 || request.keep >= request.total {
        return Err(AppError::bad_request(
            "keep must be at least 1 and below total",
        ));
    }

    let settings = state.settings.get();
    require_connection(&settings)?;
    let target = VmixTarget::from_settings(&settings)?;

    let removed = state
        .dispatcher
        .end_playlist_at(&target, request.keep, request.total)
        .await?;
    Ok(Json(EndResponse { removed }))
}

async fn status(State(state): State<AppState>) -> AppResult<Json<PlaylistView>> {
    let settings = state.settings.get();
    require_connection(&settings)?;
    let target = VmixTarget::from_settings(&settings)?;

    // Prefer the poller snapshot when one exists; fall back to a live
    // fetch before the first poll lands or when polling is disabled.
    let snapshot = state
        .status_rx
        .as_ref()
        .and_then(|rx| rx.borrow().clone());
    let vmix_state = match snapshot {
        Some(parsed) => parsed,
        None => {
            let xml = state.client.fetch_state(&target).await?;
            VmixState::parse(&xml)?
        }
    };

    match vmix_state.playlist_view(&settings.vmix_input) {
        Some(view) => Ok(Json(view)),
        None => Err(AppError::not_found(format!(
            "Input \"{}\" not found. Available inputs: {}",
            settings.vmix_input,
            vmix_state.input_titles().join(", ")
        ))),
    }
}

/// Outbound sends need the full configuration; report the first missing
/// piece before any network call goes out.
fn require_configured(settings: &ConnectionSettings) -> Result<(), AppError> {
    require_connection(settings)?;
    if settings.folder_path.trim().is_empty() {
        return Err(AppError::bad_request("video folder path is not configured"));
    }
    Ok(())
}

fn require_connection(settings: &ConnectionSettings) -> Result<(), AppError> {
    if settings.vmix_ip.trim().is_empty() {
        return Err(AppError::bad_request("vMix IP address is not configured"));
    }
    if settings.vmix_input.trim().is_empty() {
        return Err(AppError::bad_request("vMix input is not configured"));
    }
    Ok(())
}
