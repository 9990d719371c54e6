//! Settings routes
//!
//! The connection record is replaced wholesale on save, mirroring how the
//! front end's settings form works.

use axum::{extract::State, routing::get, Json, Router};

use adpanel_core::models::ConnectionSettings;

use crate::{AppResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/settings", get(get_settings).put(put_settings))
}

async fn get_settings(State(state): State<AppState>) -> Json<ConnectionSettings> {
    Json(state.settings.get())
}

async fn put_settings(
    State(state): State<AppState>,
    Json(settings): Json<ConnectionSettings>,
) -> AppResult<Json<ConnectionSettings>> {
    let saved = state.settings.replace(settings)?;
    Ok(Json(saved))
}
