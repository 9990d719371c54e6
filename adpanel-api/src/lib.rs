// Module: adpanel-api
// HTTP/JSON surface for the ad panel: the same-origin relay plus REST
// routes over the library, settings and playlist operations.

pub mod error;
pub mod health;
pub mod library;
pub mod playlist;
pub mod relay;
pub mod settings;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use adpanel_core::service::{LibraryService, SettingsService};
use adpanel_core::vmix::{Dispatcher, StateReceiver, VmixClient};

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub library: LibraryService,
    pub settings: SettingsService,
    pub client: VmixClient,
    pub dispatcher: Dispatcher,
    /// Latest poller snapshot, when the poller is enabled.
    pub status_rx: Option<StateReceiver>,
}

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(relay::router())
        .merge(library::router())
        .merge(settings::router())
        .merge(playlist::router());

    Router::new()
        .merge(health::router())
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        // The relay exists for browser front ends on other origins.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
