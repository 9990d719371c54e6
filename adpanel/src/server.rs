//! Server lifecycle management
//!
//! Opens the store, wires the services into the HTTP router, runs the
//! optional status poller, and handles graceful shutdown.

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use adpanel_api::{create_router, AppState};
use adpanel_core::{
    service::{LibraryService, SettingsService},
    store::{JsonStore, SharedState},
    vmix::{DispatchOptions, Dispatcher, StatusPoller, VmixClient},
    Config,
};

pub struct AdPanelServer {
    config: Config,
    state: AppState,
    poller: Option<StatusPoller>,
}

impl AdPanelServer {
    /// Build all services from configuration.
    pub fn new(config: Config) -> Result<Self> {
        let store = JsonStore::new(&config.store.path);
        let shared = SharedState::open(store)
            .with_context(|| format!("failed to open state store at {}", config.store.path))?;
        let library = LibraryService::new(shared.clone());
        let settings = SettingsService::new(shared);
        info!(clips = library.len(), "library loaded");

        let client = VmixClient::new(&config.vmix)?;
        let dispatcher = Dispatcher::new(client.clone(), DispatchOptions::default());

        let (poller, status_rx) = if config.poller.enabled {
            let (poller, rx) = StatusPoller::new(
                client.clone(),
                settings.clone(),
                Duration::from_secs(config.poller.interval_seconds.max(1)),
            );
            (Some(poller), Some(rx))
        } else {
            (None, None)
        };

        let state = AppState {
            library,
            settings,
            client,
            dispatcher,
            status_rx,
        };

        Ok(Self {
            config,
            state,
            poller,
        })
    }

    /// Serve until a shutdown signal arrives.
    pub async fn run(self) -> Result<()> {
        let Self {
            config,
            state,
            poller,
        } = self;

        let cancel = CancellationToken::new();
        let poll_handle: Option<JoinHandle<()>> = poller.map(|poller| {
            info!(
                interval_seconds = config.poller.interval_seconds,
                "status poller started"
            );
            tokio::spawn(poller.run(cancel.clone()))
        });

        let router = create_router(state);
        let address = config.http_address();
        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("failed to bind {address}"))?;
        info!(%address, "HTTP server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        cancel.cancel();
        if let Some(handle) = poll_handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "poller task did not shut down cleanly");
            }
        }
        info!("shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => warn!(error = %e, "failed to listen for shutdown signal"),
    }
}
