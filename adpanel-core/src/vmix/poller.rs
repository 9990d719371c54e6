//! Periodic status polling
//!
//! Fetches and parses the status document on a fixed interval and
//! publishes the latest good snapshot over a watch channel. Polling is
//! read-only and idempotent, so it deliberately runs uncoordinated with
//! outbound sends. A failed poll keeps the previous snapshot in place.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::client::{VmixClient, VmixTarget};
use super::state::VmixState;
use crate::service::SettingsService;

/// Receiver side of the snapshot channel. `None` until the first
/// successful poll.
pub type StateReceiver = watch::Receiver<Option<VmixState>>;

pub struct StatusPoller {
    client: VmixClient,
    settings: SettingsService,
    interval: Duration,
    tx: watch::Sender<Option<VmixState>>,
}

impl StatusPoller {
    pub fn new(
        client: VmixClient,
        settings: SettingsService,
        interval: Duration,
    ) -> (Self, StateReceiver) {
        let (tx, rx) = watch::channel(None);
        (
            Self {
                client,
                settings,
                interval,
                tx,
            },
            rx,
        )
    }

    /// Poll until cancelled. Settings are re-read every tick so a saved
    /// connection change takes effect without a restart.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let settings = self.settings.get();
            let Ok(target) = VmixTarget::from_settings(&settings) else {
                // Not configured yet; nothing to poll.
                continue;
            };

            match self.poll(&target).await {
                Ok(state) => {
                    let _ = self.tx.send(Some(state));
                }
                Err(e) => debug!(error = %e, "status poll failed"),
            }
        }
        debug!("status poller stopped");
    }

    async fn poll(&self, target: &VmixTarget) -> crate::Result<VmixState> {
        let xml = self.client.fetch_state(target).await?;
        VmixState::parse(&xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VmixHttpConfig;
    use crate::models::ConnectionSettings;
    use crate::store::{JsonStore, SharedState};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SAMPLE: &str = r#"<vmix>
  <inputs>
    <input key="k" number="1" type="VideoList" title="Ads" state="Running"></input>
  </inputs>
  <active>1</active>
</vmix>"#;

    #[tokio::test]
    async fn test_poller_publishes_snapshots() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let shared = SharedState::open(JsonStore::new(dir.path().join("state.json"))).unwrap();
        let settings = SettingsService::new(shared);
        let address = *server.address();
        settings
            .replace(ConnectionSettings {
                vmix_ip: address.ip().to_string(),
                vmix_port: address.port().to_string(),
                vmix_input: "Ads".to_string(),
                folder_path: "C:\\Ads\\".to_string(),
                use_proxy: true,
            })
            .unwrap();

        let client = VmixClient::new(&VmixHttpConfig::default()).unwrap();
        let (poller, mut rx) =
            StatusPoller::new(client, settings, Duration::from_millis(10));

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poller.run(cancel.clone()));

        // Wait for the first snapshot to land.
        rx.changed().await.unwrap();
        let snapshot = rx.borrow().clone();
        let state = snapshot.expect("poller should have published a state");
        assert_eq!(state.inputs.len(), 1);
        assert_eq!(state.active_input.as_deref(), Some("1"));

        cancel.cancel();
        handle.await.unwrap();
    }
}
