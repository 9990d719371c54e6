//! Connection settings service
//!
//! Settings are replaced wholesale on save, normalized first (trimmed
//! fields, defaulted port, folder path terminated with a separator).

use std::sync::Arc;

use tracing::info;

use crate::models::ConnectionSettings;
use crate::store::SharedState;
use crate::Result;

#[derive(Clone)]
pub struct SettingsService {
    shared: Arc<SharedState>,
}

impl SettingsService {
    pub fn new(shared: Arc<SharedState>) -> Self {
        Self { shared }
    }

    #[must_use]
    pub fn get(&self) -> ConnectionSettings {
        self.shared.state.read().settings.clone()
    }

    /// Replace the stored settings with a normalized copy of `settings`.
    pub fn replace(&self, settings: ConnectionSettings) -> Result<ConnectionSettings> {
        let settings = settings.normalized();
        let mut state = self.shared.state.write();
        state.settings = settings.clone();
        self.shared.persist(&state)?;
        info!(
            host = %settings.vmix_ip,
            port = settings.effective_port(),
            input = %settings.vmix_input,
            "settings saved"
        );
        Ok(settings)
    }
}
