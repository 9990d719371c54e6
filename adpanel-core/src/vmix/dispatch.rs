//! Sequential outbound dispatch to the vMix playlist
//!
//! Items go out one at a time with a short pacing delay so the remote
//! endpoint is never flooded. Per-item failures are counted; once they
//! reach the threshold the rest of the batch is abandoned instead of
//! spamming a dead endpoint.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::client::{VmixClient, VmixTarget};
use crate::models::Clip;
use crate::Result;

/// Pacing and abort thresholds for outbound sends.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Delay between consecutive adds.
    pub pacing: Duration,
    /// Delay between consecutive removals when trimming the playlist.
    pub removal_pacing: Duration,
    /// Item failures tolerated before the rest of the batch is dropped.
    pub max_failures: usize,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            pacing: Duration::from_millis(100),
            removal_pacing: Duration::from_millis(50),
            max_failures: 3,
        }
    }
}

/// Outcome of a batch send.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReport {
    pub sent: usize,
    pub failed: usize,
    pub aborted: bool,
}

#[derive(Clone)]
pub struct Dispatcher {
    client: VmixClient,
    options: DispatchOptions,
}

impl Dispatcher {
    pub fn new(client: VmixClient, options: DispatchOptions) -> Self {
        Self { client, options }
    }

    /// Send `clips` to the target's list input via `ListAdd`, one at a
    /// time. Each value is the folder path joined with the clip filename.
    pub async fn send_playlist(
        &self,
        target: &VmixTarget,
        folder: &str,
        clips: &[Clip],
        cancel: &CancellationToken,
    ) -> SendReport {
        let mut report = SendReport::default();
        info!(count = clips.len(), input = %target.input, "sending playlist");

        for clip in clips {
            if cancel.is_cancelled() {
                report.aborted = true;
                break;
            }

            let path = format!("{folder}{}", clip.filename);
            match self
                .client
                .call(target, "ListAdd", Some(&target.input), Some(&path))
                .await
            {
                Ok(body) if body_reports_error(&body) => {
                    warn!(filename = %clip.filename, response = %truncate(&body, 100), "vMix rejected item");
                    report.failed += 1;
                }
                Ok(_) => {
                    info!(filename = %clip.filename, "added to playlist");
                    report.sent += 1;
                }
                Err(e) => {
                    warn!(filename = %clip.filename, error = %e, "failed to add item");
                    report.failed += 1;
                }
            }

            if report.failed >= self.options.max_failures {
                warn!(failed = report.failed, "too many failures, aborting remaining sends");
                report.aborted = true;
                break;
            }

            tokio::select! {
                () = cancel.cancelled() => {
                    report.aborted = true;
                    break;
                }
                () = tokio::time::sleep(self.options.pacing) => {}
            }
        }

        info!(sent = report.sent, failed = report.failed, aborted = report.aborted, "send complete");
        report
    }

    /// Best-effort clear followed by a send, the "replace playlist" flow.
    pub async fn replace_playlist(
        &self,
        target: &VmixTarget,
        folder: &str,
        clips: &[Clip],
        cancel: &CancellationToken,
    ) -> SendReport {
        self.clear_playlist_silent(target).await;
        self.send_playlist(target, folder, clips, cancel).await
    }

    /// Clear the live playlist: select everything, then remove it.
    pub async fn clear_playlist(&self, target: &VmixTarget) -> Result<()> {
        self.client
            .call(target, "SelectAll", Some(&target.input), None)
            .await?;
        self.client
            .call(target, "ListRemoveAll", Some(&target.input), None)
            .await?;
        info!(input = %target.input, "playlist cleared");
        Ok(())
    }

    /// Clear without surfacing failures, used before a replace send.
    pub async fn clear_playlist_silent(&self, target: &VmixTarget) {
        match self
            .client
            .call(target, "ListRemoveAll", Some(&target.input), None)
            .await
        {
            Ok(_) => info!("cleared existing playlist"),
            Err(e) => warn!(error = %e, "could not clear existing playlist"),
        }
    }

    /// Remove every item after position `keep` (1-based), highest position
    /// first so earlier removals never shift the indices still to go.
    pub async fn end_playlist_at(
        &self,
        target: &VmixTarget,
        keep: usize,
        total: usize,
    ) -> Result<usize> {
        let mut removed = 0;
        for position in ((keep + 1)..=total).rev() {
            self.client
                .call(
                    target,
                    "ListRemove",
                    Some(&target.input),
                    Some(&position.to_string()),
                )
                .await?;
            removed += 1;
            tokio::time::sleep(self.options.removal_pacing).await;
        }
        info!(removed, keep, "playlist trimmed");
        Ok(removed)
    }
}

/// The control API answers 200 with an error message in the body when a
/// function fails, so the text itself has to be inspected.
fn body_reports_error(body: &str) -> bool {
    body.contains("Error") || body.contains("error")
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
