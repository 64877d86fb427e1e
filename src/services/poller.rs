//! Batch confirmation polling.

use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::adapters::{methods, WalletProvider};
use crate::domain::{BatchState, CallsStatus};
use crate::error::{ClaimError, Result};

/// Bounds for the confirmation loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub max_attempts: u32,
    /// Fixed delay between consecutive status queries
    pub interval: Duration,
}

impl PollConfig {
    pub fn new(max_attempts: u32, interval_ms: u64) -> Self {
        Self {
            max_attempts,
            interval: Duration::from_millis(interval_ms),
        }
    }

    /// Upper bound on time spent waiting between queries
    pub fn max_wait(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new(60, 2000)
    }
}

/// Single `wallet_getCallsStatus` round trip
#[instrument(skip(provider))]
pub async fn get_batch_status(provider: &dyn WalletProvider, batch_id: &str) -> Result<CallsStatus> {
    let raw = provider
        .request(methods::GET_CALLS_STATUS, json!([batch_id]))
        .await?;
    Ok(serde_json::from_value(raw)?)
}

/// Poll until the batch is confirmed or failed, or attempts run out
pub async fn poll_until_terminal(
    provider: &dyn WalletProvider,
    batch_id: &str,
    config: PollConfig,
) -> Result<CallsStatus> {
    poll_until_terminal_with(provider, batch_id, config, |_, _| {}).await
}

/// Same as [`poll_until_terminal`], reporting every non-terminal status to `on_status`
///
/// Transport errors end the loop immediately; only non-terminal statuses
/// consume attempts.
#[instrument(skip(provider, on_status))]
pub async fn poll_until_terminal_with<F>(
    provider: &dyn WalletProvider,
    batch_id: &str,
    config: PollConfig,
    mut on_status: F,
) -> Result<CallsStatus>
where
    F: FnMut(u32, &CallsStatus) + Send,
{
    for attempt in 1..=config.max_attempts {
        let status = get_batch_status(provider, batch_id).await?;

        match status.status {
            BatchState::Confirmed => {
                status.validate()?;
                info!("Batch {} confirmed after {} queries", batch_id, attempt);
                return Ok(status);
            }
            BatchState::Failed => {
                let detail = status.error_detail();
                warn!("Batch {} failed: {}", batch_id, detail);
                return Err(ClaimError::BatchFailed(detail));
            }
            ref other => {
                debug!(
                    "Batch {} status {} ({}/{})",
                    batch_id, other, attempt, config.max_attempts
                );
                on_status(attempt, &status);
            }
        }

        if attempt < config.max_attempts {
            tokio::time::sleep(config.interval).await;
        }
    }

    warn!(
        "Batch {} not confirmed after {} queries",
        batch_id, config.max_attempts
    );
    Err(ClaimError::Timeout {
        attempts: config.max_attempts,
    })
}
