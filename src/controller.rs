//! Claim flow controller.
//!
//! Sequences connect → claim → confirm in response to user actions and owns
//! the view state. Every change goes through [`apply`]. Each action captures a
//! generation number when it starts; `disconnect` and newer actions bump it,
//! so results of an abandoned sequence are dropped instead of repopulating
//! cleared state.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

use crate::adapters::AccountSdk;
use crate::config::{AppConfig, ClaimTarget};
use crate::domain::{BatchRecord, CallsStatus, ClaimStatus, WalletSession};
use crate::error::{ClaimError, Result};
use crate::services::{
    poll_until_terminal_with, PollConfig, ProviderGateway, TransactionSubmitter,
};

/// Everything the view renders
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub status: ClaimStatus,
    pub session: Option<WalletSession>,
    pub batch_id: Option<String>,
    pub batch: Option<BatchRecord>,
    pub error: Option<String>,
    pub(crate) generation: u64,
}

impl ViewState {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// State changes, one per step of the flow
#[derive(Debug, Clone)]
pub enum Transition {
    ConnectStarted,
    Connected(WalletSession),
    ClaimStarted,
    Submitted(String),
    ConfirmingStarted,
    Progress(CallsStatus),
    Confirmed(CallsStatus),
    Failed(String),
    Disconnected,
}

impl Transition {
    fn target(&self, current: ClaimStatus) -> ClaimStatus {
        match self {
            Transition::ConnectStarted => ClaimStatus::Connecting,
            Transition::Connected(_) => ClaimStatus::Connected,
            Transition::ClaimStarted => ClaimStatus::Claiming,
            Transition::Submitted(_) => ClaimStatus::Claimed,
            Transition::ConfirmingStarted => ClaimStatus::Confirming,
            Transition::Progress(_) => current,
            Transition::Confirmed(_) => ClaimStatus::Confirmed,
            Transition::Failed(_) => ClaimStatus::Error,
            Transition::Disconnected => ClaimStatus::Idle,
        }
    }
}

/// The single transition function over [`ViewState`]
pub fn apply(state: &mut ViewState, transition: Transition) -> Result<()> {
    let from = state.status;
    let to = transition.target(from);

    let allowed = match transition {
        Transition::Progress(_) => from == ClaimStatus::Confirming,
        _ => from.can_transition_to(to),
    };
    if !allowed {
        return Err(ClaimError::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    match transition {
        Transition::ConnectStarted => {
            state.error = None;
        }
        Transition::Connected(session) => {
            state.session = Some(session);
        }
        Transition::ClaimStarted => {
            state.error = None;
            state.batch_id = None;
            state.batch = None;
        }
        Transition::Submitted(batch_id) => {
            state.batch_id = Some(batch_id);
        }
        Transition::ConfirmingStarted => {}
        Transition::Progress(status) | Transition::Confirmed(status) => {
            let batch_id = state.batch_id.clone().ok_or_else(|| {
                ClaimError::InvalidStateTransition {
                    from: from.to_string(),
                    to: format!("{to} without a batch id"),
                }
            })?;
            state.batch = Some(BatchRecord::new(batch_id, status)?);
        }
        Transition::Failed(message) => {
            state.error = Some(message);
        }
        Transition::Disconnected => {
            state.session = None;
            state.batch_id = None;
            state.batch = None;
            state.error = None;
        }
    }

    if from != to {
        debug!("claim status {} -> {}", from, to);
    }
    state.status = to;
    Ok(())
}

/// Drives the gateway, submitter and poller and records the outcome
pub struct ClaimController {
    config: AppConfig,
    gateway: ProviderGateway,
    submitter: TransactionSubmitter,
    poll: PollConfig,
    state: RwLock<ViewState>,
}

impl ClaimController {
    pub fn new(config: AppConfig, sdk: Arc<dyn AccountSdk>) -> Self {
        let chain = config.chain.target_chain();
        let gateway = ProviderGateway::new(sdk, chain.clone());
        let submitter = TransactionSubmitter::new(
            chain,
            config.relay.assume_supported_on_capability_error,
        );
        let poll = config.polling.poll_config();

        Self {
            config,
            gateway,
            submitter,
            poll,
            state: RwLock::new(ViewState::default()),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Copy of the current view state
    pub fn snapshot(&self) -> ViewState {
        self.read().clone()
    }

    pub fn status(&self) -> ClaimStatus {
        self.read().status
    }

    /// Connect the wallet and move it to the target chain
    pub async fn connect(&self) -> Result<()> {
        let generation = self.begin(|state| {
            if state.session.is_some() {
                return Err(ClaimError::InvalidStateTransition {
                    from: state.status.to_string(),
                    to: ClaimStatus::Connecting.to_string(),
                });
            }
            apply(state, Transition::ConnectStarted)
        })?;

        let result = async {
            let session = self.gateway.connect().await?;
            if !self
                .gateway
                .ensure_target_chain(session.provider.as_ref())
                .await
            {
                warn!(
                    "Wallet is not on {}; the claim may be rejected",
                    self.gateway.chain().name
                );
            }
            Ok::<_, ClaimError>(session)
        }
        .await;

        match result {
            Ok(session) => {
                self.commit(generation, Transition::Connected(session));
                Ok(())
            }
            Err(e) => {
                self.commit(generation, Transition::Failed(format!("Failed to connect: {e}")));
                Err(e)
            }
        }
    }

    /// Submit the sponsored claim and wait for the batch to settle
    pub async fn claim(&self) -> Result<()> {
        let (generation, session, target) = {
            let mut state = self.write();
            if state.status.is_transitional() {
                return Err(ClaimError::InvalidStateTransition {
                    from: state.status.to_string(),
                    to: ClaimStatus::Claiming.to_string(),
                });
            }

            let checked = self.config.claim_target().and_then(|target| {
                state
                    .session
                    .clone()
                    .map(|session| (session, target))
                    .ok_or(ClaimError::NotConnected)
            });
            let (session, target) = match checked {
                Ok(ok) => ok,
                Err(e) => {
                    state.generation += 1;
                    apply(&mut state, Transition::Failed(e.to_string()))?;
                    return Err(e);
                }
            };

            state.generation += 1;
            apply(&mut state, Transition::ClaimStarted)?;
            (state.generation, session, target)
        };

        match self.run_claim(generation, &session, &target).await {
            Ok(()) => Ok(()),
            Err(e) if self.commit(generation, Transition::Failed(e.to_string())) => Err(e),
            // Abandoned by disconnect or a newer action
            Err(e) => {
                debug!("Ignoring failure of abandoned claim: {}", e);
                Ok(())
            }
        }
    }

    async fn run_claim(
        &self,
        generation: u64,
        session: &WalletSession,
        target: &ClaimTarget,
    ) -> Result<()> {
        let provider = session.provider.as_ref();

        if !self
            .submitter
            .check_relay_ready(&target.paymaster_url, Some(provider))
            .await
        {
            return Err(ClaimError::RelayUnavailable(target.paymaster_url.clone()));
        }

        let batch_id = self
            .submitter
            .submit(
                Some(provider),
                &session.address,
                target.contract_address,
                &target.paymaster_url,
            )
            .await?;

        if !self.commit(generation, Transition::Submitted(batch_id.clone()))
            || !self.commit(generation, Transition::ConfirmingStarted)
        {
            return Ok(());
        }

        let status = poll_until_terminal_with(provider, &batch_id, self.poll, |_, status| {
            self.commit(generation, Transition::Progress(status.clone()));
        })
        .await?;

        if self.commit(generation, Transition::Confirmed(status)) {
            info!("Reward claimed in batch {}", batch_id);
        }
        Ok(())
    }

    /// Drop the session and clear all batch state. In-flight results are discarded.
    pub async fn disconnect(&self) -> bool {
        let sdk = {
            let mut state = self.write();
            state.generation += 1;
            let sdk = state.session.as_ref().map(|s| Arc::clone(&s.sdk));
            if let Err(e) = apply(&mut state, Transition::Disconnected) {
                warn!("Disconnect: {}", e);
            }
            sdk
        };

        ProviderGateway::disconnect(sdk.as_deref()).await
    }

    /// Start an action: check, apply its first transition and claim a new generation
    fn begin<F>(&self, start: F) -> Result<u64>
    where
        F: FnOnce(&mut ViewState) -> Result<()>,
    {
        let mut state = self.write();
        if state.status.is_transitional() {
            return Err(ClaimError::InvalidStateTransition {
                from: state.status.to_string(),
                to: "new action".to_string(),
            });
        }
        start(&mut *state)?;
        state.generation += 1;
        Ok(state.generation)
    }

    /// Apply a transition if `generation` is still current
    fn commit(&self, generation: u64, transition: Transition) -> bool {
        let mut state = self.write();
        if state.generation != generation {
            debug!(
                "Discarding stale result (generation {} != {})",
                generation, state.generation
            );
            return false;
        }
        match apply(&mut state, transition) {
            Ok(()) => true,
            Err(e) => {
                warn!("Rejected state update: {}", e);
                false
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ViewState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ViewState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::provider::{MockAccountSdk, MockWalletProvider};
    use crate::adapters::{methods, WalletProvider};
    use crate::domain::BatchState;
    use serde_json::json;

    const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    fn configured() -> AppConfig {
        let mut config = AppConfig::default();
        config.rewards.contract_address = Some(CONTRACT.to_string());
        config.rewards.paymaster_url = Some("https://paymaster.example/rpc".to_string());
        config
    }

    fn sdk_with(provider: MockWalletProvider) -> Arc<dyn AccountSdk> {
        let provider: Arc<dyn WalletProvider> = Arc::new(provider);
        let mut sdk = MockAccountSdk::new();
        sdk.expect_provider()
            .returning(move || Some(Arc::clone(&provider)));
        sdk.expect_disconnect().returning(|| Ok(()));
        Arc::new(sdk)
    }

    fn connecting_provider() -> MockWalletProvider {
        let mut provider = MockWalletProvider::new();
        provider
            .expect_request()
            .withf(|m, _| m == methods::REQUEST_ACCOUNTS)
            .returning(|_, _| Ok(json!(["0xAAA"])));
        provider
            .expect_request()
            .withf(|m, _| m == methods::CHAIN_ID)
            .returning(|_, _| Ok(json!("0x14a34")));
        provider
    }

    #[test]
    fn test_apply_rejects_out_of_order() {
        let mut state = ViewState::default();
        let err = apply(&mut state, Transition::Submitted("0xB".into())).unwrap_err();
        assert!(matches!(err, ClaimError::InvalidStateTransition { .. }));
        assert_eq!(state.status, ClaimStatus::Idle);
        assert!(state.batch_id.is_none());
    }

    #[test]
    fn test_progress_only_while_confirming() {
        let mut state = ViewState::default();
        let pending = CallsStatus {
            status: BatchState::Pending,
            receipts: vec![],
            error: None,
        };
        assert!(apply(&mut state, Transition::Progress(pending)).is_err());
    }

    #[tokio::test]
    async fn test_claim_without_config_makes_no_calls() {
        let mut provider = MockWalletProvider::new();
        provider.expect_request().never();
        let controller = ClaimController::new(AppConfig::default(), sdk_with(provider));

        let err = controller.claim().await.unwrap_err();
        assert!(matches!(err, ClaimError::Configuration(_)));

        let state = controller.snapshot();
        assert_eq!(state.status, ClaimStatus::Error);
        assert!(state.error.unwrap().contains("Configuration missing"));
    }

    #[tokio::test]
    async fn test_claim_without_session_makes_no_calls() {
        let mut provider = MockWalletProvider::new();
        provider.expect_request().never();
        let controller = ClaimController::new(configured(), sdk_with(provider));

        let err = controller.claim().await.unwrap_err();
        assert!(matches!(err, ClaimError::NotConnected));
        assert_eq!(
            controller.snapshot().error.as_deref(),
            Some("Please connect your wallet first")
        );
    }

    #[tokio::test]
    async fn test_failed_connect_leaves_no_session() {
        let mut provider = MockWalletProvider::new();
        provider
            .expect_request()
            .withf(|m, _| m == methods::REQUEST_ACCOUNTS)
            .returning(|_, _| Ok(json!([])));
        let controller = ClaimController::new(configured(), sdk_with(provider));

        assert!(matches!(controller.connect().await, Err(ClaimError::NoAccounts)));
        let state = controller.snapshot();
        assert_eq!(state.status, ClaimStatus::Error);
        assert!(state.session.is_none());
        assert_eq!(state.error.as_deref(), Some("Failed to connect: No accounts found."));
    }

    #[tokio::test]
    async fn test_relay_unavailable_keeps_session() {
        let mut provider = connecting_provider();
        provider
            .expect_request()
            .withf(|m, _| m == methods::GET_CAPABILITIES)
            .returning(|_, _| Ok(json!({ "0x14a34": {} })));
        provider
            .expect_request()
            .withf(|m, _| m == methods::SEND_CALLS)
            .never();
        let controller = ClaimController::new(configured(), sdk_with(provider));

        controller.connect().await.unwrap();
        let err = controller.claim().await.unwrap_err();
        assert!(matches!(err, ClaimError::RelayUnavailable(_)));

        let state = controller.snapshot();
        assert_eq!(state.status, ClaimStatus::Error);
        assert_eq!(state.session.unwrap().address, "0xAAA");
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_failure_reported() {
        let mut provider = connecting_provider();
        provider
            .expect_request()
            .withf(|m, _| m == methods::GET_CAPABILITIES)
            .returning(|_, _| Ok(json!({ "0x14a34": { "paymasterService": { "supported": true } } })));
        provider
            .expect_request()
            .withf(|m, _| m == methods::SEND_CALLS)
            .returning(|_, _| Ok(json!("0xBATCH1")));
        provider
            .expect_request()
            .withf(|m, _| m == methods::GET_CALLS_STATUS)
            .returning(|_, _| Ok(json!({ "status": "FAILED", "error": "out of sponsorship" })));
        let controller = ClaimController::new(configured(), sdk_with(provider));

        controller.connect().await.unwrap();
        let err = controller.claim().await.unwrap_err();
        assert!(matches!(err, ClaimError::BatchFailed(_)));

        let state = controller.snapshot();
        assert_eq!(state.status, ClaimStatus::Error);
        assert_eq!(state.error.as_deref(), Some("Batch failed: out of sponsorship"));
        assert_eq!(state.batch_id.as_deref(), Some("0xBATCH1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_claim_again_after_confirmed_clears_previous_batch() {
        let mut provider = connecting_provider();
        provider
            .expect_request()
            .withf(|m, _| m == methods::GET_CAPABILITIES)
            .returning(|_, _| Ok(json!({ "0x14a34": { "paymasterService": { "supported": true } } })));
        let mut sent = 0;
        provider
            .expect_request()
            .withf(|m, _| m == methods::SEND_CALLS)
            .returning(move |_, _| {
                sent += 1;
                Ok(json!(format!("0xBATCH{sent}")))
            });
        provider
            .expect_request()
            .withf(|m, _| m == methods::GET_CALLS_STATUS)
            .returning(|_, p| {
                Ok(json!({
                    "status": "CONFIRMED",
                    "receipts": [{ "transactionHash": format!("0xTX-{}", p[0].as_str().unwrap_or("")) }]
                }))
            });
        let controller = ClaimController::new(configured(), sdk_with(provider));

        controller.connect().await.unwrap();
        controller.claim().await.unwrap();
        controller.claim().await.unwrap();

        let state = controller.snapshot();
        assert_eq!(state.status, ClaimStatus::Confirmed);
        let batch = state.batch.unwrap();
        assert_eq!(batch.batch_id, "0xBATCH2");
        assert_eq!(batch.batch_status.status, BatchState::Confirmed);
        assert_eq!(
            batch.batch_status.first_receipt().unwrap().transaction_hash,
            "0xTX-0xBATCH2"
        );
    }

    #[tokio::test]
    async fn test_connect_twice_is_rejected() {
        let controller = ClaimController::new(configured(), sdk_with(connecting_provider()));
        controller.connect().await.unwrap();

        let err = controller.connect().await.unwrap_err();
        assert!(matches!(err, ClaimError::InvalidStateTransition { .. }));
        assert_eq!(controller.status(), ClaimStatus::Connected);
    }

    #[tokio::test]
    async fn test_disconnect_resets_to_idle() {
        let controller = ClaimController::new(configured(), sdk_with(connecting_provider()));
        controller.connect().await.unwrap();
        let before = controller.snapshot().generation();

        assert!(controller.disconnect().await);
        let state = controller.snapshot();
        assert_eq!(state.status, ClaimStatus::Idle);
        assert!(state.session.is_none());
        assert!(state.generation() > before);
    }
}
