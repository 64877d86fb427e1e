//! Provider gateway: account access, chain selection and session release.

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::adapters::{methods, AccountSdk, WalletProvider};
use crate::domain::{TargetChain, WalletSession};
use crate::error::{ClaimError, Result, RpcError};

/// Connects to the installed wallet and keeps it on the target chain
pub struct ProviderGateway {
    sdk: Arc<dyn AccountSdk>,
    chain: TargetChain,
}

impl ProviderGateway {
    pub fn new(sdk: Arc<dyn AccountSdk>, chain: TargetChain) -> Self {
        Self { sdk, chain }
    }

    pub fn chain(&self) -> &TargetChain {
        &self.chain
    }

    /// Request account access and open a session on the first account
    #[instrument(skip(self))]
    pub async fn connect(&self) -> Result<WalletSession> {
        let provider = self.sdk.provider().ok_or(ClaimError::NoProvider)?;

        let accounts = provider
            .request(methods::REQUEST_ACCOUNTS, Value::Null)
            .await?;

        let address = match accounts {
            Value::Array(list) => match list.first() {
                Some(Value::String(addr)) if !addr.is_empty() => addr.clone(),
                Some(other) => {
                    return Err(ClaimError::MalformedResponse(format!(
                        "unexpected account entry {other}"
                    )))
                }
                None => return Err(ClaimError::NoAccounts),
            },
            Value::Null => return Err(ClaimError::NoAccounts),
            other => {
                return Err(ClaimError::MalformedResponse(format!(
                    "eth_requestAccounts returned {other}"
                )))
            }
        };

        info!("Wallet connected: {}", address);
        Ok(WalletSession {
            address,
            provider,
            sdk: Arc::clone(&self.sdk),
        })
    }

    /// Put the wallet on the target chain, registering the chain if the wallet
    /// does not know it. Failures are logged and reported as `false`.
    #[instrument(skip(self, provider), fields(target = self.chain.id))]
    pub async fn ensure_target_chain(&self, provider: &dyn WalletProvider) -> bool {
        let current = match provider.request(methods::CHAIN_ID, Value::Null).await {
            Ok(Value::String(id)) => id,
            Ok(Value::Number(n)) => n.to_string(),
            Ok(other) => {
                warn!("eth_chainId returned {}", other);
                return false;
            }
            Err(e) => {
                warn!("Could not read wallet chain: {}", e);
                return false;
            }
        };

        if self.chain.matches(&current) {
            debug!("Wallet already on {} ({})", self.chain.name, current);
            return true;
        }

        info!(
            "Switching wallet from chain {} to {} ({})",
            current,
            self.chain.hex_id(),
            self.chain.name
        );

        match self.switch_chain(provider).await {
            Ok(()) => true,
            Err(e) if e.rpc_error().is_some_and(RpcError::is_unrecognized_chain) => {
                info!("Wallet does not know {}, registering it", self.chain.name);
                match self.add_chain(provider).await {
                    Ok(()) => true,
                    Err(e) => {
                        error!("Error switching to {}: {}", self.chain.name, e);
                        false
                    }
                }
            }
            Err(e) => {
                warn!("Error switching to {}: {}", self.chain.name, e);
                false
            }
        }
    }

    async fn switch_chain(&self, provider: &dyn WalletProvider) -> Result<()> {
        provider
            .request(
                methods::SWITCH_CHAIN,
                json!([{ "chainId": self.chain.hex_id() }]),
            )
            .await?;
        Ok(())
    }

    async fn add_chain(&self, provider: &dyn WalletProvider) -> Result<()> {
        provider
            .request(methods::ADD_CHAIN, json!([self.chain.add_chain_params()]))
            .await?;
        // Some wallets switch as part of registration, others need the retry
        self.switch_chain(provider).await
    }

    /// Release the session. Never fails; returns whether the release succeeded.
    pub async fn disconnect(sdk: Option<&dyn AccountSdk>) -> bool {
        let Some(sdk) = sdk else {
            return true;
        };
        match sdk.disconnect().await {
            Ok(()) => {
                info!("Wallet disconnected");
                true
            }
            Err(e) => {
                error!("Error disconnecting wallet: {}", e);
                false
            }
        }
    }
}
