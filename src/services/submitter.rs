//! Sponsored batch submission through `wallet_sendCalls`.

use alloy::primitives::Address;
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::adapters::{methods, rewards, WalletProvider};
use crate::domain::TargetChain;
use crate::error::{ClaimError, Result};

/// `wallet_sendCalls` protocol version
pub const SEND_CALLS_VERSION: &str = "1.0";

/// Builds and submits the claim batch
#[derive(Debug, Clone)]
pub struct TransactionSubmitter {
    chain: TargetChain,
    /// Treat a failing capability query as "paymaster supported"
    assume_supported_on_capability_error: bool,
}

impl TransactionSubmitter {
    pub fn new(chain: TargetChain, assume_supported_on_capability_error: bool) -> Self {
        Self {
            chain,
            assume_supported_on_capability_error,
        }
    }

    /// Whether the relay URL is usable and the wallet advertises paymaster
    /// support on the target chain. Never errors.
    #[instrument(skip(self, provider))]
    pub async fn check_relay_ready(
        &self,
        relay_url: &str,
        provider: Option<&dyn WalletProvider>,
    ) -> bool {
        if relay_url.trim().is_empty() {
            return false;
        }
        if let Err(e) = Url::parse(relay_url.trim()) {
            error!("Invalid paymaster URL {:?}: {}", relay_url, e);
            return false;
        }

        let Some(provider) = provider else {
            return true;
        };

        match provider
            .request(methods::GET_CAPABILITIES, Value::Null)
            .await
        {
            Ok(capabilities) => {
                let supported = self.paymaster_supported(&capabilities);
                debug!(
                    "Paymaster service on chain {}: {}",
                    self.chain.hex_id(),
                    supported
                );
                supported
            }
            Err(e) if self.assume_supported_on_capability_error => {
                warn!("Capability query failed, assuming paymaster support: {}", e);
                true
            }
            Err(e) => {
                error!("Capability query failed: {}", e);
                false
            }
        }
    }

    /// `capabilities[<target chain>].paymasterService.supported == true`
    pub fn paymaster_supported(&self, capabilities: &Value) -> bool {
        let Some(by_chain) = capabilities.as_object() else {
            return false;
        };
        by_chain
            .iter()
            .filter(|(chain_id, _)| self.chain.matches(chain_id))
            .any(|(_, caps)| caps["paymasterService"]["supported"].as_bool() == Some(true))
    }

    /// `wallet_sendCalls` parameters for a single zero-value `claimReward()` call
    pub fn send_calls_params(&self, from: &str, contract: Address, relay_url: &str) -> Value {
        json!([{
            "version": SEND_CALLS_VERSION,
            "chainId": self.chain.hex_id(),
            "from": from,
            "calls": [{
                "to": contract.to_string(),
                "value": "0x0",
                "data": rewards::claim_calldata().to_string(),
            }],
            "capabilities": {
                "paymasterService": { "url": relay_url },
            },
        }])
    }

    /// Submit the sponsored claim batch and return the wallet's batch id
    #[instrument(skip(self, provider))]
    pub async fn submit(
        &self,
        provider: Option<&dyn WalletProvider>,
        from: &str,
        contract: Address,
        relay_url: &str,
    ) -> Result<String> {
        let provider = provider.ok_or_else(|| ClaimError::submission(ClaimError::NoProvider))?;

        if relay_url.trim().is_empty() {
            return Err(ClaimError::submission(ClaimError::Configuration(
                "No paymaster URL provided".to_string(),
            )));
        }

        let params = self.send_calls_params(from, contract, relay_url.trim());
        let result = provider
            .request(methods::SEND_CALLS, params)
            .await
            .map_err(|e| {
                error!("Error sending transaction: {}", e);
                ClaimError::submission(e)
            })?;

        let batch_id = parse_batch_id(result).map_err(ClaimError::submission)?;
        info!("Claim batch submitted: {}", batch_id);
        Ok(batch_id)
    }
}

/// Batch id from either a bare string or `{ "id": ... }`
fn parse_batch_id(result: Value) -> Result<String> {
    let id = match result {
        Value::String(id) => Some(id),
        Value::Object(mut obj) => match obj.remove("id") {
            Some(Value::String(id)) => Some(id),
            _ => None,
        },
        _ => None,
    };

    id.filter(|id| !id.is_empty()).ok_or_else(|| {
        ClaimError::MalformedResponse("wallet_sendCalls returned no batch id".to_string())
    })
}
