//! Rewards contract bindings.

use alloy::primitives::{Address, Bytes};
use alloy::providers::ProviderBuilder;
use alloy::sol;
use alloy::sol_types::SolCall;
use tracing::debug;
use url::Url;

use crate::error::{ClaimError, Result};

// Generate contract bindings for the rewards contract
sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IRewards {
        /// Claim the caller's reward
        function claimReward() external;

        /// Whether the reward has been claimed
        function rewardClaimed() external view returns (bool);
    }
}

/// Calldata for `claimReward()`: the bare 4-byte selector
pub fn claim_calldata() -> Bytes {
    Bytes::from(IRewards::claimRewardCall {}.abi_encode())
}

/// Read `rewardClaimed()` from the chain as `owner`
pub async fn reward_claimed(rpc_url: Url, contract: Address, owner: Address) -> Result<bool> {
    let provider = ProviderBuilder::new().connect_http(rpc_url);
    let rewards = IRewards::new(contract, provider);

    let claimed = rewards
        .rewardClaimed()
        .from(owner)
        .call()
        .await
        .map_err(|e| ClaimError::Other(anyhow::anyhow!("rewardClaimed() call failed: {e}")))?;

    debug!("rewardClaimed() for {} on {} = {}", owner, contract, claimed);
    Ok(claimed)
}
