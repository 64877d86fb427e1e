//! EIP-1193 request surface of an installed wallet.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::error::Result;

/// Wallet RPC methods used by the claim flow
pub mod methods {
    pub const REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
    pub const CHAIN_ID: &str = "eth_chainId";
    pub const SWITCH_CHAIN: &str = "wallet_switchEthereumChain";
    pub const ADD_CHAIN: &str = "wallet_addEthereumChain";
    pub const GET_CAPABILITIES: &str = "wallet_getCapabilities";
    pub const SEND_CALLS: &str = "wallet_sendCalls";
    pub const GET_CALLS_STATUS: &str = "wallet_getCallsStatus";
    pub const REVOKE_PERMISSIONS: &str = "wallet_revokePermissions";
}

/// `provider.request({ method, params })`
///
/// `params` is `Value::Null` for methods that take none. Wallet-side JSON-RPC
/// errors come back as `ClaimError::Provider` carrying the numeric code.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> Result<Value>;
}

/// Account SDK that hands out the provider and owns the session lifecycle
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountSdk: Send + Sync {
    /// The wallet's request interface, if a wallet is installed
    fn provider(&self) -> Option<Arc<dyn WalletProvider>>;

    /// Release the session
    async fn disconnect(&self) -> Result<()>;
}
