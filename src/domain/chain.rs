use serde_json::{json, Value};

use super::batch::parse_quantity;

/// The network the wallet must be on for calls to be valid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetChain {
    pub id: u64,
    pub name: String,
    pub currency_name: String,
    pub currency_symbol: String,
    pub currency_decimals: u8,
    pub rpc_url: String,
    pub explorer_url: String,
}

impl TargetChain {
    /// Chain id as the wallet expects it, e.g. `0x14a34`
    pub fn hex_id(&self) -> String {
        format!("{:#x}", self.id)
    }

    /// Compare against a chain id in any hex/decimal spelling
    pub fn matches(&self, chain_id: &str) -> bool {
        parse_quantity(chain_id) == Some(self.id)
    }

    /// `wallet_addEthereumChain` parameter object
    pub fn add_chain_params(&self) -> Value {
        json!({
            "chainId": self.hex_id(),
            "chainName": self.name,
            "nativeCurrency": {
                "name": self.currency_name,
                "symbol": self.currency_symbol,
                "decimals": self.currency_decimals,
            },
            "rpcUrls": [self.rpc_url],
            "blockExplorerUrls": [self.explorer_url],
        })
    }

    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), tx_hash)
    }
}
