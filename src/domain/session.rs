use std::fmt;
use std::sync::Arc;

use crate::adapters::{AccountSdk, WalletProvider};

/// A connected wallet: the account plus the handles used to reach it
#[derive(Clone)]
pub struct WalletSession {
    pub address: String,
    pub provider: Arc<dyn WalletProvider>,
    pub sdk: Arc<dyn AccountSdk>,
}

impl WalletSession {
    /// `0x1234...abcd` form for display
    pub fn short_address(&self) -> String {
        shorten_address(&self.address)
    }
}

impl fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSession")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

pub fn shorten_address(address: &str) -> String {
    if address.len() <= 10 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorten_address() {
        assert_eq!(
            shorten_address("0x5FbDB2315678afecb367f032d93F642f64180aa3"),
            "0x5FbD...0aa3"
        );
        assert_eq!(shorten_address("0xAAA"), "0xAAA");
    }
}
