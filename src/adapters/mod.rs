pub mod bridge;
pub mod provider;
pub mod rewards;

pub use bridge::{BridgeProvider, BridgeSdk};
pub use provider::{methods, AccountSdk, WalletProvider};
