pub mod adapters;
pub mod cli;
pub mod config;
pub mod controller;
pub mod domain;
pub mod error;
pub mod services;
pub mod view;

pub use adapters::{AccountSdk, BridgeSdk, WalletProvider};
pub use config::AppConfig;
pub use controller::{ClaimController, ViewState};
pub use domain::{BatchRecord, BatchState, CallsStatus, ClaimStatus, WalletSession};
pub use error::{ClaimError, Result};
pub use services::{PollConfig, ProviderGateway, TransactionSubmitter};
