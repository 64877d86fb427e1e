pub mod batch;
pub mod chain;
pub mod session;
pub mod state;

pub use batch::{BatchRecord, BatchState, CallReceipt, CallsStatus};
pub use chain::TargetChain;
pub use session::{shorten_address, WalletSession};
pub use state::ClaimStatus;
