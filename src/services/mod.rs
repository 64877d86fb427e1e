pub mod gateway;
pub mod poller;
pub mod submitter;

pub use gateway::ProviderGateway;
pub use poller::{get_batch_status, poll_until_terminal, poll_until_terminal_with, PollConfig};
pub use submitter::{TransactionSubmitter, SEND_CALLS_VERSION};
