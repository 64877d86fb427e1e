use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error code a wallet returns from `wallet_switchEthereumChain` when the chain is unknown
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

/// Main error type for the claim flow
#[derive(Error, Debug)]
pub enum ClaimError {
    // Wallet session errors
    #[error("No provider found. Please install the Base Wallet extension.")]
    NoProvider,

    #[error("No accounts found.")]
    NoAccounts,

    #[error("Please connect your wallet first")]
    NotConnected,

    // Configuration errors
    #[error("Configuration missing: {0}")]
    Configuration(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Relay / submission errors
    #[error("Paymaster service is not configured: {0}")]
    RelayUnavailable(String),

    #[error("Failed to claim reward: {0}")]
    Submission(#[source] Box<ClaimError>),

    #[error("Batch failed: {0}")]
    BatchFailed(String),

    #[error("Batch confirmation timeout after {attempts} attempts")]
    Timeout { attempts: u32 },

    // Wallet RPC errors
    #[error("Wallet error: {0}")]
    Provider(RpcError),

    #[error("Malformed wallet response: {0}")]
    MalformedResponse(String),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // State machine errors
    #[error("Invalid state transition: from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl ClaimError {
    /// Wrap any failure on the submission path
    pub fn submission(cause: ClaimError) -> Self {
        match cause {
            already @ ClaimError::Submission(_) => already,
            other => ClaimError::Submission(Box::new(other)),
        }
    }

    /// The wallet's JSON-RPC error object, looking through `Submission`
    pub fn rpc_error(&self) -> Option<&RpcError> {
        match self {
            ClaimError::Provider(rpc) => Some(rpc),
            ClaimError::Submission(inner) => inner.rpc_error(),
            _ => None,
        }
    }

    /// Wallet error code, if the failure came from a JSON-RPC error object
    pub fn rpc_code(&self) -> Option<i64> {
        self.rpc_error().map(|rpc| rpc.code)
    }
}

/// Result type alias for ClaimError
pub type Result<T> = std::result::Result<T, ClaimError>;

/// JSON-RPC error object as returned by an EIP-1193 provider
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{message} (code {code})")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn is_unrecognized_chain(&self) -> bool {
        self.code == UNRECOGNIZED_CHAIN_CODE
    }
}

impl From<RpcError> for ClaimError {
    fn from(err: RpcError) -> Self {
        ClaimError::Provider(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_does_not_double_wrap() {
        let err = ClaimError::submission(ClaimError::submission(ClaimError::NoProvider));
        match err {
            ClaimError::Submission(inner) => assert!(matches!(*inner, ClaimError::NoProvider)),
            other => panic!("expected Submission, got {other:?}"),
        }
    }

    #[test]
    fn test_rpc_code_through_submission() {
        let err = ClaimError::submission(RpcError::new(4001, "User rejected").into());
        assert_eq!(err.rpc_code(), Some(4001));
        assert_eq!(err.rpc_error().map(|e| e.message.as_str()), Some("User rejected"));
        assert_eq!(ClaimError::NoAccounts.rpc_code(), None);
    }

    #[test]
    fn test_messages_are_human_readable() {
        assert_eq!(
            ClaimError::NotConnected.to_string(),
            "Please connect your wallet first"
        );
        assert_eq!(
            ClaimError::BatchFailed("reverted".into()).to_string(),
            "Batch failed: reverted"
        );
        assert_eq!(
            ClaimError::Provider(RpcError::new(4902, "Unrecognized chain")).to_string(),
            "Wallet error: Unrecognized chain (code 4902)"
        );
    }

    #[test]
    fn test_rpc_error_deserializes_without_data() {
        let err: RpcError =
            serde_json::from_str(r#"{"code":4902,"message":"Unrecognized chain ID"}"#).unwrap();
        assert!(err.is_unrecognized_chain());
        assert!(err.data.is_none());
    }
}
