//! Batch call status as reported by `wallet_getCallsStatus`.
//!
//! Wallets speak two dialects: the original string statuses (`PENDING`,
//! `CONFIRMED`, `FAILED`) and the numeric EIP-5792 codes (`100`, `200`,
//! `4xx`..`6xx`). Both decode into [`BatchState`].

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::error::{ClaimError, Result};

/// Lifecycle of a submitted batch
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BatchState {
    Pending,
    Confirmed,
    Failed,
    /// Anything the wallet reports that is neither terminal nor pending
    Other(String),
}

impl BatchState {
    pub fn as_str(&self) -> &str {
        match self {
            BatchState::Pending => "PENDING",
            BatchState::Confirmed => "CONFIRMED",
            BatchState::Failed => "FAILED",
            BatchState::Other(s) => s.as_str(),
        }
    }

    pub fn from_code(code: u64) -> Self {
        match code {
            100..=199 => BatchState::Pending,
            200..=299 => BatchState::Confirmed,
            400..=699 => BatchState::Failed,
            other => BatchState::Other(other.to_string()),
        }
    }
}

impl From<&str> for BatchState {
    fn from(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => BatchState::Pending,
            "CONFIRMED" => BatchState::Confirmed,
            "FAILED" => BatchState::Failed,
            _ => BatchState::Other(s.to_string()),
        }
    }
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for BatchState {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BatchState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => Ok(BatchState::from(s.as_str())),
            serde_json::Value::Number(n) => n
                .as_u64()
                .map(BatchState::from_code)
                .ok_or_else(|| de::Error::custom(format!("invalid status code {n}"))),
            other => Err(de::Error::custom(format!("invalid batch status {other}"))),
        }
    }
}

/// Receipt of one executed call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallReceipt {
    #[serde(default)]
    pub transaction_hash: String,
    #[serde(
        default,
        deserialize_with = "deserialize_block_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub block_number: Option<u64>,
}

/// Raw status object for one batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallsStatus {
    pub status: BatchState,
    #[serde(default, deserialize_with = "deserialize_receipts")]
    pub receipts: Vec<CallReceipt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

impl CallsStatus {
    pub fn first_receipt(&self) -> Option<&CallReceipt> {
        self.receipts.first()
    }

    /// Relay-reported failure detail
    pub fn error_detail(&self) -> String {
        match &self.error {
            Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
            Some(serde_json::Value::Object(obj)) => obj
                .get("message")
                .and_then(|m| m.as_str())
                .map(String::from)
                .unwrap_or_else(|| serde_json::Value::Object(obj.clone()).to_string()),
            Some(serde_json::Value::Null) | Some(serde_json::Value::String(_)) | None => {
                format!("status {}", self.status)
            }
            Some(other) => other.to_string(),
        }
    }

    /// A confirmed batch with receipts must name at least one transaction
    pub fn validate(&self) -> Result<()> {
        if self.status == BatchState::Confirmed
            && !self.receipts.is_empty()
            && self.receipts.iter().all(|r| r.transaction_hash.trim().is_empty())
        {
            return Err(ClaimError::MalformedResponse(
                "confirmed batch carries receipts without a transaction hash".to_string(),
            ));
        }
        Ok(())
    }
}

/// A submitted batch and its latest known status
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRecord {
    pub batch_id: String,
    pub batch_status: CallsStatus,
}

impl BatchRecord {
    pub fn new(batch_id: impl Into<String>, batch_status: CallsStatus) -> Result<Self> {
        batch_status.validate()?;
        Ok(Self {
            batch_id: batch_id.into(),
            batch_status,
        })
    }
}

fn deserialize_receipts<'de, D>(deserializer: D) -> std::result::Result<Vec<CallReceipt>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<CallReceipt>>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_block_number<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(n) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid block number {n}"))),
        serde_json::Value::String(s) => parse_quantity(&s)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid block number {s}"))),
        other => Err(de::Error::custom(format!("invalid block number {other}"))),
    }
}

/// Parse a JSON-RPC quantity: `0x`-prefixed hex or plain decimal
pub fn parse_quantity(s: &str) -> Option<u64> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) if !hex.is_empty() => u64::from_str_radix(hex, 16).ok(),
        Some(_) => None,
        None => s.parse().ok(),
    }
}
