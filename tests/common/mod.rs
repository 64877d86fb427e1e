//! Scripted in-memory wallet for driving the claim flow.

#![allow(dead_code)]

use async_trait::async_trait;
use gasless_claim::adapters::{methods, AccountSdk, WalletProvider};
use gasless_claim::error::{ClaimError, Result, RpcError};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
pub const PAYMASTER: &str = "https://paymaster.example/rpc/v1/base-sepolia";

pub struct FakeWallet {
    pub accounts: Vec<String>,
    pub chain_id: String,
    pub capabilities: Value,
    pub batch_id: String,
    /// Status answers in order; the last one repeats
    statuses: Mutex<VecDeque<Value>>,
    /// When set, every status query waits for a permit first
    pub status_gate: Option<Arc<Notify>>,
    calls: Mutex<Vec<String>>,
}

impl FakeWallet {
    pub fn new(statuses: Vec<Value>) -> Self {
        Self {
            accounts: vec!["0xAAA0000000000000000000000000000000000001".to_string()],
            chain_id: "0x14a34".to_string(),
            capabilities: json!({
                "0x14a34": { "paymasterService": { "supported": true } }
            }),
            batch_id: "0xBATCH1".to_string(),
            statuses: Mutex::new(statuses.into()),
            status_gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.status_gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn next_status(&self) -> Value {
        let mut statuses = self.statuses.lock().unwrap();
        if statuses.len() > 1 {
            statuses.pop_front().unwrap()
        } else {
            statuses.front().cloned().unwrap_or(json!({ "status": "PENDING" }))
        }
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        self.calls.lock().unwrap().push(method.to_string());

        match method {
            methods::REQUEST_ACCOUNTS => Ok(json!(self.accounts)),
            methods::CHAIN_ID => Ok(json!(self.chain_id)),
            methods::GET_CAPABILITIES => Ok(self.capabilities.clone()),
            methods::SEND_CALLS => {
                if params[0]["capabilities"]["paymasterService"]["url"].is_null() {
                    return Err(RpcError::new(-32602, "missing paymaster").into());
                }
                Ok(json!(self.batch_id))
            }
            methods::GET_CALLS_STATUS => {
                if let Some(ref gate) = self.status_gate {
                    gate.notified().await;
                }
                Ok(self.next_status())
            }
            other => Err(ClaimError::Provider(RpcError::new(
                4200,
                format!("unsupported method {other}"),
            ))),
        }
    }
}

pub struct FakeSdk {
    pub wallet: Option<Arc<FakeWallet>>,
}

#[async_trait]
impl AccountSdk for FakeSdk {
    fn provider(&self) -> Option<Arc<dyn WalletProvider>> {
        self.wallet
            .as_ref()
            .map(|w| Arc::clone(w) as Arc<dyn WalletProvider>)
    }

    async fn disconnect(&self) -> Result<()> {
        Ok(())
    }
}
