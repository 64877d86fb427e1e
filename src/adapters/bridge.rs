//! JSON-RPC bridge to a browser wallet.
//!
//! The bridge is a local HTTP endpoint that forwards each request to the
//! page's `window.ethereum.request` and returns the wallet's answer in a
//! JSON-RPC 2.0 envelope.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::provider::{methods, AccountSdk, WalletProvider};
use crate::config::WalletConfig;
use crate::error::{ClaimError, Result, RpcError};

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

/// EIP-1193 provider reached over HTTP
pub struct BridgeProvider {
    http: Client,
    url: Url,
    next_id: AtomicU64,
}

impl BridgeProvider {
    pub fn new(url: &str, timeout: Duration, app_name: &str) -> Result<Self> {
        let url = Url::parse(url.trim())
            .map_err(|e| ClaimError::Configuration(format!("invalid wallet.bridge_url: {e}")))?;

        let http = Client::builder()
            .user_agent(format!("{}/{}", app_name, env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            url,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn envelope(&self, method: &str, params: Value) -> Value {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
        });
        if !params.is_null() {
            body["params"] = params;
        }
        body
    }
}

#[async_trait]
impl WalletProvider for BridgeProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let body = self.envelope(method, params);
        debug!("wallet request {} -> {}", method, self.url);

        let resp = self.http.post(self.url.clone()).json(&body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        decode_response(method, status, &text)
    }
}

/// Map a bridge HTTP answer to the wallet's result or error.
///
/// Bridges may return the JSON-RPC error object with a non-2xx status, so
/// the error object wins over the HTTP status.
fn decode_response(method: &str, status: StatusCode, text: &str) -> Result<Value> {
    let parsed: Option<RpcResponse> = serde_json::from_str(text).ok();
    match parsed {
        Some(RpcResponse {
            error: Some(err), ..
        }) => Err(ClaimError::Provider(err)),
        Some(RpcResponse { result, .. }) if status.is_success() => {
            Ok(result.unwrap_or(Value::Null))
        }
        _ => Err(ClaimError::MalformedResponse(format!(
            "{} failed: status={} body={}",
            method, status, text
        ))),
    }
}

/// Account SDK backed by the bridge
pub struct BridgeSdk {
    provider: Option<Arc<BridgeProvider>>,
}

impl BridgeSdk {
    /// No configured bridge means no installed wallet
    pub fn from_config(config: &WalletConfig) -> Result<Self> {
        let provider = match config.bridge_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Some(Arc::new(BridgeProvider::new(
                url,
                Duration::from_millis(config.request_timeout_ms),
                &config.app_name,
            )?)),
            _ => None,
        };

        if let Some(ref p) = provider {
            info!("{} using wallet bridge at {}", config.app_name, p.url());
        }

        Ok(Self { provider })
    }
}

#[async_trait]
impl AccountSdk for BridgeSdk {
    fn provider(&self) -> Option<Arc<dyn WalletProvider>> {
        self.provider
            .as_ref()
            .map(|p| Arc::clone(p) as Arc<dyn WalletProvider>)
    }

    async fn disconnect(&self) -> Result<()> {
        if let Some(ref provider) = self.provider {
            provider
                .request(
                    methods::REVOKE_PERMISSIONS,
                    json!([{ "eth_accounts": {} }]),
                )
                .await?;
        }
        Ok(())
    }
}
