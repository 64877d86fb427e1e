use alloy::primitives::Address;
use clap::{Parser, Subcommand};
use std::sync::Arc;

use crate::adapters::{rewards, AccountSdk};
use crate::config::AppConfig;
use crate::controller::ClaimController;
use crate::domain::{BatchRecord, ClaimStatus};
use crate::services::{self, PollConfig, TransactionSubmitter};

pub mod output;
pub mod shell;

use output::OutputMode;

#[derive(Parser)]
#[command(name = "gasless-claim")]
#[command(version)]
#[command(about = "Claim rewards with gasless transactions sponsored by a paymaster", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config directory (default.toml, $GASLESS_ENV.toml)
    #[arg(short, long, default_value = "config", global = true)]
    pub config: String,

    /// Wallet bridge URL (overrides wallet.bridge_url)
    #[arg(long, env = "GASLESS_BRIDGE_URL", global = true)]
    pub bridge_url: Option<String>,

    /// Print the view as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Connect, submit the sponsored claim and wait for confirmation
    Claim,
    /// Query the status of a batch once
    Status {
        /// Batch id returned by wallet_sendCalls
        batch_id: String,
    },
    /// Poll a batch until it is confirmed or failed
    Wait {
        /// Batch id returned by wallet_sendCalls
        batch_id: String,
        /// Maximum number of status queries
        #[arg(long)]
        max_attempts: Option<u32>,
        /// Delay between queries in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Check whether the paymaster can sponsor calls on the target chain
    Capabilities,
    /// Read rewardClaimed() for an account from the chain
    Claimed {
        /// Account address
        address: String,
    },
    /// Interactive session (connect / claim / disconnect)
    Shell,
}

impl Cli {
    /// Apply flag overrides on top of loaded configuration
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(ref url) = self.bridge_url {
            config.wallet.bridge_url = Some(url.clone());
        }
    }
}

/// Full one-shot flow: connect → claim → confirm
pub async fn run_claim(controller: &ClaimController, mode: OutputMode) -> anyhow::Result<()> {
    let chain = controller.config().chain.target_chain();

    let result = async {
        controller.connect().await?;
        controller.claim().await
    }
    .await;

    output::print_view(&controller.snapshot(), &chain, mode)?;

    match result {
        Ok(()) if controller.status() == ClaimStatus::Confirmed => Ok(()),
        Ok(()) => anyhow::bail!("claim ended in status {}", controller.status()),
        Err(e) => Err(e.into()),
    }
}

pub async fn run_status(
    sdk: &dyn AccountSdk,
    config: &AppConfig,
    batch_id: &str,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let provider = sdk.provider().ok_or(crate::error::ClaimError::NoProvider)?;
    let status = services::get_batch_status(provider.as_ref(), batch_id).await?;
    print_batch(BatchRecord::new(batch_id, status)?, config, mode)
}

pub async fn run_wait(
    sdk: &dyn AccountSdk,
    config: &AppConfig,
    batch_id: &str,
    poll: PollConfig,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let provider = sdk.provider().ok_or(crate::error::ClaimError::NoProvider)?;
    output::print_warn(&format!(
        "waiting up to {}s for batch {}",
        poll.max_wait().as_secs(),
        batch_id
    ));
    let status = services::poll_until_terminal(provider.as_ref(), batch_id, poll).await?;
    print_batch(BatchRecord::new(batch_id, status)?, config, mode)
}

fn print_batch(batch: BatchRecord, config: &AppConfig, mode: OutputMode) -> anyhow::Result<()> {
    match mode {
        OutputMode::Text => {
            print!(
                "{}",
                crate::view::render_batch(&batch, &config.chain.target_chain())
            );
            Ok(())
        }
        OutputMode::Json => output::print_item(&batch),
    }
}

pub async fn run_capabilities(sdk: &dyn AccountSdk, config: &AppConfig) -> anyhow::Result<()> {
    let provider = sdk.provider();
    let paymaster_url = config.rewards.paymaster_url.clone().unwrap_or_default();
    let submitter = TransactionSubmitter::new(
        config.chain.target_chain(),
        config.relay.assume_supported_on_capability_error,
    );

    let ready = submitter
        .check_relay_ready(&paymaster_url, provider.as_deref())
        .await;

    output::print_kv("chain", &config.chain.target_chain().hex_id());
    output::print_kv("paymaster", &paymaster_url);
    if ready {
        output::print_success("paymaster service ready");
    } else {
        output::print_error("paymaster service not available");
    }

    if let Some(provider) = provider {
        match provider
            .request(crate::adapters::methods::GET_CAPABILITIES, serde_json::Value::Null)
            .await
        {
            Ok(raw) => output::print_json_value(&raw)?,
            Err(e) => output::print_warn(&format!("wallet_getCapabilities failed: {e}")),
        }
    }
    Ok(())
}

pub async fn run_claimed(config: &AppConfig, address: &str) -> anyhow::Result<()> {
    let target = config.claim_target()?;
    let owner: Address = address
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid address {address}: {e}"))?;

    let claimed = rewards::reward_claimed(config.rpc_url()?, target.contract_address, owner).await?;
    output::print_kv("rewardClaimed", &claimed.to_string());
    Ok(())
}

pub async fn run_shell(controller: Arc<ClaimController>, mode: OutputMode) -> anyhow::Result<()> {
    shell::run(controller, mode).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wait_flags() {
        let cli = Cli::try_parse_from([
            "gasless-claim",
            "wait",
            "0xBATCH1",
            "--max-attempts",
            "3",
            "--interval-ms",
            "500",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Commands::Wait {
                batch_id: "0xBATCH1".to_string(),
                max_attempts: Some(3),
                interval_ms: Some(500),
            }
        );
        assert_eq!(cli.config, "config");
    }

    #[test]
    fn test_bridge_override() {
        let cli = Cli::try_parse_from([
            "gasless-claim",
            "--bridge-url",
            "http://127.0.0.1:8545",
            "claim",
        ])
        .unwrap();
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(
            config.wallet.bridge_url.as_deref(),
            Some("http://127.0.0.1:8545")
        );
    }
}
