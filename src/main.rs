use clap::Parser;
use gasless_claim::adapters::{AccountSdk, BridgeSdk};
use gasless_claim::cli::{self, output::OutputMode, Cli, Commands};
use gasless_claim::config::AppConfig;
use gasless_claim::controller::ClaimController;
use gasless_claim::services::PollConfig;
use std::sync::Arc;
use tracing::{debug, error};

mod main_runtime;

use main_runtime::{init_logging, init_logging_simple};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_from(&cli.config)?;
    cli.apply_overrides(&mut config);
    let mode = OutputMode::from_json_flag(cli.json);

    match cli.command {
        Commands::Claim | Commands::Shell => init_logging(&config.logging),
        _ => init_logging_simple(),
    }
    debug!("Loaded configuration from {}", cli.config);

    let sdk: Arc<dyn AccountSdk> = Arc::new(BridgeSdk::from_config(&config.wallet)?);

    let result = match &cli.command {
        Commands::Claim => {
            let controller = ClaimController::new(config, sdk);
            cli::run_claim(&controller, mode).await
        }
        Commands::Status { batch_id } => {
            cli::run_status(sdk.as_ref(), &config, batch_id, mode).await
        }
        Commands::Wait {
            batch_id,
            max_attempts,
            interval_ms,
        } => {
            let poll = PollConfig::new(
                max_attempts.unwrap_or(config.polling.max_attempts),
                interval_ms.unwrap_or(config.polling.interval_ms),
            );
            cli::run_wait(sdk.as_ref(), &config, batch_id, poll, mode).await
        }
        Commands::Capabilities => cli::run_capabilities(sdk.as_ref(), &config).await,
        Commands::Claimed { address } => cli::run_claimed(&config, address).await,
        Commands::Shell => {
            let controller = Arc::new(ClaimController::new(config, sdk));
            cli::run_shell(controller, mode).await
        }
    };

    if let Err(ref e) = result {
        error!("{e:#}");
    }
    result
}
