//! `gasless-claim shell`: interactive claim session.
//!
//! `claim` runs in a background task so `disconnect` stays available while
//! the batch is confirming.

use std::sync::Arc;

use super::output::{self, OutputMode};
use crate::controller::ClaimController;

/// Commands accepted at the shell prompt.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
    /// Connect the wallet
    Connect,
    /// Claim the reward (runs in the background)
    Claim,
    /// Disconnect and clear the session
    Disconnect,
    /// Show the current view
    Status,
}

/// Internal CLI struct for shell parsing.
#[derive(clap::Parser, Debug)]
#[command(name = "claim", no_binary_name = true)]
struct ShellCli {
    #[command(subcommand)]
    command: ShellCommand,
}

pub async fn run(controller: Arc<ClaimController>, mode: OutputMode) -> anyhow::Result<()> {
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    println!("\x1b[36mGasless Claim Shell\x1b[0m");
    println!("Type 'help' for available commands, 'exit' to quit.");
    println!();

    let history_path = dirs::config_dir().map(|d| d.join("gasless-claim").join("history.txt"));

    let mut rl = DefaultEditor::new()?;

    if let Some(ref path) = history_path {
        let _ = rl.load_history(path);
    }

    let chain = controller.config().chain.target_chain();
    output::print_view(&controller.snapshot(), &chain, mode)?;

    loop {
        let line = tokio::task::block_in_place(|| rl.readline("\x1b[36mclaim>\x1b[0m "));
        match line {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                match line {
                    "exit" | "quit" | "q" => break,
                    "help" | "?" => {
                        print_shell_help();
                        continue;
                    }
                    _ => {}
                }

                use clap::Parser;
                let parsed = match ShellCli::try_parse_from(line.split_whitespace()) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        eprintln!("{e}");
                        continue;
                    }
                };

                match parsed.command {
                    ShellCommand::Connect => {
                        if let Err(e) = controller.connect().await {
                            output::print_error(&format!("{e}"));
                        }
                    }
                    ShellCommand::Claim => {
                        let controller = Arc::clone(&controller);
                        let chain = chain.clone();
                        tokio::spawn(async move {
                            match controller.claim().await {
                                Ok(()) => output::print_success("claim finished"),
                                Err(e) => output::print_error(&format!("{e}")),
                            }
                            let _ = output::print_view(&controller.snapshot(), &chain, mode);
                        });
                        output::print_warn("claim started; 'status' to follow, 'disconnect' to abandon");
                        continue;
                    }
                    ShellCommand::Disconnect => {
                        if !controller.disconnect().await {
                            output::print_warn("wallet did not acknowledge the disconnect");
                        }
                    }
                    ShellCommand::Status => {}
                }

                output::print_view(&controller.snapshot(), &chain, mode)?;
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("readline error: {e}");
                break;
            }
        }
    }

    if let Some(ref path) = history_path {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = rl.save_history(path);
    }

    Ok(())
}

fn print_shell_help() {
    println!("Available commands:");
    println!("  connect     (connect the wallet and switch chain)");
    println!("  claim       (submit the sponsored claim, runs in background)");
    println!("  disconnect  (drop the session)");
    println!("  status      (show the current view)");
    println!("  help        (this message)");
    println!("  exit        (quit shell)");
}
