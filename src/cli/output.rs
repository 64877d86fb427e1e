//! Output formatting for CLI commands.
//!
//! Supports two modes: the rendered text view (default) and JSON (--json).

use serde::Serialize;

use crate::controller::ViewState;
use crate::domain::TargetChain;
use crate::view::{self, ViewSummary};

/// Output mode for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Text
        }
    }
}

/// Print the claim view in the chosen mode.
pub fn print_view(state: &ViewState, chain: &TargetChain, mode: OutputMode) -> anyhow::Result<()> {
    match mode {
        OutputMode::Text => print!("{}", view::render(state, chain)),
        OutputMode::Json => print_item(&ViewSummary::from(state))?,
    }
    Ok(())
}

/// Print a single Serialize item as pretty JSON.
pub fn print_item<T: Serialize>(item: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(item)?);
    Ok(())
}

/// Print raw JSON value.
pub fn print_json_value(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a simple key-value pair.
pub fn print_kv(key: &str, value: &str) {
    println!("{key}: {value}");
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("\x1b[32m{msg}\x1b[0m");
}

/// Print a warning message.
pub fn print_warn(msg: &str) {
    println!("\x1b[33m{msg}\x1b[0m");
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("\x1b[31m{msg}\x1b[0m");
}
