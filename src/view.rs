//! Terminal rendering of the claim view.

use serde::Serialize;
use std::fmt::Write;

use crate::controller::ViewState;
use crate::domain::{BatchRecord, BatchState, ClaimStatus, TargetChain};

/// Which actions the user can take right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub connect: bool,
    pub claim: bool,
    pub disconnect: bool,
}

impl Controls {
    pub fn for_state(state: &ViewState) -> Self {
        let busy = state.status.is_transitional();
        let connected = state.session.is_some();
        Self {
            connect: !connected && !busy,
            claim: connected && !busy,
            disconnect: connected,
        }
    }
}

pub fn connect_label(status: ClaimStatus) -> &'static str {
    match status {
        ClaimStatus::Connecting => "CONNECTING...",
        _ => "CONNECT BASE ACCOUNT",
    }
}

pub fn claim_label(status: ClaimStatus) -> &'static str {
    match status {
        ClaimStatus::Claiming | ClaimStatus::Claimed => "CLAIMING...",
        ClaimStatus::Confirming => "CONFIRMING...",
        _ => "CLAIM REWARD",
    }
}

pub fn batch_label(state: &BatchState) -> &'static str {
    match state {
        BatchState::Confirmed => "SUCCESS - REWARD CLAIMED!",
        BatchState::Failed => "FAILED",
        // Statuses the wallet reports before settling
        BatchState::Pending | BatchState::Other(_) => "PENDING...",
    }
}

/// Serializable form of the view for `--json`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSummary {
    pub status: ClaimStatus,
    pub address: Option<String>,
    pub batch_id: Option<String>,
    pub batch: Option<BatchRecord>,
    pub error: Option<String>,
    pub controls: Controls,
}

impl From<&ViewState> for ViewSummary {
    fn from(state: &ViewState) -> Self {
        Self {
            status: state.status,
            address: state.session.as_ref().map(|s| s.address.clone()),
            batch_id: state.batch_id.clone(),
            batch: state.batch.clone(),
            error: state.error.clone(),
            controls: Controls::for_state(state),
        }
    }
}

fn button(label: &str, enabled: bool) -> String {
    if enabled {
        format!("[ {label} ]")
    } else {
        format!("[ {label} ] (disabled)")
    }
}

/// Render the whole view as plain text
pub fn render(state: &ViewState, chain: &TargetChain) -> String {
    let controls = Controls::for_state(state);
    let mut out = String::new();

    let _ = writeln!(out, "CLAIM REWARD");
    let _ = writeln!(out, "Gasless transaction powered by Coinbase Paymaster");
    let _ = writeln!(out);

    match &state.session {
        None => {
            let _ = writeln!(
                out,
                "{}",
                button(connect_label(state.status), controls.connect)
            );
        }
        Some(session) => {
            let _ = writeln!(out, "Connected Account  {}", session.short_address());
            let _ = writeln!(
                out,
                "{}  {}",
                button(claim_label(state.status), controls.claim),
                button("DISCONNECT", controls.disconnect)
            );
        }
    }

    if let Some(ref error) = state.error {
        let _ = writeln!(out);
        let _ = writeln!(out, "ERROR");
        let _ = writeln!(out, "  {error}");
    }

    if let (Some(_), Some(batch)) = (&state.batch_id, &state.batch) {
        let _ = writeln!(out);
        out.push_str(&render_batch(batch, chain));
    }

    out
}

/// Transaction status panel
pub fn render_batch(batch: &BatchRecord, chain: &TargetChain) -> String {
    let mut out = String::new();
    let status = &batch.batch_status;

    let _ = writeln!(out, "TRANSACTION STATUS");
    let _ = writeln!(out, "  Status            {}", batch_label(&status.status));
    let _ = writeln!(out, "  Batch             {}", batch.batch_id);

    if let Some(receipt) = status.first_receipt() {
        let _ = writeln!(out, "  Transaction Hash  {}", receipt.transaction_hash);
        if let Some(block) = receipt.block_number {
            let _ = writeln!(out, "  Block             {block}");
        }
        if !receipt.transaction_hash.is_empty() {
            let _ = writeln!(
                out,
                "  Explorer          {}",
                chain.tx_url(&receipt.transaction_hash)
            );
        }
    }

    out
}
