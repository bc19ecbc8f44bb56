//! Plain-text rendering of the wizard.

use crate::chain::types::TxHash;
use crate::publish::PublishStatus;
use crate::wizard::{Step, Wizard};

/// Render the full wizard screen.
pub fn render(wizard: &Wizard, status: &PublishStatus, explorer_tx_url: &str) -> String {
    let mut out = String::new();
    out.push_str(&render_stepper(wizard.step()));
    out.push('\n');

    match wizard.step() {
        Step::ConnectWallet => {
            out.push_str("Select Wallet\n");
            if wizard.wallets().is_empty() {
                out.push_str("  Loading wallets...\n");
            }
            for wallet in wizard.wallets() {
                out.push_str(&format!("  - {}\n", wallet.name));
            }
        }
        Step::CreateMasterKey => {
            out.push_str("Create Master Key\n");
            if wizard.session().master_key().is_some() {
                out.push_str("  Master key created successfully!\n");
            } else {
                out.push_str("  No master key yet.\n");
            }
        }
        Step::PublishDid => {
            out.push_str("Publish DID\n");
            if let Some(short) = wizard.session().short_form_did() {
                out.push_str(&format!("  You are about to publish your Prism DID {} on chain.\n", short));
            }
            if let Some(line) = render_status(status, explorer_tx_url) {
                out.push_str(&format!("  {}\n", line));
            }
        }
    }

    let mut nav = Vec::new();
    if wizard.step().previous().is_some() {
        nav.push("[previous]");
    }
    if wizard.can_go_next() {
        nav.push("[next]");
    }
    if !nav.is_empty() {
        out.push_str(&format!("\n{}\n", nav.join(" ")));
    }
    out
}

/// One line per step, the current one marked.
pub fn render_stepper(current: Step) -> String {
    Step::ALL
        .iter()
        .map(|&step| {
            let marker = if step == current { '>' } else { ' ' };
            format!(
                "{} {}. {} - {}\n",
                marker,
                step.index() + 1,
                step.title(),
                step.description()
            )
        })
        .collect()
}

/// Status line for the publish step; `None` while idle.
pub fn render_status(status: &PublishStatus, explorer_tx_url: &str) -> Option<String> {
    let message = status.message().unwrap_or_default();
    let link = |hash: Option<&TxHash>| {
        hash.map(|h| format!(" View transaction: {}", explorer_link(explorer_tx_url, h)))
            .unwrap_or_default()
    };

    match status {
        PublishStatus::Idle => None,
        PublishStatus::Publishing { .. } => Some(format!("... {}", message)),
        PublishStatus::Confirming { tx_hash, .. } => {
            Some(format!("... {}{}", message, link(tx_hash.as_ref())))
        }
        PublishStatus::Completed { tx_hash, .. } => {
            Some(format!("✓ {}{}", message, link(tx_hash.as_ref())))
        }
        PublishStatus::Error { .. } => Some(format!("✗ {}", message)),
    }
}

pub fn explorer_link(explorer_tx_url: &str, tx_hash: &TxHash) -> String {
    format!("{}{}", explorer_tx_url, tx_hash)
}
