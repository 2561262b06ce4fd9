//! Tally settlement harness.
//!
//! Reads a ledger snapshot, prints each member's balance and the transfers
//! that settle the ledger.
//!
//! Usage: cargo run --bin settle -- bins/settle/ledger.example.json

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tally_core::currency::{RoundingScale, from_minor_units};
use tally_core::settlement::{Expense, LedgerSettings, Settlement, settle};
use tally_shared::config::LogConfig;
use tally_shared::{AppConfig, CurrencyCode, LedgerId};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "settle", about = "Compute balances and a settlement plan for a ledger")]
struct Cli {
    /// Path to a JSON ledger snapshot.
    ledger: PathBuf,
}

/// A ledger as exported by the application.
#[derive(Debug, Deserialize)]
struct LedgerSnapshot {
    /// Ledger identifier, used for log context only.
    #[serde(default)]
    ledger_id: Option<LedgerId>,
    /// Ledger currency. Falls back to the configured default.
    #[serde(default)]
    currency: Option<CurrencyCode>,
    /// Ledger policy. Falls back to the configured defaults.
    #[serde(default)]
    settings: Option<LedgerSettings>,
    /// Expense history in recorded order.
    expenses: Vec<Expense>,
}

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.log);

    let cli = Cli::parse();
    let snapshot = read_snapshot(&cli.ledger)?;

    let currency = match snapshot.currency {
        Some(currency) => currency,
        None => config
            .settlement
            .currency
            .parse()
            .context("Configured default currency is invalid")?,
    };
    let settings = match snapshot.settings {
        Some(settings) => settings,
        None => LedgerSettings::from_config(&config.settlement)
            .context("Configured default settlement policy is invalid")?,
    };

    info!(
        ledger_id = ?snapshot.ledger_id,
        currency = %currency,
        expenses = snapshot.expenses.len(),
        "Settling ledger"
    );

    let settlement = settle(currency, &snapshot.expenses, &settings).map_err(|err| {
        anyhow::anyhow!("{err} [{}]", err.error_code())
    })?;

    let mut report = String::new();
    render(&mut report, &settlement, currency, settings.rounding_scale)?;
    print!("{report}");
    Ok(())
}

fn init_tracing(log: &LogConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let json = log
        .json
        .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr));
    let text = (!log.json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .init();
}

fn read_snapshot(path: &Path) -> anyhow::Result<LedgerSnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read ledger snapshot {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse ledger snapshot {}", path.display()))
}

fn render(
    out: &mut impl fmt::Write,
    settlement: &Settlement,
    currency: CurrencyCode,
    scale: RoundingScale,
) -> fmt::Result {
    let amount = |minor: i64| from_minor_units(minor, scale);

    writeln!(out, "Balances ({currency}):")?;
    for balance in settlement.sheet.iter() {
        writeln!(
            out,
            "  {}  paid {}  owed {}  net {}",
            balance.member,
            amount(balance.paid_total),
            amount(balance.owed_total),
            amount(balance.net),
        )?;
    }

    if settlement.plan.is_empty() {
        return writeln!(out, "Nothing to settle.");
    }

    writeln!(out, "Transfers:")?;
    for transfer in &settlement.plan {
        writeln!(
            out,
            "  {} -> {}  {}",
            transfer.from,
            transfer.to,
            amount(transfer.amount_minor),
        )?;
    }
    Ok(())
}
