//! One-call settlement of a ledger.

use serde::Serialize;
use tally_shared::types::CurrencyCode;
use tracing::info;

use super::balance::{BalanceSheet, NetBalances};
use super::calculator::compute_balance_sheet;
use super::error::SettlementError;
use super::planner::{TransferPlan, greedy_min_transfers};
use super::settings::LedgerSettings;
use super::types::Expense;

/// Balances and the plan that settles them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settlement {
    /// Paid/owed/net per member.
    pub sheet: BalanceSheet,
    /// Net balance per member.
    pub balances: NetBalances,
    /// Transfers that zero the balances.
    pub plan: TransferPlan,
}

/// Computes balances for an expense history and plans the transfers that settle it.
///
/// # Errors
///
/// Returns the first `SettlementError` found in the history.
pub fn settle(
    ledger_currency: CurrencyCode,
    expenses: &[Expense],
    settings: &LedgerSettings,
) -> Result<Settlement, SettlementError> {
    let sheet = compute_balance_sheet(ledger_currency, expenses, settings)?;
    let balances = sheet.net_balances();
    let plan = greedy_min_transfers(&balances);

    info!(
        currency = %ledger_currency,
        expenses = expenses.len(),
        members = sheet.len(),
        unsettled = balances.unsettled_count(),
        transfers = plan.len(),
        "Ledger settled"
    );

    Ok(Settlement {
        sheet,
        balances,
        plan,
    })
}
