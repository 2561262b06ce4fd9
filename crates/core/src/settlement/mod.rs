//! Settlement engine.
//!
//! Turns a ledger's expense history into:
//! - Each member's signed net balance (`calculator`)
//! - A short list of transfers that zeroes those balances (`planner`)
//!
//! Both steps are pure functions over plain values. Callers own loading the
//! history, storing results, and recording payments back into the ledger.

pub mod balance;
pub mod calculator;
pub mod error;
pub mod planner;
pub mod service;
pub mod settings;
pub mod types;

#[cfg(test)]
mod calculator_props;
#[cfg(test)]
mod planner_props;

pub use balance::{BalanceSheet, MemberBalance, NetBalances};
pub use calculator::{
    PERCENTAGE_EPSILON, allocate_expense, compute_balance_sheet, compute_net_balances,
};
pub use error::{AmountIssue, SettlementError, ShareTotalIssue};
pub use planner::{Transfer, TransferPlan, greedy_min_transfers};
pub use service::{Settlement, settle};
pub use settings::{CrossCurrencyRule, LedgerSettings};
pub use types::{Expense, ParticipantShare, Share, SplitStrategy};
