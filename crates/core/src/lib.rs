//! Settlement engine for Tally.
//!
//! This crate contains pure settlement math with ZERO web, database, or file dependencies.
//! Callers hand in plain expense records and get plain values back.
//!
//! # Modules
//!
//! - `currency` - Minor-unit conversion and deterministic allocation
//! - `settlement` - Balance calculation and transfer planning

pub mod currency;
pub mod settlement;

pub use settlement::{
    Expense, LedgerSettings, NetBalances, ParticipantShare, Settlement, SettlementError, Share,
    SplitStrategy, Transfer, TransferPlan, compute_net_balances, greedy_min_transfers, settle,
};
