//! Shared types and configuration for Tally.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for members, expenses, and ledgers
//! - Validated ISO 4217 currency codes
//! - Configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;
pub use types::{CurrencyCode, ExpenseId, LedgerId, MemberId};
