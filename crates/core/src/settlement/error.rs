//! Settlement error types.
//!
//! Every error is a data-entry problem tied to one expense. None of them are
//! transient: the caller has to fix the offending record and run again.

use rust_decimal::Decimal;
use tally_shared::types::{CurrencyCode, ExpenseId, MemberId};
use thiserror::Error;

/// Errors that can occur while computing balances.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    /// The expense is recorded in a currency other than the ledger's.
    #[error("Expense {expense_id} is in {found}, but the ledger uses {expected}")]
    CurrencyMismatch {
        /// The offending expense.
        expense_id: ExpenseId,
        /// The ledger currency.
        expected: CurrencyCode,
        /// The expense currency.
        found: CurrencyCode,
    },

    /// The expense total or one of its shares is not positive.
    #[error("Expense {expense_id} has an invalid amount: {issue}")]
    InvalidAmount {
        /// The offending expense.
        expense_id: ExpenseId,
        /// Which amount was rejected.
        issue: AmountIssue,
    },

    /// The expense needs beneficiaries but lists none.
    #[error("Expense {expense_id} has no participants")]
    NoParticipants {
        /// The offending expense.
        expense_id: ExpenseId,
    },

    /// The shares of the expense do not reconcile with its total.
    #[error("Expense {expense_id} shares do not add up: {issue}")]
    InvalidShareTotal {
        /// The offending expense.
        expense_id: ExpenseId,
        /// How the shares fail to reconcile.
        issue: ShareTotalIssue,
    },

    /// Accumulating the expense would overflow 64-bit minor units.
    ///
    /// Checked on each member's gross paid and owed totals, not only on the net.
    #[error("Expense {expense_id} overflows the supported amount range")]
    AmountOverflow {
        /// The offending expense.
        expense_id: ExpenseId,
    },
}

/// The amount rejected by [`SettlementError::InvalidAmount`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountIssue {
    /// The expense total is zero or negative.
    #[error("total {0} must be positive")]
    NonPositiveTotal(i64),

    /// An exact share is zero or negative.
    #[error("exact share {amount} for member {member} must be positive")]
    NonPositiveExactShare {
        /// The participant.
        member: MemberId,
        /// The rejected amount.
        amount: i64,
    },

    /// A percentage share is zero or negative.
    #[error("percentage {percentage} for member {member} must be positive")]
    NonPositivePercentage {
        /// The participant.
        member: MemberId,
        /// The rejected percentage.
        percentage: Decimal,
    },
}

/// The mismatch reported by [`SettlementError::InvalidShareTotal`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShareTotalIssue {
    /// Percentages are the only claims and do not sum to 100.
    #[error("percentages sum to {total}, expected 100")]
    PercentagesNotHundred {
        /// Sum of the listed percentages.
        total: Decimal,
    },

    /// Percentages sum to more than 100.
    #[error("percentages sum to {total}, more than 100")]
    PercentagesOverHundred {
        /// Sum of the listed percentages.
        total: Decimal,
    },

    /// No equal pool is left, so exact and percentage shares must cover the total exactly.
    #[error("shares claim {claimed} of {total}")]
    ClaimsDoNotMatchTotal {
        /// Sum of exact and percentage shares.
        claimed: i64,
        /// The expense total.
        total: i64,
    },

    /// Exact and percentage shares leave a negative equal pool.
    #[error("shares claim {claimed}, more than the total {total}")]
    ClaimsExceedTotal {
        /// Sum of exact and percentage shares.
        claimed: i64,
        /// The expense total.
        total: i64,
    },

    /// An equal-split expense carries an exact or percentage share.
    #[error("member {member} has a fixed share on an equal split")]
    FixedShareOnEqualSplit {
        /// The participant.
        member: MemberId,
    },
}

impl SettlementError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::InvalidAmount { .. } => "INVALID_AMOUNT",
            Self::NoParticipants { .. } => "NO_PARTICIPANTS",
            Self::InvalidShareTotal { .. } => "INVALID_SHARE_TOTAL",
            Self::AmountOverflow { .. } => "AMOUNT_OVERFLOW",
        }
    }

    /// Returns the expense that failed validation.
    #[must_use]
    pub const fn expense_id(&self) -> ExpenseId {
        match self {
            Self::CurrencyMismatch { expense_id, .. }
            | Self::InvalidAmount { expense_id, .. }
            | Self::NoParticipants { expense_id }
            | Self::InvalidShareTotal { expense_id, .. }
            | Self::AmountOverflow { expense_id } => *expense_id,
        }
    }
}
