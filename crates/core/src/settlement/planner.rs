//! Transfer planning.
//!
//! Greedy debt simplification: repeatedly match the largest creditor with the
//! largest debtor and settle as much as possible between them. Each step fully
//! settles at least one party, so `N` unsettled members need at most `N - 1`
//! transfers. Exact minimisation is NP-hard; this heuristic is fast and
//! deterministic instead.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};
use tally_shared::types::{CurrencyCode, ExpenseId, MemberId};
use tracing::{debug, warn};

use super::balance::NetBalances;
use super::types::{Expense, ParticipantShare, SplitStrategy};

/// One payment in a settlement plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transfer {
    /// The paying debtor.
    pub from: MemberId,
    /// The receiving creditor.
    pub to: MemberId,
    /// Amount in minor units. Always positive.
    pub amount_minor: i64,
}

/// Ordered transfers that settle a ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferPlan(Vec<Transfer>);

impl TransferPlan {
    /// Returns the transfers in emission order.
    #[must_use]
    pub fn transfers(&self) -> &[Transfer] {
        &self.0
    }

    /// Number of transfers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing needs to move.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the transfers in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Transfer> {
        self.0.iter()
    }

    /// Total amount moved by the plan.
    #[must_use]
    pub fn total_moved(&self) -> i128 {
        self.0.iter().map(|t| i128::from(t.amount_minor)).sum()
    }

    /// Applies the plan to `balances` and returns the result.
    ///
    /// Paying settles debt: the sender's balance rises toward zero and the
    /// recipient's falls toward zero by the transferred amount.
    #[must_use]
    pub fn replay(&self, balances: &NetBalances) -> NetBalances {
        let mut result = balances.clone();
        for transfer in &self.0 {
            result.adjust(transfer.from, transfer.amount_minor);
            result.adjust(transfer.to, -transfer.amount_minor);
        }
        result
    }

    /// Records each transfer as an expense so it can be appended to the ledger history.
    ///
    /// The expense is paid by the sender and owed in full by the recipient, which moves
    /// both balances exactly like [`TransferPlan::replay`]. Once appended, the ledger
    /// computes to all-zero balances.
    #[must_use]
    pub fn to_settlement_expenses(&self, currency: CurrencyCode) -> Vec<Expense> {
        self.0
            .iter()
            .map(|transfer| Expense {
                id: ExpenseId::new(),
                payer: transfer.from,
                amount_minor: transfer.amount_minor,
                currency,
                split_strategy: SplitStrategy::Custom,
                include_payer: Some(false),
                participants: vec![ParticipantShare::exact(transfer.to, transfer.amount_minor)],
            })
            .collect()
    }

    /// Consumes the plan and returns the transfers.
    #[must_use]
    pub fn into_inner(self) -> Vec<Transfer> {
        self.0
    }
}

impl<'a> IntoIterator for &'a TransferPlan {
    type Item = &'a Transfer;
    type IntoIter = std::slice::Iter<'a, Transfer>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A party waiting to be settled.
///
/// Field order is the heap order: largest outstanding amount first, then the
/// smallest member ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Party {
    outstanding: u64,
    member: Reverse<MemberId>,
}

impl Party {
    const fn new(member: MemberId, outstanding: u64) -> Self {
        Self {
            outstanding,
            member: Reverse(member),
        }
    }
}

/// Builds a transfer plan that zeroes the given balances.
///
/// Ties between equally large balances go to the smaller `MemberId`, so the
/// same balances always yield the same plan.
///
/// Balances must sum to zero. If they do not, a warning is logged and planning
/// stops as soon as either side runs out; the surplus stays unsettled.
#[must_use]
pub fn greedy_min_transfers(balances: &NetBalances) -> TransferPlan {
    let imbalance = balances.total();
    if imbalance != 0 {
        warn!(
            imbalance = %imbalance,
            "Net balances do not sum to zero; surplus will stay unsettled"
        );
    }

    let mut creditors = BinaryHeap::new();
    let mut debtors = BinaryHeap::new();
    for (member, balance) in balances.iter() {
        if balance > 0 {
            creditors.push(Party::new(member, balance.unsigned_abs()));
        } else if balance < 0 {
            debtors.push(Party::new(member, balance.unsigned_abs()));
        }
    }

    let mut transfers = Vec::with_capacity((creditors.len() + debtors.len()).saturating_sub(1));

    while let (Some(creditor), Some(debtor)) = (creditors.peek().copied(), debtors.peek().copied())
    {
        creditors.pop();
        debtors.pop();

        let amount = creditor.outstanding.min(debtor.outstanding);
        // Bounded by a positive i64 balance.
        let amount_minor = i64::try_from(amount).unwrap_or(i64::MAX);
        let transfer = Transfer {
            from: debtor.member.0,
            to: creditor.member.0,
            amount_minor,
        };
        debug!(
            from = %transfer.from,
            to = %transfer.to,
            amount_minor,
            "Transfer planned"
        );
        transfers.push(transfer);

        if creditor.outstanding > amount {
            creditors.push(Party::new(creditor.member.0, creditor.outstanding - amount));
        }
        if debtor.outstanding > amount {
            debtors.push(Party::new(debtor.member.0, debtor.outstanding - amount));
        }
    }

    if !creditors.is_empty() || !debtors.is_empty() {
        warn!(
            creditors = creditors.len(),
            debtors = debtors.len(),
            "Parties left unsettled"
        );
    }

    TransferPlan(transfers)
}
