//! Member balances.
//!
//! Sign convention: a positive balance means the ledger owes the member
//! money (net creditor), a negative balance means the member owes the ledger
//! (net debtor).

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::MemberId;

use crate::currency::{RoundingScale, from_minor_units};

/// One member's position across all expenses of a ledger.
///
/// Gross totals are kept exactly, so each of `paid_total` and `owed_total` must
/// fit in an `i64` on its own. A member whose gross payments exceed that range
/// overflows even when their net stays at zero (repeated treats, for example).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalance {
    /// The member.
    pub member: MemberId,
    /// Total fronted by this member.
    pub paid_total: i64,
    /// Total of this member's shares.
    pub owed_total: i64,
    /// `paid_total - owed_total`.
    pub net: i64,
}

impl MemberBalance {
    /// Creates an empty balance.
    #[must_use]
    pub const fn new(member: MemberId) -> Self {
        Self {
            member,
            paid_total: 0,
            owed_total: 0,
            net: 0,
        }
    }

    /// Adds a payment. Returns `None` on overflow and leaves the balance untouched.
    #[must_use]
    pub fn add_paid(&mut self, amount: i64) -> Option<()> {
        let paid_total = self.paid_total.checked_add(amount)?;
        let net = paid_total.checked_sub(self.owed_total)?;
        self.paid_total = paid_total;
        self.net = net;
        Some(())
    }

    /// Adds a share owed. Returns `None` on overflow and leaves the balance untouched.
    #[must_use]
    pub fn add_owed(&mut self, amount: i64) -> Option<()> {
        let owed_total = self.owed_total.checked_add(amount)?;
        let net = self.paid_total.checked_sub(owed_total)?;
        self.owed_total = owed_total;
        self.net = net;
        Some(())
    }
}

/// Paid/owed/net breakdown for every member seen in a ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BalanceSheet {
    members: BTreeMap<MemberId, MemberBalance>,
}

impl BalanceSheet {
    /// Creates an empty sheet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a payment fronted by `member`.
    #[must_use]
    pub fn record_paid(&mut self, member: MemberId, amount: i64) -> Option<()> {
        self.entry(member).add_paid(amount)
    }

    /// Records a share owed by `member`.
    #[must_use]
    pub fn record_owed(&mut self, member: MemberId, amount: i64) -> Option<()> {
        self.entry(member).add_owed(amount)
    }

    fn entry(&mut self, member: MemberId) -> &mut MemberBalance {
        self.members
            .entry(member)
            .or_insert_with(|| MemberBalance::new(member))
    }

    /// Returns the balance of one member, if they appear in the ledger.
    #[must_use]
    pub fn get(&self, member: MemberId) -> Option<&MemberBalance> {
        self.members.get(&member)
    }

    /// Iterates balances ordered by member.
    pub fn iter(&self) -> impl Iterator<Item = &MemberBalance> {
        self.members.values()
    }

    /// Number of members on the sheet.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if no member has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Collapses the sheet to net balances.
    #[must_use]
    pub fn net_balances(&self) -> NetBalances {
        self.members
            .iter()
            .map(|(member, balance)| (*member, balance.net))
            .collect()
    }
}

/// Signed net balance per member, in minor units.
///
/// Backed by a `BTreeMap` so iteration order is stable and tie-breaks keyed on
/// member order are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetBalances(BTreeMap<MemberId, i64>);

impl NetBalances {
    /// Creates an empty balance map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the member's balance, zero if absent.
    #[must_use]
    pub fn get(&self, member: MemberId) -> i64 {
        self.0.get(&member).copied().unwrap_or(0)
    }

    /// Sets the member's balance.
    pub fn insert(&mut self, member: MemberId, balance: i64) {
        self.0.insert(member, balance);
    }

    /// Adds `delta` to the member's balance, inserting them if absent.
    ///
    /// Saturates instead of wrapping. Calculated balances never get near the bounds.
    pub fn adjust(&mut self, member: MemberId, delta: i64) {
        let balance = self.0.entry(member).or_insert(0);
        *balance = balance.saturating_add(delta);
    }

    /// Iterates `(member, balance)` pairs ordered by member.
    pub fn iter(&self) -> impl Iterator<Item = (MemberId, i64)> + '_ {
        self.0.iter().map(|(member, balance)| (*member, *balance))
    }

    /// Number of members in the map, including settled ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the map has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all balances. Zero for any ledger the calculator produced.
    ///
    /// Widened to `i128` so the check itself cannot overflow.
    #[must_use]
    pub fn total(&self) -> i128 {
        self.0.values().map(|balance| i128::from(*balance)).sum()
    }

    /// Number of members whose balance is not zero.
    #[must_use]
    pub fn unsettled_count(&self) -> usize {
        self.0.values().filter(|balance| **balance != 0).count()
    }

    /// Returns true if every member's balance is zero.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.unsettled_count() == 0
    }

    /// Renders balances as decimal amounts at the given scale.
    #[must_use]
    pub fn to_decimal(&self, scale: RoundingScale) -> BTreeMap<MemberId, Decimal> {
        self.0
            .iter()
            .map(|(member, balance)| (*member, from_minor_units(*balance, scale)))
            .collect()
    }

    /// Consumes the wrapper and returns the underlying map.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<MemberId, i64> {
        self.0
    }
}

impl FromIterator<(MemberId, i64)> for NetBalances {
    fn from_iter<T: IntoIterator<Item = (MemberId, i64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<MemberId, i64>> for NetBalances {
    fn from(map: BTreeMap<MemberId, i64>) -> Self {
        Self(map)
    }
}
