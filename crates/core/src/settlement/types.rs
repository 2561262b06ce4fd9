//! Value types handed to the engine by its callers.
//!
//! Callers load expense rows from wherever they keep them and translate them
//! into these plain values. Nothing here references storage.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{CurrencyCode, ExpenseId, MemberId};

/// How an expense is divided among its participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitStrategy {
    /// Even split ("AA"). Participants may only be `Equal` or `Waived`.
    #[default]
    Equal,
    /// Free-form split mixing equal, exact, percentage and waived shares.
    Custom,
    /// The payer covers everything. Participants are kept for the record and owe nothing.
    Treat,
}

impl SplitStrategy {
    /// Returns true if the strategy needs at least one listed participant.
    #[must_use]
    pub const fn requires_participants(self) -> bool {
        !matches!(self, Self::Treat)
    }
}

/// One member's claim on an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Share {
    /// An even slice of whatever the exact and percentage shares leave over.
    Equal,
    /// A fixed amount in minor units.
    Exact(i64),
    /// A percentage of the expense total (e.g. `25` for a quarter).
    Percentage(Decimal),
    /// Listed for the record, owes nothing.
    Waived,
}

/// A participant of an expense together with their share rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantShare {
    /// The beneficiary.
    pub member: MemberId,
    /// How much of the expense they owe.
    pub share: Share,
}

impl ParticipantShare {
    /// An equal-split participant.
    #[must_use]
    pub const fn equal(member: MemberId) -> Self {
        Self {
            member,
            share: Share::Equal,
        }
    }

    /// A participant owing a fixed amount in minor units.
    #[must_use]
    pub const fn exact(member: MemberId, amount_minor: i64) -> Self {
        Self {
            member,
            share: Share::Exact(amount_minor),
        }
    }

    /// A participant owing a percentage of the total.
    #[must_use]
    pub const fn percentage(member: MemberId, percentage: Decimal) -> Self {
        Self {
            member,
            share: Share::Percentage(percentage),
        }
    }

    /// A participant who owes nothing.
    #[must_use]
    pub const fn waived(member: MemberId) -> Self {
        Self {
            member,
            share: Share::Waived,
        }
    }
}

/// A single recorded payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Expense identifier, used only to report errors.
    pub id: ExpenseId,
    /// The member who fronted the money.
    pub payer: MemberId,
    /// Total amount in minor units. Must be positive.
    pub amount_minor: i64,
    /// Currency of the amount. Must match the ledger currency.
    pub currency: CurrencyCode,
    /// Which allocation rule applies.
    #[serde(default)]
    pub split_strategy: SplitStrategy,
    /// Whether the payer joins the equal split. `None` uses the ledger default.
    #[serde(default)]
    pub include_payer: Option<bool>,
    /// Beneficiaries in listed order. Order decides who absorbs remainder units.
    #[serde(default)]
    pub participants: Vec<ParticipantShare>,
}

impl Expense {
    /// Creates an equal-split expense with a fresh ID and no participants.
    #[must_use]
    pub fn new(payer: MemberId, amount_minor: i64, currency: CurrencyCode) -> Self {
        Self {
            id: ExpenseId::new(),
            payer,
            amount_minor,
            currency,
            split_strategy: SplitStrategy::Equal,
            include_payer: None,
            participants: Vec::new(),
        }
    }

    /// Sets the split strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: SplitStrategy) -> Self {
        self.split_strategy = strategy;
        self
    }

    /// Overrides the ledger's include-payer default for this expense.
    #[must_use]
    pub fn with_include_payer(mut self, include_payer: bool) -> Self {
        self.include_payer = Some(include_payer);
        self
    }

    /// Replaces the participant list.
    #[must_use]
    pub fn with_participants(
        mut self,
        participants: impl IntoIterator<Item = ParticipantShare>,
    ) -> Self {
        self.participants = participants.into_iter().collect();
        self
    }

    /// Returns true if the payer appears anywhere in the participant list.
    #[must_use]
    pub fn lists_payer(&self) -> bool {
        self.participants.iter().any(|p| p.member == self.payer)
    }
}
