//! Property-based tests for balance calculation.
//!
//! - Conservation: balances of any valid ledger sum to zero
//! - Determinism: identical input yields identical balances
//! - Allocation: every expense's shares sum to its total

use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::{CurrencyCode, ExpenseId, MemberId};

use super::calculator::{allocate_expense, compute_balance_sheet, compute_net_balances};
use super::settings::LedgerSettings;
use super::types::{Expense, ParticipantShare, Share, SplitStrategy};

const MEMBERS: u128 = 6;

/// Strategy to generate a member out of a small group.
fn member_strategy() -> impl Strategy<Value = MemberId> {
    (1..=MEMBERS).prop_map(MemberId::from_u128)
}

/// Strategy to generate an expense total (0.01 to 100,000.00).
fn amount_strategy() -> impl Strategy<Value = i64> {
    1i64..10_000_000
}

/// Strategy to generate an equal split, possibly with waived members.
fn equal_expense() -> impl Strategy<Value = Expense> {
    (
        member_strategy(),
        amount_strategy(),
        prop::option::of(any::<bool>()),
        prop::collection::vec((member_strategy(), any::<bool>()), 1..8),
    )
        .prop_map(|(payer, amount, include_payer, listed)| {
            let participants = listed.into_iter().map(|(member, waived)| {
                if waived {
                    ParticipantShare::waived(member)
                } else {
                    ParticipantShare::equal(member)
                }
            });
            let mut expense =
                Expense::new(payer, amount, CurrencyCode::CNY).with_participants(participants);
            expense.include_payer = include_payer;
            expense
        })
}

/// Strategy to generate a custom split with exact shares carved out of the total
/// and the rest split equally.
fn custom_expense() -> impl Strategy<Value = Expense> {
    (
        member_strategy(),
        amount_strategy(),
        prop::collection::vec((member_strategy(), 1u32..=100), 1..4),
        prop::collection::vec(member_strategy(), 1..4),
    )
        .prop_map(|(payer, amount, exact, equal)| {
            // Each exact claim takes a slice of at most a quarter of the total.
            let participants = exact
                .into_iter()
                .map(|(member, percent)| {
                    let share = (amount / 4 * i64::from(percent) / 100).max(1);
                    ParticipantShare::exact(member, share)
                })
                .chain(equal.into_iter().map(ParticipantShare::equal))
                .collect::<Vec<_>>();
            Expense::new(payer, amount, CurrencyCode::CNY)
                .with_strategy(SplitStrategy::Custom)
                .with_participants(participants)
        })
        .prop_filter("exact shares must fit in the total", |expense| {
            let claimed: i64 = expense
                .participants
                .iter()
                .map(|p| match p.share {
                    Share::Exact(amount) => amount,
                    _ => 0,
                })
                .sum();
            claimed <= expense.amount_minor
        })
}

/// Strategy to generate a percentage-only split whose percentages sum to 100.
fn percentage_expense() -> impl Strategy<Value = Expense> {
    (
        member_strategy(),
        amount_strategy(),
        prop::option::of(any::<bool>()),
        prop::collection::vec((member_strategy(), 1u32..100), 1..6),
    )
        .prop_map(|(payer, amount, include_payer, weights)| {
            let weight_sum: u32 = weights.iter().map(|(_, w)| *w).sum();
            let mut remaining = Decimal::ONE_HUNDRED;
            let last = weights.len() - 1;
            let participants = weights
                .into_iter()
                .enumerate()
                .map(|(i, (member, weight))| {
                    let percentage = if i == last {
                        remaining
                    } else {
                        (Decimal::ONE_HUNDRED * Decimal::from(weight) / Decimal::from(weight_sum))
                            .round_dp(2)
                    };
                    remaining -= percentage;
                    ParticipantShare::percentage(member, percentage)
                })
                .collect::<Vec<_>>();
            let mut expense = Expense::new(payer, amount, CurrencyCode::CNY)
                .with_strategy(SplitStrategy::Custom)
                .with_participants(participants);
            expense.include_payer = include_payer;
            expense
        })
        .prop_filter("percentages must be positive", |expense| {
            expense.participants.iter().all(|p| match p.share {
                Share::Percentage(pct) => pct > Decimal::ZERO,
                _ => true,
            })
        })
}

/// Strategy to generate a treat.
fn treat_expense() -> impl Strategy<Value = Expense> {
    (
        member_strategy(),
        amount_strategy(),
        prop::collection::vec(member_strategy(), 0..4),
    )
        .prop_map(|(payer, amount, guests)| {
            Expense::new(payer, amount, CurrencyCode::CNY)
                .with_strategy(SplitStrategy::Treat)
                .with_participants(guests.into_iter().map(ParticipantShare::waived))
        })
}

/// Strategy to generate any valid expense.
fn expense_strategy() -> impl Strategy<Value = Expense> {
    prop_oneof![
        4 => equal_expense(),
        2 => custom_expense(),
        2 => percentage_expense(),
        1 => treat_expense(),
    ]
}

/// Strategy to generate a ledger history.
fn history_strategy() -> impl Strategy<Value = Vec<Expense>> {
    prop::collection::vec(expense_strategy(), 0..30)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Balances of any valid history sum to exactly zero.
    #[test]
    fn prop_balances_conserve_money(history in history_strategy()) {
        let balances = compute_net_balances(CurrencyCode::CNY, &history, &LedgerSettings::default())
            .unwrap();
        prop_assert_eq!(balances.total(), 0);
    }

    /// Every expense allocates exactly its total.
    #[test]
    fn prop_allocation_sums_to_total(expense in expense_strategy()) {
        let allocations = allocate_expense(&expense, &LedgerSettings::default()).unwrap();
        let owed: i64 = allocations.iter().map(|(_, owed)| *owed).sum();
        prop_assert_eq!(owed, expense.amount_minor);
    }

    /// Nobody is credited by an expense they did not pay for.
    #[test]
    fn prop_allocations_are_never_negative(expense in expense_strategy()) {
        let allocations = allocate_expense(&expense, &LedgerSettings::default()).unwrap();
        prop_assert!(allocations.iter().all(|(_, owed)| *owed >= 0));
    }

    /// A percentage split charges only its percentage participants.
    #[test]
    fn prop_percentage_split_charges_listed_members(expense in percentage_expense()) {
        let allocations = allocate_expense(&expense, &LedgerSettings::default()).unwrap();
        prop_assert_eq!(allocations.len(), expense.participants.len());
    }

    /// Paid totals equal the sum of expense amounts, and so do owed totals.
    #[test]
    fn prop_sheet_totals_match_history(history in history_strategy()) {
        let sheet = compute_balance_sheet(CurrencyCode::CNY, &history, &LedgerSettings::default())
            .unwrap();
        let spent: i64 = history.iter().map(|e| e.amount_minor).sum();
        let paid: i64 = sheet.iter().map(|b| b.paid_total).sum();
        let owed: i64 = sheet.iter().map(|b| b.owed_total).sum();
        prop_assert_eq!(paid, spent);
        prop_assert_eq!(owed, spent);
    }

    /// Identical input yields identical balances.
    #[test]
    fn prop_balances_are_deterministic(history in history_strategy()) {
        let settings = LedgerSettings::default();
        let first = compute_net_balances(CurrencyCode::CNY, &history, &settings);
        let second = compute_net_balances(CurrencyCode::CNY, &history, &settings);
        prop_assert_eq!(first, second);
    }

    /// A foreign-currency expense anywhere in the history fails the whole run.
    #[test]
    fn prop_foreign_expense_rejects_history(
        history in history_strategy(),
        foreign in expense_strategy(),
        position in any::<prop::sample::Index>(),
    ) {
        let mut history = history;
        let mut foreign = foreign;
        foreign.currency = CurrencyCode::USD;
        foreign.id = ExpenseId::new();
        let at = position.index(history.len() + 1);
        history.insert(at, foreign.clone());

        let err = compute_net_balances(CurrencyCode::CNY, &history, &LedgerSettings::default())
            .unwrap_err();
        prop_assert_eq!(err.expense_id(), foreign.id);
        prop_assert_eq!(err.error_code(), "CURRENCY_MISMATCH");
    }
}
