//! Property-based tests for transfer planning.
//!
//! - Replaying a plan settles every balance
//! - At most `N - 1` transfers for `N` unsettled members
//! - Every transfer is positive and moves money between two different members
//! - Identical balances yield identical plans

use proptest::prelude::*;
use tally_shared::types::{CurrencyCode, MemberId};

use super::balance::NetBalances;
use super::calculator::compute_net_balances;
use super::planner::greedy_min_transfers;
use super::settings::LedgerSettings;

/// Strategy to generate balances that sum to zero.
///
/// The last member absorbs whatever the others leave over.
fn zero_sum_balances() -> impl Strategy<Value = NetBalances> {
    prop::collection::vec(-1_000_000i64..1_000_000, 1..20).prop_map(|values| {
        let closing = -values.iter().sum::<i64>();
        values
            .into_iter()
            .chain(std::iter::once(closing))
            .enumerate()
            .map(|(i, balance)| (MemberId::from_u128(i as u128 + 1), balance))
            .collect()
    })
}

/// Strategy to generate zero-sum balances where many members hold the same amount.
fn tied_balances() -> impl Strategy<Value = NetBalances> {
    (1usize..8, 1i64..1_000).prop_map(|(pairs, amount)| {
        (0..pairs)
            .flat_map(|i| {
                let creditor = MemberId::from_u128(2 * i as u128 + 1);
                let debtor = MemberId::from_u128(2 * i as u128 + 2);
                [(creditor, amount), (debtor, -amount)]
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Replaying the plan drives every balance to zero.
    #[test]
    fn prop_plan_settles_everyone(balances in zero_sum_balances()) {
        prop_assert_eq!(balances.total(), 0);
        let plan = greedy_min_transfers(&balances);
        prop_assert!(plan.replay(&balances).is_settled());
    }

    /// The plan never needs more than `N - 1` transfers.
    #[test]
    fn prop_plan_size_bound(balances in zero_sum_balances()) {
        let plan = greedy_min_transfers(&balances);
        let unsettled = balances.unsettled_count();
        prop_assert!(plan.len() <= unsettled.saturating_sub(1));
    }

    /// Every transfer moves a positive amount from a debtor to a creditor.
    #[test]
    fn prop_transfers_are_well_formed(balances in zero_sum_balances()) {
        let plan = greedy_min_transfers(&balances);
        for transfer in &plan {
            prop_assert!(transfer.amount_minor > 0);
            prop_assert_ne!(transfer.from, transfer.to);
            prop_assert!(balances.get(transfer.from) < 0);
            prop_assert!(balances.get(transfer.to) > 0);
        }
    }

    /// The plan moves exactly the total credit outstanding.
    #[test]
    fn prop_plan_moves_total_credit(balances in zero_sum_balances()) {
        let plan = greedy_min_transfers(&balances);
        let credit: i128 = balances
            .iter()
            .filter(|(_, balance)| *balance > 0)
            .map(|(_, balance)| i128::from(balance))
            .sum();
        prop_assert_eq!(plan.total_moved(), credit);
    }

    /// Identical balances yield identical plans, ties included.
    #[test]
    fn prop_plan_is_deterministic(balances in tied_balances()) {
        let first = greedy_min_transfers(&balances);
        let second = greedy_min_transfers(&balances.clone());
        prop_assert_eq!(&first, &second);
        prop_assert!(first.replay(&balances).is_settled());
    }

    /// Balances computed from a simple pairwise history always plan to settlement.
    #[test]
    fn prop_calculated_balances_plan_to_zero(
        payments in prop::collection::vec((1u128..=5, 1u128..=5, 1i64..100_000), 0..30),
    ) {
        use super::types::{Expense, ParticipantShare};

        let history: Vec<Expense> = payments
            .into_iter()
            .map(|(payer, payee, amount)| {
                Expense::new(MemberId::from_u128(payer), amount, CurrencyCode::CNY)
                    .with_participants([ParticipantShare::equal(MemberId::from_u128(payee))])
            })
            .collect();

        let balances = compute_net_balances(CurrencyCode::CNY, &history, &LedgerSettings::default())
            .unwrap();
        let plan = greedy_min_transfers(&balances);
        prop_assert!(plan.replay(&balances).is_settled());
    }
}
