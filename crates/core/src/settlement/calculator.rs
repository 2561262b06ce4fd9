//! Balance calculation.
//!
//! Folds an expense history into per-member balances. Each expense credits its
//! payer with the full amount and debits its beneficiaries with shares that sum
//! to exactly that amount, so the balances of a ledger always sum to zero.

use rust_decimal::Decimal;
use tally_shared::types::{CurrencyCode, MemberId};
use tracing::debug;

use super::balance::{BalanceSheet, NetBalances};
use super::error::{AmountIssue, SettlementError, ShareTotalIssue};
use super::settings::{CrossCurrencyRule, LedgerSettings};
use super::types::{Expense, Share, SplitStrategy};
use crate::currency::MinorUnitAllocator;

/// Tolerance when checking that percentages sum to 100 (0.01 percentage points).
pub const PERCENTAGE_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Computes every member's net balance over an expense history.
///
/// Expenses are validated and folded in input order. Order only affects which
/// members absorb remainder units, never the totals.
///
/// # Errors
///
/// Returns the first `SettlementError` found. No partial balances are returned.
pub fn compute_net_balances(
    ledger_currency: CurrencyCode,
    expenses: &[Expense],
    settings: &LedgerSettings,
) -> Result<NetBalances, SettlementError> {
    compute_balance_sheet(ledger_currency, expenses, settings).map(|sheet| sheet.net_balances())
}

/// Computes the paid/owed/net breakdown for every member over an expense history.
///
/// # Errors
///
/// Returns the first `SettlementError` found. No partial balances are returned.
pub fn compute_balance_sheet(
    ledger_currency: CurrencyCode,
    expenses: &[Expense],
    settings: &LedgerSettings,
) -> Result<BalanceSheet, SettlementError> {
    let mut sheet = BalanceSheet::new();

    for expense in expenses {
        check_currency(expense, ledger_currency, settings.cross_currency_rule)?;
        let allocations = allocate_expense(expense, settings)?;

        let overflow = || SettlementError::AmountOverflow {
            expense_id: expense.id,
        };
        sheet
            .record_paid(expense.payer, expense.amount_minor)
            .ok_or_else(overflow)?;
        for (member, share) in &allocations {
            sheet.record_owed(*member, *share).ok_or_else(overflow)?;
        }

        debug!(
            expense_id = %expense.id,
            payer = %expense.payer,
            amount_minor = expense.amount_minor,
            beneficiaries = allocations.len(),
            "Expense folded into balances"
        );
    }

    Ok(sheet)
}

fn check_currency(
    expense: &Expense,
    ledger_currency: CurrencyCode,
    rule: CrossCurrencyRule,
) -> Result<(), SettlementError> {
    match rule {
        CrossCurrencyRule::Forbid if expense.currency != ledger_currency => {
            Err(SettlementError::CurrencyMismatch {
                expense_id: expense.id,
                expected: ledger_currency,
                found: expense.currency,
            })
        }
        CrossCurrencyRule::Forbid => Ok(()),
    }
}

/// Splits one expense into the amount each beneficiary owes.
///
/// Returns `(member, owed)` pairs in listed order, with an implicitly included
/// payer appended last. The owed amounts always sum to `amount_minor`:
/// - percentages must sum to 100; each share is rounded half to even and the
///   rounding residual is spread over the percentage participants in listed
///   order, never taking a share below zero
/// - a percentage split covers the whole total, so the payer is never added
///   implicitly and listed equal beneficiaries owe nothing
/// - the equal pool is what exact shares leave over, split evenly with
///   remainder units going to the earliest equal beneficiaries
/// - when nobody claims anything (all waived, or a treat) the payer owes it all
///
/// Does not check the currency; that depends on the ledger.
///
/// # Errors
///
/// Returns `InvalidAmount`, `NoParticipants`, `InvalidShareTotal` or
/// `AmountOverflow` for the expense.
pub fn allocate_expense(
    expense: &Expense,
    settings: &LedgerSettings,
) -> Result<Vec<(MemberId, i64)>, SettlementError> {
    let expense_id = expense.id;
    let total = expense.amount_minor;

    if total <= 0 {
        return Err(SettlementError::InvalidAmount {
            expense_id,
            issue: AmountIssue::NonPositiveTotal(total),
        });
    }
    if expense.split_strategy.requires_participants() && expense.participants.is_empty() {
        return Err(SettlementError::NoParticipants { expense_id });
    }
    if expense.split_strategy == SplitStrategy::Treat {
        return Ok(vec![(expense.payer, total)]);
    }

    let overflow = || SettlementError::AmountOverflow { expense_id };
    let share_total = |issue| SettlementError::InvalidShareTotal { expense_id, issue };

    let mut allocations: Vec<(MemberId, i64)> = Vec::with_capacity(expense.participants.len() + 1);
    let mut equal_slots = Vec::new();
    let mut percentage_slots = Vec::new();
    let mut percentage_total = Decimal::ZERO;
    let mut claimed: i64 = 0;
    let mut has_exact = false;

    for participant in &expense.participants {
        let member = participant.member;
        let slot = allocations.len();

        let owed = match participant.share {
            Share::Equal => {
                equal_slots.push(slot);
                0
            }
            Share::Waived => 0,
            Share::Exact(_) | Share::Percentage(_)
                if expense.split_strategy == SplitStrategy::Equal =>
            {
                return Err(share_total(ShareTotalIssue::FixedShareOnEqualSplit { member }));
            }
            Share::Exact(amount) => {
                if amount <= 0 {
                    return Err(SettlementError::InvalidAmount {
                        expense_id,
                        issue: AmountIssue::NonPositiveExactShare { member, amount },
                    });
                }
                has_exact = true;
                amount
            }
            Share::Percentage(percentage) => {
                if percentage <= Decimal::ZERO {
                    return Err(SettlementError::InvalidAmount {
                        expense_id,
                        issue: AmountIssue::NonPositivePercentage { member, percentage },
                    });
                }
                percentage_total = percentage_total.checked_add(percentage).ok_or_else(overflow)?;
                percentage_slots.push(slot);
                MinorUnitAllocator::percentage_share(total, percentage).ok_or_else(overflow)?
            }
        };

        claimed = claimed.checked_add(owed).ok_or_else(overflow)?;
        allocations.push((member, owed));
    }

    if percentage_total > Decimal::ONE_HUNDRED + PERCENTAGE_EPSILON {
        return Err(share_total(ShareTotalIssue::PercentagesOverHundred {
            total: percentage_total,
        }));
    }

    let has_percentage = !percentage_slots.is_empty();
    if has_percentage {
        if (percentage_total - Decimal::ONE_HUNDRED).abs() > PERCENTAGE_EPSILON {
            return Err(share_total(ShareTotalIssue::PercentagesNotHundred {
                total: percentage_total,
            }));
        }

        // Percentages cover the whole total once their rounding residual is spread.
        let mut shares: Vec<i64> = percentage_slots
            .iter()
            .map(|slot| allocations[*slot].1)
            .collect();
        let rounded: i64 = shares.iter().sum();
        MinorUnitAllocator::distribute_residual(&mut shares, total - rounded);
        for (slot, share) in percentage_slots.into_iter().zip(shares) {
            allocations[slot].1 = share;
        }
        claimed = (claimed - rounded).checked_add(total).ok_or_else(overflow)?;
    }

    let include_payer = expense.include_payer.unwrap_or(settings.include_payer_in_aa);
    if include_payer && !has_percentage && !expense.lists_payer() {
        equal_slots.push(allocations.len());
        allocations.push((expense.payer, 0));
    }

    if !equal_slots.is_empty() {
        let pool = total - claimed;
        if pool < 0 {
            return Err(share_total(ShareTotalIssue::ClaimsExceedTotal { claimed, total }));
        }
        let shares = MinorUnitAllocator::allocate_equal(pool, equal_slots.len());
        for (slot, share) in equal_slots.into_iter().zip(shares) {
            allocations[slot].1 = share;
        }
    } else if has_exact || has_percentage {
        if claimed != total {
            return Err(share_total(ShareTotalIssue::ClaimsDoNotMatchTotal { claimed, total }));
        }
    } else {
        // Everyone listed is waived.
        allocations.push((expense.payer, total));
    }

    Ok(allocations)
}
