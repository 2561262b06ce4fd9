//! Deterministic allocation of minor units.
//!
//! Every split in the engine goes through these helpers so that allocations
//! always sum back to the amount being split:
//! 1. Integer-divide the amount
//! 2. Hand the leftover units out one at a time, in listed order
//!
//! Listed order is the tie-break. No sorting by fractional part is done here,
//! so the same input always charges the same members the extra unit.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Allocation utility for distributing minor units.
///
/// Guarantees:
/// - Sum of allocations EXACTLY equals the amount allocated
/// - Allocations differ by at most one unit
/// - Remainder units go to the earliest positions
pub struct MinorUnitAllocator;

impl MinorUnitAllocator {
    /// Allocate `total` equally across `count` recipients.
    ///
    /// # Example
    ///
    /// ```
    /// use tally_core::currency::MinorUnitAllocator;
    ///
    /// // 100 / 3 = [34, 33, 33], first recipient absorbs the remainder
    /// assert_eq!(MinorUnitAllocator::allocate_equal(100, 3), vec![34, 33, 33]);
    /// ```
    #[must_use]
    pub fn allocate_equal(total: i64, count: usize) -> Vec<i64> {
        if count == 0 {
            return vec![];
        }

        let divisor = i64::try_from(count).unwrap_or(i64::MAX);
        let base = total.div_euclid(divisor);
        let extra = usize::try_from(total.rem_euclid(divisor)).unwrap_or(0);

        (0..count)
            .map(|i| if i < extra { base + 1 } else { base })
            .collect()
    }

    /// Spread `residual` units over `shares`, one unit per position in order,
    /// wrapping around if the residual is larger than the number of shares.
    ///
    /// A negative residual takes units away from positive shares only, so no
    /// share is pushed below zero. Units that cannot be taken without doing so
    /// are left untaken. Does nothing when `shares` is empty.
    pub fn distribute_residual(shares: &mut [i64], residual: i64) {
        if shares.is_empty() || residual == 0 {
            return;
        }
        if residual < 0 {
            Self::take_residual(shares, residual.unsigned_abs());
            return;
        }

        let len = i64::try_from(shares.len()).unwrap_or(i64::MAX);
        let per_share = residual / len;
        let leftover = usize::try_from(residual % len).unwrap_or(0);

        for (i, share) in shares.iter_mut().enumerate() {
            *share += per_share;
            if i < leftover {
                *share += 1;
            }
        }
    }

    /// Removes `units` from the positive shares, evenly while every positive
    /// share can give, then one unit each from the earliest positive shares.
    fn take_residual(shares: &mut [i64], mut units: u64) {
        while units > 0 {
            let positive = u64::try_from(shares.iter().filter(|share| **share > 0).count())
                .unwrap_or(u64::MAX);
            let Some(smallest) = shares.iter().filter(|share| **share > 0).min().copied() else {
                return;
            };

            let per_share = (units / positive).min(smallest.unsigned_abs());
            if per_share == 0 {
                for share in shares.iter_mut().filter(|share| **share > 0) {
                    if units == 0 {
                        break;
                    }
                    *share -= 1;
                    units -= 1;
                }
                return;
            }

            // Bounded by `smallest`, which is an i64.
            let step = i64::try_from(per_share).unwrap_or(i64::MAX);
            for share in shares.iter_mut().filter(|share| **share > 0) {
                *share -= step;
            }
            units -= per_share * positive;
        }
    }

    /// Returns `percentage`% of `total`, rounded half to even to whole minor units.
    ///
    /// Returns `None` if the intermediate value overflows.
    #[must_use]
    pub fn percentage_share(total: i64, percentage: Decimal) -> Option<i64> {
        Decimal::from(total)
            .checked_mul(percentage)?
            .checked_div(Decimal::ONE_HUNDRED)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
            .to_i64()
    }
}
