//! Conversion between decimal amounts and integer minor units.
//!
//! CRITICAL: this is the only place where rounding happens on the way in.
//! - Always round to the ledger's scale
//! - Use banker's rounding (round half to even)
//! - Going back out is exact and never rounds

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest supported scale. `10^18` is the largest power of ten that fits in an `i64`.
pub const MAX_SCALE: u32 = 18;

/// Errors raised at the decimal/minor-unit boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MinorUnitError {
    /// The requested scale cannot be represented.
    #[error("Rounding scale {scale} exceeds the maximum of {max}")]
    ScaleTooLarge {
        /// The rejected scale.
        scale: u32,
        /// The largest accepted scale.
        max: u32,
    },

    /// The amount does not fit in 64-bit minor units.
    #[error("Amount {amount} does not fit in minor units")]
    Overflow {
        /// The amount that could not be converted.
        amount: Decimal,
    },
}

/// Number of fractional digits in one major currency unit (2 for cents, 0 for yen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct RoundingScale(u32);

impl RoundingScale {
    /// Whole units only (e.g. JPY).
    pub const WHOLE: Self = Self(0);
    /// Hundredths (e.g. CNY, USD).
    pub const CENTS: Self = Self(2);

    /// Creates a scale, rejecting anything above [`MAX_SCALE`].
    pub const fn new(places: u32) -> Result<Self, MinorUnitError> {
        if places > MAX_SCALE {
            return Err(MinorUnitError::ScaleTooLarge {
                scale: places,
                max: MAX_SCALE,
            });
        }
        Ok(Self(places))
    }

    /// Returns the number of fractional digits.
    #[must_use]
    pub const fn places(self) -> u32 {
        self.0
    }

    /// Returns the number of minor units in one major unit.
    #[must_use]
    pub const fn factor(self) -> i64 {
        10i64.pow(self.0)
    }
}

impl Default for RoundingScale {
    fn default() -> Self {
        Self::CENTS
    }
}

impl TryFrom<u32> for RoundingScale {
    type Error = MinorUnitError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoundingScale> for u32 {
    fn from(scale: RoundingScale) -> Self {
        scale.0
    }
}

/// Converts a decimal amount to minor units at the given scale.
///
/// Uses banker's rounding (round half to even) for digits beyond the scale.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tally_core::currency::{RoundingScale, to_minor_units};
///
/// assert_eq!(to_minor_units(dec!(12.34), RoundingScale::CENTS), Ok(1234));
/// assert_eq!(to_minor_units(dec!(0.125), RoundingScale::CENTS), Ok(12));
/// ```
///
/// # Errors
///
/// Returns `MinorUnitError::Overflow` if the result does not fit in an `i64`.
pub fn to_minor_units(amount: Decimal, scale: RoundingScale) -> Result<i64, MinorUnitError> {
    amount
        .round_dp_with_strategy(scale.places(), RoundingStrategy::MidpointNearestEven)
        .checked_mul(Decimal::from(scale.factor()))
        .and_then(|scaled| scaled.to_i64())
        .ok_or(MinorUnitError::Overflow { amount })
}

/// Converts minor units back to a decimal amount. Exact.
#[must_use]
pub fn from_minor_units(minor: i64, scale: RoundingScale) -> Decimal {
    Decimal::new(minor, scale.places())
}
