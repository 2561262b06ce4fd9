//! Minor-unit arithmetic.
//!
//! Money enters the engine as decimals only at the conversion boundary; all
//! accounting past that point is integer arithmetic on minor units (cents).

pub mod allocation;
pub mod minor_units;


pub use allocation::MinorUnitAllocator;
pub use minor_units::{MAX_SCALE, MinorUnitError, RoundingScale, from_minor_units, to_minor_units};
