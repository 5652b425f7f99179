// ============================================================================
// Numeric Module
// Exact fixed-point arithmetic for protocol accounting
// ============================================================================
//
// This module provides:
// - FixedPointValue: arbitrary-precision scaled integer with runtime precision
// - FixedDecimal<P>: the same value with its precision fixed by a type tag
// - Precision: the tag trait, plus the protocol tags and `precision_tag!`
// - NumericError: Error types for construction and formula evaluation
//
// Design principles:
// - No floating-point in accounting paths (floats only at construction/display)
// - Magnitudes never overflow (num-bigint)
// - Precision reduction is the only lossy step, and it truncates toward zero
// - Mixing precision tags requires an explicit conversion

mod errors;
mod fixed_decimal;
mod fixed_point;
mod precision;

#[cfg(feature = "serde")]
mod serde_support;

pub use errors::{NumericError, NumericResult, SequenceViolation};
pub use fixed_decimal::{
    CollateralAmount, FixedDecimal, PercentageMultiplier, Price, Ratio, UsdValue,
};
pub use fixed_point::FixedPointValue;
pub use precision::{
    CollateralDecimals, PercentageDecimals, Precision, PriceDecimals, RatioDecimals, UsdDecimals,
};

pub(crate) use fixed_point::pow10;
