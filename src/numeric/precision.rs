// ============================================================================
// Precision Tags
// Type-level labels binding a fractional-digit count to a value type
// ============================================================================

use std::fmt;
use std::hash::Hash;

/// A compile-time precision label.
///
/// Implementors are zero-sized marker types. `DECIMALS` is a required
/// associated constant, so a tag can never be used without a precision;
/// precisions that are only known at startup go through
/// [`DecimalsConfig`](crate::config::DecimalsConfig) instead.
pub trait Precision: Copy + Default + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Human-readable tag name (used in logs and configuration lookups)
    const NAME: &'static str;

    /// Number of implied fractional decimal digits
    const DECIMALS: u32;
}

/// Declares a zero-sized precision tag.
///
/// ```
/// use settlement_engine::precision_tag;
/// use settlement_engine::numeric::{FixedDecimal, Precision};
///
/// precision_tag!(
///     /// Six-decimal stablecoin amounts
///     pub StableDecimals = 6
/// );
///
/// assert_eq!(StableDecimals::DECIMALS, 6);
/// let amount = FixedDecimal::<StableDecimals>::from_integer(5);
/// assert_eq!(amount.raw_value().to_string(), "5000000");
/// ```
#[macro_export]
macro_rules! precision_tag {
    ($(#[$meta:meta])* $vis:vis $name:ident = $decimals:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis struct $name;

        impl $crate::numeric::Precision for $name {
            const NAME: &'static str = stringify!($name);
            const DECIMALS: u32 = $decimals;
        }
    };
}

// ============================================================================
// Protocol Tags
// ============================================================================

precision_tag!(
    /// Asset prices (18 fractional digits)
    pub PriceDecimals = 18
);

precision_tag!(
    /// USD-denominated values (9 fractional digits)
    pub UsdDecimals = 9
);

precision_tag!(
    /// Dimensionless ratios used as multipliers (18 fractional digits)
    pub RatioDecimals = 18
);

precision_tag!(
    /// Collateral amounts in the base asset (9 fractional digits)
    pub CollateralDecimals = 9
);

precision_tag!(
    /// Whole-number percentage multipliers
    pub PercentageDecimals = 0
);
