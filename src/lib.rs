// ============================================================================
// Settlement Engine Library
// Exact fixed-point accounting for leveraged positions
// ============================================================================

//! # Settlement Engine
//!
//! Exact accounting primitives for a leveraged trading protocol.
//!
//! ## Features
//!
//! - **Fixed-point values** with arbitrary-size magnitudes and explicit precision
//! - **Precision tags** that keep prices, USD values and ratios apart at compile time
//! - **Formula evaluation** over mixed precisions with one truncation at the end
//! - **Settlement waterfall** moving fees, funding and PnL between collateral and reserves
//!
//! ## Example
//!
//! ```rust
//! use settlement_engine::prelude::*;
//!
//! // Notional of 1.5 units at 45,000 per unit
//! let size = FixedPointValue::from_decimal_str("1.5", 18)?;
//! let price = Price::from_integer(45_000);
//! let notional: UsdValue = Formula::first(size).multiply_by(price).calculate()?;
//! assert_eq!(notional, UsdValue::from_integer(67_500));
//!
//! // Settle a 0.1% protocol fee on that notional
//! let fee: UsdValue = Formula::first(notional.clone())
//!     .multiply_by(FixedPointValue::from_decimal_str("0.001", 18)?)
//!     .calculate()?;
//!
//! let out = SettlementInput::new(UsdValue::from_integer(10_000), UsdValue::from_integer(1_000_000))
//!     .with_protocol_fee(fee)
//!     .settle();
//!
//! assert_eq!(out.status, SettlementStatus::Success);
//! assert_eq!(out.new_collateral.to_string(), "9932.5");
//! # Ok::<(), NumericError>(())
//! ```

pub mod config;
pub mod formula;
pub mod numeric;
pub mod settlement;
pub mod utils;

// Re-exports for convenience
pub mod prelude {
    pub use crate::config::DecimalsConfig;
    pub use crate::formula::Formula;
    pub use crate::numeric::{
        CollateralAmount, CollateralDecimals, FixedDecimal, FixedPointValue, NumericError,
        NumericResult, PercentageDecimals, PercentageMultiplier, Precision, Price, PriceDecimals,
        Ratio, RatioDecimals, UsdDecimals, UsdValue,
    };
    pub use crate::settlement::{
        calculate_settlement, SettlementInput, SettlementOutput, SettlementStatus, WaterfallStep,
    };
}

#[cfg(test)]
mod integration_tests {
    use super::prelude::*;

    #[test]
    fn test_formula_feeds_settlement() {
        // Funding payment: (rate * notional) / 100, owed by the position
        let rate = UsdValue::from_integer(5);
        let notional = UsdValue::from_integer(100_000);
        let funding: UsdValue = Formula::first(rate)
            .multiply_by(notional)
            .divide_by(UsdValue::from_integer(100))
            .unwrap()
            .calculate()
            .unwrap();
        assert_eq!(funding, UsdValue::from_integer(5_000));

        let out = calculate_settlement(
            UsdValue::from_integer(10),
            UsdValue::from_integer(3),
            UsdValue::zero(),
            funding,
            false,
            UsdValue::zero(),
            true,
            UsdValue::from_integer(20_000),
            UsdValue::from_integer(1_000_000),
        );

        assert_eq!(out.status, SettlementStatus::Success);
        assert_eq!(out.new_collateral, UsdValue::from_integer(20_000 - 10 - 5_000));
        assert_eq!(out.new_total_reserves, UsdValue::from_integer(1_000_000 + 5_000 + 3));
    }

    #[test]
    fn test_runtime_precision_settlement() {
        let config = DecimalsConfig::with_base_asset(9);
        let collateral = config.value_from_str("BaseAsset", "80").unwrap();
        let fee = config.value_from_str("BaseAsset", "50").unwrap();
        let funding = config.value_from_str("BaseAsset", "10000").unwrap();

        // Same precision as CollateralDecimals, so tagging is exact
        config.require(["BaseAsset", "CollateralDecimals"]).unwrap();
        let out = SettlementInput::new(
            CollateralAmount::from_value(&collateral),
            CollateralAmount::from_integer(1_000_000),
        )
        .with_protocol_fee(CollateralAmount::from_value(&fee))
        .with_funding_rate(CollateralAmount::from_value(&funding), false)
        .settle();

        assert_eq!(out.protocol_fee_charged, CollateralAmount::from_integer(50));
        assert_eq!(out.funding_rate_charged, CollateralAmount::from_integer(30));
        assert!(out.new_collateral.is_zero());
        assert_eq!(out.status, SettlementStatus::InsufficientCollateral);
    }

    #[test]
    fn test_cross_tag_conversion() {
        let price = Price::from_integer(40_000);
        let as_usd: UsdValue = price.convert();
        assert_eq!(as_usd, UsdValue::from_integer(40_000));

        let ratio = Ratio::from_value(&FixedPointValue::from_decimal_str("0.5", 2).unwrap());
        let scaled: UsdValue = Formula::first(as_usd).multiply_by(ratio).calculate().unwrap();
        assert_eq!(scaled, UsdValue::from_integer(20_000));
    }
}
