// ============================================================================
// Decimals Configuration
// Named precisions resolved at startup
// ============================================================================

use crate::numeric::{
    CollateralDecimals, FixedPointValue, NumericError, NumericResult, PercentageDecimals, Precision,
    PriceDecimals, RatioDecimals, UsdDecimals,
};
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest precision whose scale factor still fits a 256-bit word.
pub const MAX_DECIMALS: u32 = 77;

/// Table of named precisions.
///
/// Compile-time tags carry their precision in the type. Deployments that only
/// learn some precisions at startup (a base asset's decimals, for example)
/// register them here by name; using a name that was never registered fails
/// with [`NumericError::Configuration`] instead of defaulting.
///
/// Serialized as a plain JSON object of `name -> decimals`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DecimalsConfig {
    precisions: BTreeMap<String, u32>,
}

impl DecimalsConfig {
    /// Empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: Register a named precision
    pub fn with_precision(mut self, name: impl Into<String>, decimals: u32) -> Self {
        self.precisions.insert(name.into(), decimals);
        self
    }

    /// Builder method: Register a compile-time tag under its own name
    pub fn with_tag<P: Precision>(self) -> Self {
        self.with_precision(P::NAME, P::DECIMALS)
    }

    /// Look up a named precision.
    pub fn precision_of(&self, name: &str) -> NumericResult<u32> {
        self.precisions
            .get(name)
            .copied()
            .ok_or_else(|| NumericError::Configuration {
                tag: name.to_string(),
            })
    }

    /// Fail unless every name in `names` is configured.
    pub fn require<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> NumericResult<()> {
        for name in names {
            self.precision_of(name)?;
        }
        Ok(())
    }

    /// Check that the table agrees with a compile-time tag of the same name.
    pub fn check_tag<P: Precision>(&self) -> NumericResult<()> {
        let configured = self.precision_of(P::NAME)?;
        if configured != P::DECIMALS {
            return Err(NumericError::InvalidInput(format!(
                "{} configured with {} decimals, type declares {}",
                P::NAME,
                configured,
                P::DECIMALS
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.precisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.precisions.is_empty()
    }

    /// Registered names with their precisions, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.precisions.iter().map(|(name, decimals)| (name.as_str(), *decimals))
    }

    // ========================================================================
    // Value Construction
    // ========================================================================

    /// Raw scaled magnitude in the named precision.
    pub fn value_from_raw(&self, name: &str, raw: impl Into<num_bigint::BigInt>) -> NumericResult<FixedPointValue> {
        Ok(FixedPointValue::from_raw(raw, self.precision_of(name)?))
    }

    /// Float in the named precision (rounded half away from zero).
    pub fn value_from_f64(&self, name: &str, x: f64) -> NumericResult<FixedPointValue> {
        FixedPointValue::from_f64(x, self.precision_of(name)?)
    }

    /// Decimal string in the named precision (excess digits truncated).
    pub fn value_from_str(&self, name: &str, s: &str) -> NumericResult<FixedPointValue> {
        FixedPointValue::from_decimal_str(s, self.precision_of(name)?)
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        for (name, decimals) in &self.precisions {
            if name.trim().is_empty() {
                return Err("Precision name cannot be empty".to_string());
            }
            if *decimals > MAX_DECIMALS {
                return Err(format!(
                    "Precision {name} has {decimals} decimals, maximum is {MAX_DECIMALS}"
                ));
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON document such as `{"UsdDecimals": 9}`.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> NumericResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| NumericError::InvalidInput(format!("decimals config: {e}")))?;
        config.validate().map_err(NumericError::InvalidInput)?;
        Ok(config)
    }
}

// ============================================================================
// Preset Configurations
// ============================================================================

impl DecimalsConfig {
    /// The protocol's compile-time tags.
    pub fn protocol_defaults() -> Self {
        Self::new()
            .with_tag::<PriceDecimals>()
            .with_tag::<UsdDecimals>()
            .with_tag::<RatioDecimals>()
            .with_tag::<CollateralDecimals>()
            .with_tag::<PercentageDecimals>()
    }

    /// Protocol tags plus a base asset whose decimals come from deployment.
    pub fn with_base_asset(base_asset_decimals: u32) -> Self {
        Self::protocol_defaults().with_precision("BaseAsset", base_asset_decimals)
    }
}
