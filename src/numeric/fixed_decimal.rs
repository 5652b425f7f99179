// ============================================================================
// Fixed-Point Decimal
// Fixed-point value whose precision is fixed by a type-level tag
// ============================================================================

use super::errors::{NumericError, NumericResult};
use super::fixed_point::FixedPointValue;
use super::precision::{
    CollateralDecimals, PercentageDecimals, Precision, PriceDecimals, RatioDecimals, UsdDecimals,
};
use num_bigint::{BigInt, Sign};
use num_traits::Zero;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::Sum;
use std::marker::PhantomData;
use std::ops::{Add, Neg, Sub};

/// Fixed-point decimal number with a compile-time precision tag.
///
/// Internally stores `value × 10^P::DECIMALS` as an arbitrary-precision
/// integer. Values with different tags cannot be mixed by the arithmetic
/// operators; crossing tags goes through [`convert`](Self::convert) or the
/// [`Formula`](crate::formula::Formula) evaluator.
///
/// # Example
/// ```
/// use settlement_engine::numeric::{Price, UsdValue};
///
/// let price: Price = "45000.5".parse()?;
/// let usd: UsdValue = price.convert();
/// assert_eq!(usd.raw_value().to_string(), "45000500000000");
/// # Ok::<(), settlement_engine::numeric::NumericError>(())
/// ```
pub struct FixedDecimal<P: Precision> {
    raw: BigInt,
    _precision: PhantomData<P>,
}

impl<P: Precision> FixedDecimal<P> {
    /// Number of fractional digits carried by this type
    pub const DECIMALS: u32 = P::DECIMALS;

    // ========================================================================
    // Construction
    // ========================================================================

    /// Create from raw internal representation (already scaled).
    #[inline]
    pub fn from_raw(raw: impl Into<BigInt>) -> Self {
        Self {
            raw: raw.into(),
            _precision: PhantomData,
        }
    }

    /// Create from a whole number of units.
    pub fn from_integer(whole: impl Into<BigInt>) -> Self {
        Self::from_raw(FixedPointValue::from_integer(whole, P::DECIMALS).into_parts().0)
    }

    /// Zero value
    #[inline]
    pub fn zero() -> Self {
        Self::from_raw(BigInt::zero())
    }

    /// Create from a float, rounding half away from zero.
    ///
    /// # Errors
    /// Returns `InvalidInput` for non-finite input.
    pub fn from_f64(x: f64) -> NumericResult<Self> {
        FixedPointValue::from_f64(x, P::DECIMALS).map(|value| Self::from_raw(value.into_parts().0))
    }

    /// Adopt an untagged value, rescaling it into this tag's precision.
    ///
    /// Reducing precision truncates toward zero.
    pub fn from_value(value: &FixedPointValue) -> Self {
        if value.precision() != P::DECIMALS {
            tracing::debug!(
                from = value.precision(),
                to = P::NAME,
                value = %value,
                "converting between precision tags"
            );
        }
        Self::from_raw(value.convert_to(P::DECIMALS).into_parts().0)
    }

    /// Convert from `rust_decimal::Decimal` (truncating excess digits).
    pub fn from_decimal(d: rust_decimal::Decimal) -> Self {
        Self::from_value(&FixedPointValue::from_decimal(d))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Get the raw internal value (scaled).
    #[inline]
    pub fn raw_value(&self) -> &BigInt {
        &self.raw
    }

    #[inline]
    pub fn into_raw(self) -> BigInt {
        self.raw
    }

    /// Untagged copy carrying the same magnitude and precision.
    pub fn to_value(&self) -> FixedPointValue {
        FixedPointValue::from_raw(self.raw.clone(), P::DECIMALS)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.raw.sign() == Sign::Plus
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.raw.sign() == Sign::Minus
    }

    /// Approximate float value for display.
    pub fn to_f64_approx(&self) -> f64 {
        self.to_value().to_f64_approx()
    }

    /// Convert to `rust_decimal::Decimal`.
    ///
    /// # Errors
    /// Returns `Overflow` if the value does not fit.
    pub fn to_decimal(&self) -> NumericResult<rust_decimal::Decimal> {
        self.to_value().to_decimal()
    }

    // ========================================================================
    // Conversion
    // ========================================================================

    /// Explicit conversion into another precision tag.
    pub fn convert<Q: Precision>(&self) -> FixedDecimal<Q> {
        FixedDecimal::from_value(&self.to_value())
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    /// Subtraction floored at zero.
    pub fn saturating_sub(&self, rhs: &Self) -> Self {
        if rhs.raw >= self.raw {
            Self::zero()
        } else {
            Self::from_raw(&self.raw - &rhs.raw)
        }
    }

    /// Returns the minimum of two values.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        if other.raw < self.raw {
            other
        } else {
            self
        }
    }

    /// Returns the maximum of two values.
    #[inline]
    pub fn max(self, other: Self) -> Self {
        if other.raw > self.raw {
            other
        } else {
            self
        }
    }
}

// ============================================================================
// Trait Implementations
// ============================================================================

impl<P: Precision> Clone for FixedDecimal<P> {
    fn clone(&self) -> Self {
        Self::from_raw(self.raw.clone())
    }
}

impl<P: Precision> Default for FixedDecimal<P> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<P: Precision> PartialEq for FixedDecimal<P> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<P: Precision> Eq for FixedDecimal<P> {}

impl<P: Precision> PartialOrd for FixedDecimal<P> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P: Precision> Ord for FixedDecimal<P> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<P: Precision> Hash for FixedDecimal<P> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<P: Precision> Neg for FixedDecimal<P> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::from_raw(-self.raw)
    }
}

impl<P: Precision> Add for FixedDecimal<P> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::from_raw(self.raw + rhs.raw)
    }
}

impl<P: Precision> Sub for FixedDecimal<P> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::from_raw(self.raw - rhs.raw)
    }
}

impl<P: Precision> Add for &FixedDecimal<P> {
    type Output = FixedDecimal<P>;

    fn add(self, rhs: Self) -> Self::Output {
        FixedDecimal::from_raw(&self.raw + &rhs.raw)
    }
}

impl<P: Precision> Sub for &FixedDecimal<P> {
    type Output = FixedDecimal<P>;

    fn sub(self, rhs: Self) -> Self::Output {
        FixedDecimal::from_raw(&self.raw - &rhs.raw)
    }
}

impl<P: Precision> Sum for FixedDecimal<P> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, x| acc + x)
    }
}

impl<P: Precision> From<FixedDecimal<P>> for FixedPointValue {
    fn from(value: FixedDecimal<P>) -> Self {
        FixedPointValue::from_raw(value.raw, P::DECIMALS)
    }
}

impl<P: Precision> From<&FixedDecimal<P>> for FixedPointValue {
    fn from(value: &FixedDecimal<P>) -> Self {
        value.to_value()
    }
}

impl From<&FixedPointValue> for FixedPointValue {
    fn from(value: &FixedPointValue) -> Self {
        value.clone()
    }
}

// ============================================================================
// Display and Debug
// ============================================================================

impl<P: Precision> fmt::Debug for FixedDecimal<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedDecimal<{}>({}, raw={})", P::NAME, self, self.raw)
    }
}

impl<P: Precision> fmt::Display for FixedDecimal<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_value(), f)
    }
}

// ============================================================================
// String Parsing
// ============================================================================

impl<P: Precision> std::str::FromStr for FixedDecimal<P> {
    type Err = NumericError;

    /// Parse from a decimal string.
    ///
    /// # Examples
    /// - "123" -> 123 whole units
    /// - "123.456" -> 123.456
    /// - "0.1234567891" at 9 decimals -> 0.123456789 (extra digits truncated)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FixedPointValue::from_decimal_str(s, P::DECIMALS)
            .map(|value| Self::from_raw(value.into_parts().0))
    }
}

// ============================================================================
// Type Aliases for Common Use Cases
// ============================================================================

/// Asset price with 18 decimal places
pub type Price = FixedDecimal<PriceDecimals>;

/// USD value with 9 decimal places
pub type UsdValue = FixedDecimal<UsdDecimals>;

/// Dimensionless ratio with 18 decimal places
pub type Ratio = FixedDecimal<RatioDecimals>;

/// Collateral amount with 9 decimal places
pub type CollateralAmount = FixedDecimal<CollateralDecimals>;

/// Whole-number percentage multiplier
pub type PercentageMultiplier = FixedDecimal<PercentageDecimals>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[test]
    fn test_constants() {
        assert_eq!(Price::DECIMALS, 18);
        assert_eq!(UsdValue::DECIMALS, 9);
        assert!(UsdValue::zero().is_zero());
        assert_eq!(UsdValue::default(), UsdValue::zero());
    }

    #[test]
    fn test_from_integer() {
        let x = UsdValue::from_integer(100);
        assert_eq!(x.raw_value(), &BigInt::from(100_000_000_000i64));
        assert_eq!(x.to_string(), "100");
    }

    #[test]
    fn test_from_f64() {
        let x = UsdValue::from_f64(1.5).unwrap();
        assert_eq!(x.raw_value(), &BigInt::from(1_500_000_000i64));

        let pct = PercentageMultiplier::from_f64(2.5).unwrap();
        assert_eq!(pct.raw_value(), &BigInt::from(3));
    }

    #[test]
    fn test_from_str() {
        let x: UsdValue = "123.456".parse().unwrap();
        assert_eq!(x.raw_value(), &BigInt::from(123_456_000_000i64));

        let y: UsdValue = "-0.001".parse().unwrap();
        assert!(y.is_negative());

        // Extra digits are truncated, not rejected
        let z: UsdValue = "1.1234567890".parse().unwrap();
        assert_eq!(z.raw_value(), &BigInt::from(1_123_456_789i64));

        let bad: Result<UsdValue, _> = "not_a_number".parse();
        assert!(matches!(bad, Err(NumericError::InvalidInput(_))));
    }

    #[test]
    fn test_convert_between_tags() {
        let price: Price = "1.123456789123456789".parse().unwrap();

        let usd: UsdValue = price.convert();
        assert_eq!(usd.raw_value(), &BigInt::from(1_123_456_789i64));

        let back: Price = usd.convert();
        assert_eq!(back.to_string(), "1.123456789");
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn captured_logs(f: impl FnOnce()) -> String {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(logs.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = logs.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_precision_changes_are_logged() {
        let price = Price::from_integer(7);

        let via_convert = captured_logs(|| {
            let _: UsdValue = price.convert();
        });
        assert_eq!(via_convert.matches("converting between precision tags").count(), 1);

        let via_value = captured_logs(|| {
            let _ = UsdValue::from_value(&price.to_value());
        });
        assert!(via_value.contains("converting between precision tags"));
        assert!(via_value.contains("UsdDecimals"));

        let same_precision = captured_logs(|| {
            let _ = Ratio::from_value(&price.to_value());
            let _ = FixedPointValue::from(price.clone());
        });
        assert!(same_precision.is_empty());
    }

    #[test]
    fn test_arithmetic() {
        let a = UsdValue::from_integer(100);
        let b = UsdValue::from_integer(30);

        assert_eq!(&a - &b, UsdValue::from_integer(70));
        assert_eq!(b.clone() - a.clone(), UsdValue::from_integer(-70));
        assert_eq!(a.clone() + b.clone(), UsdValue::from_integer(130));
        assert_eq!(-a.clone(), UsdValue::from_integer(-100));
        assert_eq!(b.saturating_sub(&a), UsdValue::zero());
        assert_eq!(a.saturating_sub(&b), UsdValue::from_integer(70));
    }

    #[test]
    fn test_comparison() {
        let a = UsdValue::from_integer(100);
        let b = UsdValue::from_integer(50);

        assert!(a > b);
        assert!(b < a);
        assert_eq!(a.clone().min(b.clone()), b);
        assert_eq!(a.clone().max(b.clone()), a);
    }

    #[test]
    fn test_sum() {
        let total: UsdValue = (1..=4).map(|n| UsdValue::from_integer(n)).sum();
        assert_eq!(total, UsdValue::from_integer(10));
    }

    #[test]
    fn test_into_untagged_value() {
        let x = CollateralAmount::from_integer(7);
        let value: FixedPointValue = (&x).into();
        assert_eq!(value.precision(), 9);
        assert_eq!(value, FixedPointValue::from_integer(7, 0));
    }

    #[test]
    fn test_decimal_interop() {
        let d = rust_decimal::Decimal::new(12345, 2);
        let x = UsdValue::from_decimal(d);
        assert_eq!(x.to_string(), "123.45");
        assert_eq!(x.to_decimal().unwrap(), d);
    }

    #[test]
    fn test_debug_format() {
        let x = UsdValue::from_integer(2);
        assert_eq!(
            format!("{:?}", x),
            "FixedDecimal<UsdDecimals>(2, raw=2000000000)"
        );
    }
}
