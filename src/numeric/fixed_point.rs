// ============================================================================
// Fixed-Point Value
// Arbitrary-precision scaled integer with a runtime precision
// ============================================================================

use super::errors::{NumericError, NumericResult};
use num_bigint::{BigInt, Sign};
use num_traits::{FromPrimitive, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Neg, Sub};

/// Largest scale `rust_decimal::Decimal` can carry
const DECIMAL_MAX_SCALE: u32 = 28;

/// Compute 10^n
pub(crate) fn pow10(n: u32) -> BigInt {
    BigInt::from(10u8).pow(n)
}

/// `round(x * 10^precision)` computed on the exact binary value of `x`, for
/// precisions whose scale factor does not fit in an `f64`.
fn scale_float_exact(x: f64, precision: u32) -> BigInt {
    let (mantissa, exponent, sign) = num_traits::Float::integer_decode(x);
    let scaled = BigInt::from(mantissa) * pow10(precision);

    let magnitude = if exponent >= 0 {
        scaled << exponent.unsigned_abs()
    } else {
        // Half away from zero on the unsigned magnitude
        let shift = exponent.unsigned_abs();
        let half = BigInt::from(1u8) << (shift - 1);
        (scaled + half) >> shift
    };

    if sign < 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Exact decimal number: `magnitude / 10^precision`.
///
/// The magnitude is an arbitrary-precision signed integer, so protocol-scale
/// quantities (256-bit and beyond) never overflow. Values are immutable;
/// every conversion or arithmetic operation returns a new value.
///
/// Equality, ordering and hashing compare the represented number, not the
/// `(magnitude, precision)` pair: `1.50` at precision 2 equals `1.5` at
/// precision 1.
///
/// # Example
/// ```
/// use settlement_engine::numeric::FixedPointValue;
///
/// let fee = FixedPointValue::from_decimal_str("12.345", 6)?;
/// assert_eq!(fee.magnitude().to_string(), "12345000");
/// assert_eq!(fee.convert_to(2).to_decimal_string(), "12.34");
/// # Ok::<(), settlement_engine::numeric::NumericError>(())
/// ```
#[derive(Clone)]
pub struct FixedPointValue {
    magnitude: BigInt,
    precision: u32,
}

impl FixedPointValue {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Wrap an already-scaled integer.
    #[inline]
    pub fn from_raw(raw: impl Into<BigInt>, precision: u32) -> Self {
        Self {
            magnitude: raw.into(),
            precision,
        }
    }

    /// Create from a whole number of units (`whole × 10^precision`).
    pub fn from_integer(whole: impl Into<BigInt>, precision: u32) -> Self {
        Self {
            magnitude: whole.into() * pow10(precision),
            precision,
        }
    }

    /// Zero at the given precision.
    #[inline]
    pub fn zero(precision: u32) -> Self {
        Self::from_raw(BigInt::zero(), precision)
    }

    /// Create from a float: `round(x × 10^precision)`, half away from zero.
    ///
    /// Floats carry roughly 15 significant digits; use
    /// [`from_decimal_str`](Self::from_decimal_str) for user-entered amounts.
    ///
    /// # Errors
    /// Returns `InvalidInput` for NaN, infinities, or a scaled value that is
    /// not representable.
    pub fn from_f64(x: f64, precision: u32) -> NumericResult<Self> {
        if !x.is_finite() {
            return Err(NumericError::invalid_input(format!(
                "cannot build a fixed-point value from non-finite float {x}"
            )));
        }
        let exponent = i32::try_from(precision).map_err(|_| {
            NumericError::invalid_input(format!("precision {precision} is too large for floats"))
        })?;

        let factor = 10f64.powi(exponent);
        if !factor.is_finite() {
            return Ok(Self::from_raw(scale_float_exact(x, precision), precision));
        }

        // f64::round rounds half away from zero
        let scaled = (x * factor).round();
        let magnitude = BigInt::from_f64(scaled).ok_or_else(|| {
            NumericError::invalid_input(format!(
                "{x} is out of range at precision {precision}"
            ))
        })?;

        Ok(Self::from_raw(magnitude, precision))
    }

    /// Parse a decimal string such as `"-12.5"` or `".25"`.
    ///
    /// The fractional part is right-padded to `precision` digits. Digits
    /// beyond `precision` are dropped (truncation toward zero).
    ///
    /// # Errors
    /// Returns `InvalidInput` for empty strings, non-digit characters or more
    /// than one decimal point.
    pub fn from_decimal_str(s: &str, precision: u32) -> NumericResult<Self> {
        let s = s.trim();

        let (is_negative, unsigned) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        let (int_str, frac_str) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        if int_str.is_empty() && frac_str.is_empty() {
            return Err(NumericError::invalid_input(format!("`{s}` is not a number")));
        }
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_str) || !all_digits(frac_str) {
            return Err(NumericError::invalid_input(format!("`{s}` is not a decimal number")));
        }

        let width = precision as usize;
        let kept = frac_str.len().min(width);

        let mut digits = String::with_capacity(int_str.len() + width);
        digits.push_str(int_str);
        digits.push_str(&frac_str[..kept]);
        digits.extend(std::iter::repeat('0').take(width - kept));

        let magnitude = if digits.is_empty() {
            BigInt::zero()
        } else {
            BigInt::parse_bytes(digits.as_bytes(), 10)
                .ok_or_else(|| NumericError::invalid_input(format!("`{s}` is not a number")))?
        };

        Ok(Self::from_raw(
            if is_negative { -magnitude } else { magnitude },
            precision,
        ))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The raw scaled integer.
    #[inline]
    pub fn magnitude(&self) -> &BigInt {
        &self.magnitude
    }

    /// Number of implied fractional digits.
    #[inline]
    pub fn precision(&self) -> u32 {
        self.precision
    }

    #[inline]
    pub fn into_parts(self) -> (BigInt, u32) {
        (self.magnitude, self.precision)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.magnitude.sign() == Sign::Minus
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.magnitude.sign() == Sign::Plus
    }

    /// Absolute value at the same precision.
    pub fn abs(&self) -> Self {
        if self.is_negative() {
            -self
        } else {
            self.clone()
        }
    }

    // ========================================================================
    // Precision Conversion
    // ========================================================================

    /// Rescale to `target` fractional digits.
    ///
    /// Increasing precision is exact. Decreasing precision divides by a power
    /// of ten and truncates toward zero; this is the only place ordinary
    /// scaling loses information.
    pub fn convert_to(&self, target: u32) -> Self {
        match target.cmp(&self.precision) {
            Ordering::Equal => self.clone(),
            Ordering::Greater => Self {
                magnitude: &self.magnitude * pow10(target - self.precision),
                precision: target,
            },
            Ordering::Less => {
                let divisor = pow10(self.precision - target);
                let magnitude = &self.magnitude / &divisor;

                if tracing::enabled!(tracing::Level::TRACE)
                    && !(&self.magnitude % &divisor).is_zero()
                {
                    tracing::trace!(
                        from = self.precision,
                        to = target,
                        value = %self,
                        "precision reduction truncated digits"
                    );
                }

                Self {
                    magnitude,
                    precision: target,
                }
            },
        }
    }

    /// Magnitude expressed at a precision at least as large as ours.
    pub(crate) fn magnitude_at(&self, precision: u32) -> BigInt {
        debug_assert!(precision >= self.precision);
        if precision == self.precision {
            self.magnitude.clone()
        } else {
            &self.magnitude * pow10(precision - self.precision)
        }
    }

    /// Same number with trailing zero digits stripped from the magnitude.
    pub fn normalized(&self) -> Self {
        if self.magnitude.is_zero() {
            return Self::zero(0);
        }

        let ten = BigInt::from(10u8);
        let mut magnitude = self.magnitude.clone();
        let mut precision = self.precision;
        while precision > 0 && (&magnitude % &ten).is_zero() {
            magnitude /= &ten;
            precision -= 1;
        }

        Self {
            magnitude,
            precision,
        }
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Minimal decimal rendering: no trailing zeros, no bare decimal point.
    pub fn to_decimal_string(&self) -> String {
        let digits = self.magnitude.magnitude().to_string();
        let width = self.precision as usize;

        let padded = if digits.len() <= width {
            format!("{}{}", "0".repeat(width + 1 - digits.len()), digits)
        } else {
            digits
        };

        let (int_part, frac_part) = padded.split_at(padded.len() - width);
        let frac_part = frac_part.trim_end_matches('0');
        let sign = if self.is_negative() { "-" } else { "" };

        if frac_part.is_empty() {
            format!("{sign}{int_part}")
        } else {
            format!("{sign}{int_part}.{frac_part}")
        }
    }

    /// Approximate float value. Display only, never for accounting.
    pub fn to_f64_approx(&self) -> f64 {
        self.to_decimal_string().parse().unwrap_or(f64::NAN)
    }

    // ========================================================================
    // rust_decimal Interop (API boundaries)
    // ========================================================================

    /// Convert from `rust_decimal::Decimal` (exact).
    pub fn from_decimal(d: rust_decimal::Decimal) -> Self {
        Self::from_raw(d.mantissa(), d.scale())
    }

    /// Convert to `rust_decimal::Decimal`.
    ///
    /// Precisions above 28 digits are truncated to 28 first.
    ///
    /// # Errors
    /// Returns `Overflow` if the magnitude does not fit a 96-bit mantissa.
    pub fn to_decimal(&self) -> NumericResult<rust_decimal::Decimal> {
        let value = if self.precision > DECIMAL_MAX_SCALE {
            self.convert_to(DECIMAL_MAX_SCALE)
        } else {
            self.clone()
        };

        let mantissa = value.magnitude.to_i128().ok_or(NumericError::Overflow)?;
        rust_decimal::Decimal::try_from_i128_with_scale(mantissa, value.precision)
            .map_err(|_| NumericError::Overflow)
    }

    // ========================================================================
    // Comparison
    // ========================================================================

    /// Returns the smaller of two values.
    pub fn min(self, other: Self) -> Self {
        if other < self {
            other
        } else {
            self
        }
    }

    /// Returns the larger of two values.
    pub fn max(self, other: Self) -> Self {
        if other > self {
            other
        } else {
            self
        }
    }
}

// ============================================================================
// Trait Implementations
// ============================================================================

impl Default for FixedPointValue {
    fn default() -> Self {
        Self::zero(0)
    }
}

impl PartialEq for FixedPointValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FixedPointValue {}

impl PartialOrd for FixedPointValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FixedPointValue {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.precision == other.precision {
            return self.magnitude.cmp(&other.magnitude);
        }
        let precision = self.precision.max(other.precision);
        self.magnitude_at(precision)
            .cmp(&other.magnitude_at(precision))
    }
}

impl Hash for FixedPointValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let normalized = self.normalized();
        normalized.magnitude.hash(state);
        normalized.precision.hash(state);
    }
}

impl Neg for FixedPointValue {
    type Output = FixedPointValue;

    fn neg(self) -> Self::Output {
        Self {
            magnitude: -self.magnitude,
            precision: self.precision,
        }
    }
}

impl Neg for &FixedPointValue {
    type Output = FixedPointValue;

    fn neg(self) -> Self::Output {
        FixedPointValue {
            magnitude: -&self.magnitude,
            precision: self.precision,
        }
    }
}

// Add/Sub scale both operands to the wider precision; exact.
impl Add for &FixedPointValue {
    type Output = FixedPointValue;

    fn add(self, rhs: Self) -> Self::Output {
        let precision = self.precision.max(rhs.precision);
        FixedPointValue {
            magnitude: self.magnitude_at(precision) + rhs.magnitude_at(precision),
            precision,
        }
    }
}

impl Sub for &FixedPointValue {
    type Output = FixedPointValue;

    fn sub(self, rhs: Self) -> Self::Output {
        let precision = self.precision.max(rhs.precision);
        FixedPointValue {
            magnitude: self.magnitude_at(precision) - rhs.magnitude_at(precision),
            precision,
        }
    }
}

// Mul keeps every digit: the result precision is the sum of both precisions.
impl Mul for &FixedPointValue {
    type Output = FixedPointValue;

    fn mul(self, rhs: Self) -> Self::Output {
        FixedPointValue {
            magnitude: &self.magnitude * &rhs.magnitude,
            precision: self.precision + rhs.precision,
        }
    }
}

impl Add for FixedPointValue {
    type Output = FixedPointValue;

    fn add(self, rhs: Self) -> Self::Output {
        &self + &rhs
    }
}

impl Sub for FixedPointValue {
    type Output = FixedPointValue;

    fn sub(self, rhs: Self) -> Self::Output {
        &self - &rhs
    }
}

impl Mul for FixedPointValue {
    type Output = FixedPointValue;

    fn mul(self, rhs: Self) -> Self::Output {
        &self * &rhs
    }
}

// ============================================================================
// Display and Debug
// ============================================================================

impl fmt::Debug for FixedPointValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FixedPointValue({}, raw={}, precision={})",
            self, self.magnitude, self.precision
        )
    }
}

impl fmt::Display for FixedPointValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
