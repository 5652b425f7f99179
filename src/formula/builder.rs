// ============================================================================
// Formula Builder
// Immutable numerator/denominator formulas with a single rounding step
// ============================================================================

use super::node::{Node, Operation};
use crate::numeric::{
    pow10, FixedDecimal, FixedPointValue, NumericError, NumericResult, Precision, SequenceViolation,
};
use std::fmt;
use std::rc::Rc;

/// Exact arithmetic over fixed-point values of mixed precision.
///
/// A formula is one numerator chain, optionally divided by one denominator
/// chain. Every intermediate result is kept at full precision; the only
/// rounding happens in [`evaluate`](Formula::evaluate), which truncates
/// toward zero into the requested precision.
///
/// Every builder method consumes the formula and returns a new one. Cloning
/// is cheap because the underlying trees are shared.
///
/// ```
/// use settlement_engine::formula::Formula;
/// use settlement_engine::numeric::{FixedPointValue, Price, UsdValue};
///
/// // notional / size, in price precision
/// let notional = UsdValue::from_integer(100);
/// let size = FixedPointValue::from_integer(3, 18);
///
/// let price: Price = Formula::first(notional)
///     .divide_by(size)?
///     .calculate()?;
/// assert_eq!(price.raw_value().to_string(), "33333333333333333333");
/// # Ok::<(), settlement_engine::numeric::NumericError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Formula {
    numerator: Option<Rc<Node>>,
    denominator: Option<Rc<Node>>,
    error: Option<NumericError>,
}

impl Formula {
    /// Empty formula, the entry point of sub-builders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a numerator with a single term.
    pub fn first(value: impl Into<FixedPointValue>) -> Self {
        Self {
            numerator: Some(Node::leaf(value.into())),
            ..Self::default()
        }
    }

    /// Standalone numerator built by `build` from an empty formula.
    ///
    /// The sub-expression must be non-empty and must not open a denominator.
    pub fn in_numerator<F, R>(build: F) -> NumericResult<Self>
    where
        F: FnOnce(Formula) -> R,
        R: IntoFormula,
    {
        let sub = build(Formula::new()).into_formula()?;
        if sub.denominator.is_some() {
            return Err(SequenceViolation::NestedDenominator.into());
        }
        match sub.numerator {
            Some(numerator) => Ok(Self {
                numerator: Some(numerator),
                ..Self::default()
            }),
            None => Err(SequenceViolation::EmptyFormula.into()),
        }
    }

    // ========================================================================
    // Building
    // ========================================================================

    /// Initialize an empty formula with its first term.
    pub fn value(self, value: impl Into<FixedPointValue>) -> NumericResult<Self> {
        self.check()?;
        if self.numerator.is_some() {
            return Err(SequenceViolation::PopulatedFormula.into());
        }
        Ok(Self::first(value))
    }

    /// Multiply the open side by `value`.
    pub fn multiply_by(self, value: impl Into<FixedPointValue>) -> Self {
        self.push(Operation::Multiply, value.into())
    }

    /// Add `value` to the open side.
    #[allow(clippy::should_implement_trait)]
    pub fn add(self, value: impl Into<FixedPointValue>) -> Self {
        self.push(Operation::Add, value.into())
    }

    /// Subtract `value` from the open side.
    pub fn subtract_by(self, value: impl Into<FixedPointValue>) -> Self {
        self.push(Operation::Subtract, value.into())
    }

    /// Open the denominator with a single term. Later terms extend it.
    pub fn divide_by(self, value: impl Into<FixedPointValue>) -> NumericResult<Self> {
        self.check_can_divide()?;
        Ok(Self {
            denominator: Some(Node::leaf(value.into())),
            ..self
        })
    }

    /// Open the denominator with a sub-expression built from an empty formula.
    pub fn in_denominator<F, R>(self, build: F) -> NumericResult<Self>
    where
        F: FnOnce(Formula) -> R,
        R: IntoFormula,
    {
        self.check_can_divide()?;
        let sub = build(Formula::new()).into_formula()?;
        self.over(sub)
    }

    /// Divide by an independently built formula.
    pub fn over(self, denominator: Formula) -> NumericResult<Self> {
        self.check_can_divide()?;
        denominator.check()?;
        if denominator.denominator.is_some() {
            return Err(SequenceViolation::NestedDenominator.into());
        }
        match denominator.numerator {
            Some(node) => Ok(Self {
                denominator: Some(node),
                ..self
            }),
            None => Err(SequenceViolation::EmptyFormula.into()),
        }
    }

    fn push(self, op: Operation, value: FixedPointValue) -> Self {
        if self.error.is_some() {
            return self;
        }
        match (self.numerator, self.denominator) {
            (Some(numerator), Some(denominator)) => Self {
                numerator: Some(numerator),
                denominator: Some(Node::apply(denominator, op, value)),
                error: None,
            },
            (Some(numerator), None) => Self {
                numerator: Some(Node::apply(numerator, op, value)),
                denominator: None,
                error: None,
            },
            (None, _) => Self {
                numerator: None,
                denominator: None,
                error: Some(SequenceViolation::OperationBeforeNumerator.into()),
            },
        }
    }

    fn check(&self) -> NumericResult<()> {
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn check_can_divide(&self) -> NumericResult<()> {
        self.check()?;
        if self.numerator.is_none() {
            return Err(SequenceViolation::DenominatorBeforeNumerator.into());
        }
        if self.denominator.is_some() {
            return Err(SequenceViolation::ConsecutiveDenominator.into());
        }
        Ok(())
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Reduce the formula and truncate the result into `precision` digits.
    ///
    /// The numerator and denominator are each reduced exactly. The quotient
    /// is taken as `num * 10^(2 * den.precision) / den` at precision
    /// `num.precision + den.precision`, which keeps every digit the target
    /// could need before the final conversion.
    pub fn evaluate(&self, precision: u32) -> NumericResult<FixedPointValue> {
        self.check()?;
        let numerator = self
            .numerator
            .as_ref()
            .ok_or(NumericError::InvalidSequence(SequenceViolation::EmptyFormula))?
            .reduce();

        let exact = match &self.denominator {
            None => numerator,
            Some(node) => {
                let denominator = node.reduce();
                if denominator.is_zero() {
                    return Err(NumericError::DivisionByZero);
                }
                let (num_mag, num_prec) = numerator.into_parts();
                let (den_mag, den_prec) = denominator.into_parts();
                let quotient = num_mag * pow10(2 * den_prec) / den_mag;
                FixedPointValue::from_raw(quotient, num_prec + den_prec)
            },
        };

        tracing::trace!(
            formula = %self,
            precision,
            exact_precision = exact.precision(),
            "evaluating formula"
        );
        Ok(exact.convert_to(precision))
    }

    /// Evaluate into the precision of tag `P`.
    pub fn calculate<P: Precision>(&self) -> NumericResult<FixedDecimal<P>> {
        let (raw, _) = self.evaluate(P::DECIMALS)?.into_parts();
        Ok(FixedDecimal::from_raw(raw))
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// True when no term has been added.
    pub fn is_empty(&self) -> bool {
        self.numerator.is_none()
    }

    pub fn has_denominator(&self) -> bool {
        self.denominator.is_some()
    }

    /// Number of terms across numerator and denominator.
    pub fn term_count(&self) -> usize {
        let count = |side: &Option<Rc<Node>>| side.as_ref().map_or(0, |node| node.term_count());
        count(&self.numerator) + count(&self.denominator)
    }

    /// Deferred sequence error, if a misuse has been recorded.
    pub fn error(&self) -> Option<&NumericError> {
        self.error.as_ref()
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.numerator, &self.denominator) {
            (None, _) => f.write_str("<empty>"),
            (Some(num), None) => write!(f, "{num}"),
            (Some(num), Some(den)) => write!(f, "{num} / {den}"),
        }
    }
}

/// Output of a sub-builder closure.
///
/// Closures may return a plain [`Formula`] or the result of a fallible
/// builder call such as [`Formula::value`].
pub trait IntoFormula {
    fn into_formula(self) -> NumericResult<Formula>;
}

impl IntoFormula for Formula {
    fn into_formula(self) -> NumericResult<Formula> {
        self.check()?;
        Ok(self)
    }
}

impl IntoFormula for NumericResult<Formula> {
    fn into_formula(self) -> NumericResult<Formula> {
        self.and_then(IntoFormula::into_formula)
    }
}
