// ============================================================================
// Numeric Errors
// Error types for fixed-point construction and formula evaluation
// ============================================================================

use std::fmt;
use thiserror::Error;

/// Ways a formula can be assembled in an illegal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceViolation {
    /// A denominator was opened while another one is already open
    ConsecutiveDenominator,
    /// A denominator was opened before the numerator held any term
    DenominatorBeforeNumerator,
    /// A denominator sub-formula carries a denominator of its own
    NestedDenominator,
    /// `value` was called on a formula that already holds a term
    PopulatedFormula,
    /// A sub-formula (or the whole formula) holds no term at all
    EmptyFormula,
    /// multiply/add/subtract was called before any term existed
    OperationBeforeNumerator,
}

impl fmt::Display for SequenceViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SequenceViolation::ConsecutiveDenominator => {
                "illegal consecutive denominator invocation"
            },
            SequenceViolation::DenominatorBeforeNumerator => {
                "denominator cannot be invoked before numerator"
            },
            SequenceViolation::NestedDenominator => {
                "denominator formula cannot have nested denominator formulas"
            },
            SequenceViolation::PopulatedFormula => "cannot initialize a populated formula",
            SequenceViolation::EmptyFormula => "formula has no terms",
            SequenceViolation::OperationBeforeNumerator => {
                "operation cannot be applied before the numerator is initialized"
            },
        };
        f.write_str(msg)
    }
}

/// Errors that can occur while building or evaluating fixed-point values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumericError {
    /// A named precision was used without ever being defined
    #[error("configuration error: no precision defined for `{tag}`")]
    Configuration { tag: String },

    /// Formula builder calls arrived in an illegal order
    #[error("invalid formula sequence: {0}")]
    InvalidSequence(SequenceViolation),

    /// A denominator evaluated to zero
    #[error("division by zero")]
    DivisionByZero,

    /// Input string or value is invalid
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Value does not fit the requested fixed-width representation
    #[error("arithmetic overflow: value does not fit the target representation")]
    Overflow,
}

impl NumericError {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        NumericError::InvalidInput(reason.into())
    }
}

impl From<SequenceViolation> for NumericError {
    fn from(violation: SequenceViolation) -> Self {
        NumericError::InvalidSequence(violation)
    }
}

/// Result type alias for numeric operations
pub type NumericResult<T> = Result<T, NumericError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(NumericError::DivisionByZero.to_string(), "division by zero");
        assert_eq!(
            NumericError::Configuration {
                tag: "BaseAsset".to_string()
            }
            .to_string(),
            "configuration error: no precision defined for `BaseAsset`"
        );
        assert_eq!(
            NumericError::from(SequenceViolation::ConsecutiveDenominator).to_string(),
            "invalid formula sequence: illegal consecutive denominator invocation"
        );
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(NumericError::Overflow, NumericError::Overflow);
        assert_ne!(NumericError::Overflow, NumericError::DivisionByZero);
        assert_ne!(
            NumericError::InvalidSequence(SequenceViolation::EmptyFormula),
            NumericError::InvalidSequence(SequenceViolation::PopulatedFormula)
        );
    }
}
