// ============================================================================
// Formula Module
// Mixed-precision arithmetic with a single, explicit rounding step
// ============================================================================
//
// This module provides:
// - Formula: immutable numerator/denominator builder
// - Operation: the binary operations a formula chains together
// - IntoFormula: accepted return types of sub-builder closures
//
// Terms are reduced exactly (multiplication sums precisions, addition and
// subtraction widen to the larger precision). Only evaluation truncates.

mod builder;
mod node;

pub use builder::{Formula, IntoFormula};
pub use node::Operation;
