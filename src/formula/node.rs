// ============================================================================
// Formula Nodes
// Persistent left-deep expression tree over fixed-point values
// ============================================================================

use crate::numeric::FixedPointValue;
use smallvec::SmallVec;
use std::fmt;
use std::rc::Rc;

/// Binary operation applied between a running result and the next operand.
///
/// Division is not an operation here: it is the edge between a formula's
/// numerator and its denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Product; precision becomes the sum of both precisions
    Multiply,
    /// Sum at the wider of both precisions
    Add,
    /// Difference at the wider of both precisions
    Subtract,
}

impl Operation {
    /// Apply without any rounding.
    pub fn apply(self, lhs: &FixedPointValue, rhs: &FixedPointValue) -> FixedPointValue {
        match self {
            Operation::Multiply => lhs * rhs,
            Operation::Add => lhs + rhs,
            Operation::Subtract => lhs - rhs,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Operation::Multiply => "*",
            Operation::Add => "+",
            Operation::Subtract => "-",
        }
    }
}

/// Immutable tree node. Appending a term creates a new root that shares the
/// previous tree, so extending a formula never copies earlier terms.
#[derive(Debug)]
pub(crate) enum Node {
    Leaf(FixedPointValue),
    Apply {
        op: Operation,
        lhs: Rc<Node>,
        rhs: FixedPointValue,
    },
}

impl Node {
    pub(crate) fn leaf(value: FixedPointValue) -> Rc<Node> {
        Rc::new(Node::Leaf(value))
    }

    pub(crate) fn apply(lhs: Rc<Node>, op: Operation, rhs: FixedPointValue) -> Rc<Node> {
        Rc::new(Node::Apply { op, lhs, rhs })
    }

    /// Leftmost leaf plus the operations applied to it, in application order.
    fn unwind(&self) -> (&FixedPointValue, SmallVec<[(Operation, &FixedPointValue); 8]>) {
        let mut steps = SmallVec::new();
        let mut node = self;
        let seed = loop {
            match node {
                Node::Leaf(value) => break value,
                Node::Apply { op, lhs, rhs } => {
                    steps.push((*op, rhs));
                    node = lhs;
                },
            }
        };
        steps.reverse();
        (seed, steps)
    }

    /// Fold the tree left to right into one exact value.
    pub(crate) fn reduce(&self) -> FixedPointValue {
        let (seed, steps) = self.unwind();
        steps
            .into_iter()
            .fold(seed.clone(), |acc, (op, rhs)| op.apply(&acc, rhs))
    }

    /// Number of leaves.
    pub(crate) fn term_count(&self) -> usize {
        self.unwind().1.len() + 1
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (seed, steps) = self.unwind();
        for _ in 0..steps.len() {
            f.write_str("(")?;
        }
        write!(f, "{seed}")?;
        for (op, rhs) in steps {
            write!(f, " {} {rhs})", op.symbol())?;
        }
        Ok(())
    }
}
