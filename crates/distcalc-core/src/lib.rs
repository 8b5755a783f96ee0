//! # distcalc-core
//!
//! Core library for the distcalc distributed expression evaluator.
//! Converts infix expressions to postfix order and defines the data model,
//! fault taxonomy, and compute wire contract shared by the agent and the
//! orchestrator.

pub mod constants;
pub mod error;
pub mod float;
pub mod model;
pub mod options;
pub mod postfix;
pub mod token;
pub mod wire;

// Re-exports
pub use constants::{exit_codes, DEFAULT_AGENT_ADDR, DEFAULT_OWNER, DEFAULT_WORKERS, MAX_WORKERS};
pub use error::{CalcError, ConfigError, FaultKind};
pub use model::{Expression, ExpressionId, Operation, OperationId, Outcome, Owner, Status};
pub use options::OperationTimes;
pub use postfix::{to_postfix, Postfix};
pub use token::{Operator, Token};
pub use wire::{ComputeClient, ComputeRequest, ComputeResponse, WireFault};

/// Apply a binary operator to two operands.
///
/// This is the arithmetic every compute worker performs. Division by zero
/// is reported as a fault, never as an infinite or NaN value.
///
/// # Example
/// ```
/// use distcalc_core::{apply, FaultKind, Operator};
///
/// assert_eq!(apply(Operator::Sub, 7.0, 2.0), Ok(5.0));
/// assert_eq!(apply(Operator::Div, 4.0, 0.0), Err(FaultKind::DivisionByZero));
/// ```
pub fn apply(op: Operator, left: f32, right: f32) -> Result<f32, FaultKind> {
    match op {
        Operator::Add => Ok(left + right),
        Operator::Sub => Ok(left - right),
        Operator::Mul => Ok(left * right),
        Operator::Div => {
            if right == 0.0 {
                Err(FaultKind::DivisionByZero)
            } else {
                Ok(left / right)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_basic_arithmetic() {
        assert_eq!(apply(Operator::Add, 2.0, 3.0), Ok(5.0));
        assert_eq!(apply(Operator::Sub, 5.0, 3.0), Ok(2.0));
        assert_eq!(apply(Operator::Mul, 4.0, 5.0), Ok(20.0));
        assert_eq!(apply(Operator::Div, 10.0, 2.0), Ok(5.0));
    }

    #[test]
    fn apply_keeps_operand_order() {
        assert_eq!(apply(Operator::Sub, 2.0, 5.0), Ok(-3.0));
        assert_eq!(apply(Operator::Div, 1.0, 4.0), Ok(0.25));
    }

    #[test]
    fn apply_negative_zero_divisor() {
        assert_eq!(
            apply(Operator::Div, 1.0, -0.0),
            Err(FaultKind::DivisionByZero)
        );
    }
}
