//! Orchestration interfaces.

use std::time::Duration;

use distcalc_core::{CalcError, Expression, ExpressionId, Operation};

/// Trait for presenting results to the user.
pub trait ResultPresenter: Send + Sync {
    /// Present the outcome of one evaluation.
    fn present_evaluation(&self, report: &EvaluationReport, details: bool);

    /// Present a single stored expression, with its operations if requested.
    fn present_expression(&self, expression: &Expression, operations: &[Operation]);

    /// Present an owner's expressions.
    fn present_expressions(&self, expressions: &[Expression]);

    /// Present the number of expressions removed by a clear.
    fn present_cleared(&self, removed: usize);

    /// Present an error.
    fn present_error(&self, error: &str);
}

/// Result of a single evaluation.
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    /// Identifier the expression was stored under.
    pub expression_id: ExpressionId,
    /// Infix text as submitted.
    pub source: String,
    /// Space-separated postfix form, if conversion succeeded.
    pub postfix: Option<String>,
    /// Number of operations dispatched to the compute service.
    pub operations: usize,
    /// The computed value or a structured error.
    pub outcome: Result<f64, CalcError>,
    /// Wall-clock evaluation time.
    pub duration: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use distcalc_core::FaultKind;

    #[test]
    fn evaluation_report() {
        let report = EvaluationReport {
            expression_id: "e1".into(),
            source: "4/0".into(),
            postfix: Some("4 0 /".into()),
            operations: 1,
            outcome: Err(CalcError::Compute(FaultKind::DivisionByZero)),
            duration: Duration::from_millis(3),
        };
        assert!(report.outcome.is_err());
        assert_eq!(report.expression_id.as_str(), "e1");
    }
}
