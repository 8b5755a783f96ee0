//! Expression evaluator.
//!
//! Converts an infix expression to postfix order and reduces it over an
//! operand stack, dispatching one compute call per operator. Calls are
//! strictly sequential: the next operator waits for the previous outcome.
//! The first fault stops the reduction and fails the expression.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use distcalc_core::{
    to_postfix, CalcError, ComputeClient, ComputeRequest, Expression, ExpressionId, FaultKind,
    Operation, Outcome, Owner, Postfix, Token,
};

use crate::interfaces::EvaluationReport;
use crate::store::StatusStore;

/// Evaluates expressions against a compute client and records their state.
#[derive(Clone)]
pub struct Evaluator {
    store: Arc<StatusStore>,
    client: Arc<dyn ComputeClient>,
}

impl Evaluator {
    #[must_use]
    pub fn new(store: Arc<StatusStore>, client: Arc<dyn ComputeClient>) -> Self {
        Self { store, client }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<StatusStore> {
        &self.store
    }

    /// Evaluate `source` on behalf of `owner`.
    ///
    /// # Errors
    ///
    /// The first fault encountered. The stored expression is failed with the
    /// same message.
    pub fn evaluate(&self, source: &str, owner: &Owner) -> Result<f64, CalcError> {
        self.evaluate_tracked(source, owner).outcome
    }

    /// Evaluate `source` and report the assigned id alongside the outcome.
    pub fn evaluate_tracked(&self, source: &str, owner: &Owner) -> EvaluationReport {
        let started = Instant::now();
        let id = ExpressionId::generate();
        let mut report = EvaluationReport {
            expression_id: id.clone(),
            source: source.to_string(),
            postfix: None,
            operations: 0,
            outcome: Err(CalcError::Evaluation(FaultKind::BadExpression)),
            duration: started.elapsed(),
        };

        if let Err(err) = self
            .store
            .put(Expression::pending(id.clone(), owner.clone(), source))
        {
            report.outcome = Err(err.into());
            report.duration = started.elapsed();
            return report;
        }
        debug!(expression_id = %id, %owner, source, "expression created");

        let reduced = match to_postfix(source) {
            Ok(postfix) => {
                debug!(expression_id = %id, postfix = %postfix, "converted");
                report.postfix = Some(postfix.to_string());
                self.reduce(&id, owner, &postfix, &mut report.operations)
            }
            Err(err) => Err(err),
        };

        report.outcome = self.finish(&id, owner, reduced);
        report.duration = started.elapsed();
        match &report.outcome {
            Ok(value) => info!(
                expression_id = %id,
                %owner,
                result = value,
                operations = report.operations,
                elapsed = ?report.duration,
                "expression completed"
            ),
            Err(err) => warn!(
                expression_id = %id,
                %owner,
                error = %err,
                operations = report.operations,
                "expression failed"
            ),
        }
        report
    }

    fn reduce(
        &self,
        id: &ExpressionId,
        owner: &Owner,
        postfix: &Postfix,
        dispatched: &mut usize,
    ) -> Result<f64, CalcError> {
        let mut stack: Vec<f64> = Vec::with_capacity(postfix.len());

        for token in postfix {
            match *token {
                Token::Number(value) => stack.push(value),
                Token::Operator(op) => {
                    let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
                        return Err(CalcError::Evaluation(FaultKind::BadExpression));
                    };

                    let mut operation =
                        Operation::new(id.clone(), owner.clone(), left, right, op.symbol());
                    self.store.put_operation(operation.clone());
                    *dispatched += 1;
                    debug!(
                        expression_id = %id,
                        operation_id = %operation.id,
                        left,
                        right,
                        operator = %op,
                        endpoint = %self.client.endpoint(),
                        "dispatching operation"
                    );

                    let outcome = self
                        .client
                        .compute(&ComputeRequest::from_operands(left, right, op))
                        .map(f64::from);
                    match &outcome {
                        Ok(value) => operation.result = Some(*value),
                        Err(err) => operation.error = Some(err.to_string()),
                    }
                    self.store.put_operation(operation);
                    stack.push(outcome?);
                }
            }
        }

        match stack.as_slice() {
            [value] => Ok(*value),
            _ => Err(CalcError::Evaluation(FaultKind::BadExpression)),
        }
    }

    fn finish(
        &self,
        id: &ExpressionId,
        owner: &Owner,
        outcome: Result<f64, CalcError>,
    ) -> Result<f64, CalcError> {
        let terminal = match &outcome {
            Ok(value) => Outcome::Completed(*value),
            Err(err) => Outcome::Failed(err.to_string()),
        };
        self.store.update_status(id, owner, terminal)?;
        outcome
    }
}
