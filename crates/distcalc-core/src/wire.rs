//! Compute service wire contract.
//!
//! One request carries two `f32` operands and a one-character operator
//! string. The response is either a result, a structured fault, or an
//! error when the service could not produce an outcome at all. Operands and
//! results that overflow to infinity travel as `"inf"`/`"-inf"`/`"NaN"`.

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, FaultKind};
use crate::token::Operator;

/// A single binary operation to compute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeRequest {
    #[serde(with = "crate::float::single")]
    pub left: f32,
    #[serde(with = "crate::float::single")]
    pub right: f32,
    pub operator: String,
}

impl ComputeRequest {
    #[must_use]
    pub fn new(left: f32, right: f32, operator: char) -> Self {
        Self {
            left,
            right,
            operator: operator.to_string(),
        }
    }

    /// Build a request from evaluator operands.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_operands(left: f64, right: f64, op: Operator) -> Self {
        Self::new(left as f32, right as f32, op.symbol())
    }

    /// The operator as a single character.
    ///
    /// Anything other than exactly one character is an unexpected symbol.
    pub fn operator_symbol(&self) -> Result<char, FaultKind> {
        let mut chars = self.operator.chars();
        match (chars.next(), chars.next()) {
            (Some(symbol), None) => Ok(symbol),
            _ => Err(FaultKind::UnexpectedSymbol),
        }
    }
}

/// Structured computation fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireFault {
    pub kind: FaultKind,
    pub message: String,
}

impl From<FaultKind> for WireFault {
    fn from(kind: FaultKind) -> Self {
        Self {
            kind,
            message: kind.to_string(),
        }
    }
}

/// Response to a `ComputeRequest`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComputeResponse {
    /// `{"result": 5.0}`
    Result {
        #[serde(with = "crate::float::single")]
        result: f32,
    },
    /// `{"fault": {"kind": "division_by_zero", "message": "division by zero"}}`
    Fault { fault: WireFault },
    /// `{"error": "..."}`: undecodable request or lost workers.
    Error { error: String },
}

impl ComputeResponse {
    /// Convert into the caller-side result.
    ///
    /// Faults become `CalcError::Compute`; service errors are reported as
    /// transport faults since the caller did nothing wrong.
    pub fn into_result(self) -> Result<f32, CalcError> {
        match self {
            Self::Result { result } => Ok(result),
            Self::Fault { fault } => Err(CalcError::Compute(fault.kind)),
            Self::Error { error } => Err(CalcError::Transport(error)),
        }
    }
}

impl From<Result<f32, FaultKind>> for ComputeResponse {
    fn from(outcome: Result<f32, FaultKind>) -> Self {
        match outcome {
            Ok(result) => Self::Result { result },
            Err(kind) => Self::Fault { fault: kind.into() },
        }
    }
}

/// Client side of the compute service, consumed by the evaluator.
///
/// Implementations may call the service in-process or across a transport.
pub trait ComputeClient: Send + Sync {
    /// Compute one binary operation.
    ///
    /// Returns `CalcError::Compute` for computation faults and
    /// `CalcError::Transport` when the service cannot be reached.
    fn compute(&self, request: &ComputeRequest) -> Result<f32, CalcError>;

    /// Short description of where calls go, for logging.
    fn endpoint(&self) -> String;
}
