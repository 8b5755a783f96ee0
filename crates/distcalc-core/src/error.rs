//! Fault taxonomy.
//!
//! `FaultKind` names what went wrong with the caller's input. `CalcError`
//! records where it went wrong (parsing, stack evaluation, remote compute)
//! and separates caller faults from system faults.

use serde::{Deserialize, Serialize};

/// Kind of a caller-attributable fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// A character outside the expression alphabet, or an unknown operator.
    #[error("unexpected symbol")]
    UnexpectedSymbol,

    /// Unbalanced parentheses or an operand stack that does not reduce to one value.
    #[error("bad expression")]
    BadExpression,

    /// Division with a zero right-hand operand.
    #[error("division by zero")]
    DivisionByZero,
}

/// Error type for expression evaluation.
///
/// The three fault variants display as the bare fault message; that text is
/// what gets recorded on a failed expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalcError {
    /// The infix text could not be converted to postfix.
    #[error("{0}")]
    Parse(FaultKind),

    /// The postfix sequence did not reduce to a single value.
    #[error("{0}")]
    Evaluation(FaultKind),

    /// The compute service rejected an operation.
    #[error("{0}")]
    Compute(FaultKind),

    /// The compute service was unreachable or the call was aborted.
    #[error("compute service unavailable: {0}")]
    Transport(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The status store rejected a write.
    #[error("storage error: {0}")]
    Store(String),
}

impl CalcError {
    /// The fault kind, for parse, evaluation and compute faults.
    #[must_use]
    pub fn fault_kind(&self) -> Option<FaultKind> {
        match self {
            Self::Parse(kind) | Self::Evaluation(kind) | Self::Compute(kind) => Some(*kind),
            Self::Transport(_) | Self::Config(_) | Self::Store(_) => None,
        }
    }

    /// Whether the fault is attributable to malformed caller input.
    #[must_use]
    pub fn is_caller_fault(&self) -> bool {
        self.fault_kind().is_some()
    }

    /// HTTP status a transport should answer with for this error.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Parse(_) | Self::Evaluation(_) | Self::Compute(_) => 422,
            Self::Transport(_) => 503,
            Self::Config(_) | Self::Store(_) => 500,
        }
    }
}

/// Invalid compute service configuration. Always fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No operation time was supplied for an operator.
    #[error("missing operation time for '{0}'")]
    MissingOperationTime(char),

    /// An operation time was negative.
    #[error("negative operation time for '{0}': {1}ms")]
    NegativeOperationTime(char, i64),

    /// The operation-time table names something that is not an operator.
    #[error("unknown operator in operation times: '{0}'")]
    UnknownOperator(char),

    /// Worker count was zero.
    #[error("worker count must be at least 1")]
    NoWorkers,

    /// Worker count exceeded the allowed maximum.
    #[error("worker count {0} exceeds maximum of {1}")]
    TooManyWorkers(usize, usize),
}

impl From<ConfigError> for CalcError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
