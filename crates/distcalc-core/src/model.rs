//! Expressions, operations, and their identities.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Opaque expression identifier.
    ExpressionId
);
string_id!(
    /// Opaque operation identifier.
    OperationId
);
string_id!(
    /// The user an expression belongs to.
    Owner
);

impl ExpressionId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl OperationId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// Lifecycle state of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Completed,
    Failed,
}

impl Status {
    /// Whether no further transition is allowed.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcome of an evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed(f64),
    Failed(String),
}

/// A user-submitted expression tracked from submission to a terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub id: ExpressionId,
    pub owner: Owner,
    /// Raw infix text as submitted.
    pub source: String,
    pub status: Status,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::float::double_opt"
    )]
    pub result: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Expression {
    /// Create a pending expression.
    #[must_use]
    pub fn pending(id: ExpressionId, owner: Owner, source: impl Into<String>) -> Self {
        Self {
            id,
            owner,
            source: source.into(),
            status: Status::Pending,
            result: None,
            error: None,
        }
    }

    /// Move to the terminal state described by `outcome`.
    ///
    /// Returns `false` and leaves the expression untouched if it is already
    /// terminal.
    pub fn finish(&mut self, outcome: Outcome) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        match outcome {
            Outcome::Completed(value) => {
                self.status = Status::Completed;
                self.result = Some(value);
            }
            Outcome::Failed(message) => {
                self.status = Status::Failed;
                self.error = Some(message);
            }
        }
        true
    }
}

/// One binary operation dispatched while reducing an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub id: OperationId,
    pub expression_id: ExpressionId,
    pub owner: Owner,
    #[serde(with = "crate::float::double")]
    pub left: f64,
    #[serde(with = "crate::float::double")]
    pub right: f64,
    pub operator: char,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::float::double_opt"
    )]
    pub result: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Operation {
    /// Create an operation with a fresh id and no outcome yet.
    #[must_use]
    pub fn new(
        expression_id: ExpressionId,
        owner: Owner,
        left: f64,
        right: f64,
        operator: char,
    ) -> Self {
        Self {
            id: OperationId::generate(),
            expression_id,
            owner,
            left,
            right,
            operator,
            result: None,
            error: None,
        }
    }
}
