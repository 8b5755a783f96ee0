//! # distcalc-orchestration
//!
//! Drives expression evaluation: converts to postfix, reduces the operand
//! stack through a compute client, and tracks every expression and operation
//! in the status store.

pub mod evaluator;
pub mod interfaces;
pub mod store;

// Re-exports
pub use evaluator::Evaluator;
pub use interfaces::{EvaluationReport, ResultPresenter};
pub use store::{StatusStore, StoreError};
