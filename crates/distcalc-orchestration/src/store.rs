//! Status store for expressions and operations.
//!
//! A single coarse lock guards all state. Reads are scoped by owner: an
//! expression is only visible under the `(id, owner)` pair it was stored
//! with. Expressions come back in submission order.

use std::collections::HashMap;
use std::path::Path;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use distcalc_core::{
    CalcError, Expression, ExpressionId, Operation, OperationId, Outcome, Owner, Status,
};

/// Error type for store access.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No expression with this id belongs to this owner.
    #[error("expression {id} not found for owner {owner}")]
    NotFound { id: ExpressionId, owner: Owner },

    /// No operation with this id.
    #[error("operation {0} not found")]
    OperationNotFound(OperationId),

    /// The expression already exists under this owner.
    #[error("expression {0} already exists")]
    AlreadyExists(ExpressionId),

    /// The expression is already completed or failed.
    #[error("expression {id} is already {status}")]
    AlreadyTerminal { id: ExpressionId, status: Status },

    /// Snapshot file could not be read or written.
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot file is not valid JSON for this format.
    #[error("snapshot format error: {0}")]
    Format(#[from] serde_json::Error),
}

impl From<StoreError> for CalcError {
    fn from(err: StoreError) -> Self {
        Self::Store(err.to_string())
    }
}

type ExpressionKey = (ExpressionId, Owner);

#[derive(Debug, Default)]
struct Inner {
    next_seq: u64,
    expressions: HashMap<ExpressionKey, (u64, Expression)>,
    operations: HashMap<OperationId, (u64, Operation)>,
}

impl Inner {
    fn seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

/// On-disk form of the store.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    expressions: Vec<Expression>,
    #[serde(default)]
    operations: Vec<Operation>,
}

/// In-memory expression and operation state.
#[derive(Debug, Default)]
pub struct StatusStore {
    inner: Mutex<Inner>,
}

impl StatusStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new expression.
    pub fn put(&self, expression: Expression) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let key = (expression.id.clone(), expression.owner.clone());
        if inner.expressions.contains_key(&key) {
            return Err(StoreError::AlreadyExists(expression.id));
        }
        let seq = inner.seq();
        inner.expressions.insert(key, (seq, expression));
        Ok(())
    }

    /// Look up an expression by id, visible only to its owner.
    pub fn get(&self, id: &ExpressionId, owner: &Owner) -> Result<Expression, StoreError> {
        self.inner
            .lock()
            .expressions
            .get(&(id.clone(), owner.clone()))
            .map(|(_, expression)| expression.clone())
            .ok_or_else(|| StoreError::NotFound {
                id: id.clone(),
                owner: owner.clone(),
            })
    }

    /// All of an owner's expressions, oldest first.
    pub fn list(&self, owner: &Owner) -> Vec<Expression> {
        let inner = self.inner.lock();
        let mut entries: Vec<_> = inner
            .expressions
            .values()
            .filter(|(_, expression)| &expression.owner == owner)
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, e)| e.clone()).collect()
    }

    /// Move a pending expression to its terminal state.
    ///
    /// Returns the updated expression.
    pub fn update_status(
        &self,
        id: &ExpressionId,
        owner: &Owner,
        outcome: Outcome,
    ) -> Result<Expression, StoreError> {
        let mut inner = self.inner.lock();
        let Some((_, expression)) = inner.expressions.get_mut(&(id.clone(), owner.clone())) else {
            return Err(StoreError::NotFound {
                id: id.clone(),
                owner: owner.clone(),
            });
        };
        if !expression.finish(outcome) {
            return Err(StoreError::AlreadyTerminal {
                id: id.clone(),
                status: expression.status,
            });
        }
        debug!(expression_id = %id, %owner, status = %expression.status, "status updated");
        Ok(expression.clone())
    }

    /// Insert or replace an operation record.
    pub fn put_operation(&self, operation: Operation) {
        let mut inner = self.inner.lock();
        let seq = match inner.operations.get(&operation.id) {
            Some((seq, _)) => *seq,
            None => inner.seq(),
        };
        inner.operations.insert(operation.id.clone(), (seq, operation));
    }

    pub fn get_operation(&self, id: &OperationId) -> Result<Operation, StoreError> {
        self.inner
            .lock()
            .operations
            .get(id)
            .map(|(_, operation)| operation.clone())
            .ok_or_else(|| StoreError::OperationNotFound(id.clone()))
    }

    /// An owner's operations for one expression, in dispatch order.
    pub fn operations(&self, expression_id: &ExpressionId, owner: &Owner) -> Vec<Operation> {
        let inner = self.inner.lock();
        let mut entries: Vec<_> = inner
            .operations
            .values()
            .filter(|(_, op)| &op.expression_id == expression_id && &op.owner == owner)
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, op)| op.clone()).collect()
    }

    /// Delete an owner's expressions and their operations.
    ///
    /// Returns the number of expressions removed.
    pub fn clear(&self, owner: &Owner) -> usize {
        let mut inner = self.inner.lock();
        let before = inner.expressions.len();
        inner.expressions.retain(|(_, key_owner), _| key_owner != owner);
        inner.operations.retain(|_, (_, op)| &op.owner != owner);
        let removed = before - inner.expressions.len();

        info!(%owner, removed, "cleared expressions");
        removed
    }

    /// Total number of stored expressions across all owners.
    pub fn len(&self) -> usize {
        self.inner.lock().expressions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the whole store to `path` as pretty JSON.
    pub fn save_to_path(&self, path: &Path) -> Result<(), StoreError> {
        let snapshot = {
            let inner = self.inner.lock();
            let mut expressions: Vec<_> = inner.expressions.values().collect();
            expressions.sort_by_key(|(seq, _)| *seq);
            let mut operations: Vec<_> = inner.operations.values().collect();
            operations.sort_by_key(|(seq, _)| *seq);
            Snapshot {
                expressions: expressions.into_iter().map(|(_, e)| e.clone()).collect(),
                operations: operations.into_iter().map(|(_, op)| op.clone()).collect(),
            }
        };
        let content = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(path, content)?;
        debug!(path = %path.display(), expressions = snapshot.expressions.len(), "snapshot saved");
        Ok(())
    }

    /// Read a store previously written by [`StatusStore::save_to_path`].
    pub fn load_from_path(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;
        let store = Self::new();
        {
            let mut inner = store.inner.lock();
            for expression in snapshot.expressions {
                let seq = inner.seq();
                let key = (expression.id.clone(), expression.owner.clone());
                inner.expressions.insert(key, (seq, expression));
            }
            for operation in snapshot.operations {
                let seq = inner.seq();
                inner.operations.insert(operation.id.clone(), (seq, operation));
            }
        }
        debug!(path = %path.display(), expressions = store.len(), "snapshot loaded");
        Ok(store)
    }

    /// Load from `path` if it exists, otherwise start empty.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if path.exists() {
            Self::load_from_path(path)
        } else {
            Ok(Self::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(id: &str, owner: &str) -> Expression {
        Expression::pending(id.into(), owner.into(), "1+1")
    }

    #[test]
    fn put_and_get() {
        let store = StatusStore::new();
        store.put(pending("e1", "alice")).unwrap();
        let e = store.get(&"e1".into(), &"alice".into()).unwrap();
        assert_eq!(e.status, Status::Pending);
        assert_eq!(e.source, "1+1");
    }

    #[test]
    fn duplicate_put_rejected() {
        let store = StatusStore::new();
        store.put(pending("e1", "alice")).unwrap();
        assert!(matches!(
            store.put(pending("e1", "alice")),
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[test]
    fn owner_isolation() {
        let store = StatusStore::new();
        store.put(pending("shared", "alice")).unwrap();
        store.put(pending("shared", "bob")).unwrap();
        store
            .update_status(&"shared".into(), &"alice".into(), Outcome::Completed(2.0))
            .unwrap();

        let alice = store.get(&"shared".into(), &"alice".into()).unwrap();
        let bob = store.get(&"shared".into(), &"bob".into()).unwrap();
        assert_eq!(alice.status, Status::Completed);
        assert_eq!(bob.status, Status::Pending);

        assert!(matches!(
            store.get(&"shared".into(), &"carol".into()),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn list_is_scoped_and_ordered() {
        let store = StatusStore::new();
        for id in ["z", "a", "m"] {
            store.put(pending(id, "alice")).unwrap();
        }
        store.put(pending("b", "bob")).unwrap();

        let ids: Vec<_> = store
            .list(&"alice".into())
            .into_iter()
            .map(|e| e.id.to_string())
            .collect();
        assert_eq!(ids, ["z", "a", "m"]);
        assert_eq!(store.list(&"bob".into()).len(), 1);
        assert!(store.list(&"nobody".into()).is_empty());
    }

    #[test]
    fn terminal_is_final() {
        let store = StatusStore::new();
        store.put(pending("e1", "alice")).unwrap();
        let done = store
            .update_status(&"e1".into(), &"alice".into(), Outcome::Failed("bad expression".into()))
            .unwrap();
        assert_eq!(done.status, Status::Failed);
        assert_eq!(done.error.as_deref(), Some("bad expression"));

        let again = store.update_status(&"e1".into(), &"alice".into(), Outcome::Completed(1.0));
        assert!(matches!(
            again,
            Err(StoreError::AlreadyTerminal {
                status: Status::Failed,
                ..
            })
        ));
        let e = store.get(&"e1".into(), &"alice".into()).unwrap();
        assert_eq!(e.result, None);
    }

    #[test]
    fn update_missing() {
        let store = StatusStore::new();
        assert!(matches!(
            store.update_status(&"nope".into(), &"alice".into(), Outcome::Completed(1.0)),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn operations_upsert_and_order() {
        let store = StatusStore::new();
        let first = Operation::new("e1".into(), "alice".into(), 1.0, 2.0, '+');
        let second = Operation::new("e1".into(), "alice".into(), 3.0, 4.0, '*');
        let other = Operation::new("e2".into(), "alice".into(), 5.0, 6.0, '-');
        store.put_operation(first.clone());
        store.put_operation(second.clone());
        store.put_operation(other);

        let mut finished = first.clone();
        finished.result = Some(3.0);
        store.put_operation(finished);

        let ops = store.operations(&"e1".into(), &"alice".into());
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].id, first.id);
        assert_eq!(ops[0].result, Some(3.0));
        assert_eq!(ops[1].id, second.id);

        assert_eq!(store.get_operation(&second.id).unwrap().operator, '*');
        assert!(matches!(
            store.get_operation(&"missing".into()),
            Err(StoreError::OperationNotFound(_))
        ));
    }

    #[test]
    fn clear_removes_only_owner() {
        let store = StatusStore::new();
        store.put(pending("e1", "alice")).unwrap();
        store.put(pending("e2", "alice")).unwrap();
        store.put(pending("e3", "bob")).unwrap();
        store.put_operation(Operation::new("e1".into(), "alice".into(), 1.0, 1.0, '+'));
        store.put_operation(Operation::new("e3".into(), "bob".into(), 1.0, 1.0, '+'));

        assert_eq!(store.clear(&"alice".into()), 2);
        assert!(store.list(&"alice".into()).is_empty());
        assert_eq!(store.list(&"bob".into()).len(), 1);
        assert!(store.operations(&"e1".into(), &"alice".into()).is_empty());
        assert_eq!(store.operations(&"e3".into(), &"bob".into()).len(), 1);
        assert_eq!(store.clear(&"alice".into()), 0);
    }

    #[test]
    fn shared_expression_id_keeps_operations_apart() {
        let store = StatusStore::new();
        store.put(pending("e1", "alice")).unwrap();
        store.put(pending("e1", "bob")).unwrap();
        let alice_op = Operation::new("e1".into(), "alice".into(), 1.0, 2.0, '+');
        let bob_op = Operation::new("e1".into(), "bob".into(), 7.0, 8.0, '*');
        store.put_operation(alice_op.clone());
        store.put_operation(bob_op.clone());

        assert_eq!(store.operations(&"e1".into(), &"alice".into()), [alice_op]);
        assert_eq!(store.operations(&"e1".into(), &"bob".into()), [bob_op.clone()]);
        assert!(store.operations(&"e1".into(), &"carol".into()).is_empty());

        assert_eq!(store.clear(&"alice".into()), 1);
        assert!(store.operations(&"e1".into(), &"alice".into()).is_empty());
        assert_eq!(store.operations(&"e1".into(), &"bob".into()), [bob_op]);
    }

    #[test]
    fn store_error_converts() {
        let err: CalcError = StoreError::OperationNotFound("x".into()).into();
        assert_eq!(err.to_string(), "storage error: operation x not found");
    }
}
