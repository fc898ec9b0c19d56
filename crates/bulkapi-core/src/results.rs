use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

/// Append-only shared result sequence.
///
/// Cloning the handle shares the underlying storage; the outermost bulk
/// invocation aliases its local batch as the root set, and nested
/// invocations inherit the same handle so their templates can reference any
/// result produced so far. Values are pushed or batch-extended, never
/// rewritten at existing indices.
#[derive(Clone, Default)]
pub struct ResultSet {
    inner: Arc<Mutex<Vec<Value>>>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, value: Value) {
        self.inner.lock().push(value);
    }

    pub fn extend(&self, values: Vec<Value>) {
        self.inner.lock().extend(values);
    }

    pub fn snapshot(&self) -> Vec<Value> {
        self.inner.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Whether two handles alias the same storage.
    pub fn shares_storage(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResultSet").field(&self.snapshot()).finish()
    }
}
