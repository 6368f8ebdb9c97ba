use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// One mutex per document store.
///
/// A commit replaces the whole unit, so synthesis on any two classes of the same unit must
/// run in turn. Entries nobody holds are dropped the next time a lock is handed out.
#[derive(Debug, Default)]
pub struct UnitLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UnitLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_for(&self, store: &str) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.retain(|key, lock| key == store || Arc::strong_count(lock) > 1);
        map.entry(store.to_string()).or_default().clone()
    }

    /// Stores with a live lock entry.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
