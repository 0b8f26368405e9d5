use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::trace;

/// Per-path mutual exclusion for in-place rewrites.
///
/// Entries are dropped once no caller holds or waits on them.
#[derive(Debug, Default)]
pub struct PathLocks {
    entries: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` while holding the lock for `key`.
    pub fn run_locked<T>(&self, key: &Path, f: impl FnOnce() -> T) -> T {
        let slot = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(entries.entry(key.to_path_buf()).or_default())
        };

        let result = {
            trace!("Waiting for path lock: {}", key.display());
            let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        // map + this caller
        if Arc::strong_count(&slot) == 2 {
            entries.remove(key);
        }

        result
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
