//! In-memory provider.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::error::{PersistenceError, Result};
use crate::provider::PersistenceProvider;

/// Volatile provider backed by a sorted map.
///
/// Intended for tests and for hosts that do not need durability. Failure
/// injection (`fail_writes`, `fail_reads`) lets tests exercise the error
/// paths of callers.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    entries: Mutex<BTreeMap<String, String>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent save/delete/clear fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent load/list fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Synchronous peek, for assertions.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn check(&self, flag: &AtomicBool, operation: &'static str, key: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(PersistenceError::Backend {
                operation,
                key: key.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

impl PersistenceProvider for MemoryProvider {
    async fn save(&self, key: &str, data: String) -> Result<()> {
        self.check(&self.fail_writes, "save", key)?;
        self.entries.lock().insert(key.to_string(), data);
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<String>> {
        self.check(&self.fail_reads, "load", key)?;
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check(&self.fail_writes, "delete", key)?;
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>> {
        self.check(&self.fail_reads, "list", "*")?;
        Ok(self.entries.lock().keys().cloned().collect())
    }

    async fn clear(&self) -> Result<()> {
        self.check(&self.fail_writes, "clear", "*")?;
        self.entries.lock().clear();
        Ok(())
    }
}
