//! In-memory ledger backed by an ordered map.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{PoisonError, RwLock};

use crate::error::{IdentityError, Result};

use super::{is_present, Entry, Ledger};

/// In-process ledger. Safe to share between threads; `put_new` is atomic.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    ///
    /// Counts through a poisoned lock: every write is a single map
    /// operation, so the map is whole even after a writer panicked.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> IdentityError {
    IdentityError::StorageError("memory ledger lock poisoned".into())
}

fn check_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(IdentityError::StorageError("key must not be empty".into()));
    }
    Ok(())
}

impl Ledger for MemoryLedger {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        check_key(key)?;
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn put_new(&self, key: &str, value: &[u8]) -> Result<bool> {
        check_key(key)?;
        let mut entries = self.entries.write().map_err(poisoned)?;
        if is_present(entries.get(key).map(Vec::as_slice)) {
            return Ok(false);
        }
        entries.insert(key.to_string(), value.to_vec());
        Ok(true)
    }

    fn scan(&self, start: &str, end: &str) -> Result<Vec<Entry>> {
        if !start.is_empty() && !end.is_empty() && start >= end {
            return Ok(Vec::new());
        }
        let lower = if start.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(start)
        };
        let upper = if end.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end)
        };

        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries
            .range::<str, _>((lower, upper))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
