//! Ledger adapter: the key-value seam between the registry and the store
//! of record.
//!
//! The registry never holds state of its own; every operation reads and
//! writes through a [`Ledger`] passed in by the caller.
//!
//! # Implementations
//!
//! - [`memory::MemoryLedger`]: in-process ordered map.
//! - [`file::FileLedger`]: one file per key under a directory.
//!
//! # Key order
//!
//! Scans return entries in lexical key order. Range bounds are half-open
//! `[start, end)`; an empty string means "unbounded" on that side.

pub mod codec;
pub mod file;
pub mod memory;

pub use codec::{decode_identity, encode_identities, encode_identity};
pub use file::FileLedger;
pub use memory::MemoryLedger;

use crate::error::Result;

/// A key and its stored value.
pub type Entry = (String, Vec<u8>);

/// Key-value store of record.
///
/// Write exclusivity is the ledger's responsibility: when two writers race
/// on [`Ledger::put_new`] for the same key, at most one may succeed.
pub trait Ledger {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Store `value` under `key` only if no non-empty value is present.
    ///
    /// Returns `false` when the key is already taken. The default
    /// implementation is a non-atomic read-then-write; implementations
    /// that can commit conditionally should override it.
    fn put_new(&self, key: &str, value: &[u8]) -> Result<bool> {
        if is_present(self.get(key)?.as_deref()) {
            return Ok(false);
        }
        self.put(key, value)?;
        Ok(true)
    }

    /// Return entries with keys in `[start, end)` in lexical key order.
    fn scan(&self, start: &str, end: &str) -> Result<Vec<Entry>>;

    /// Return every entry in lexical key order.
    fn scan_all(&self) -> Result<Vec<Entry>> {
        self.scan("", "")
    }
}

/// An empty stored value counts as absent.
pub(crate) fn is_present(value: Option<&[u8]>) -> bool {
    value.map_or(false, |v| !v.is_empty())
}

/// Whether `key` lies within the half-open range `[start, end)`.
pub(crate) fn in_range(key: &str, start: &str, end: &str) -> bool {
    (start.is_empty() || key >= start) && (end.is_empty() || key < end)
}
