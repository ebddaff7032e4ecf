//! Filesystem-backed ledger.
//!
//! Each key is stored as a single file under the base directory. Short keys
//! are named by their hex encoding, so any identifier (including `:` and
//! `/`) maps to a portable name. Keys whose hex form would exceed common
//! file-name limits are named by the hex SHA-256 of the key instead, and
//! the file starts with a header line holding the hex key:
//!
//! ```text
//! {base_dir}/
//! ├── {hex(key)}.json            raw value
//! └── {hex(sha256(key))}.entry   hex(key) "\n" raw value
//! ```

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use sha2::{Digest, Sha256};

use crate::error::{IdentityError, Result};

use super::{in_range, is_present, Entry, Ledger};

const VALUE_EXTENSION: &str = "json";
const DIGEST_EXTENSION: &str = "entry";
const STAGING_EXTENSION: &str = "tmp";

/// Longest hex stem used as a file name. Leaves room for the extension
/// under the usual 255-byte limit.
const MAX_HEX_NAME: usize = 200;

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// Where a key lives on disk and how its contents are framed.
struct Slot {
    path: PathBuf,
    /// Contents carry a `hex(key)` header line before the value.
    enveloped: bool,
}

/// Filesystem-backed ledger.
///
/// `put_new` stages the value and hard-links it into place, so concurrent
/// creators of the same key (threads or processes) see exactly one success.
#[derive(Debug, Clone)]
pub struct FileLedger {
    base_dir: PathBuf,
}

impl FileLedger {
    /// Open a ledger rooted at `base_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Io` if the directory cannot be created.
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn slot(&self, key: &str) -> Result<Slot> {
        if key.is_empty() {
            return Err(IdentityError::StorageError("key must not be empty".into()));
        }
        let hex_key = hex::encode(key.as_bytes());
        if hex_key.len() <= MAX_HEX_NAME {
            return Ok(Slot {
                path: self.base_dir.join(format!("{hex_key}.{VALUE_EXTENSION}")),
                enveloped: false,
            });
        }
        let digest = hex::encode(Sha256::digest(key.as_bytes()));
        Ok(Slot {
            path: self.base_dir.join(format!("{digest}.{DIGEST_EXTENSION}")),
            enveloped: true,
        })
    }

    /// Unique scratch file for `put_new`. Its extension keeps it out of scans.
    fn staging_path(&self) -> PathBuf {
        let seq = STAGING_SEQ.fetch_add(1, Ordering::Relaxed);
        self.base_dir
            .join(format!(".{}-{seq}.{STAGING_EXTENSION}", std::process::id()))
    }

    /// Read the value under `key` from its slot, `None` if absent.
    fn read_slot(&self, key: &str, slot: &Slot) -> Result<Option<Vec<u8>>> {
        let bytes = match std::fs::read(&slot.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if !slot.enveloped {
            return Ok(Some(bytes));
        }
        match split_envelope(&bytes) {
            Some((stored, value)) if stored == key => Ok(Some(value.to_vec())),
            Some((stored, _)) => Err(IdentityError::StorageError(format!(
                "{} holds key {stored}, not {key}",
                slot.path.display()
            ))),
            None => Err(IdentityError::StorageError(format!(
                "{} has a malformed key header",
                slot.path.display()
            ))),
        }
    }

    /// Decode a ledger file into its entry, or `None` for foreign files.
    fn read_entry(path: &Path) -> Result<Option<Entry>> {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Ok(None);
        };
        match ext {
            VALUE_EXTENSION => {
                let Some(key) = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(|s| hex::decode(s).ok())
                    .and_then(|b| String::from_utf8(b).ok())
                else {
                    return Ok(None);
                };
                Ok(Some((key, std::fs::read(path)?)))
            }
            DIGEST_EXTENSION => {
                let bytes = std::fs::read(path)?;
                Ok(split_envelope(&bytes).map(|(key, value)| (key, value.to_vec())))
            }
            _ => Ok(None),
        }
    }
}

fn encode_contents(key: &str, slot: &Slot, value: &[u8]) -> Vec<u8> {
    if !slot.enveloped {
        return value.to_vec();
    }
    let mut contents = hex::encode(key.as_bytes()).into_bytes();
    contents.push(b'\n');
    contents.extend_from_slice(value);
    contents
}

/// Split `hex(key) "\n" value` into the key and the value.
fn split_envelope(bytes: &[u8]) -> Option<(String, &[u8])> {
    let newline = bytes.iter().position(|b| *b == b'\n')?;
    let key = String::from_utf8(hex::decode(&bytes[..newline]).ok()?).ok()?;
    Some((key, &bytes[newline + 1..]))
}

impl Ledger for FileLedger {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let slot = self.slot(key)?;
        self.read_slot(key, &slot)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let slot = self.slot(key)?;
        std::fs::write(&slot.path, encode_contents(key, &slot, value))?;
        Ok(())
    }

    fn put_new(&self, key: &str, value: &[u8]) -> Result<bool> {
        let slot = self.slot(key)?;

        // Stage the full value, then link it into place. The link fails if
        // the key exists, so a reader never sees a half-written record.
        let staged = self.staging_path();
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&staged)?;
        let written = file
            .write_all(&encode_contents(key, &slot, value))
            .and_then(|_| file.sync_all());
        drop(file);
        let linked = written.and_then(|_| std::fs::hard_link(&staged, &slot.path));
        let _ = std::fs::remove_file(&staged);

        match linked {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                // An empty value holds no record.
                if !is_present(self.read_slot(key, &slot)?.as_deref()) {
                    self.put(key, value)?;
                    return Ok(true);
                }
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn scan(&self, start: &str, end: &str) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();
        for dir_entry in std::fs::read_dir(&self.base_dir)? {
            let path = dir_entry?.path();
            let Some((key, value)) = Self::read_entry(&path)? else {
                log::debug!("skipping foreign file in ledger: {}", path.display());
                continue;
            };
            if in_range(&key, start, end) {
                entries.push((key, value));
            }
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }
}
