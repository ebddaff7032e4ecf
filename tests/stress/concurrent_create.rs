//! Concurrency test: parallel creation of identities on a shared ledger.
//!
//! Validates that racing creators of the same id see exactly one success and
//! that the surviving record is never overwritten.

use std::sync::{Arc, Mutex};
use std::thread;

use ledger_identity::crypto::{sign_compact, EcSigningKey};
use ledger_identity::{
    FileLedger, IdentityError, IdentityRegistry, Ledger, MemoryLedger, VerifiedIdentityRequest,
};

const CONTEXT: &str = "http://www.lsdi.ufma.br/";

/// Race `threads` root creations of the same id; return (successes, losers).
fn race_root_creation<L: Ledger + Send + Sync + 'static>(
    ledger: Arc<L>,
    threads: usize,
) -> (usize, usize) {
    let registry = Arc::new(IdentityRegistry::default());
    let results = Arc::new(Mutex::new(Vec::new()));

    let mut handles = Vec::new();
    for thread_id in 0..threads {
        let ledger = Arc::clone(&ledger);
        let registry = Arc::clone(&registry);
        let results = Arc::clone(&results);
        let handle = thread::spawn(move || {
            let context = format!("ctx-{thread_id}");
            let result = registry.create_root_identity(ledger.as_ref(), &context, "contested", "contested");
            results.lock().unwrap().push(result);
        });
        handles.push(handle);
    }
    for handle in handles {
        handle.join().expect("thread should not panic");
    }

    let results = results.lock().unwrap();
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let losers = results
        .iter()
        .filter(|r| matches!(r, Err(IdentityError::AlreadyExists(id)) if id == "contested"))
        .count();

    // The stored record belongs to the single winner.
    let winner = results.iter().find_map(|r| r.as_ref().ok()).unwrap();
    let stored = registry.read_identity(ledger.as_ref(), "contested").unwrap();
    assert_eq!(&stored, winner);

    (successes, losers)
}

#[test]
fn stress_memory_ledger_same_id_one_winner() {
    let (successes, losers) = race_root_creation(Arc::new(MemoryLedger::new()), 50);
    assert_eq!(successes, 1);
    assert_eq!(losers, 49);
}

#[test]
fn stress_file_ledger_same_id_one_winner() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = FileLedger::open(dir.path()).unwrap();
    let (successes, losers) = race_root_creation(Arc::new(ledger), 32);
    assert_eq!(successes, 1);
    assert_eq!(losers, 31);
}

#[test]
fn stress_parallel_distinct_ids_all_succeed() {
    let ledger = Arc::new(MemoryLedger::new());
    let registry = Arc::new(IdentityRegistry::default());
    registry.init_ledger(ledger.as_ref()).unwrap();

    let mut handles = Vec::new();
    for thread_id in 0..16 {
        let ledger = Arc::clone(&ledger);
        let registry = Arc::clone(&registry);
        handles.push(thread::spawn(move || {
            for i in 0..25 {
                let id = format!("device:{thread_id:02}:{i:02}");
                registry
                    .create_root_identity(ledger.as_ref(), CONTEXT, &id, "lsdi:identity:first")
                    .expect("distinct ids should not conflict");
            }
        }));
    }
    for handle in handles {
        handle.join().expect("thread should not panic");
    }

    let all = registry.get_all_identities(ledger.as_ref()).unwrap();
    assert_eq!(all.len(), 16 * 25 + 1);
}

#[test]
fn stress_parallel_verified_creation() {
    let ledger = Arc::new(MemoryLedger::new());
    let registry = Arc::new(IdentityRegistry::default());

    let mut handles = Vec::new();
    for thread_id in 0..8 {
        let ledger = Arc::clone(&ledger);
        let registry = Arc::clone(&registry);
        handles.push(thread::spawn(move || {
            let id = format!("agent:{thread_id}");
            let key = EcSigningKey::generate_p256();
            let token = sign_compact(&key, id.as_bytes(), None);
            let request =
                VerifiedIdentityRequest::new(CONTEXT, id.clone(), id, key.public_jwk(None), token);
            registry
                .create_verified_identity(ledger.as_ref(), request)
                .expect("verified creation should succeed")
        }));
    }

    let created: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("thread should not panic"))
        .collect();
    assert_eq!(created.len(), 8);
    for identity in &created {
        assert!(identity.is_verified());
        assert_eq!(&registry.read_identity(ledger.as_ref(), &identity.id).unwrap(), identity);
    }
}
