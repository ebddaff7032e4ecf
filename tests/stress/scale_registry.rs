//! Scale test: thousands of identities on one ledger.
//!
//! Validates listing, paging and controller chains at volume.

use ledger_identity::crypto::{sign_compact, EcSigningKey};
use ledger_identity::{FileLedger, IdentityRegistry, MemoryLedger, VerifiedIdentityRequest};

const CONTEXT: &str = "http://www.lsdi.ufma.br/";
const GENESIS: &str = "lsdi:identity:first";

#[test]
fn stress_5k_root_identities_listed_in_order() {
    let ledger = MemoryLedger::new();
    let registry = IdentityRegistry::default();
    registry.init_ledger(&ledger).unwrap();

    for i in 0..5_000 {
        registry
            .create_root_identity(&ledger, CONTEXT, &format!("node:{i:05}"), GENESIS)
            .expect("creation should succeed");
    }

    let all = registry.get_all_identities(&ledger).unwrap();
    assert_eq!(all.len(), 5_001);
    assert!(all.windows(2).all(|w| w[0].id < w[1].id), "listing must be in key order");
}

#[test]
fn stress_paging_covers_every_identity_once() {
    let ledger = MemoryLedger::new();
    let registry = IdentityRegistry::default();
    registry.init_ledger(&ledger).unwrap();
    for i in 0..1_000 {
        registry
            .create_root_identity(&ledger, CONTEXT, &format!("node:{i:04}"), GENESIS)
            .unwrap();
    }

    let mut seen = 0;
    for page in 0..10 {
        let start = format!("node:{:04}", page * 100);
        let end = format!("node:{:04}", (page + 1) * 100);
        let identities = registry.get_identities_by_range(&ledger, &start, &end).unwrap();
        assert_eq!(identities.len(), 100, "page {page}");
        seen += identities.len();
    }
    assert_eq!(seen, 1_000);
}

#[test]
fn stress_deep_controller_chain() {
    let ledger = MemoryLedger::new();
    let registry = IdentityRegistry::default();
    registry.init_ledger(&ledger).unwrap();

    let mut controller = GENESIS.to_string();
    for depth in 0..500 {
        let id = format!("chain:{depth:03}");
        let identity = registry
            .create_root_identity(&ledger, CONTEXT, &id, &controller)
            .expect("each link's controller exists");
        assert_eq!(identity.controlled_by, controller);
        controller = id;
    }
    assert_eq!(registry.get_identities_by_range(&ledger, "chain:", "chain;").unwrap().len(), 500);
}

#[test]
fn stress_200_verified_identities_on_file_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = FileLedger::open(dir.path()).unwrap();
    let registry = IdentityRegistry::default();
    let key = EcSigningKey::generate_p256();

    for i in 0..200 {
        let id = format!("sensor:{i:03}");
        let token = sign_compact(&key, id.as_bytes(), None);
        registry
            .create_verified_identity(
                &ledger,
                VerifiedIdentityRequest::new(CONTEXT, id.clone(), id, key.public_jwk(None), token)
                    .claim("batch", "scale"),
            )
            .expect("verified creation should succeed");
    }

    let all = registry.get_all_identities(&ledger).unwrap();
    assert_eq!(all.len(), 200);
    assert!(all.iter().all(|i| i.is_verified()));
}
