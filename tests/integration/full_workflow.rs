//! Integration test: full end-to-end workflow.
//!
//! Tests the complete lifecycle:
//! 1. Initialize the ledger with the genesis identity
//! 2. Create root identities controlled by genesis
//! 3. Generate keys and sign proof tokens
//! 4. Create verified identities and reject forged proofs
//! 5. Read, list and page the ledger
//! 6. Reopen a file-backed ledger and see the same state

use ledger_identity::crypto::{sign_compact, EcSigningKey};
use ledger_identity::{
    Credential, FileLedger, IdentityError, IdentityRegistry, Ledger, MemoryLedger,
    VerifiedIdentityRequest,
};

const CONTEXT: &str = "http://www.lsdi.ufma.br/";
const GENESIS: &str = "lsdi:identity:first";

fn run_workflow<L: Ledger>(ledger: &L) {
    let registry = IdentityRegistry::default();

    // ── Step 1: Genesis ─────────────────────────────────────────────────
    let genesis = registry.init_ledger(ledger).expect("init should succeed");
    assert_eq!(genesis.id, GENESIS);
    assert!(genesis.is_self_controlled());

    let read_back = registry.read_identity(ledger, GENESIS).unwrap();
    assert_eq!(read_back, genesis);
    assert_eq!(read_back.credential, Credential::Root);

    // ── Step 2: Root identities ─────────────────────────────────────────
    let gateway = registry
        .create_root_identity(ledger, CONTEXT, "lsdi:gateway:1", GENESIS)
        .expect("genesis can control a gateway");
    assert_eq!(gateway.controlled_by, GENESIS);

    let err = registry
        .create_root_identity(ledger, CONTEXT, "lsdi:gateway:2", "lsdi:gateway:9")
        .unwrap_err();
    assert_eq!(err.code(), "CONTROLLER_NOT_FOUND");

    // ── Step 3: Keys and proofs ─────────────────────────────────────────
    let alice_key = EcSigningKey::generate_p256();
    let bob_key = EcSigningKey::generate_p384();
    let alice_token = sign_compact(&alice_key, b"alice", Some("alice-key"));
    let bob_token = sign_compact(&bob_key, b"bob", None);

    // ── Step 4: Verified identities ─────────────────────────────────────
    let alice = registry
        .create_verified_identity(
            ledger,
            VerifiedIdentityRequest::new(
                CONTEXT,
                "alice",
                "alice",
                alice_key.public_jwk(Some("alice-key")),
                alice_token.clone(),
            )
            .claim("name", "Alice"),
        )
        .expect("alice proves possession of her key");
    assert!(alice.is_verified());
    assert_eq!(alice.subject_info().unwrap()["name"], "Alice");

    let bob = registry
        .create_verified_identity(
            ledger,
            VerifiedIdentityRequest::new(CONTEXT, "bob", "alice", bob_key.public_jwk(None), bob_token)
                .issuance_years(3),
        )
        .expect("bob proves possession, controlled by alice");
    assert_eq!(bob.controlled_by, "alice");
    assert!(bob.expires_at().unwrap() > bob.issued_at().unwrap());

    // Carol replays alice's token: signature verifies, payload does not.
    let err = registry
        .create_verified_identity(
            ledger,
            VerifiedIdentityRequest::new(
                CONTEXT,
                "carol",
                "carol",
                alice_key.public_jwk(None),
                alice_token,
            ),
        )
        .unwrap_err();
    assert!(matches!(err, IdentityError::PayloadMismatch(ref id) if id == "carol"));
    assert!(!registry.identity_exists(ledger, "carol").unwrap());

    // Dave signs with one key and presents another.
    let dave_token = sign_compact(&EcSigningKey::generate_p256(), b"dave", None);
    let err = registry
        .create_verified_identity(
            ledger,
            VerifiedIdentityRequest::new(
                CONTEXT,
                "dave",
                "dave",
                EcSigningKey::generate_p256().public_jwk(None),
                dave_token,
            ),
        )
        .unwrap_err();
    assert_eq!(err.code(), "SIGNATURE_INVALID");

    // ── Step 5: Read and list ───────────────────────────────────────────
    let all = registry.get_all_identities(ledger).unwrap();
    let ids: Vec<&str> = all.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["alice", "bob", "lsdi:gateway:1", GENESIS]);

    let page = registry.get_identities_by_range(ledger, "b", "lsdi:i").unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id, "bob");
    assert_eq!(page[1].id, "lsdi:gateway:1");

    // Existing records are never overwritten.
    let err = registry
        .create_root_identity(ledger, "other", "alice", "alice")
        .unwrap_err();
    assert_eq!(err.code(), "IDENTITY_ALREADY_EXISTS");
    assert_eq!(registry.read_identity(ledger, "alice").unwrap(), alice);
}

#[test]
fn full_workflow_memory_ledger() {
    let ledger = MemoryLedger::new();
    run_workflow(&ledger);
    assert_eq!(ledger.len(), 4);
}

#[test]
fn full_workflow_file_ledger_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let ledger = FileLedger::open(dir.path()).unwrap();
        run_workflow(&ledger);
    }

    let registry = IdentityRegistry::default();
    let reopened = FileLedger::open(dir.path()).unwrap();
    let all = registry.get_all_identities(&reopened).unwrap();
    assert_eq!(all.len(), 4);

    let alice = registry.read_identity(&reopened, "alice").unwrap();
    assert!(alice.is_verified());
    assert_eq!(alice.public_key_jwk().unwrap().kid.as_deref(), Some("alice-key"));
}

#[test]
fn full_workflow_verified_through_dyn_ledger() {
    let ledger: Box<dyn Ledger> = Box::new(MemoryLedger::new());
    let registry = IdentityRegistry::default();
    registry.init_ledger(ledger.as_ref()).unwrap();

    let key = EcSigningKey::generate_p384();
    let token = sign_compact(&key, b"sensor:7", None);
    let identity = registry
        .create_verified_identity(
            ledger.as_ref(),
            VerifiedIdentityRequest::new(CONTEXT, "sensor:7", GENESIS, key.public_jwk(None), token),
        )
        .unwrap();
    assert_eq!(registry.read_identity(ledger.as_ref(), "sensor:7").unwrap(), identity);
}
