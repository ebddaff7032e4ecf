//! Ledger Identity: an identity registry on an append-only key-value ledger.
//!
//! Identities are either root (self-asserted, or vouched for by an existing
//! controller without proof) or verified (proof of possession of an EC key
//! via a compact JWS whose payload is the claimed identifier). The registry
//! enforces identifier uniqueness and controller existence, and never
//! overwrites a record once written.

pub mod config;
pub mod crypto;
pub mod error;
pub mod graph;
pub mod identity;
pub mod ledger;
pub mod registry;
pub mod time;

// Re-export primary types
pub use config::RegistryConfig;
pub use crypto::{PublicKeyJwk, Verification};
pub use error::{IdentityError, Result};
pub use graph::GraphCheck;
pub use identity::{Credential, Identity, Status, SubjectInfo};
pub use ledger::{FileLedger, Ledger, MemoryLedger};
pub use registry::{IdentityRegistry, VerifiedIdentityRequest};
