//! Cryptographic primitives for the identity registry.
//!
//! This module provides:
//! - EC public key parsing from JWK (P-256, P-384)
//! - JWS compact token parsing and signing (ES256, ES384)
//! - The proof-of-possession verifier used for verified identities

pub mod jwk;
pub mod jws;
pub mod keys;
pub mod verify;

pub use jwk::{EcCurve, JwkError, PrivateKeyJwk, PublicKeyJwk};
pub use jws::{sign_compact, CompactJws, JwsError};
pub use keys::{EcSigningKey, EcVerifyingKey};
pub use verify::{verify, Verification};
