//! Proof-of-possession check for verified identity creation.
//!
//! Verification checks:
//! 1. The token parses as a compact JWS with a supported algorithm
//! 2. The JWK describes a valid EC public key
//! 3. The token algorithm matches the key curve and the signature verifies
//! 4. The payload equals the claimed identifier byte-for-byte
//!
//! The function is pure: no ledger access, same inputs give the same outcome.

use crate::error::{IdentityError, Result};

use super::jwk::PublicKeyJwk;
use super::jws::CompactJws;

/// Outcome of verifying a proof token against a claimed identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Valid,
    SignatureInvalid,
    PayloadMismatch,
    MalformedToken(String),
    MalformedKey(String),
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Convert into the registry error taxonomy, naming `id` in the message.
    pub fn into_result(self, id: &str) -> Result<()> {
        match self {
            Self::Valid => Ok(()),
            Self::SignatureInvalid => Err(IdentityError::SignatureInvalid(id.to_string())),
            Self::PayloadMismatch => Err(IdentityError::PayloadMismatch(id.to_string())),
            Self::MalformedToken(reason) => Err(IdentityError::MalformedToken {
                id: id.to_string(),
                reason,
            }),
            Self::MalformedKey(reason) => Err(IdentityError::MalformedKey {
                id: id.to_string(),
                reason,
            }),
        }
    }
}

/// Verify that `token` is signed by `jwk` and carries `claimed_id` as payload.
///
/// A bad signature is reported before a payload mismatch.
pub fn verify(claimed_id: &str, jwk: &PublicKeyJwk, token: &str) -> Verification {
    let jws = match CompactJws::parse(token) {
        Ok(jws) => jws,
        Err(e) => return Verification::MalformedToken(e.to_string()),
    };
    let key = match jwk.to_verifying_key() {
        Ok(key) => key,
        Err(e) => return Verification::MalformedKey(e.to_string()),
    };

    if jws.curve() != key.curve() || !key.verify(jws.signing_input(), jws.signature()) {
        return Verification::SignatureInvalid;
    }

    if jws.payload() != claimed_id.as_bytes() {
        return Verification::PayloadMismatch;
    }

    Verification::Valid
}
