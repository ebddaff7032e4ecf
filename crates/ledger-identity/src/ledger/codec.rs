//! JSON encoding of identity records at the ledger boundary.

use crate::error::{IdentityError, Result};
use crate::identity::Identity;

/// Encode an identity as the JSON value stored under its `id`.
pub fn encode_identity(identity: &Identity) -> Result<Vec<u8>> {
    serde_json::to_vec(identity).map_err(|e| IdentityError::SerializationError(e.to_string()))
}

/// Decode a stored ledger value.
pub fn decode_identity(bytes: &[u8]) -> Result<Identity> {
    serde_json::from_slice(bytes).map_err(|e| IdentityError::SerializationError(e.to_string()))
}

/// Encode a list of identities as a JSON array.
pub fn encode_identities(identities: &[Identity]) -> Result<String> {
    serde_json::to_string(identities).map_err(|e| IdentityError::SerializationError(e.to_string()))
}
