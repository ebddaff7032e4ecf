//! Identity record construction.
//!
//! The builders do no validation. Callers establish creatability (graph
//! rules) and, for verified identities, credential validity first.

use super::record::{Credential, Identity, Status, SubjectInfo};
use crate::crypto::jwk::PublicKeyJwk;

/// Build an identity without credential material.
///
/// `controlled_by` is normally `id`; the registry also accepts an existing
/// external controller on this path.
pub fn build_root(context: &str, id: &str, controlled_by: &str) -> Identity {
    Identity {
        context: context.to_string(),
        id: id.to_string(),
        controlled_by: controlled_by.to_string(),
        status: Status::Active,
        credential: Credential::Root,
    }
}

/// Build a credential-verified identity, stamping a fresh issuance window
/// of `issuance_years`.
pub fn build_verified(
    context: &str,
    id: &str,
    controlled_by: &str,
    public_key_jwk: PublicKeyJwk,
    subject_info: SubjectInfo,
    issuance_years: u32,
) -> Identity {
    let (issued_at, expires_at) = crate::time::issue_window(issuance_years);
    Identity {
        context: context.to_string(),
        id: id.to_string(),
        controlled_by: controlled_by.to_string(),
        status: Status::Active,
        credential: Credential::Verified {
            public_key_jwk,
            subject_info,
            issued_at,
            expires_at,
        },
    }
}
