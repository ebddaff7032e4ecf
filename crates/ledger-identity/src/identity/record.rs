//! The identity record, the only value persisted on the ledger.
//!
//! An identity is either unproven (`Credential::Root`) or backed by a
//! verified EC public key (`Credential::Verified`). Credential fields are
//! grouped in one variant so a record can never carry only some of them.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::crypto::jwk::PublicKeyJwk;

/// Free-form claims about the subject of an identity.
pub type SubjectInfo = BTreeMap<String, String>;

/// Lifecycle flag of an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
}

impl Status {
    /// Return a stable string representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
        }
    }
}

/// Credential material attached to an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Created without proof of key possession.
    Root,
    /// Created with a signature verified against `public_key_jwk`.
    Verified {
        public_key_jwk: PublicKeyJwk,
        subject_info: SubjectInfo,
        issued_at: String,
        expires_at: String,
    },
}

/// A registered identity.
///
/// Equality covers `(context, id, controlled_by, public_key_jwk)`; hashing
/// covers `id` alone, so sets keyed by `Identity` dedupe on identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "IdentityRecord", into = "IdentityRecord")]
pub struct Identity {
    pub context: String,
    pub id: String,
    pub controlled_by: String,
    pub status: Status,
    pub credential: Credential,
}

impl Identity {
    /// True when the identity controls itself.
    pub fn is_self_controlled(&self) -> bool {
        self.id == self.controlled_by
    }

    /// True when the identity was created with a verified credential.
    pub fn is_verified(&self) -> bool {
        matches!(self.credential, Credential::Verified { .. })
    }

    pub fn public_key_jwk(&self) -> Option<&PublicKeyJwk> {
        match &self.credential {
            Credential::Verified { public_key_jwk, .. } => Some(public_key_jwk),
            Credential::Root => None,
        }
    }

    pub fn subject_info(&self) -> Option<&SubjectInfo> {
        match &self.credential {
            Credential::Verified { subject_info, .. } => Some(subject_info),
            Credential::Root => None,
        }
    }

    pub fn issued_at(&self) -> Option<&str> {
        match &self.credential {
            Credential::Verified { issued_at, .. } => Some(issued_at),
            Credential::Root => None,
        }
    }

    pub fn expires_at(&self) -> Option<&str> {
        match &self.credential {
            Credential::Verified { expires_at, .. } => Some(expires_at),
            Credential::Root => None,
        }
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.context == other.context
            && self.id == other.id
            && self.controlled_by == other.controlled_by
            && self.public_key_jwk() == other.public_key_jwk()
    }
}

impl Eq for Identity {}

impl Hash for Identity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Identity [context={} id={} controlledBy={} status={}]",
            self.context,
            self.id,
            self.controlled_by,
            self.status.as_str()
        )
    }
}

// ── Wire form ─────────────────────────────────────────────────────────────────

/// Flat JSON shape stored on the ledger. Credential fields are omitted
/// (never `null`) for root identities.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityRecord {
    #[serde(rename = "@context")]
    context: String,
    id: String,
    controlled_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    public_key_jwk: Option<PublicKeyJwk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subject_info: Option<SubjectInfo>,
    status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    issued_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<String>,
}

impl TryFrom<IdentityRecord> for Identity {
    type Error = String;

    fn try_from(record: IdentityRecord) -> std::result::Result<Self, Self::Error> {
        let credential = match (
            record.public_key_jwk,
            record.subject_info,
            record.issued_at,
            record.expires_at,
        ) {
            (None, None, None, None) => Credential::Root,
            (Some(public_key_jwk), Some(subject_info), Some(issued_at), Some(expires_at)) => {
                Credential::Verified {
                    public_key_jwk,
                    subject_info,
                    issued_at,
                    expires_at,
                }
            }
            _ => {
                return Err(format!(
                    "identity {} has partially populated credential fields",
                    record.id
                ))
            }
        };

        Ok(Self {
            context: record.context,
            id: record.id,
            controlled_by: record.controlled_by,
            status: record.status,
            credential,
        })
    }
}

impl From<Identity> for IdentityRecord {
    fn from(identity: Identity) -> Self {
        let (public_key_jwk, subject_info, issued_at, expires_at) = match identity.credential {
            Credential::Root => (None, None, None, None),
            Credential::Verified {
                public_key_jwk,
                subject_info,
                issued_at,
                expires_at,
            } => (
                Some(public_key_jwk),
                Some(subject_info),
                Some(issued_at),
                Some(expires_at),
            ),
        };

        Self {
            context: identity.context,
            id: identity.id,
            controlled_by: identity.controlled_by,
            public_key_jwk,
            subject_info,
            status: identity.status,
            issued_at,
            expires_at,
        }
    }
}
