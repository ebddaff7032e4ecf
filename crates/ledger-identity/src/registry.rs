//! Registry façade: the operation surface of the identity ledger.
//!
//! Every operation takes the ledger explicitly and runs to completion
//! synchronously. An identity is written only after every check on its path
//! has passed, and it is written with [`Ledger::put_new`] so a concurrent
//! creator of the same id surfaces as `AlreadyExists` rather than an
//! overwrite.

use crate::config::RegistryConfig;
use crate::crypto::{self, PublicKeyJwk};
use crate::error::{IdentityError, Result};
use crate::graph;
use crate::identity::{self, Identity, SubjectInfo};
use crate::ledger::{self, is_present, Ledger};

/// Input for [`IdentityRegistry::create_verified_identity`].
#[derive(Debug, Clone)]
pub struct VerifiedIdentityRequest {
    pub context: String,
    pub id: String,
    pub controlled_by: String,
    pub public_key_jwk: PublicKeyJwk,
    pub subject_info: SubjectInfo,
    /// Compact JWS whose payload must equal `id`.
    pub token: String,
    /// Overrides the registry's configured issuance window.
    pub issuance_years: Option<u32>,
}

impl VerifiedIdentityRequest {
    pub fn new(
        context: impl Into<String>,
        id: impl Into<String>,
        controlled_by: impl Into<String>,
        public_key_jwk: PublicKeyJwk,
        token: impl Into<String>,
    ) -> Self {
        Self {
            context: context.into(),
            id: id.into(),
            controlled_by: controlled_by.into(),
            public_key_jwk,
            subject_info: SubjectInfo::new(),
            token: token.into(),
            issuance_years: None,
        }
    }

    /// Attach subject claims.
    pub fn subject_info(mut self, subject_info: SubjectInfo) -> Self {
        self.subject_info = subject_info;
        self
    }

    /// Add a single subject claim.
    pub fn claim(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.subject_info.insert(key.into(), value.into());
        self
    }

    pub fn issuance_years(mut self, years: u32) -> Self {
        self.issuance_years = Some(years);
        self
    }
}

/// Stateless operation surface over a caller-supplied ledger.
#[derive(Debug, Clone, Default)]
pub struct IdentityRegistry {
    config: RegistryConfig,
}

impl IdentityRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Create the configured genesis root identity.
    ///
    /// Not idempotent: a second call fails with `AlreadyExists`.
    pub fn init_ledger<L: Ledger + ?Sized>(&self, ledger: &L) -> Result<Identity> {
        let genesis = &self.config.genesis;
        self.create_root_identity(ledger, &genesis.context, &genesis.id, &genesis.id)
    }

    /// Create an identity without proof of key possession.
    ///
    /// `controlled_by` may name an existing identity other than `id`.
    ///
    /// # Errors
    ///
    /// `AlreadyExists` if `id` is taken, `ControllerNotFound` if
    /// `controlled_by != id` and no such identity exists.
    pub fn create_root_identity<L: Ledger + ?Sized>(
        &self,
        ledger: &L,
        context: &str,
        id: &str,
        controlled_by: &str,
    ) -> Result<Identity> {
        self.ensure_creatable(ledger, id, controlled_by)?;

        let identity = identity::build_root(context, id, controlled_by);
        self.persist(ledger, &identity)?;
        log::info!("created root identity {id} controlled by {controlled_by}");
        Ok(identity)
    }

    /// Create an identity backed by a verified EC key.
    ///
    /// Graph rules run first, then the proof token is verified against
    /// `request.id`. Nothing is written unless both pass.
    ///
    /// # Errors
    ///
    /// `AlreadyExists`, `ControllerNotFound`, `SignatureInvalid`,
    /// `PayloadMismatch`, `MalformedToken` or `MalformedKey`.
    pub fn create_verified_identity<L: Ledger + ?Sized>(
        &self,
        ledger: &L,
        request: VerifiedIdentityRequest,
    ) -> Result<Identity> {
        let VerifiedIdentityRequest {
            context,
            id,
            controlled_by,
            public_key_jwk,
            subject_info,
            token,
            issuance_years,
        } = request;
        self.ensure_creatable(ledger, &id, &controlled_by)?;

        crypto::verify(&id, &public_key_jwk, &token)
            .into_result(&id)
            .map_err(|e| {
                log::warn!("{e}");
                e
            })?;

        let years = issuance_years.unwrap_or(self.config.issuance_years);
        let identity = identity::build_verified(
            &context,
            &id,
            &controlled_by,
            public_key_jwk,
            subject_info,
            years,
        );
        self.persist(ledger, &identity)?;
        log::info!("created verified identity {id} controlled by {controlled_by}");
        Ok(identity)
    }

    /// Read an identity by id.
    ///
    /// # Errors
    ///
    /// `NotFound` if nothing (or an empty value) is stored under `id`.
    pub fn read_identity<L: Ledger + ?Sized>(&self, ledger: &L, id: &str) -> Result<Identity> {
        match ledger.get(id)? {
            Some(bytes) if !bytes.is_empty() => ledger::decode_identity(&bytes),
            _ => {
                let err = IdentityError::NotFound(id.to_string());
                log::warn!("{err}");
                Err(err)
            }
        }
    }

    /// Whether an identity is stored under `id`. Absence is `Ok(false)`;
    /// only ledger failures are errors.
    pub fn identity_exists<L: Ledger + ?Sized>(&self, ledger: &L, id: &str) -> Result<bool> {
        Ok(is_present(ledger.get(id)?.as_deref()))
    }

    /// Every identity on the ledger, in key order.
    ///
    /// Unbounded: use [`IdentityRegistry::get_identities_by_range`] to page.
    pub fn get_all_identities<L: Ledger + ?Sized>(&self, ledger: &L) -> Result<Vec<Identity>> {
        let entries = ledger.scan_all()?;
        log::debug!("scanned {} ledger entries", entries.len());
        decode_entries(entries)
    }

    /// Identities with ids in `[start, end)`, in key order. An empty bound is
    /// open on that side.
    pub fn get_identities_by_range<L: Ledger + ?Sized>(
        &self,
        ledger: &L,
        start: &str,
        end: &str,
    ) -> Result<Vec<Identity>> {
        let entries = ledger.scan(start, end)?;
        log::debug!("scanned {} ledger entries in [{start}, {end})", entries.len());
        decode_entries(entries)
    }

    /// Apply the graph rules without writing anything: `id` must be free and
    /// `controlled_by` (if not `id`) must exist.
    ///
    /// Lets callers report graph errors before parsing credential input.
    /// Creation re-checks, so a passing result is advisory.
    pub fn ensure_creatable<L: Ledger + ?Sized>(
        &self,
        ledger: &L,
        id: &str,
        controlled_by: &str,
    ) -> Result<()> {
        let check = graph::check_creatable(id, controlled_by, |key| self.identity_exists(ledger, key))?;
        check.into_result(id, controlled_by).map_err(|e| {
            log::warn!("{e}");
            e
        })
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    fn persist<L: Ledger + ?Sized>(&self, ledger: &L, identity: &Identity) -> Result<()> {
        let bytes = ledger::encode_identity(identity)?;
        if !ledger.put_new(&identity.id, &bytes)? {
            // Lost a race with a concurrent creator after the graph check.
            let err = IdentityError::AlreadyExists(identity.id.clone());
            log::warn!("{err}");
            return Err(err);
        }
        Ok(())
    }
}

fn decode_entries(entries: Vec<ledger::Entry>) -> Result<Vec<Identity>> {
    entries
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(_, value)| ledger::decode_identity(value))
        .collect()
}
