//! Registry configuration.
//!
//! Loaded from a JSON file; every field has a default so an empty object
//! (or no file at all) gives the stock registry.
//!
//! ```json
//! {
//!     "issuance_years": 1,
//!     "genesis": { "context": "http://www.lsdi.ufma.br/", "id": "lsdi:identity:first" }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IdentityError, Result};

pub const DEFAULT_CONTEXT: &str = "http://www.lsdi.ufma.br/";
pub const DEFAULT_GENESIS_ID: &str = "lsdi:identity:first";
pub const DEFAULT_ISSUANCE_YEARS: u32 = 1;

/// The well-known root identity written by `init_ledger`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisIdentity {
    pub context: String,
    pub id: String,
}

impl Default for GenesisIdentity {
    fn default() -> Self {
        Self {
            context: DEFAULT_CONTEXT.to_string(),
            id: DEFAULT_GENESIS_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Validity window, in years, stamped on verified identities.
    pub issuance_years: u32,
    pub genesis: GenesisIdentity,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            issuance_years: DEFAULT_ISSUANCE_YEARS,
            genesis: GenesisIdentity::default(),
        }
    }
}

impl RegistryConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| IdentityError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Io` if the file cannot be read, or
    /// `IdentityError::Config` if it is malformed or invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.issuance_years == 0 {
            return Err(IdentityError::Config(
                "issuance_years must be at least 1".into(),
            ));
        }
        if self.genesis.id.is_empty() {
            return Err(IdentityError::Config("genesis id must not be empty".into()));
        }
        Ok(())
    }
}
