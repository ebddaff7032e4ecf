//! Error types for the identity registry.
//!
//! All errors are strongly typed and propagated without panicking. Every
//! variant carries a stable machine-readable code (see [`IdentityError::code`])
//! so callers can tell "already exists" from "bad signature" from
//! "unknown controller" without parsing messages.

/// Identity error types covering all operations.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Identity {0} does not exist")]
    NotFound(String),

    #[error("Identity {0} already exists")]
    AlreadyExists(String),

    #[error("Controller identity {controller} for {id} does not exist")]
    ControllerNotFound { id: String, controller: String },

    #[error("Signature invalid for identity {0}")]
    SignatureInvalid(String),

    #[error("Signature payload does not match identifier {0}")]
    PayloadMismatch(String),

    #[error("Malformed token for identity {id}: {reason}")]
    MalformedToken { id: String, reason: String },

    #[error("Malformed public key for identity {id}: {reason}")]
    MalformedKey { id: String, reason: String },

    #[error("Invalid subject claim '{0}': expected key:value")]
    InvalidSubjectClaim(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IdentityError {
    /// Return the stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "IDENTITY_NOT_FOUND",
            Self::AlreadyExists(_) => "IDENTITY_ALREADY_EXISTS",
            Self::ControllerNotFound { .. } => "CONTROLLER_NOT_FOUND",
            Self::SignatureInvalid(_) => "SIGNATURE_INVALID",
            Self::PayloadMismatch(_) => "SIGNATURE_PAYLOAD_DOES_NOT_MATCH",
            Self::MalformedToken { .. } => "MALFORMED_TOKEN",
            Self::MalformedKey { .. } => "MALFORMED_KEY",
            Self::InvalidSubjectClaim(_) => "INVALID_SUBJECT_CLAIM",
            Self::StorageError(_) | Self::Io(_) => "STORAGE_ERROR",
            Self::SerializationError(_) => "SERIALIZATION_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, IdentityError>;
