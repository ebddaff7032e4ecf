//! JSON Web Key handling for elliptic-curve public keys.
//!
//! Only `kty = "EC"` keys on `P-256` and `P-384` are accepted. Coordinates
//! are base64url (no padding) big-endian field elements.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::keys::EcVerifyingKey;

/// Reasons a JWK cannot be turned into a verifying key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JwkError {
    #[error("unsupported key type '{0}', expected EC")]
    UnsupportedKeyType(String),

    #[error("unsupported curve '{0}'")]
    UnsupportedCurve(String),

    #[error("coordinate {coordinate} is not valid base64url: {reason}")]
    Base64 {
        coordinate: &'static str,
        reason: String,
    },

    #[error("coordinate {coordinate} must be {expected} bytes, found {found}")]
    CoordinateLength {
        coordinate: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("coordinates are not a point on {0}")]
    InvalidPoint(&'static str),

    #[error("key algorithm '{alg}' does not match curve {crv}")]
    AlgorithmMismatch { alg: String, crv: &'static str },

    #[error("invalid JWK JSON: {0}")]
    Json(String),
}

/// Supported elliptic curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcCurve {
    P256,
    P384,
}

impl EcCurve {
    /// Parse a JWK `crv` value.
    pub fn from_crv(crv: &str) -> Option<Self> {
        match crv {
            "P-256" => Some(Self::P256),
            "P-384" => Some(Self::P384),
            _ => None,
        }
    }

    /// Parse a JWS `alg` value.
    pub fn from_jws_alg(alg: &str) -> Option<Self> {
        match alg {
            "ES256" => Some(Self::P256),
            "ES384" => Some(Self::P384),
            _ => None,
        }
    }

    pub fn crv(&self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
        }
    }

    pub fn jws_alg(&self) -> &'static str {
        match self {
            Self::P256 => "ES256",
            Self::P384 => "ES384",
        }
    }

    /// Byte length of one field element (and of each coordinate).
    pub fn field_size(&self) -> usize {
        match self {
            Self::P256 => 32,
            Self::P384 => 48,
        }
    }

    /// Byte length of a raw `r || s` JWS signature.
    pub fn signature_len(&self) -> usize {
        self.field_size() * 2
    }
}

/// Public EC key material as carried in an identity record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKeyJwk {
    pub kty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    pub crv: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    pub x: String,
    pub y: String,
}

impl PublicKeyJwk {
    /// Parse a JWK from JSON. Private members such as `d` are ignored.
    pub fn from_json(json: &str) -> std::result::Result<Self, JwkError> {
        serde_json::from_str(json).map_err(|e| JwkError::Json(e.to_string()))
    }

    /// Resolve and validate the curve named by this key.
    pub fn curve(&self) -> std::result::Result<EcCurve, JwkError> {
        if self.kty != "EC" {
            return Err(JwkError::UnsupportedKeyType(self.kty.clone()));
        }
        let curve =
            EcCurve::from_crv(&self.crv).ok_or_else(|| JwkError::UnsupportedCurve(self.crv.clone()))?;
        if let Some(alg) = &self.alg {
            if alg != curve.jws_alg() {
                return Err(JwkError::AlgorithmMismatch {
                    alg: alg.clone(),
                    crv: curve.crv(),
                });
            }
        }
        Ok(curve)
    }

    /// Build a verifying key from the public components.
    pub fn to_verifying_key(&self) -> std::result::Result<EcVerifyingKey, JwkError> {
        let curve = self.curve()?;
        let x = decode_coordinate("x", &self.x, curve)?;
        let y = decode_coordinate("y", &self.y, curve)?;
        EcVerifyingKey::from_coordinates(curve, &x, &y)
    }

    /// RFC 7638 thumbprint: base64url SHA-256 of the required members in
    /// lexical order. Optional members (`kid`, `alg`) do not affect it.
    pub fn thumbprint(&self) -> std::result::Result<String, JwkError> {
        let curve = self.curve()?;
        let quote = |v: &str| serde_json::Value::from(v).to_string();
        let canonical = format!(
            r#"{{"crv":{},"kty":"EC","x":{},"y":{}}}"#,
            quote(curve.crv()),
            quote(&self.x),
            quote(&self.y)
        );
        let hash = Sha256::digest(canonical.as_bytes());
        Ok(encode_member(&hash))
    }
}

/// Private EC key as written by `lid keygen`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateKeyJwk {
    #[serde(flatten)]
    pub public: PublicKeyJwk,
    pub d: String,
}

/// Decode a JWK member that must be exactly one field element long.
pub(crate) fn decode_coordinate(
    coordinate: &'static str,
    value: &str,
    curve: EcCurve,
) -> std::result::Result<Vec<u8>, JwkError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(value)
        .map_err(|e| JwkError::Base64 {
            coordinate,
            reason: e.to_string(),
        })?;
    if bytes.len() != curve.field_size() {
        return Err(JwkError::CoordinateLength {
            coordinate,
            expected: curve.field_size(),
            found: bytes.len(),
        });
    }
    Ok(bytes)
}

/// Encode a coordinate or scalar for a JWK member.
pub(crate) fn encode_member(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}
