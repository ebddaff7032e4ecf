//! JWS compact serialization (`header.payload.signature`).
//!
//! Each part is base64url without padding. The signing input is the first
//! two parts exactly as transmitted, joined by `.`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::jwk::EcCurve;
use super::keys::EcSigningKey;

/// Reasons a compact token cannot be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JwsError {
    #[error("expected 3 parts separated by '.', found {actual_parts}")]
    IncorrectPartsCount { actual_parts: usize },

    #[error("{part} is not valid base64url: {reason}")]
    Base64 { part: &'static str, reason: String },

    #[error("header is not a valid JOSE header: {0}")]
    Header(String),

    #[error("unsupported algorithm '{0}'")]
    UnsupportedAlgorithm(String),

    #[error("invalid signature length for {alg}: expected {expected_len} bytes, found {found_len}")]
    InvalidSignatureLength {
        alg: &'static str,
        expected_len: usize,
        found_len: usize,
    },
}

/// JOSE header. Unknown members are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwsHeader {
    pub alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

/// A parsed, not yet verified, compact JWS.
#[derive(Debug, Clone)]
pub struct CompactJws {
    header: JwsHeader,
    curve: EcCurve,
    signing_input: String,
    payload: Vec<u8>,
    signature: Vec<u8>,
}

impl CompactJws {
    /// Parse a compact token.
    pub fn parse(token: &str) -> std::result::Result<Self, JwsError> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            return Err(JwsError::IncorrectPartsCount {
                actual_parts: parts.len(),
            });
        }
        let (header_b64, payload_b64, signature_b64) = (parts[0], parts[1], parts[2]);

        let header_bytes = decode_part("header", header_b64)?;
        let header: JwsHeader =
            serde_json::from_slice(&header_bytes).map_err(|e| JwsError::Header(e.to_string()))?;
        let curve = EcCurve::from_jws_alg(&header.alg)
            .ok_or_else(|| JwsError::UnsupportedAlgorithm(header.alg.clone()))?;

        let payload = decode_part("payload", payload_b64)?;
        let signature = decode_part("signature", signature_b64)?;
        if signature.len() != curve.signature_len() {
            return Err(JwsError::InvalidSignatureLength {
                alg: curve.jws_alg(),
                expected_len: curve.signature_len(),
                found_len: signature.len(),
            });
        }

        Ok(Self {
            header,
            curve,
            signing_input: format!("{header_b64}.{payload_b64}"),
            payload,
            signature,
        })
    }

    pub fn header(&self) -> &JwsHeader {
        &self.header
    }

    /// Curve implied by the header `alg`.
    pub fn curve(&self) -> EcCurve {
        self.curve
    }

    pub fn signing_input(&self) -> &[u8] {
        self.signing_input.as_bytes()
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }
}

fn decode_part(part: &'static str, value: &str) -> std::result::Result<Vec<u8>, JwsError> {
    URL_SAFE_NO_PAD.decode(value).map_err(|e| JwsError::Base64 {
        part,
        reason: e.to_string(),
    })
}

/// Sign `payload` and return a compact JWS using the key's curve algorithm.
pub fn sign_compact(key: &EcSigningKey, payload: &[u8], kid: Option<&str>) -> String {
    let header = JwsHeader {
        alg: key.curve().jws_alg().to_string(),
        typ: None,
        kid: kid.map(str::to_string),
    };
    // A struct of plain strings always serializes.
    let header_json = serde_json::to_vec(&header).unwrap_or_default();
    let header_b64 = URL_SAFE_NO_PAD.encode(header_json);
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload);
    let signing_input = format!("{header_b64}.{payload_b64}");

    let signature = key.sign(signing_input.as_bytes());
    let signature_b64 = URL_SAFE_NO_PAD.encode(signature);

    format!("{signing_input}.{signature_b64}")
}
