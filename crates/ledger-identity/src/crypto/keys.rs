//! ECDSA key pairs on P-256 and P-384.
//!
//! Verifying keys are built from JWK coordinates when checking a proof.
//! Signing keys exist for issuing proofs (CLI `keygen`/`sign`, tests).

use p256::ecdsa::signature::{Signer, Verifier};

use super::jwk::{decode_coordinate, encode_member, EcCurve, JwkError, PrivateKeyJwk, PublicKeyJwk};

/// A public ECDSA key on one of the supported curves.
#[derive(Debug, Clone)]
pub enum EcVerifyingKey {
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
}

impl EcVerifyingKey {
    /// Build a key from big-endian affine coordinates.
    ///
    /// Coordinates of the wrong width, or off the curve, are `InvalidPoint`.
    pub fn from_coordinates(
        curve: EcCurve,
        x: &[u8],
        y: &[u8],
    ) -> std::result::Result<Self, JwkError> {
        // SEC1 uncompressed form: 0x04 || x || y.
        let mut sec1 = Vec::with_capacity(1 + x.len() + y.len());
        sec1.push(0x04);
        sec1.extend_from_slice(x);
        sec1.extend_from_slice(y);
        let key = match curve {
            EcCurve::P256 => p256::ecdsa::VerifyingKey::from_sec1_bytes(&sec1).map(Self::P256),
            EcCurve::P384 => p384::ecdsa::VerifyingKey::from_sec1_bytes(&sec1).map(Self::P384),
        };
        key.map_err(|_| JwkError::InvalidPoint(curve.crv()))
    }

    pub fn curve(&self) -> EcCurve {
        match self {
            Self::P256(_) => EcCurve::P256,
            Self::P384(_) => EcCurve::P384,
        }
    }

    /// Check a raw `r || s` signature over `message`.
    ///
    /// Returns `false` for any signature that does not verify, including
    /// byte strings that do not decode to a valid signature.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        match self {
            Self::P256(key) => p256::ecdsa::Signature::from_slice(signature)
                .map(|sig| key.verify(message, &sig).is_ok())
                .unwrap_or(false),
            Self::P384(key) => p384::ecdsa::Signature::from_slice(signature)
                .map(|sig| key.verify(message, &sig).is_ok())
                .unwrap_or(false),
        }
    }

    /// Uncompressed affine coordinates `(x, y)`.
    fn coordinates(&self) -> (Vec<u8>, Vec<u8>) {
        match self {
            Self::P256(key) => {
                let point = key.to_encoded_point(false);
                (
                    point.x().map(|x| x.to_vec()).unwrap_or_default(),
                    point.y().map(|y| y.to_vec()).unwrap_or_default(),
                )
            }
            Self::P384(key) => {
                let point = key.to_encoded_point(false);
                (
                    point.x().map(|x| x.to_vec()).unwrap_or_default(),
                    point.y().map(|y| y.to_vec()).unwrap_or_default(),
                )
            }
        }
    }

    /// Export as a public JWK.
    pub fn to_jwk(&self, kid: Option<&str>) -> PublicKeyJwk {
        let curve = self.curve();
        let (x, y) = self.coordinates();
        PublicKeyJwk {
            kty: "EC".to_string(),
            kid: kid.map(str::to_string),
            crv: curve.crv().to_string(),
            alg: Some(curve.jws_alg().to_string()),
            x: encode_member(&x),
            y: encode_member(&y),
        }
    }
}

/// An ECDSA signing key on one of the supported curves.
///
/// The underlying key types zeroize their scalar on drop.
pub enum EcSigningKey {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
}

impl EcSigningKey {
    /// Generate a new random key on `curve`.
    pub fn generate(curve: EcCurve) -> Self {
        match curve {
            EcCurve::P256 => Self::generate_p256(),
            EcCurve::P384 => Self::generate_p384(),
        }
    }

    pub fn generate_p256() -> Self {
        Self::P256(p256::ecdsa::SigningKey::random(&mut rand::thread_rng()))
    }

    pub fn generate_p384() -> Self {
        Self::P384(p384::ecdsa::SigningKey::random(&mut rand::thread_rng()))
    }

    pub fn curve(&self) -> EcCurve {
        match self {
            Self::P256(_) => EcCurve::P256,
            Self::P384(_) => EcCurve::P384,
        }
    }

    /// Sign `message`, returning the raw fixed-width `r || s` encoding.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        match self {
            Self::P256(key) => {
                let sig: p256::ecdsa::Signature = key.sign(message);
                sig.to_bytes().to_vec()
            }
            Self::P384(key) => {
                let sig: p384::ecdsa::Signature = key.sign(message);
                sig.to_bytes().to_vec()
            }
        }
    }

    pub fn verifying_key(&self) -> EcVerifyingKey {
        match self {
            Self::P256(key) => EcVerifyingKey::P256(key.verifying_key().clone()),
            Self::P384(key) => EcVerifyingKey::P384(key.verifying_key().clone()),
        }
    }

    /// Export the public half as a JWK.
    pub fn public_jwk(&self, kid: Option<&str>) -> PublicKeyJwk {
        self.verifying_key().to_jwk(kid)
    }

    /// Export the key pair as a private JWK (includes `d`).
    pub fn to_private_jwk(&self, kid: Option<&str>) -> PrivateKeyJwk {
        let d = match self {
            Self::P256(key) => key.to_bytes().to_vec(),
            Self::P384(key) => key.to_bytes().to_vec(),
        };
        PrivateKeyJwk {
            public: self.public_jwk(kid),
            d: encode_member(&d),
        }
    }

    /// Load a key pair from a private JWK.
    ///
    /// The public coordinates in the JWK must match the private scalar.
    pub fn from_private_jwk(jwk: &PrivateKeyJwk) -> std::result::Result<Self, JwkError> {
        let curve = jwk.public.curve()?;
        let d = decode_coordinate("d", &jwk.d, curve)?;
        let key = match curve {
            EcCurve::P256 => p256::ecdsa::SigningKey::from_slice(&d)
                .map(Self::P256)
                .map_err(|_| JwkError::InvalidPoint(curve.crv()))?,
            EcCurve::P384 => p384::ecdsa::SigningKey::from_slice(&d)
                .map(Self::P384)
                .map_err(|_| JwkError::InvalidPoint(curve.crv()))?,
        };

        let derived = key.public_jwk(None);
        if derived.x != jwk.public.x || derived.y != jwk.public.y {
            return Err(JwkError::InvalidPoint(curve.crv()));
        }
        Ok(key)
    }
}
