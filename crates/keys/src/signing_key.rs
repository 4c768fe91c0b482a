//! Signing and verification key pair types.
//!
//! A [`SigningKey`] is the private half used exclusively on the generate
//! path; a [`VerificationKey`] is the matching public half used exclusively
//! on the verify path. Both carry the key identifier (`kid`) that binds a
//! token to the key that signed it, and the algorithm identifier so an
//! authority can reject material it does not support.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use ed25519_dalek::{PUBLIC_KEY_LENGTH, VerifyingKey};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::KeyError;

/// Length in bytes of an Ed25519 PKCS#8 v1 DER encoding (16-byte header + 32-byte seed).
const ED25519_PKCS8_LEN: usize = 48;

/// Signature algorithm carried by a key.
///
/// Only Ed25519 is supported end-to-end. The enum exists so that key
/// material is always tagged with an explicit algorithm and so the session
/// authority can reject anything it does not fully implement, rather than
/// inferring the algorithm from key length.
///
/// # Non-exhaustive
///
/// Marked `#[non_exhaustive]` so that adding an algorithm (e.g. RS256) is
/// not a breaking change. Consumers must treat unknown variants as
/// unsupported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum KeyAlgorithm {
    /// EdDSA over Curve25519 (RFC 8032).
    Ed25519,
}

impl KeyAlgorithm {
    /// The algorithm name as it appears in a JWT `alg` header field.
    #[must_use]
    pub fn jwt_name(&self) -> &'static str {
        match self {
            Self::Ed25519 => "EdDSA",
        }
    }
}

impl std::fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.jwt_name())
    }
}

/// Private signing key material (Ed25519 only).
///
/// Holds the private key as PKCS#8 v1 DER, wrapped in [`Zeroizing`] so the
/// seed bytes are scrubbed from memory when the struct is dropped. The
/// session authority copies this DER once at construction and never
/// persists it.
///
/// # Naming
///
/// "Signing key" here means the private half, following the cryptographic
/// convention; the public half is [`VerificationKey`].
pub struct SigningKey {
    kid: String,
    algorithm: KeyAlgorithm,
    pkcs8_der: Zeroizing<Vec<u8>>,
}

impl SigningKey {
    /// Generates a fresh Ed25519 key pair under the given `kid`.
    ///
    /// Returns the private half and the matching public half. Each call
    /// produces independent random material.
    #[must_use]
    pub fn generate(kid: impl Into<String>) -> (Self, VerificationKey) {
        let kid = kid.into();
        let secret = ed25519_dalek::SigningKey::generate(&mut OsRng);
        let public_b64 = URL_SAFE_NO_PAD.encode(secret.verifying_key().to_bytes());

        let seed: Zeroizing<[u8; 32]> = Zeroizing::new(secret.to_bytes());
        let signing = Self {
            kid: kid.clone(),
            algorithm: KeyAlgorithm::Ed25519,
            pkcs8_der: wrap_pkcs8(&seed),
        };
        let verification = VerificationKey {
            kid,
            algorithm: KeyAlgorithm::Ed25519,
            public_key: Zeroizing::new(public_b64),
        };
        (signing, verification)
    }

    /// Builds a signing key from existing PKCS#8 v1 DER bytes.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidKeyMaterial`] if the DER is not a
    /// well-formed Ed25519 PKCS#8 v1 encoding.
    pub fn from_pkcs8_der(kid: impl Into<String>, der: &[u8]) -> Result<Self, KeyError> {
        validate_pkcs8(der)?;
        Ok(Self {
            kid: kid.into(),
            algorithm: KeyAlgorithm::Ed25519,
            pkcs8_der: Zeroizing::new(der.to_vec()),
        })
    }

    /// Key identifier, carried in the header of every token this key signs.
    #[must_use]
    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// The signature algorithm this key is tagged with.
    #[must_use]
    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// The private key as PKCS#8 v1 DER bytes.
    ///
    /// Callers must not copy this material out of [`Zeroizing`]-managed
    /// buffers.
    #[must_use]
    pub fn pkcs8_der(&self) -> &[u8] {
        &self.pkcs8_der
    }

    /// Derives the matching public half.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidKeyMaterial`] if the stored DER does not
    /// contain a valid Ed25519 seed.
    pub fn verification_key(&self) -> Result<VerificationKey, KeyError> {
        let seed = pkcs8_seed(&self.pkcs8_der)?;
        let secret = ed25519_dalek::SigningKey::from_bytes(&seed);
        Ok(VerificationKey {
            kid: self.kid.clone(),
            algorithm: self.algorithm,
            public_key: Zeroizing::new(URL_SAFE_NO_PAD.encode(secret.verifying_key().to_bytes())),
        })
    }
}

// Manual impl: key material must never appear in logs.
impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("kid", &self.kid)
            .field("algorithm", &self.algorithm)
            .field("pkcs8_der", &"<redacted>")
            .finish()
    }
}

impl Clone for SigningKey {
    fn clone(&self) -> Self {
        Self {
            kid: self.kid.clone(),
            algorithm: self.algorithm,
            pkcs8_der: Zeroizing::new(self.pkcs8_der.to_vec()),
        }
    }
}

/// Public verification key (Ed25519 only).
///
/// The public key is the raw 32-byte Ed25519 point encoded as base64url
/// without padding, following RFC 7515 (JWS) conventions; a 32-byte key
/// encodes to 43 characters. Wrapped in [`Zeroizing`] for symmetry with the
/// private half.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationKey {
    /// Key identifier (matches the JWT `kid` header of tokens it verifies).
    pub kid: String,
    /// Signature algorithm of the key.
    pub algorithm: KeyAlgorithm,
    /// Base64url-encoded (no padding) Ed25519 public key.
    pub public_key: Zeroizing<String>,
}

impl VerificationKey {
    /// Decodes the base64url public key into raw Ed25519 bytes, validating
    /// the length and that the bytes form a valid curve point.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidKeyMaterial`] if the encoding, length, or
    /// point is invalid.
    pub fn decode(&self) -> Result<Zeroizing<[u8; PUBLIC_KEY_LENGTH]>, KeyError> {
        let bytes: Zeroizing<Vec<u8>> = Zeroizing::new(
            URL_SAFE_NO_PAD
                .decode(self.public_key.as_bytes())
                .map_err(|e| KeyError::invalid_key_material(format!("base64 decode: {e}")))?,
        );

        if bytes.len() != PUBLIC_KEY_LENGTH {
            return Err(KeyError::invalid_key_material(format!(
                "expected {PUBLIC_KEY_LENGTH} bytes, got {}",
                bytes.len()
            )));
        }

        let point: Zeroizing<[u8; PUBLIC_KEY_LENGTH]> = Zeroizing::new(
            bytes[..PUBLIC_KEY_LENGTH]
                .try_into()
                .map_err(|_| KeyError::invalid_key_material("failed to convert bytes"))?,
        );

        VerifyingKey::from_bytes(&point)
            .map_err(|e| KeyError::invalid_key_material(format!("invalid Ed25519 key: {e}")))?;

        Ok(point)
    }
}

impl std::fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationKey")
            .field("kid", &self.kid)
            .field("algorithm", &self.algorithm)
            .field("public_key", &"<redacted>")
            .finish()
    }
}

/// Wraps a raw 32-byte Ed25519 seed in a PKCS#8 v1 DER encoding.
fn wrap_pkcs8(seed: &[u8; 32]) -> Zeroizing<Vec<u8>> {
    let mut der = Zeroizing::new(vec![
        0x30, 0x2e, // SEQUENCE, 46 bytes
        0x02, 0x01, 0x00, // INTEGER version 0
        0x30, 0x05, // SEQUENCE, 5 bytes (algorithm identifier)
        0x06, 0x03, 0x2b, 0x65, 0x70, // OID 1.3.101.112 (Ed25519)
        0x04, 0x22, // OCTET STRING, 34 bytes
        0x04, 0x20, // OCTET STRING, 32 bytes (the seed)
    ]);
    der.extend_from_slice(seed);
    der
}

/// Checks that `der` is a well-formed Ed25519 PKCS#8 v1 encoding.
fn validate_pkcs8(der: &[u8]) -> Result<(), KeyError> {
    pkcs8_seed(der).map(|_| ())
}

/// Extracts the 32-byte seed from an Ed25519 PKCS#8 v1 DER encoding.
fn pkcs8_seed(der: &[u8]) -> Result<Zeroizing<[u8; 32]>, KeyError> {
    if der.len() != ED25519_PKCS8_LEN {
        return Err(KeyError::invalid_key_material(format!(
            "expected {ED25519_PKCS8_LEN}-byte PKCS#8 DER, got {} bytes",
            der.len()
        )));
    }
    // OID 1.3.101.112 at the fixed v1 offset identifies Ed25519.
    if der[7..12] != [0x06, 0x03, 0x2b, 0x65, 0x70] {
        return Err(KeyError::invalid_key_material("DER does not carry the Ed25519 OID"));
    }
    let seed: Zeroizing<[u8; 32]> = Zeroizing::new(
        der[16..48].try_into().map_err(|_| KeyError::invalid_key_material("truncated seed"))?,
    );
    Ok(seed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_produces_matching_halves() {
        let (signing, verification) = SigningKey::generate("key-2024-001");
        assert_eq!(signing.kid(), "key-2024-001");
        assert_eq!(verification.kid, "key-2024-001");
        assert_eq!(signing.algorithm(), KeyAlgorithm::Ed25519);

        let derived = signing.verification_key().unwrap();
        assert_eq!(*derived.public_key, *verification.public_key);
    }

    #[test]
    fn test_generate_unique_material() {
        let (_, pk1) = SigningKey::generate("a");
        let (_, pk2) = SigningKey::generate("a");
        assert_ne!(*pk1.public_key, *pk2.public_key, "each call must produce a unique key pair");
    }

    #[test]
    fn test_pkcs8_der_round_trip() {
        let (signing, verification) = SigningKey::generate("k1");
        let rebuilt = SigningKey::from_pkcs8_der("k1", signing.pkcs8_der()).unwrap();
        let derived = rebuilt.verification_key().unwrap();
        assert_eq!(*derived.public_key, *verification.public_key);
    }

    #[test]
    fn test_from_pkcs8_der_rejects_truncated() {
        let result = SigningKey::from_pkcs8_der("k1", &[0x30, 0x2e, 0x02]);
        assert!(matches!(result, Err(KeyError::InvalidKeyMaterial(_))));
    }

    #[test]
    fn test_from_pkcs8_der_rejects_wrong_oid() {
        let (signing, _) = SigningKey::generate("k1");
        let mut der = signing.pkcs8_der().to_vec();
        der[9] ^= 0xff; // corrupt the OID
        let result = SigningKey::from_pkcs8_der("k1", &der);
        assert!(matches!(result, Err(KeyError::InvalidKeyMaterial(_))));
    }

    #[test]
    fn test_verification_key_decode() {
        let (_, verification) = SigningKey::generate("k1");
        // Base64url of 32 bytes = 43 characters (no padding)
        assert_eq!(verification.public_key.len(), 43);
        assert!(verification.decode().is_ok());
    }

    #[test]
    fn test_verification_key_decode_rejects_bad_material() {
        let mut key = SigningKey::generate("k1").1;
        key.public_key = Zeroizing::new("not-valid-base64!!!".into());
        assert!(matches!(key.decode(), Err(KeyError::InvalidKeyMaterial(_))));

        key.public_key = Zeroizing::new("AAAA".into()); // wrong length
        assert!(matches!(key.decode(), Err(KeyError::InvalidKeyMaterial(_))));
    }

    #[test]
    fn test_debug_redacts_material() {
        let (signing, verification) = SigningKey::generate("k1");
        let signing_debug = format!("{signing:?}");
        let verification_debug = format!("{verification:?}");
        assert!(signing_debug.contains("<redacted>"));
        assert!(verification_debug.contains("<redacted>"));
        assert!(!verification_debug.contains(&**verification.public_key));
    }

    #[test]
    fn test_algorithm_jwt_name() {
        assert_eq!(KeyAlgorithm::Ed25519.jwt_name(), "EdDSA");
        assert_eq!(KeyAlgorithm::Ed25519.to_string(), "EdDSA");
    }
}
