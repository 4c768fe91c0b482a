//! Error taxonomies for construction, generation, and verification.
//!
//! Three separate types, matching the three failure surfaces:
//!
//! - [`ConstructionError`] — startup-time and fatal; a process must not
//!   start serving with invalid keys
//! - [`GenerationError`] — per-call on the mint path; propagated to the
//!   login flow, never retried internally
//! - [`VerificationError`] — per-call on the verify path; a closed set of
//!   reasons for internal diagnostics
//!
//! # Oracle resistance
//!
//! [`VerificationError`] variants exist for logs and metrics only. Callers
//! facing an untrusted client must map *every* variant to the same
//! "unauthenticated" response — distinguishing "expired" from "forged" on
//! the wire hands an attacker an oracle.

use thiserror::Error;

/// Startup-time failures binding key material into an authority.
///
/// All variants are fatal configuration problems: the process should not
/// start (or the rotation should not be applied) when one occurs.
///
/// # Non-exhaustive
///
/// Marked `#[non_exhaustive]` — new variants may be added in future minor
/// releases. Downstream match expressions must include a wildcard arm.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConstructionError {
    /// The signing key material is unusable.
    #[error("invalid signing key: {0}")]
    InvalidSigningKey(String),

    /// The signing key's algorithm is not supported.
    #[error("unsupported signing algorithm: {algorithm}")]
    UnsupportedAlgorithm {
        /// The algorithm the key was tagged with.
        algorithm: String,
    },

    /// The verification key set is empty.
    ///
    /// A verifier with no keys can never succeed; this is caught at
    /// startup, not at first request.
    #[error("verification key set is empty")]
    EmptyVerificationKeySet,

    /// A verification key could not be decoded.
    #[error("invalid verification key '{kid}': {reason}")]
    InvalidVerificationKey {
        /// Key ID of the unusable key.
        kid: String,
        /// Why the key was rejected.
        reason: String,
    },

    /// The configured session lifetime is zero.
    #[error("session lifetime must be a positive duration")]
    ZeroSessionLifetime,

    /// The key provider failed to supply key material.
    #[error("key provider error: {0}")]
    KeyProvider(#[from] sentinel_keys::KeyError),
}

/// Per-call failures on the mint path.
///
/// Signing is not expected to transiently fail; a [`GenerationError`] is
/// surfaced to the caller as an authentication-flow failure and never
/// retried internally.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    /// The subject identifier was empty.
    #[error("subject must be a non-empty identifier")]
    EmptySubject,

    /// The underlying signing operation failed.
    #[error("signing failed: {0}")]
    SigningFailed(String),
}

/// Per-call failures on the verify path.
///
/// The set is closed: every way a token can be rejected reduces to one of
/// these four reasons. Use [`reason_label`](Self::reason_label) for
/// low-cardinality log/metric labels; never forward the variant (or its
/// `Display` output) to an untrusted client.
#[derive(Debug, Error)]
pub enum VerificationError {
    /// The token's `kid` is not in the verification key set.
    ///
    /// Signature validity is irrelevant here — an unknown key is rejected
    /// before any cryptographic check.
    #[error("token signed by unknown key: {kid}")]
    UnknownKey {
        /// The key ID the token claimed.
        kid: String,
    },

    /// The signature does not verify: tampered token, wrong key, or an
    /// algorithm outside the accepted list.
    #[error("invalid signature")]
    BadSignature,

    /// The token's `exp` is at or before the current time.
    #[error("token expired")]
    Expired,

    /// The token is structurally invalid: not three segments, undecodable
    /// header or payload, or required claims missing, empty, or ill-typed.
    #[error("malformed token: {0}")]
    Malformed(String),
}

impl VerificationError {
    /// Stable, low-cardinality label for logs and metrics.
    ///
    /// Safe to record internally; still not for untrusted clients.
    #[must_use]
    pub fn reason_label(&self) -> &'static str {
        match self {
            Self::UnknownKey { .. } => "unknown_key",
            Self::BadSignature => "bad_signature",
            Self::Expired => "expired",
            Self::Malformed(_) => "malformed",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for VerificationError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            // Signature-segment failures. Base64 errors surface from the
            // signature segment once the header has parsed, so a bit-flipped
            // signature maps here rather than to Malformed.
            ErrorKind::InvalidSignature | ErrorKind::Base64(_) => Self::BadSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => Self::BadSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidToken => Self::Malformed("invalid token structure".into()),
            ErrorKind::MissingRequiredClaim(claim) => {
                Self::Malformed(format!("missing required claim: {claim}"))
            },
            ErrorKind::Json(e) => Self::Malformed(format!("claims are not valid JSON: {e}")),
            ErrorKind::Utf8(e) => Self::Malformed(format!("claims are not valid UTF-8: {e}")),
            _ => Self::Malformed(format!("token rejected: {err}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConstructionError::EmptyVerificationKeySet;
        assert_eq!(err.to_string(), "verification key set is empty");

        let err = GenerationError::EmptySubject;
        assert_eq!(err.to_string(), "subject must be a non-empty identifier");

        let err = VerificationError::UnknownKey { kid: "k9".into() };
        assert_eq!(err.to_string(), "token signed by unknown key: k9");

        let err = VerificationError::Expired;
        assert_eq!(err.to_string(), "token expired");
    }

    #[test]
    fn test_reason_labels_are_stable() {
        assert_eq!(VerificationError::UnknownKey { kid: "k".into() }.reason_label(), "unknown_key");
        assert_eq!(VerificationError::BadSignature.reason_label(), "bad_signature");
        assert_eq!(VerificationError::Expired.reason_label(), "expired");
        assert_eq!(VerificationError::Malformed("x".into()).reason_label(), "malformed");
    }

    #[test]
    fn test_from_jsonwebtoken_signature_failure() {
        let jwt_err =
            jsonwebtoken::errors::Error::from(jsonwebtoken::errors::ErrorKind::InvalidSignature);
        let err: VerificationError = jwt_err.into();
        assert!(matches!(err, VerificationError::BadSignature));
    }

    #[test]
    fn test_from_jsonwebtoken_expired() {
        let jwt_err =
            jsonwebtoken::errors::Error::from(jsonwebtoken::errors::ErrorKind::ExpiredSignature);
        let err: VerificationError = jwt_err.into();
        assert!(matches!(err, VerificationError::Expired));
    }

    #[test]
    fn test_from_jsonwebtoken_missing_claim() {
        let jwt_err = jsonwebtoken::errors::Error::from(
            jsonwebtoken::errors::ErrorKind::MissingRequiredClaim("exp".into()),
        );
        let err: VerificationError = jwt_err.into();
        assert!(matches!(err, VerificationError::Malformed(ref msg) if msg.contains("exp")));
    }

    #[test]
    fn test_key_provider_error_wrapped() {
        let key_err = sentinel_keys::KeyError::NoSigningKey;
        let err: ConstructionError = key_err.into();
        assert!(matches!(err, ConstructionError::KeyProvider(_)));
        assert_eq!(err.to_string(), "key provider error: no signing key available");
    }
}
