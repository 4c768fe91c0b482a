//! JWT algorithm allow/deny lists.
//!
//! # Security
//!
//! Strict algorithm checks per RFC 8725 prevent substitution attacks:
//! - `none` and symmetric algorithms are always rejected
//! - Only algorithms with full end-to-end verification support are accepted
//!
//! The check runs before any key lookup so a hostile header cannot steer
//! key selection.

use crate::error::VerificationError;

/// Algorithms never accepted, regardless of the accepted list.
///
/// - `none`: no signature at all (trivially forgeable)
/// - `HS256`/`HS384`/`HS512`: symmetric — a verifier holding the key could
///   also mint tokens, which breaks the sign/verify separation this core is
///   built around
pub const FORBIDDEN_ALGORITHMS: &[&str] = &["none", "HS256", "HS384", "HS512"];

/// Algorithms with full end-to-end support.
///
/// Only EdDSA (Ed25519) is implemented: the key provider supplies Ed25519
/// material exclusively and the verify path only builds Ed25519 decoding
/// keys. Per RFC 8725 §3.1, algorithms without complete verification
/// support must not be listed here.
pub const ACCEPTED_ALGORITHMS: &[&str] = &["EdDSA"];

/// Validates a token header's algorithm against the allow/deny lists.
///
/// Rejections map to [`VerificationError::BadSignature`]: a token carrying
/// a wrong algorithm can never have a valid signature under the accepted
/// policy, and the uniform variant avoids leaking which check tripped.
///
/// # Examples
///
/// ```
/// use sentinel_session::validation::validate_algorithm;
///
/// assert!(validate_algorithm("EdDSA").is_ok());
/// assert!(validate_algorithm("none").is_err());
/// assert!(validate_algorithm("HS256").is_err());
/// assert!(validate_algorithm("RS256").is_err());
/// ```
///
/// # Errors
///
/// Returns [`VerificationError::BadSignature`] for any algorithm outside
/// [`ACCEPTED_ALGORITHMS`].
pub fn validate_algorithm(alg: &str) -> Result<(), VerificationError> {
    if FORBIDDEN_ALGORITHMS.contains(&alg) {
        tracing::debug!(alg, "rejected forbidden token algorithm");
        return Err(VerificationError::BadSignature);
    }

    if !ACCEPTED_ALGORITHMS.contains(&alg) {
        tracing::debug!(alg, "rejected unsupported token algorithm");
        return Err(VerificationError::BadSignature);
    }

    Ok(())
}
