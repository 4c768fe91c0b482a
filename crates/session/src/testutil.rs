//! Test helpers for session token testing.
//!
//! Helpers for minting tokens with arbitrary claims (expired, ill-formed,
//! wrong shape) and crafting raw token strings for attack testing. Gated
//! behind the `testutil` feature to keep them out of production builds.
//!
//! # Usage
//!
//! In integration tests, enable the feature in `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! sentinel-session = { path = "../session", features = ["testutil"] }
//! ```

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use sentinel_keys::SigningKey;

/// Signs an arbitrary JSON claim set with the given key, `kid` in the header.
///
/// Unlike the authority's `generate`, this places no constraints on the
/// claims — use it to mint expired tokens, tokens with missing or ill-typed
/// claims, or tokens carrying extra fields.
///
/// # Panics
///
/// Panics if encoding fails (should not happen with valid key material).
#[must_use]
pub fn sign_claims(signing_key: &SigningKey, claims: &serde_json::Value) -> String {
    let mut header = Header::new(Algorithm::EdDSA);
    header.kid = Some(signing_key.kid().to_owned());

    let encoding_key = EncodingKey::from_ed_der(signing_key.pkcs8_der());
    jsonwebtoken::encode(&header, claims, &encoding_key).expect("failed to encode test token")
}

/// Crafts a raw token string from arbitrary header and payload JSON.
///
/// The result has the structure `{header_b64}.{payload_b64}.` with an empty
/// signature — intentional, for testing rejection of `alg: "none"`,
/// algorithm confusion, and other malformed inputs.
///
/// # Panics
///
/// Panics if JSON serialization fails.
#[must_use]
pub fn craft_raw_token(header: &serde_json::Value, payload: &serde_json::Value) -> String {
    let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(header).expect("header json"));
    let payload_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).expect("payload json"));
    format!("{header_b64}.{payload_b64}.")
}

/// Replaces the character at `index` in a token with a different base64url
/// character, simulating a bit flip in the decoded bytes.
///
/// Keeps the segment decodable so the mutation reaches the signature check
/// rather than failing base64 parsing.
///
/// # Panics
///
/// Panics if `index` is out of range or points at a `.` separator.
#[must_use]
pub fn flip_token_char(token: &str, index: usize) -> String {
    let mut chars: Vec<char> = token.chars().collect();
    let old = chars[index];
    assert_ne!(old, '.', "cannot mutate a segment separator");
    chars[index] = if old == 'A' { 'B' } else { 'A' };
    chars.into_iter().collect()
}

/// Asserts that a `Result<T, VerificationError>` is an `Err` of the given
/// variant.
///
/// On failure, prints the expected variant and the actual result.
///
/// # Examples
///
/// ```
/// use sentinel_session::{VerificationError, assert_verification_error};
///
/// let result: Result<(), VerificationError> = Err(VerificationError::Expired);
/// assert_verification_error!(result, Expired);
/// ```
#[macro_export]
macro_rules! assert_verification_error {
    ($result:expr, $variant:ident) => {
        assert!(
            matches!($result, Err($crate::error::VerificationError::$variant { .. })),
            "expected VerificationError::{}, got: {:?}",
            stringify!($variant),
            $result,
        );
    };
    ($result:expr, $variant:ident, $msg:expr) => {
        assert!(
            matches!($result, Err($crate::error::VerificationError::$variant { .. })),
            "{}: expected VerificationError::{}, got: {:?}",
            $msg,
            stringify!($variant),
            $result,
        );
    };
}
