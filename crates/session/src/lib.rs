//! # Sentinel Session
//!
//! The session token authority: mints and verifies compact, signed,
//! time-bounded identity assertions for a single subject identifier.
//!
//! Every authenticated request's trust reduces to this crate doing two
//! things correctly:
//! - **Generate**: sign a `{sub, iat, exp}` claim set with the one active
//!   signing key, embedding the key identifier in the token header
//! - **Verify**: treat an incoming token as hostile until its key is known,
//!   its signature checks out, its claims are well-formed, and it has not
//!   expired
//!
//! Key material comes from a [`KeyProvider`](sentinel_keys::KeyProvider)
//! snapshot at construction time; the authority itself is stateless with
//! respect to individual sessions and performs no I/O after construction.
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use sentinel_keys::{SigningKey, VerificationKeySet};
//! use sentinel_session::SessionAuthority;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (signing, verification) = SigningKey::generate("key-2024-001");
//! let keys: VerificationKeySet = [verification].into_iter().collect();
//!
//! let authority = SessionAuthority::new(signing, keys, Duration::from_secs(3600))?;
//! let token = authority.generate("user-42")?;
//! let claims = authority.verify(&token)?;
//! assert_eq!(claims.sub, "user-42");
//! # Ok(())
//! # }
//! ```
//!
//! ## Security
//!
//! - Only EdDSA (Ed25519) is accepted; `none` and symmetric algorithms are
//!   on a hard deny list (see [`validation`])
//! - Verification failures carry a closed set of reasons; callers must
//!   collapse all of them into a uniform "unauthenticated" response so an
//!   attacker cannot distinguish an expired token from a forged one

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// The session authority: construction, generate, verify, rotation.
pub mod authority;
/// Session claims.
pub mod claims;
/// Error taxonomies for construction, generation, and verification.
pub mod error;
/// JWT algorithm allow/deny lists.
pub mod validation;

/// Test helpers (feature-gated).
#[cfg(feature = "testutil")]
pub mod testutil;

pub use authority::{DEFAULT_SESSION_LIFETIME, SessionAuthority};
pub use claims::SessionClaims;
pub use error::{ConstructionError, GenerationError, VerificationError};
pub use validation::{ACCEPTED_ALGORITHMS, FORBIDDEN_ALGORITHMS, validate_algorithm};
