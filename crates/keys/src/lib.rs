//! # Sentinel Keys
//!
//! Key material types and the key provider interface for Sentinel session
//! tokens.
//!
//! This crate is the leaf dependency of the session authority. It defines:
//! - **Key types**: [`SigningKey`] (private half, Ed25519 only) and
//!   [`VerificationKey`]/[`VerificationKeySet`] (public halves, keyed by `kid`)
//! - **The provider seam**: the [`KeyProvider`] trait, through which the
//!   authority obtains its keys at construction time
//! - **A reference provider**: [`MemoryKeyProvider`], which generates and
//!   rotates keys in-process (used in tests and single-node deployments)
//!
//! ## Security
//!
//! - Only Ed25519 is supported; there is no symmetric key type
//! - Private and public key buffers are wrapped in [`zeroize::Zeroizing`] so
//!   the material is scrubbed from memory on drop
//! - Keys are never persisted by this crate; storage is the provider
//!   implementation's concern

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Key provider and key material errors.
pub mod error;
/// Verification key set, keyed by `kid`.
pub mod keyset;
/// Key provider trait and the in-memory reference implementation.
pub mod provider;
/// Signing and verification key pair types.
pub mod signing_key;

pub use error::{KeyError, Result};
pub use keyset::VerificationKeySet;
pub use provider::{KeyProvider, MemoryKeyProvider};
pub use signing_key::{KeyAlgorithm, SigningKey, VerificationKey};
