//! Key provider trait and the in-memory reference implementation.
//!
//! The session authority never loads, stores, or rotates key material
//! itself — it reads a snapshot from a [`KeyProvider`] at construction time.
//! Production deployments back the trait with whatever key storage they run
//! (an HSM, a database, a secrets manager); [`MemoryKeyProvider`] serves
//! tests and single-node setups.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{
    error::KeyError,
    keyset::VerificationKeySet,
    signing_key::{SigningKey, VerificationKey},
};

/// Read-only source of signing and verification key material.
///
/// The two methods are the only operations the session core depends on; how
/// keys are persisted or rotated behind them is the implementation's
/// concern. Both reads are expected to reflect a consistent snapshot: the
/// key returned by [`signing_key`](Self::signing_key) must be present in
/// the set returned by [`verification_keys`](Self::verification_keys), or
/// tokens minted by a freshly constructed authority would fail to verify.
#[async_trait]
pub trait KeyProvider: Send + Sync {
    /// Returns the currently active signing key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::NoSigningKey`] if no key is active, or
    /// [`KeyError::Unavailable`] if the backend cannot be reached.
    async fn signing_key(&self) -> Result<SigningKey, KeyError>;

    /// Returns the set of currently accepted verification keys.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Unavailable`] if the backend cannot be reached.
    async fn verification_keys(&self) -> Result<VerificationKeySet, KeyError>;
}

/// Provider state: the active signing key plus every still-accepted
/// verification key. Swapped wholesale on rotation.
struct KeyState {
    signing: SigningKey,
    verification: VerificationKeySet,
}

/// In-memory key provider.
///
/// Generates a fresh Ed25519 pair at construction and keeps all state in
/// process memory. Rotation installs a new signing key while the retired
/// key's public half remains in the verification set, so tokens signed
/// before the rotation keep verifying until they expire.
///
/// # Examples
///
/// ```
/// use sentinel_keys::{KeyProvider, MemoryKeyProvider};
///
/// # async fn example() -> Result<(), sentinel_keys::KeyError> {
/// let provider = MemoryKeyProvider::new("key-2024-001");
/// let signing = provider.signing_key().await?;
/// let keys = provider.verification_keys().await?;
/// assert!(keys.contains(signing.kid()));
/// # Ok(())
/// # }
/// ```
pub struct MemoryKeyProvider {
    state: Arc<RwLock<KeyState>>,
}

impl MemoryKeyProvider {
    /// Creates a provider with a freshly generated key under the given `kid`.
    #[must_use]
    pub fn new(kid: impl Into<String>) -> Self {
        let (signing, verification) = SigningKey::generate(kid);
        let mut set = VerificationKeySet::new();
        set.insert(verification);
        Self { state: Arc::new(RwLock::new(KeyState { signing, verification: set })) }
    }

    /// Creates a provider from existing key material.
    ///
    /// The signing key's public half must already be present in `keys`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidKeyMaterial`] if the signing key's `kid`
    /// is missing from the verification set.
    pub fn with_keys(signing: SigningKey, keys: VerificationKeySet) -> Result<Self, KeyError> {
        if !keys.contains(signing.kid()) {
            return Err(KeyError::invalid_key_material(format!(
                "verification set does not contain the active signing key '{}'",
                signing.kid()
            )));
        }
        Ok(Self { state: Arc::new(RwLock::new(KeyState { signing, verification: keys })) })
    }

    /// Rotates to a freshly generated signing key under `new_kid`.
    ///
    /// The retired key's public half stays in the verification set so
    /// outstanding tokens keep verifying. Returns the new public half.
    pub fn rotate(&self, new_kid: impl Into<String>) -> VerificationKey {
        let (signing, verification) = SigningKey::generate(new_kid);
        let mut state = self.state.write();
        tracing::info!(
            old_kid = %state.signing.kid(),
            new_kid = %verification.kid,
            "rotating signing key"
        );
        state.verification.insert(verification.clone());
        state.signing = signing;
        verification
    }

    /// Drops a retired key from the verification set.
    ///
    /// Call this only once every token signed with `kid` has expired; the
    /// active signing key cannot be retired.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidKeyMaterial`] if `kid` is the active
    /// signing key.
    pub fn retire(&self, kid: &str) -> Result<Option<VerificationKey>, KeyError> {
        let mut state = self.state.write();
        if state.signing.kid() == kid {
            return Err(KeyError::invalid_key_material(format!(
                "cannot retire the active signing key '{kid}'"
            )));
        }
        Ok(state.verification.remove(kid))
    }
}

#[async_trait]
impl KeyProvider for MemoryKeyProvider {
    async fn signing_key(&self) -> Result<SigningKey, KeyError> {
        Ok(self.state.read().signing.clone())
    }

    async fn verification_keys(&self) -> Result<VerificationKeySet, KeyError> {
        Ok(self.state.read().verification.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_provider_snapshot_is_consistent() {
        let provider = MemoryKeyProvider::new("k1");
        let signing = provider.signing_key().await.unwrap();
        let keys = provider.verification_keys().await.unwrap();

        assert_eq!(signing.kid(), "k1");
        assert!(keys.contains("k1"), "active key must appear in the verification set");
        assert_eq!(keys.len(), 1);
    }

    #[tokio::test]
    async fn test_rotate_keeps_retired_public_half() {
        let provider = MemoryKeyProvider::new("k1");
        provider.rotate("k2");

        let signing = provider.signing_key().await.unwrap();
        let keys = provider.verification_keys().await.unwrap();

        assert_eq!(signing.kid(), "k2");
        assert!(keys.contains("k1"), "retired key must remain until its tokens expire");
        assert!(keys.contains("k2"));
    }

    #[tokio::test]
    async fn test_retire_removes_old_key() {
        let provider = MemoryKeyProvider::new("k1");
        provider.rotate("k2");

        let removed = provider.retire("k1").unwrap();
        assert!(removed.is_some());

        let keys = provider.verification_keys().await.unwrap();
        assert!(!keys.contains("k1"));
        assert!(keys.contains("k2"));
    }

    #[tokio::test]
    async fn test_retire_active_key_rejected() {
        let provider = MemoryKeyProvider::new("k1");
        let result = provider.retire("k1");
        assert!(matches!(result, Err(KeyError::InvalidKeyMaterial(_))));
    }

    #[test]
    fn test_with_keys_requires_active_kid_in_set() {
        let (signing, _) = SigningKey::generate("k1");
        let (_, other) = SigningKey::generate("k2");
        let mut set = VerificationKeySet::new();
        set.insert(other);

        let result = MemoryKeyProvider::with_keys(signing, set);
        assert!(matches!(result, Err(KeyError::InvalidKeyMaterial(_))));
    }
}
