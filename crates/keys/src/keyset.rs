//! Verification key set, keyed by `kid`.
//!
//! A [`VerificationKeySet`] holds every public key whose signatures are
//! currently accepted. During zero-downtime rotation a retiring key stays in
//! the set until all tokens signed with it have expired, while the new key
//! is already present so freshly minted tokens verify everywhere.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::signing_key::VerificationKey;

/// The set of currently accepted verification keys.
///
/// Keys are unique by `kid`; insertion order is irrelevant. The set is a
/// plain value type — the session authority treats it as immutable and
/// models rotation as an atomic swap of the whole set, never an in-place
/// mutation visible to concurrent readers.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VerificationKeySet {
    keys: HashMap<String, VerificationKey>,
}

impl VerificationKeySet {
    /// Creates an empty set.
    ///
    /// An empty set can never verify anything; the session authority
    /// rejects it at construction time.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a key, replacing any existing key with the same `kid`.
    ///
    /// Returns the replaced key if one was present.
    pub fn insert(&mut self, key: VerificationKey) -> Option<VerificationKey> {
        self.keys.insert(key.kid.clone(), key)
    }

    /// Removes the key with the given `kid`, if present.
    pub fn remove(&mut self, kid: &str) -> Option<VerificationKey> {
        self.keys.remove(kid)
    }

    /// Looks up a key by `kid`.
    #[must_use]
    pub fn get(&self, kid: &str) -> Option<&VerificationKey> {
        self.keys.get(kid)
    }

    /// Whether the set contains a key with the given `kid`.
    #[must_use]
    pub fn contains(&self, kid: &str) -> bool {
        self.keys.contains_key(kid)
    }

    /// Number of keys in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterates over the keys in the set (order unspecified).
    pub fn iter(&self) -> impl Iterator<Item = &VerificationKey> {
        self.keys.values()
    }

    /// Iterates over the key identifiers in the set (order unspecified).
    pub fn kids(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }
}

impl FromIterator<VerificationKey> for VerificationKeySet {
    fn from_iter<I: IntoIterator<Item = VerificationKey>>(iter: I) -> Self {
        let mut set = Self::new();
        for key in iter {
            set.insert(key);
        }
        set
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::signing_key::SigningKey;

    #[test]
    fn test_empty_set() {
        let set = VerificationKeySet::new();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert!(set.get("k1").is_none());
    }

    #[test]
    fn test_insert_and_lookup() {
        let (_, k1) = SigningKey::generate("k1");
        let (_, k2) = SigningKey::generate("k2");

        let set: VerificationKeySet = [k1, k2].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains("k1"));
        assert!(set.contains("k2"));
        assert!(!set.contains("k3"));
        assert_eq!(set.get("k1").unwrap().kid, "k1");
    }

    #[test]
    fn test_insert_replaces_same_kid() {
        let (_, first) = SigningKey::generate("shared");
        let (_, second) = SigningKey::generate("shared");

        let mut set = VerificationKeySet::new();
        assert!(set.insert(first.clone()).is_none());
        let replaced = set.insert(second.clone()).expect("first key should be replaced");

        assert_eq!(replaced.public_key, first.public_key);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("shared").unwrap().public_key, second.public_key);
    }

    #[test]
    fn test_remove() {
        let (_, key) = SigningKey::generate("k1");
        let mut set = VerificationKeySet::new();
        set.insert(key);

        assert!(set.remove("k1").is_some());
        assert!(set.remove("k1").is_none());
        assert!(set.is_empty());
    }

    #[test]
    fn test_kids_iteration() {
        let set: VerificationKeySet =
            ["a", "b", "c"].into_iter().map(|kid| SigningKey::generate(kid).1).collect();

        let mut kids: Vec<&str> = set.kids().collect();
        kids.sort_unstable();
        assert_eq!(kids, ["a", "b", "c"]);
    }
}
