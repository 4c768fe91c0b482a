//! The session authority: construction, generate, verify, rotation.
//!
//! A [`SessionAuthority`] binds one active signing key and a set of
//! verification keys, captured from a key provider snapshot at construction
//! time, to the two operations everything else reduces to:
//!
//! ```text
//! login flow ──► generate(subject) ──► token ──► (transport) ──► verify(token) ──► claims
//! ```
//!
//! After construction the authority performs no I/O and holds no per-session
//! state. `generate` and `verify` may be called concurrently from any number
//! of callers; key rotation swaps the verifier set atomically so in-flight
//! verifications always see a complete, consistent set.

use std::{collections::HashMap, sync::Arc, time::Duration};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use parking_lot::RwLock;
use sentinel_keys::{KeyAlgorithm, KeyProvider, SigningKey, VerificationKeySet};
use serde::Deserialize;

use crate::{
    claims::SessionClaims,
    error::{ConstructionError, GenerationError, VerificationError},
    validation::validate_algorithm,
};

/// Default session lifetime: 60 minutes.
///
/// A policy placeholder, not a recommendation — deployments should pass an
/// explicit lifetime from configuration. [`SessionAuthority::new`] takes
/// the lifetime as a required parameter precisely so this value never hides
/// inside the generate path.
pub const DEFAULT_SESSION_LIFETIME: Duration = Duration::from_secs(60 * 60);

/// Token header fields the verify path inspects before any key lookup.
///
/// Parsed manually (rather than via `jsonwebtoken::decode_header`) so that
/// hostile algorithm names like `"none"` reach the algorithm deny list
/// instead of failing JSON enum parsing with a misleading error class.
#[derive(Deserialize)]
struct TokenHeader {
    alg: String,
    #[serde(default)]
    kid: Option<String>,
}

/// Issues and verifies signed, time-bounded session tokens.
///
/// Construct once at startup from a key provider snapshot; the instance
/// lives for the process lifetime. Rotation replaces the verification set
/// wholesale via [`rotate_verification_keys`](Self::rotate_verification_keys)
/// — keys are never mutated in place.
///
/// # Concurrency
///
/// `Send + Sync`; [`generate`](Self::generate) and [`verify`](Self::verify)
/// take `&self` and perform no shared mutable state changes. `verify` takes
/// a brief read lock only to clone the current verifier-set `Arc`.
pub struct SessionAuthority {
    /// `kid` embedded in the header of every minted token.
    kid: String,
    /// Signing key, prepared once at construction.
    encoding_key: EncodingKey,
    /// Decoding keys by `kid`. Replaced atomically on rotation.
    verifiers: RwLock<Arc<HashMap<String, DecodingKey>>>,
    session_lifetime: Duration,
}

impl SessionAuthority {
    /// Binds key material and a session lifetime into an authority.
    ///
    /// All key material is validated here, at startup — a key that cannot
    /// decode must fail the process, not the first request.
    ///
    /// # Errors
    ///
    /// - [`ConstructionError::ZeroSessionLifetime`] if `session_lifetime` is zero
    /// - [`ConstructionError::UnsupportedAlgorithm`] if the signing key is not Ed25519
    /// - [`ConstructionError::InvalidSigningKey`] if the private key material is unusable
    /// - [`ConstructionError::EmptyVerificationKeySet`] if `verification_keys` is empty
    /// - [`ConstructionError::InvalidVerificationKey`] if any public key fails to decode
    pub fn new(
        signing_key: SigningKey,
        verification_keys: VerificationKeySet,
        session_lifetime: Duration,
    ) -> Result<Self, ConstructionError> {
        if session_lifetime.is_zero() {
            return Err(ConstructionError::ZeroSessionLifetime);
        }

        match signing_key.algorithm() {
            KeyAlgorithm::Ed25519 => {},
            other => {
                return Err(ConstructionError::UnsupportedAlgorithm {
                    algorithm: other.to_string(),
                });
            },
        }

        // Deriving the public half exercises the private material end to
        // end; unusable DER fails here rather than on the first login.
        signing_key
            .verification_key()
            .map_err(|e| ConstructionError::InvalidSigningKey(e.to_string()))?;

        let verifiers = build_verifiers(&verification_keys)?;

        tracing::info!(
            kid = %signing_key.kid(),
            verification_keys = verification_keys.len(),
            lifetime_secs = session_lifetime.as_secs(),
            "session authority constructed"
        );

        Ok(Self {
            kid: signing_key.kid().to_owned(),
            encoding_key: EncodingKey::from_ed_der(signing_key.pkcs8_der()),
            verifiers: RwLock::new(Arc::new(verifiers)),
            session_lifetime,
        })
    }

    /// Like [`new`](Self::new), with [`DEFAULT_SESSION_LIFETIME`].
    pub fn with_default_lifetime(
        signing_key: SigningKey,
        verification_keys: VerificationKeySet,
    ) -> Result<Self, ConstructionError> {
        Self::new(signing_key, verification_keys, DEFAULT_SESSION_LIFETIME)
    }

    /// Constructs an authority from a key provider snapshot.
    ///
    /// Performs the provider's two reads, then delegates to [`new`](Self::new).
    /// This is the only I/O the authority is ever involved in, and it
    /// happens before the authority exists.
    ///
    /// # Errors
    ///
    /// [`ConstructionError::KeyProvider`] if either read fails, plus every
    /// error [`new`](Self::new) can return.
    pub async fn from_provider(
        provider: &dyn KeyProvider,
        session_lifetime: Duration,
    ) -> Result<Self, ConstructionError> {
        let signing_key = provider.signing_key().await?;
        let verification_keys = provider.verification_keys().await?;
        Self::new(signing_key, verification_keys, session_lifetime)
    }

    /// Mints a signed session token for `subject`.
    ///
    /// Captures the current wall clock as `iat`, sets
    /// `exp = iat + session_lifetime`, and signs `{sub, iat, exp}` with the
    /// bound key, `kid` in the header. The authority does not check that
    /// the subject exists — that is the caller's responsibility.
    ///
    /// No server-side state is created: there is no session table and no
    /// revocation list in this core.
    ///
    /// # Errors
    ///
    /// - [`GenerationError::EmptySubject`] if `subject` is empty
    /// - [`GenerationError::SigningFailed`] if the signing operation fails;
    ///   surfaced to the caller, never retried
    #[tracing::instrument(skip(self, subject))]
    pub fn generate(&self, subject: &str) -> Result<String, GenerationError> {
        if subject.is_empty() {
            return Err(GenerationError::EmptySubject);
        }

        let iat = Utc::now().timestamp() as u64;
        // Saturate so an absurd configured lifetime cannot wrap `exp` into
        // the past.
        let exp = iat.saturating_add(self.session_lifetime.as_secs());
        let claims = SessionClaims { sub: subject.to_owned(), iat, exp };

        let mut header = Header::new(Algorithm::EdDSA);
        header.kid = Some(self.kid.clone());

        let token = jsonwebtoken::encode(&header, &claims, &self.encoding_key)
            .map_err(|e| GenerationError::SigningFailed(e.to_string()))?;

        tracing::debug!(kid = %self.kid, exp, "session token minted");
        Ok(token)
    }

    /// Verifies an untrusted token and returns its claims.
    ///
    /// Four checks run on every call, none skippable: the header's `kid`
    /// must be in the verification set, the signature must verify, the
    /// claims must be structurally complete, and the token must not be
    /// expired. Idempotent — a valid token verifies identically until it
    /// expires.
    ///
    /// # Errors
    ///
    /// One of the four [`VerificationError`] reasons. Callers facing an
    /// untrusted client must collapse all of them into a uniform
    /// "unauthenticated" response.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, VerificationError> {
        self.verify_at(token, Utc::now())
    }

    /// [`verify`](Self::verify) against an explicit instant.
    ///
    /// Exists so expiry semantics are testable without sleeping or mocking
    /// the system clock; production callers use [`verify`](Self::verify).
    #[tracing::instrument(skip(self, token, now))]
    pub fn verify_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionClaims, VerificationError> {
        let header = parse_header(token)?;
        validate_algorithm(&header.alg)?;

        let kid = match header.kid {
            Some(kid) if !kid.is_empty() => kid,
            _ => return Err(VerificationError::Malformed("header missing 'kid'".into())),
        };

        // Snapshot the verifier set; rotation swaps the Arc, so this
        // verification keeps a consistent view even mid-rotation.
        let verifiers = Arc::clone(&self.verifiers.read());
        let decoding_key =
            verifiers.get(&kid).ok_or_else(|| VerificationError::UnknownKey { kid: kid.clone() })?;

        // Expiry is checked explicitly below with zero leeway; the
        // library's lenient default (60s) would move the boundary.
        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        // `iat` presence is enforced by the claims struct itself.
        validation.set_required_spec_claims(&["sub", "exp"]);

        let data = jsonwebtoken::decode::<SessionClaims>(token, decoding_key, &validation)?;
        let claims = data.claims;

        if claims.sub.is_empty() {
            return Err(VerificationError::Malformed("empty 'sub' claim".into()));
        }
        if claims.exp <= claims.iat {
            return Err(VerificationError::Malformed("'exp' is not after 'iat'".into()));
        }
        if claims.is_expired_at(now) {
            return Err(VerificationError::Expired);
        }

        tracing::debug!(kid = %kid, "session token verified");
        Ok(claims)
    }

    /// Replaces the verification key set atomically.
    ///
    /// The new set is validated exactly like at construction; on any error
    /// the current set stays in place untouched. In-flight verifications
    /// that already snapshotted the old set complete against it.
    ///
    /// Note the direction of rotation: this replaces only the *verify*
    /// side. Adopting a new *signing* key means constructing a new
    /// authority, since the signing key is bound for the instance lifetime.
    ///
    /// # Errors
    ///
    /// [`ConstructionError::EmptyVerificationKeySet`] or
    /// [`ConstructionError::InvalidVerificationKey`].
    pub fn rotate_verification_keys(
        &self,
        verification_keys: VerificationKeySet,
    ) -> Result<(), ConstructionError> {
        let verifiers = Arc::new(build_verifiers(&verification_keys)?);
        *self.verifiers.write() = verifiers;
        tracing::info!(
            verification_keys = verification_keys.len(),
            "verification key set replaced"
        );
        Ok(())
    }

    /// `kid` of the bound signing key.
    #[must_use]
    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// The configured session lifetime.
    #[must_use]
    pub fn session_lifetime(&self) -> Duration {
        self.session_lifetime
    }

    /// Key identifiers currently accepted on the verify path.
    #[must_use]
    pub fn verification_kids(&self) -> Vec<String> {
        self.verifiers.read().keys().cloned().collect()
    }
}

impl std::fmt::Debug for SessionAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAuthority")
            .field("kid", &self.kid)
            .field("verification_keys", &self.verifiers.read().len())
            .field("session_lifetime", &self.session_lifetime)
            .finish()
    }
}

/// Parses the header segment of a compact token without verification.
fn parse_header(token: &str) -> Result<TokenHeader, VerificationError> {
    let mut segments = token.split('.');
    let header_b64 = segments
        .next()
        .ok_or_else(|| VerificationError::Malformed("empty token".into()))?;
    if segments.count() != 2 {
        return Err(VerificationError::Malformed(
            "token must have 3 segments separated by dots".into(),
        ));
    }

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header_b64)
        .map_err(|e| VerificationError::Malformed(format!("header is not valid base64url: {e}")))?;

    serde_json::from_slice(&header_bytes)
        .map_err(|e| VerificationError::Malformed(format!("header is not valid JSON: {e}")))
}

/// Decodes every key in the set into a ready-to-use verifier map.
fn build_verifiers(
    keys: &VerificationKeySet,
) -> Result<HashMap<String, DecodingKey>, ConstructionError> {
    if keys.is_empty() {
        return Err(ConstructionError::EmptyVerificationKeySet);
    }

    let mut verifiers = HashMap::with_capacity(keys.len());
    for key in keys.iter() {
        match key.algorithm {
            KeyAlgorithm::Ed25519 => {},
            other => {
                return Err(ConstructionError::InvalidVerificationKey {
                    kid: key.kid.clone(),
                    reason: format!("unsupported algorithm: {other}"),
                });
            },
        }
        let point = key.decode().map_err(|e| ConstructionError::InvalidVerificationKey {
            kid: key.kid.clone(),
            reason: e.to_string(),
        })?;
        verifiers.insert(key.kid.clone(), DecodingKey::from_ed_der(&*point));
    }
    Ok(verifiers)
}
