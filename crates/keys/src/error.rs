//! Key provider and key material errors.

use thiserror::Error;

/// Errors surfaced by key providers and key material handling.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]` — new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KeyError {
    /// The provider has no signing key available.
    #[error("no signing key available")]
    NoSigningKey,

    /// Key material could not be decoded or failed structural validation.
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// The provider backend could not be reached.
    #[error("key provider unavailable: {message}")]
    Unavailable {
        /// Human-readable description of the failure.
        message: String,
        /// The underlying error, when one exists.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl KeyError {
    /// Creates an [`KeyError::InvalidKeyMaterial`] from any displayable reason.
    pub fn invalid_key_material(reason: impl std::fmt::Display) -> Self {
        Self::InvalidKeyMaterial(reason.to_string())
    }

    /// Creates an [`KeyError::Unavailable`] with a message and no source.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable { message: message.into(), source: None }
    }
}

/// Result type alias for key provider operations.
pub type Result<T> = std::result::Result<T, KeyError>;
