//! Error types for TechCard sessions
//!
//! Provides error handling for:
//! - Transport failures (HTTP status, timeouts, malformed envelopes)
//! - Session misuse (no element selected, unknown keys)
//! - Configuration loading

use std::path::PathBuf;
use techcard_model::CompositeKey;

/// Result alias for transport calls
pub type TransportResult<T> = Result<T, TransportError>;

/// Result alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Failure reported by the transport collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Server answered with a non-success status
    #[error("HTTP error: status {status}")]
    Http {
        /// Status code
        status: u16,
    },

    /// No response within the configured timeout
    #[error("request timed out after {secs}s")]
    Timeout {
        /// Timeout that elapsed
        secs: u64,
    },

    /// Body is not JSON (or not double-encoded JSON)
    #[error("malformed response envelope: {0}")]
    Envelope(String),

    /// Connection-level failure
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

impl TransportError {
    /// Check if retrying the same request may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Unavailable(_))
    }
}

/// A field that fails validation
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidField {
    /// Composite key of the field
    pub key: CompositeKey,
    /// Display name of the field
    pub name: String,
    /// Validation message
    pub message: String,
}

/// Session-level errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Transport round trip failed; session state was left untouched
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Operation needs a selected element
    #[error("no element selected")]
    NoElementSelected,

    /// Element id is not an integer
    #[error("invalid element id: {0:?}")]
    InvalidElementId(String),

    /// Object type id is not an integer
    #[error("invalid object type id: {0:?}")]
    InvalidTypeId(String),

    /// Key does not address a displayed parameter
    #[error("unknown parameter key: {0}")]
    UnknownKey(CompositeKey),

    /// Final submission blocked by invalid fields
    #[error("{} field(s) failed validation", .0.len())]
    InvalidFields(Vec<InvalidField>),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl SessionError {
    /// Check if the operation may be retried unchanged
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_retryable())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// TOML did not parse
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field holds an unusable value
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        /// Field name
        field: &'static str,
        /// What is wrong
        reason: String,
    },
}

impl ConfigError {
    /// Create invalid-field error
    #[inline]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
