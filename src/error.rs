//! Error types for resource reconciliation

use thiserror::Error;

use crate::resource::ResourceKind;

/// Errors surfaced by the resource controllers
///
/// Remote failures are never classified or retried; they are wrapped with the
/// operation they interrupted and handed back to the caller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The remote API call failed (not found, auth, rate limit, network...)
    #[error("Error {context}: {cause:#}")]
    Remote {
        context: &'static str,
        cause: anyhow::Error,
    },

    /// Adopt found no remote resource with the declared identity
    #[error("could not find {kind} with {field} {key}")]
    NotMatched {
        kind: ResourceKind,
        field: &'static str,
        key: String,
    },

    /// A declared configuration entry is not a flat key/value pair
    #[error("invalid configuration entry {key:?}: {reason}")]
    InvalidConfiguration { key: String, reason: String },

    /// The kind has no in-place update path; the resource must be replaced
    #[error("{kind} cannot be updated in place")]
    UpdateUnsupported { kind: ResourceKind },

    /// The operation needs a remote identifier and the record has none
    #[error("{kind} has no remote identifier")]
    Unmanaged { kind: ResourceKind },
}

impl Error {
    /// Wrap a remote failure with the operation that was in progress
    pub fn remote(context: &'static str, cause: anyhow::Error) -> Self {
        Self::Remote { context, cause }
    }

    /// Create an invalid configuration error for the given key
    pub fn invalid_configuration(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
