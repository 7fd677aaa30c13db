//! Error types for the site provider.

use thiserror::Error;

use crate::model::ManagedRecord;

/// Failures reported by a [`SiteService`](crate::service::SiteService).
///
/// The remote service only distinguishes "nothing matched the lookup" from
/// every other failure; anything else is passed through as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The lookup matched no site.
    #[error("site not found: {0}")]
    NotFound(String),

    /// Any transport or server failure.
    #[error("{0}")]
    Failed(String),
}

impl ServiceError {
    /// Create a generic service failure.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

/// Errors surfaced by the lifecycle operations.
#[derive(Debug, Error)]
pub enum SiteError {
    /// A required field is missing from the declared configuration.
    #[error("Validation error: {0}")]
    Validation(String),

    /// No site with the given name exists in the remote service.
    #[error("Site not found: {0}")]
    NotFound(String),

    /// No site with the given identity exists; the import cannot proceed.
    #[error("Cannot import site {0}: no site with that id")]
    ImportNotFound(String),

    /// The remote service failed.
    #[error("Remote service error: {0}")]
    Remote(#[from] ServiceError),

    /// The site was created but reading it back failed.
    ///
    /// `record` carries the identity the service assigned so the site can
    /// still be tracked, updated or deleted.
    #[error("Site {} was created but could not be read back: {source}", .record.id)]
    Unverified {
        /// The record as created, with its remote identity.
        record: ManagedRecord,
        /// Why the read-back failed.
        source: Box<SiteError>,
    },

    /// The requested resource or data source type is not served.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// State or configuration could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SiteError {
    /// Get the error message as a string.
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(msg) => msg,
            Self::NotFound(msg) => msg,
            Self::ImportNotFound(msg) => msg,
            Self::Remote(ServiceError::NotFound(msg)) => msg,
            Self::Remote(ServiceError::Failed(msg)) => msg,
            Self::Unverified { source, .. } => source.message(),
            Self::UnknownResource(msg) => msg,
            Self::Serialization(_err) => "serialization error (see Debug output)",
        }
    }

    /// Whether this error means the tracked site no longer exists remotely.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// The record to keep tracking when an operation failed after the site
    /// was already created remotely.
    pub fn record(&self) -> Option<&ManagedRecord> {
        match self {
            Self::Unverified { record, .. } => Some(record),
            _ => None,
        }
    }
}
