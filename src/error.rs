//! Error types for assembly composition and lifecycle operations.

use thiserror::Error;

/// Errors surfaced by the composition engine and its collaborators.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Record, component, flavor or account absent from the store.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Stored or queued JSON could not be decoded.
    #[error("Malformed {what}: {reason}")]
    Malformed { what: String, reason: String },

    /// One component failed to resolve during aggregation. The assembly keeps
    /// the components resolved before the failure.
    #[error("Failed to resolve component {component_id} after {resolved} resolved: {source}")]
    PartialAggregation {
        component_id: String,
        resolved: usize,
        #[source]
        source: Box<ApiError>,
    },

    /// An update call to the record store failed. In-memory state may
    /// already reflect the attempted change.
    #[error("Failed to persist {kind} {id}: {source}")]
    PersistenceFailure {
        kind: &'static str,
        id: String,
        #[source]
        source: Box<ApiError>,
    },

    /// The status change was persisted but the event write failed.
    #[error("Status '{status}' persisted for assembly {assembly_id} but notification failed: {source}")]
    NotificationFailure {
        assembly_id: String,
        status: String,
        #[source]
        source: Box<ApiError>,
    },

    /// A list or lookup returned zero records.
    #[error("No records found: {0}")]
    EmptyResult(String),

    #[error("Policy index {index} out of range ({len} policies)")]
    PolicyIndexOutOfRange { index: usize, len: usize },

    #[error("No outputs found to update")]
    NoOutputsFound,

    #[error("Invalid tosca type: {0}")]
    InvalidToscaType(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Transport-level failure reported by a collaborator.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] sled::Error),
}

impl ApiError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        ApiError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn malformed(what: impl Into<String>, reason: impl ToString) -> Self {
        ApiError::Malformed {
            what: what.into(),
            reason: reason.to_string(),
        }
    }

    /// True when a status change is durable but its notification was lost.
    ///
    /// Callers should re-emit the event rather than write the status again.
    pub fn is_persisted_but_not_notified(&self) -> bool {
        matches!(self, ApiError::NotificationFailure { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}
