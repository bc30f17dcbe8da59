//! Error types for provisioning runs.
//!
//! Store calls fail with [`StoreError`]; the engine wraps those into
//! [`ProvisionError`] together with the phase of the run that failed.

use std::fmt;

/// The kind of entity an operation or reference concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A permission scoped to an application.
    Permission,
    /// A role scoped to an application.
    Role,
    /// A group (not scoped to an application).
    Group,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permission => write!(f, "permission"),
            Self::Role => write!(f, "role"),
            Self::Group => write!(f, "group"),
        }
    }
}

/// Errors returned by a [`DirectoryStore`](crate::DirectoryStore) call.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The request never produced a response (connect, TLS, timeout).
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// The store answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The response body, as returned by the store.
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("Failed to decode response: {message}")]
    Decode {
        /// Description of the decoding failure.
        message: String,
    },
}

impl StoreError {
    /// Creates a new `Transport` error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a new `Status` error.
    #[must_use]
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Creates a new `Decode` error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Returns the HTTP status if the store answered at all.
    #[must_use]
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A terminating failure of a provisioning run.
///
/// There is no partial-success result: the first error stops the run and
/// entities created before it remain in the store.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// The bearer token could not be obtained.
    #[error("Authentication failed: {message}")]
    Authentication {
        /// Description of the authentication failure.
        message: String,
    },

    /// Loading the current state of the store failed; nothing was written.
    #[error("Failed to load existing {entity}s: {source}")]
    StoreRead {
        /// Which listing failed.
        entity: EntityKind,
        /// The underlying store error.
        #[source]
        source: StoreError,
    },

    /// A create or attach call failed; earlier writes were not undone.
    #[error("Failed to {operation}: {source}")]
    StoreWrite {
        /// Human-readable description of the failed write.
        operation: String,
        /// The underlying store error.
        #[source]
        source: StoreError,
    },

    /// A declared reference does not resolve to exactly one entity.
    #[error("Unresolvable {kind} reference '{reference}' in {scope}")]
    UnresolvableReference {
        /// The kind of entity that was referenced.
        kind: EntityKind,
        /// The declared name that failed to resolve.
        reference: String,
        /// Where the reference was declared (role or group).
        scope: String,
    },
}

impl ProvisionError {
    /// Creates a new `Authentication` error.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Creates a new `StoreRead` error.
    #[must_use]
    pub fn store_read(entity: EntityKind, source: StoreError) -> Self {
        Self::StoreRead { entity, source }
    }

    /// Creates a new `StoreWrite` error.
    #[must_use]
    pub fn store_write(operation: impl Into<String>, source: StoreError) -> Self {
        Self::StoreWrite {
            operation: operation.into(),
            source,
        }
    }

    /// Creates a new `UnresolvableReference` error.
    #[must_use]
    pub fn unresolvable(
        kind: EntityKind,
        reference: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self::UnresolvableReference {
            kind,
            reference: reference.into(),
            scope: scope.into(),
        }
    }

    /// Returns `true` if the run stopped on a model/state mismatch rather than
    /// on an I/O failure.
    #[must_use]
    pub fn is_unresolvable_reference(&self) -> bool {
        matches!(self, Self::UnresolvableReference { .. })
    }
}

/// Errors raised while loading a declarative model file.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON model: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid TOML model: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported model format '{0}' (expected .json or .toml)")]
    UnsupportedFormat(String),
}
