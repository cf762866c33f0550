//! Error types for catalog operations.
//!
//! [`CatalogError`] is what callers see. Store failures are wrapped as
//! [`CatalogError::Internal`] together with the name of the operation that
//! failed; the underlying [`StoreError`] stays reachable through
//! [`std::error::Error::source`] for logging but never appears in the message.

/// Failure raised by the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Store call interrupted")]
    Interrupted,

    #[error("Runtime error: {0}")]
    Runtime(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{0}")]
    InvalidParameter(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("internal error during {op}")]
    Internal {
        op: &'static str,
        #[source]
        source: StoreError,
    },
}

impl CatalogError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Wrap a store failure, logging the cause.
    pub fn internal(op: &'static str, source: impl Into<StoreError>) -> Self {
        let source = source.into();
        tracing::error!(op, error = %source, "catalog store call failed");
        Self::Internal { op, source }
    }

    /// Stable classification code for transport layers.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidParameter(_) => "invalid",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Internal { .. } => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Result type for raw store calls, before they are tagged with an operation.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Attach an operation name to a store result.
pub(crate) trait StoreResultExt<T> {
    fn op(self, op: &'static str) -> Result<T>;
}

impl<T> StoreResultExt<T> for StoreResult<T> {
    fn op(self, op: &'static str) -> Result<T> {
        self.map_err(|e| CatalogError::internal(op, e))
    }
}
