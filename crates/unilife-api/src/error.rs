use thiserror::Error;

use unilife_core::store::StoreError;

/// Stable machine-readable codes for the transport layer to map onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ConfigurationMissing,
    InvalidCost,
    NotFound,
    InvalidArgument,
    Conflict,
    Retryable,
    Internal,
}

/// Inbound API errors.
///
/// An already-decided slot is deliberately NOT in this list; it is an
/// informational response, not a failure.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The user has never submitted settings; nothing can be answered.
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),
    /// Rejected before any mutation.
    #[error("invalid cost: {0}")]
    InvalidCost(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("conflict: {0}")]
    Conflict(String),
    /// Persistence failed after the operation was rolled back; the caller
    /// may safely retry.
    #[error("retryable: {0}")]
    Retryable(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::ConfigurationMissing(_) => ErrorCode::ConfigurationMissing,
            Self::InvalidCost(_) => ErrorCode::InvalidCost,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Conflict(_) => ErrorCode::Conflict,
            Self::Retryable(_) => ErrorCode::Retryable,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => ApiError::NotFound(msg),
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
