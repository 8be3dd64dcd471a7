//! Request-level error taxonomy.
//!
//! Every import, sync, and search operation returns a [`ServiceResult`], so
//! callers can tell an unreachable external service apart from a bad request
//! or a local failure. Lower layers (store, db, config) keep using
//! `anyhow::Result` and are mapped to [`ServiceError::Internal`] at the
//! component boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The requested Wikipedia page does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An outbound HTTP call failed, timed out, or returned a non-success status.
    #[error("service unavailable: {0}")]
    Transport(String),

    /// The caller supplied invalid input.
    #[error("{0}")]
    Validation(String),

    /// Unexpected local failure (storage, formatting, response decoding).
    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

impl ServiceError {
    /// Machine-readable code used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Transport(_) => "service_unavailable",
            ServiceError::Validation(_) => "bad_request",
            ServiceError::Internal(_) => "internal",
        }
    }

    /// Wrap a lower-layer error as [`ServiceError::Internal`], keeping the cause chain.
    pub fn internal(err: anyhow::Error) -> Self {
        ServiceError::Internal(format!("{:#}", err))
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::Internal(format!("invalid response body: {}", err))
        } else {
            ServiceError::Transport(err.to_string())
        }
    }
}
