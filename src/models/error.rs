use axum::http::StatusCode;
use bb8_postgres::tokio_postgres;
use thiserror::Error;

/// Failure of a model operation, carrying the HTTP status it maps to.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("No such {entity}: {id}")]
    NotFound {
        entity: &'static str,
        id: i32,
    },
    #[error("Number of guests must be at least 1")]
    InvalidGuestCount(i32),
    #[error("Database query failed: {0}")]
    Query(#[from] tokio_postgres::Error),
    #[error(transparent)]
    Connection(#[from] anyhow::Error),
    #[error("Failed to format timestamp: {0}")]
    Format(#[from] time::error::Format),
}

impl ModelError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        ModelError::NotFound { entity, id }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ModelError::NotFound { .. } => StatusCode::NOT_FOUND,
            ModelError::InvalidGuestCount(_) => StatusCode::BAD_REQUEST,
            ModelError::Query(_)
            | ModelError::Connection(_)
            | ModelError::Format(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
