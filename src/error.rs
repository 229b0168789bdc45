//! Unified error types for the sample tracking API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

/// Unified error type for the sample tracking API.
#[derive(Error, Debug)]
pub enum ApiError {
    /// No sample matches the requested identifier.
    #[error("sample {sample_id} not found")]
    SampleNotFound {
        /// The business identifier that matched nothing.
        sample_id: String,
    },

    /// No test matches the requested (sample, type) pair.
    #[error("test {test_type} for sample {sample_id} not found")]
    TestNotFound {
        /// Sample the test was looked up under.
        sample_id: String,
        /// Test type that matched nothing.
        test_type: String,
    },

    /// Database operation error.
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

impl ApiError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::SampleNotFound { .. } | ApiError::TestNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON body returned for failed requests.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Short human-readable message.
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!("request failed: {}", self);
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_variants_map_to_404() {
        let err = ApiError::SampleNotFound {
            sample_id: "abc".to_string(),
        };
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = ApiError::TestNotFound {
            sample_id: "abc".to_string(),
            test_type: "cbc".to_string(),
        };
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn database_errors_map_to_500() {
        let err = ApiError::Database(mongodb::error::Error::custom("boom"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn messages_name_the_missing_record() {
        let err = ApiError::SampleNotFound {
            sample_id: "s-1".to_string(),
        };
        assert_eq!(err.to_string(), "sample s-1 not found");

        let err = ApiError::TestNotFound {
            sample_id: "s-1".to_string(),
            test_type: "cbc".to_string(),
        };
        assert_eq!(err.to_string(), "test cbc for sample s-1 not found");
    }
}
