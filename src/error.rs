//! HTTP error mapping.
//!
//! Every failure leaves the service as `{"detail": "<message>"}` with the status chosen here.
//! Handler logic returns typed errors and only this module decides status codes.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Input rejected before any upstream call (400).
    #[error("{0}")]
    BadRequest(String),

    /// The request body could not be read as JSON of the expected shape.
    #[error("{detail}")]
    UnreadableBody { status: StatusCode, detail: String },

    /// The completion service or its response failed (500).
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::UnreadableBody { status, .. } => *status,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::UnreadableBody {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}
