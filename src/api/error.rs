use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::error::Error;

const INTERNAL_ERROR_MESSAGE: &str = "internal server error occurred";

#[derive(Debug, Serialize)]
struct ErrorBody {
    status: &'static str,
    error: String,
}

/// Maps library errors onto HTTP responses. Storage details stay in the log.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Error::EventNotFound(_) => StatusCode::NOT_FOUND,
            Error::DuplicateEvent => StatusCode::CONFLICT,
            Error::StorageUnavailable(_) | Error::ParseFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() {
            error!(error = ?self.0, "request failed");
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.0.to_string()
        };

        let body = ErrorBody {
            status: status.canonical_reason().unwrap_or("Unknown"),
            error: message,
        };

        (status, Json(body)).into_response()
    }
}
