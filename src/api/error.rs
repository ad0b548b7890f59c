//! HTTP error mapping.
//!
//! Every failure leaves the API as an [`ApiResponse`] with `success: false`,
//! so clients can branch on the flag instead of the status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::envelope::ApiResponse;
use crate::entity::FieldErrors;
use crate::error::QuickNotesError;

pub const NOT_FOUND_MESSAGE: &str = "Note not found";
pub const VALIDATION_MESSAGE: &str = "Validation failed";
pub const MALFORMED_BODY_MESSAGE: &str = "Malformed JSON body";
pub const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub errors: Option<FieldErrors>,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: NOT_FOUND_MESSAGE.to_string(),
            errors: None,
        }
    }

    pub fn validation(errors: FieldErrors) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: VALIDATION_MESSAGE.to_string(),
            errors: Some(errors),
        }
    }

    pub fn malformed_body() -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: MALFORMED_BODY_MESSAGE.to_string(),
            errors: None,
        }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: INTERNAL_MESSAGE.to_string(),
            errors: None,
        }
    }
}

impl From<QuickNotesError> for ApiError {
    fn from(err: QuickNotesError) -> Self {
        match err {
            QuickNotesError::NotFound(_) => ApiError::not_found(),
            QuickNotesError::Validation(errors) => ApiError::validation(errors),
            other => {
                tracing::error!(error = %other, "request failed");
                ApiError::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()>::failure(self.message, self.errors);
        (self.status, Json(body)).into_response()
    }
}
