use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    ClientError(String),

    #[error("An error occurred while fetching flight offers")]
    UpstreamError,
}

impl ApiError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::ClientError(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl PartialEq for ApiError {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string() && self.status_code() == other.status_code()
    }
}
