use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use faredesk_core::CoreError;
use serde_json::json;

/// HTTP-facing error wrapper. Every response body carries a stable machine
/// `code` next to the human-readable message, so clients can branch on
/// seat/price failures without string matching.
#[derive(Debug)]
pub enum AppError {
    Unauthenticated(String),
    Core(CoreError),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", msg),
            AppError::Core(err) => {
                let status = match &err {
                    CoreError::Validation(_)
                    | CoreError::PriceMismatch { .. }
                    | CoreError::InsufficientInventory { .. } => StatusCode::BAD_REQUEST,
                    CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
                    CoreError::NotFound(_) => StatusCode::NOT_FOUND,
                    CoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let code = err.code();
                let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!("Internal Server Error: {}", err);
                    "Internal Server Error".to_string()
                } else {
                    err.to_string()
                };
                (status, code, message)
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "code": code,
            "error": message,
        }));

        (status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        Self::Core(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}
