use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dialectic_core::DialecticError;

/// Private sentinel used to carry an explicit 400 through the
/// `anyhow::Error` chain for request problems that have no core error.
#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if self.0.downcast_ref::<BadRequestError>().is_some() {
            StatusCode::BAD_REQUEST
        } else if let Some(e) = self.0.downcast_ref::<DialecticError>() {
            match e {
                DialecticError::UnknownScenario(_) | DialecticError::UnknownCategory(_) => {
                    StatusCode::BAD_REQUEST
                }
                DialecticError::NotInitialized
                | DialecticError::MissingTemplate(_)
                | DialecticError::InvalidConfig(_)
                | DialecticError::BaseDirMissing(_) => StatusCode::SERVICE_UNAVAILABLE,
                DialecticError::PathEscape(_) => StatusCode::UNPROCESSABLE_ENTITY,
                DialecticError::Io(_) | DialecticError::Yaml(_) | DialecticError::Json(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
