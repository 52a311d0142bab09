use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use blog_firebase::FirebaseError;
use blog_types::ErrorResponse;
use tracing::{error, warn};

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Wraps backend failures so handlers can use `?`.
#[derive(Debug)]
pub struct ApiError(pub FirebaseError);

impl From<FirebaseError> for ApiError {
    fn from(e: FirebaseError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            FirebaseError::InvalidInput(message) => error_response(StatusCode::BAD_REQUEST, message),
            FirebaseError::NotSignedIn => error_response(StatusCode::UNAUTHORIZED, "not signed in"),
            FirebaseError::Api { status: 401 | 403, message } => {
                warn!("firebase refused request: {message}");
                error_response(StatusCode::FORBIDDEN, "permission denied")
            }
            FirebaseError::Config(message) => {
                error!("firebase misconfigured: {message}");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
            e => {
                warn!("firebase request failed: {e}");
                error_response(StatusCode::BAD_GATEWAY, "upstream service unavailable")
            }
        }
    }
}
