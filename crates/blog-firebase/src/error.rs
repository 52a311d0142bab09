use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FirebaseError {
    #[error("invalid firebase configuration: {0}")]
    Config(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not signed in")]
    NotSignedIn,
    #[error("firebase api error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("failed to decode firebase response: {0}")]
    Decode(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Error codes after which a stored refresh token is useless.
const REJECTED_CREDENTIAL_CODES: &[&str] = &[
    "TOKEN_EXPIRED",
    "INVALID_REFRESH_TOKEN",
    "USER_DISABLED",
    "USER_NOT_FOUND",
];

impl FirebaseError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the service refused the session's credentials outright.
    pub fn is_credential_rejected(&self) -> bool {
        match self {
            Self::Api { message, .. } => REJECTED_CREDENTIAL_CODES
                .iter()
                .any(|code| message.starts_with(code)),
            _ => false,
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Google APIs wrap failures as `{"error": {"code", "message", "status"}}`.
/// Anything else is passed through as raw text.
pub(crate) fn api_error(status: u16, body: &str) -> FirebaseError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    FirebaseError::Api { status, message }
}

pub(crate) async fn check_response(
    response: reqwest::Response,
) -> Result<reqwest::Response, FirebaseError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(api_error(status.as_u16(), &body))
}

pub(crate) fn decode_error(e: impl std::fmt::Display) -> FirebaseError {
    FirebaseError::Decode(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_google_error_envelope() {
        let body = r#"{"error":{"code":400,"message":"INVALID_IDP_RESPONSE : bad token","status":"INVALID_ARGUMENT"}}"#;
        let err = api_error(400, body);
        assert_eq!(err.status(), Some(400));
        assert_eq!(
            err.to_string(),
            "firebase api error (400): INVALID_IDP_RESPONSE : bad token"
        );
        assert!(!err.is_credential_rejected());
    }

    #[test]
    fn falls_back_to_raw_body() {
        let err = api_error(502, "  upstream down\n");
        assert_eq!(err.to_string(), "firebase api error (502): upstream down");
    }

    #[test]
    fn recognizes_rejected_credentials() {
        let body = r#"{"error":{"code":400,"message":"TOKEN_EXPIRED","status":"INVALID_ARGUMENT"}}"#;
        assert!(api_error(400, body).is_credential_rejected());
        assert!(!FirebaseError::NotSignedIn.is_credential_rejected());
    }
}
