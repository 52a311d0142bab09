use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use blog_firebase::{AuthState, IdpCredential, Services};
use blog_types::{caller_token, expired_session_cookie, session_cookie, AuthUser, LoginRequest};

use crate::error::{error_response, ApiError};

#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub auth_state: AuthState,
}

pub fn auth_routes(_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/login", post(handle_login))
        .route("/api/v1/auth/logout", post(handle_logout))
        .route("/api/v1/auth/session", get(get_session))
}

/// Session proof sent with the request: `Authorization: Bearer <token>` or the
/// session cookie.
pub fn request_token(headers: &HeaderMap) -> Option<String> {
    let authHeader = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let cookieHeader = headers.get(header::COOKIE).and_then(|v| v.to_str().ok());
    caller_token(authHeader, cookieHeader)
}

async fn handle_login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, Response> {
    if body.id_token.trim().is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "id_token is required"));
    }

    match state
        .services
        .auth
        .sign_in_with_idp(
            &state.services.google_provider,
            IdpCredential::IdToken(body.id_token),
        )
        .await
    {
        Ok(session) => Ok((
            [(header::SET_COOKIE, session_cookie(&session.handle))],
            Json(session.user),
        )
            .into_response()),
        Err(e) if e.status() == Some(400) => {
            tracing::debug!("google sign-in rejected: {e}");
            Err(error_response(StatusCode::UNAUTHORIZED, "invalid token"))
        }
        Err(e) => Err(ApiError(e).into_response()),
    }
}

async fn handle_logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let signedOut = request_token(&headers)
        .is_some_and(|token| state.services.auth.sign_out_held_by(&token));
    if !signedOut {
        return error_response(StatusCode::UNAUTHORIZED, "not signed in");
    }

    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, expired_session_cookie())],
    )
        .into_response()
}

/// The signed-in user, as seen by the caller: `null` unless it holds the
/// session.
async fn get_session(State(state): State<AppState>, headers: HeaderMap) -> Json<Option<AuthUser>> {
    let token = request_token(&headers);
    Json(
        state
            .auth_state
            .session_held_by(token.as_deref())
            .map(|s| s.user),
    )
}

/// Middleware for write routes: the caller must hold the signed-in session.
/// The session is handed to the handler as a request extension.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = request_token(request.headers());
    let Some(session) = state.auth_state.session_held_by(token.as_deref()) else {
        return error_response(StatusCode::UNAUTHORIZED, "not signed in");
    };

    request.extensions_mut().insert(session);
    next.run(request).await
}
