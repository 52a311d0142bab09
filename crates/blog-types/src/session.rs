//! How a caller proves it holds the signed-in session: the `quill_session`
//! cookie set at login, or `Authorization: Bearer <token>`.

pub const SESSION_COOKIE: &str = "quill_session";

const SESSION_MAX_AGE_SECS: u64 = 604_800;

pub fn session_cookie(handle: &str) -> String {
    format!(
        "{SESSION_COOKIE}={handle}; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age={SESSION_MAX_AGE_SECS}"
    )
}

pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age=0")
}

pub fn extract_cookie_value(cookieHeader: &str, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    cookieHeader
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix(&prefix))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// The bearer token if `Authorization` carries one, else the session cookie.
pub fn caller_token(authorization: Option<&str>, cookie: Option<&str>) -> Option<String> {
    match authorization.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) if !token.trim().is_empty() => Some(token.trim().to_string()),
        _ => cookie.and_then(|c| extract_cookie_value(c, SESSION_COOKIE)),
    }
}
