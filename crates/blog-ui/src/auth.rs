use blog_types::AuthUser;
use leptos::prelude::*;

#[cfg(feature = "ssr")]
pub(crate) mod server {
    use blog_firebase::{AuthState, Services, Session};
    use http::header::{HeaderValue, AUTHORIZATION, COOKIE, SET_COOKIE};
    use leptos::prelude::*;
    use leptos_axum::ResponseOptions;

    pub fn services() -> Result<Services, ServerFnError> {
        use_context::<Services>().ok_or_else(|| ServerFnError::new("services unavailable"))
    }

    pub fn auth_state() -> Result<AuthState, ServerFnError> {
        use_context::<AuthState>().ok_or_else(|| ServerFnError::new("auth state unavailable"))
    }

    /// Session proof carried by the current request.
    pub fn request_token() -> Option<String> {
        let parts = use_context::<http::request::Parts>()?;
        let authHeader = parts.headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
        let cookieHeader = parts.headers.get(COOKIE).and_then(|v| v.to_str().ok());
        blog_types::caller_token(authHeader, cookieHeader)
    }

    /// The signed-in session, if this request's caller holds it.
    pub fn caller_session() -> Result<Option<Session>, ServerFnError> {
        Ok(auth_state()?.session_held_by(request_token().as_deref()))
    }

    pub fn set_cookie(cookieValue: &str) -> Result<(), ServerFnError> {
        let responseOptions = expect_context::<ResponseOptions>();
        responseOptions.insert_header(
            SET_COOKIE,
            HeaderValue::from_str(cookieValue)
                .map_err(|e| ServerFnError::new(format!("cookie error: {e}")))?,
        );
        Ok(())
    }
}

#[server]
pub async fn current_user() -> Result<Option<AuthUser>, ServerFnError> {
    Ok(server::caller_session()?.map(|s| s.user))
}

#[server]
pub async fn sign_in(id_token: String) -> Result<AuthUser, ServerFnError> {
    use blog_firebase::IdpCredential;

    if id_token.trim().is_empty() {
        return Err(ServerFnError::new("paste a Google ID token to sign in"));
    }

    let services = server::services()?;
    let session = services
        .auth
        .sign_in_with_idp(
            &services.google_provider,
            IdpCredential::IdToken(id_token.trim().to_string()),
        )
        .await
        .map_err(|e| {
            tracing::debug!("sign-in failed: {e}");
            ServerFnError::new("sign-in was rejected")
        })?;

    server::set_cookie(&blog_types::session_cookie(&session.handle))?;
    Ok(session.user)
}

#[server]
pub async fn sign_out() -> Result<(), ServerFnError> {
    let token = server::request_token().ok_or_else(|| ServerFnError::new("not signed in"))?;
    if !server::services()?.auth.sign_out_held_by(&token) {
        return Err(ServerFnError::new("not signed in"));
    }
    server::set_cookie(&blog_types::expired_session_cookie())
}

/// The signed-in user as last reported by the server, plus the actions that
/// change it.
#[derive(Clone, Copy)]
pub struct AuthContext {
    pub user: ReadSignal<Option<AuthUser>>,
    pub sign_in: ServerAction<SignIn>,
    pub sign_out: ServerAction<SignOut>,
}

pub fn use_auth() -> AuthContext {
    expect_context::<AuthContext>()
}

/// Provides [`AuthContext`]. Place once near the root of the app.
#[component]
pub fn AuthProvider(children: Children) -> impl IntoView {
    #[allow(unused_variables)]
    let (user, setUser) = signal(Option::<AuthUser>::None);
    let signInAction = ServerAction::<SignIn>::new();
    let signOutAction = ServerAction::<SignOut>::new();

    #[cfg(feature = "hydrate")]
    {
        use wasm_bindgen_futures::spawn_local;

        // Re-read the session on mount and whenever either action completes.
        Effect::new(move |_| {
            signInAction.version().get();
            signOutAction.version().get();
            spawn_local(async move {
                if let Ok(current) = current_user().await {
                    setUser.set(current);
                }
            });
        });
    }

    provide_context(AuthContext {
        user,
        sign_in: signInAction,
        sign_out: signOutAction,
    });

    children()
}
