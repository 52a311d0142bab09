use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::{Duration, Instant};

use blog_types::AuthUser;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{Endpoints, FirebaseConfig};
use crate::error::{check_response, decode_error, FirebaseError};
use crate::provider::{GoogleAuthProvider, IdpCredential};

/// Tokens backing a session. The id token authorizes Firestore requests.
#[derive(Clone, Debug, PartialEq)]
pub struct Credentials {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: Instant,
}

/// The signed-in principal and its credentials.
///
/// `handle` is minted locally at sign-in and survives token refreshes. It is
/// what a browser keeps in its session cookie.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub handle: String,
    pub user: AuthUser,
    pub credentials: Credentials,
}

impl Session {
    pub fn email(&self) -> Option<&str> {
        self.user.email.as_deref()
    }

    /// A leeway too large to represent counts as already expiring.
    pub fn expires_within(&self, leeway: Duration) -> bool {
        match Instant::now().checked_add(leeway) {
            Some(limit) => self.credentials.expires_at <= limit,
            None => true,
        }
    }

    /// Whether `token` (the session handle or the current id token) proves the
    /// caller owns this session.
    pub fn is_held_by(&self, token: &str) -> bool {
        !token.is_empty() && (token == self.handle || token == self.credentials.id_token)
    }
}

pub type AuthListener = Arc<dyn Fn(Option<&Session>) + Send + Sync>;

/// Anything that pushes session transitions to registered listeners.
pub trait AuthStateSource {
    /// Registers `listener`, invokes it once with the current state and then on
    /// every transition until the returned subscription is dropped.
    fn on_auth_state_changed(&self, listener: AuthListener) -> Subscription;
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, AuthListener)>,
}

/// Listener bookkeeping shared by auth sources.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    inner: Arc<Mutex<Listeners>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, listener: AuthListener) -> Subscription {
        let mut listeners = lock(&self.inner);
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, listener));
        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Calls every listener in registration order. The registry lock is not
    /// held while listeners run, so a listener may drop its own subscription.
    pub fn notify(&self, session: Option<&Session>) {
        let snapshot: Vec<AuthListener> = lock(&self.inner)
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in snapshot {
            listener(session);
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle to a registered listener. Dropping it unsubscribes.
#[must_use = "dropping a subscription unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Listeners>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}

    pub fn is_active(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let listeners = lock(&registry);
        listeners.entries.iter().any(|(id, _)| *id == self.id)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).entries.retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

enum Delivery {
    All(Option<Session>),
    One(AuthListener, Option<Session>),
}

/// Pending notifications, queued in the order the session changed.
#[derive(Default)]
struct Outbox {
    queue: VecDeque<Delivery>,
    draining: bool,
}

struct AuthInner {
    http: reqwest::Client,
    api_key: String,
    app_id: String,
    auth_domain: String,
    endpoints: Endpoints,
    current: Mutex<Option<Session>>,
    outbox: Mutex<Outbox>,
    listeners: ListenerRegistry,
}

/// Client for Firebase Authentication (Identity Toolkit and Secure Token REST
/// APIs). Owns the current session and is the only writer of it.
///
/// Listeners run with no client lock held, so they may read the client or sign
/// out. A change made from inside a listener is delivered after that listener
/// returns.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<AuthInner>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInWithIdpRequest {
    post_body: String,
    request_uri: String,
    return_idp_credential: bool,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInWithIdpResponse {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
    user_id: String,
}

fn expires_at(expiresIn: &str) -> Result<Instant, FirebaseError> {
    let seconds: u64 = expiresIn
        .trim()
        .parse()
        .map_err(|e| decode_error(format!("bad expiresIn {expiresIn:?}: {e}")))?;
    Instant::now()
        .checked_add(Duration::from_secs(seconds))
        .ok_or_else(|| decode_error(format!("expiresIn {expiresIn:?} is out of range")))
}

fn new_handle() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

impl SignInWithIdpResponse {
    fn into_session(self) -> Result<Session, FirebaseError> {
        Ok(Session {
            handle: new_handle(),
            credentials: Credentials {
                id_token: self.id_token,
                refresh_token: self.refresh_token,
                expires_at: expires_at(&self.expires_in)?,
            },
            user: AuthUser {
                uid: self.local_id,
                email: self.email,
                display_name: self.display_name,
                photo_url: self.photo_url,
            },
        })
    }
}

impl AuthClient {
    pub fn new(http: reqwest::Client, config: &FirebaseConfig) -> Self {
        Self {
            inner: Arc::new(AuthInner {
                http,
                api_key: config.api_key.clone(),
                app_id: config.app_id.clone(),
                auth_domain: config.auth_domain.clone(),
                endpoints: config.endpoints.clone(),
                current: Mutex::new(None),
                outbox: Mutex::new(Outbox::default()),
                listeners: ListenerRegistry::new(),
            }),
        }
    }

    pub fn current_session(&self) -> Option<Session> {
        lock(&self.inner.current).clone()
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        lock(&self.inner.current).as_ref().map(|s| s.user.clone())
    }

    /// Exchanges a Google credential for a Firebase session, replacing any
    /// session already held.
    pub async fn sign_in_with_idp(
        &self,
        provider: &GoogleAuthProvider,
        credential: IdpCredential,
    ) -> Result<Session, FirebaseError> {
        let url = format!(
            "{}/accounts:signInWithIdp",
            self.inner.endpoints.identity_toolkit.trim_end_matches('/')
        );
        let body = SignInWithIdpRequest {
            post_body: provider.post_body(&credential),
            request_uri: provider.request_uri(&self.inner.auth_domain),
            return_idp_credential: true,
            return_secure_token: true,
        };

        let response = self
            .inner
            .http
            .post(url)
            .query(&[("key", &self.inner.api_key)])
            .header("X-Firebase-GMPID", &self.inner.app_id)
            .json(&body)
            .send()
            .await?;
        let payload: SignInWithIdpResponse = check_response(response)
            .await?
            .json()
            .await
            .map_err(decode_error)?;

        let session = payload.into_session()?;
        self.publish(Some(session.clone()));
        Ok(session)
    }

    /// Drops the local session. Listeners hear about it only if there was one.
    pub fn sign_out(&self) {
        self.transition(|current| current.take().is_some());
    }

    /// Signs out only if `token` proves ownership of the current session.
    /// Returns whether a session was ended.
    pub fn sign_out_held_by(&self, token: &str) -> bool {
        self.transition(|current| {
            if current.as_ref().is_some_and(|s| s.is_held_by(token)) {
                *current = None;
                true
            } else {
                false
            }
        })
    }

    /// Renews the id token. A refresh token the service refuses ends the
    /// session.
    pub async fn refresh(&self) -> Result<AuthUser, FirebaseError> {
        let session = self.current_session().ok_or(FirebaseError::NotSignedIn)?;
        let url = format!(
            "{}/token",
            self.inner.endpoints.secure_token.trim_end_matches('/')
        );

        let response = self
            .inner
            .http
            .post(url)
            .query(&[("key", &self.inner.api_key)])
            .header("X-Firebase-GMPID", &self.inner.app_id)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", session.credentials.refresh_token.as_str()),
            ])
            .send()
            .await?;

        let response = match check_response(response).await {
            Ok(response) => response,
            Err(e) if e.is_credential_rejected() => {
                warn!("refresh token rejected for {}: {e}", session.user.uid);
                self.end_session(&session.handle);
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        let payload: RefreshResponse = response.json().await.map_err(decode_error)?;
        if payload.user_id != session.user.uid {
            return Err(decode_error(format!(
                "refresh returned user {} for session {}",
                payload.user_id, session.user.uid
            )));
        }

        let renewed = Session {
            handle: session.handle,
            user: session.user,
            credentials: Credentials {
                id_token: payload.id_token,
                refresh_token: payload.refresh_token,
                expires_at: expires_at(&payload.expires_in)?,
            },
        };
        let user = renewed.user.clone();

        // A sign-out or a new sign-in may have landed while we waited.
        let applied = self.transition(|current| {
            if current.as_ref().map(|s| s.handle.as_str()) != Some(renewed.handle.as_str()) {
                return false;
            }
            *current = Some(renewed);
            true
        });
        if !applied {
            debug!("discarding refreshed token for {}: session changed", user.uid);
            return Err(FirebaseError::NotSignedIn);
        }
        Ok(user)
    }

    fn end_session(&self, handle: &str) {
        self.transition(|current| {
            if current.as_ref().is_some_and(|s| s.handle == handle) {
                *current = None;
                true
            } else {
                false
            }
        });
    }

    fn publish(&self, session: Option<Session>) {
        self.transition(|current| {
            *current = session;
            true
        });
    }

    /// Applies `change` under the session lock. When it reports a change, the
    /// new state is queued in that same critical section so deliveries keep
    /// the order of the changes, then the queue is drained outside the lock.
    fn transition(&self, change: impl FnOnce(&mut Option<Session>) -> bool) -> bool {
        let changed = {
            let mut current = lock(&self.inner.current);
            let changed = change(&mut *current);
            if changed {
                lock(&self.inner.outbox)
                    .queue
                    .push_back(Delivery::All(current.clone()));
            }
            changed
        };
        if changed {
            self.drain();
        }
        changed
    }

    /// Delivers queued notifications. Only one thread drains at a time; a call
    /// made while another drain is running (including from inside a listener)
    /// leaves its entry for that drain.
    fn drain(&self) {
        {
            let mut outbox = lock(&self.inner.outbox);
            if outbox.draining {
                return;
            }
            outbox.draining = true;
        }

        loop {
            let next = {
                let mut outbox = lock(&self.inner.outbox);
                match outbox.queue.pop_front() {
                    Some(delivery) => delivery,
                    None => {
                        outbox.draining = false;
                        return;
                    }
                }
            };
            match next {
                Delivery::All(session) => self.inner.listeners.notify(session.as_ref()),
                Delivery::One(listener, session) => listener(session.as_ref()),
            }
        }
    }
}

impl AuthStateSource for AuthClient {
    fn on_auth_state_changed(&self, listener: AuthListener) -> Subscription {
        let subscription = {
            let current = lock(&self.inner.current);
            let subscription = self.inner.listeners.register(Arc::clone(&listener));
            lock(&self.inner.outbox)
                .queue
                .push_back(Delivery::One(listener, current.clone()));
            subscription
        };
        self.drain();
        subscription
    }
}
