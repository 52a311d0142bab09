use std::sync::{Arc, RwLock};

use blog_types::AuthUser;
use tracing::info;

use crate::auth::{AuthStateSource, Session, Subscription};

/// Read-only view of the most recent session delivered by the auth source.
///
/// Cloning is cheap and every clone reads the same cell. Only the listener
/// installed by [`AuthObserver::start`] ever writes to it.
#[derive(Clone, Default)]
pub struct AuthState {
    cell: Arc<RwLock<Option<Session>>>,
}

impl AuthState {
    pub fn current_session(&self) -> Option<Session> {
        self.read().clone()
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.read().as_ref().map(|s| s.user.clone())
    }

    /// The current session, but only for a caller presenting its handle or id
    /// token.
    pub fn session_held_by(&self, token: Option<&str>) -> Option<Session> {
        let token = token?;
        self.read().as_ref().filter(|s| s.is_held_by(token)).cloned()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<Session>> {
        self.cell.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("user", &self.current_user())
            .finish()
    }
}

/// The one live subscription mirroring an auth source into an [`AuthState`].
#[derive(Debug)]
pub struct AuthObserver {
    state: AuthState,
    subscription: Subscription,
}

impl AuthObserver {
    /// Subscribes to `source`. Call once during startup and keep the observer
    /// for as long as the state should track the source.
    pub fn start<S: AuthStateSource + ?Sized>(source: &S) -> Self {
        let state = AuthState::default();
        let cell = Arc::clone(&state.cell);
        let subscription = source.on_auth_state_changed(Arc::new(move |session| {
            let mut slot = cell.write().unwrap_or_else(|poisoned| poisoned.into_inner());
            *slot = session.cloned();
            info!("{}", transition_message(session.map(|s| &s.user)));
        }));

        Self {
            state,
            subscription,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state.clone()
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_active()
    }

    /// Stops tracking. Handed-out states keep the last value they saw.
    pub fn unsubscribe(self) {
        self.subscription.unsubscribe();
    }
}

/// Diagnostic line for one auth transition. Users without an email are named
/// by uid.
pub fn transition_message(user: Option<&AuthUser>) -> String {
    let who = match user {
        Some(user) => user.email.as_deref().unwrap_or(&user.uid),
        None => "logged out",
    };
    format!("Auth state changed: {who}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::tests::session;
    use crate::auth::{AuthListener, ListenerRegistry};

    /// Stands in for the auth service: pushes whatever the test hands it.
    #[derive(Default)]
    struct FakeSource {
        registry: ListenerRegistry,
    }

    impl FakeSource {
        fn deliver(&self, session: Option<Session>) {
            self.registry.notify(session.as_ref());
        }
    }

    impl AuthStateSource for FakeSource {
        fn on_auth_state_changed(&self, listener: AuthListener) -> Subscription {
            self.registry.register(listener)
        }
    }

    #[test]
    fn empty_before_any_notification() {
        let source = FakeSource::default();
        let observer = AuthObserver::start(&source);
        assert!(observer.state().current_session().is_none());
        assert!(observer.state().session_held_by(Some("handle-u1")).is_none());
        assert!(AuthState::default().current_user().is_none());
    }

    #[test]
    fn last_notification_wins() {
        let source = FakeSource::default();
        let observer = AuthObserver::start(&source);
        let state = observer.state();

        let sequence = vec![
            Some(session("u1", Some("a@b.com"))),
            None,
            Some(session("u2", Some("c@d.com"))),
            Some(session("u3", None)),
        ];
        for notification in sequence {
            source.deliver(notification.clone());
            assert_eq!(state.current_session(), notification);
        }
        assert_eq!(state.current_user().map(|u| u.uid), Some("u3".to_string()));
    }

    #[test]
    fn exactly_one_subscription_per_observer() {
        let source = FakeSource::default();
        let observer = AuthObserver::start(&source);
        assert_eq!(source.registry.len(), 1);
        assert!(observer.is_active());

        observer.unsubscribe();
        assert!(source.registry.is_empty());
    }

    #[test]
    fn state_keeps_last_value_after_unsubscribe() {
        let source = FakeSource::default();
        let observer = AuthObserver::start(&source);
        let state = observer.state();

        source.deliver(Some(session("u1", Some("a@b.com"))));
        observer.unsubscribe();
        source.deliver(None);

        assert_eq!(state.current_user().map(|u| u.uid), Some("u1".to_string()));
    }

    #[test]
    fn session_is_only_handed_to_its_holder() {
        let source = FakeSource::default();
        let observer = AuthObserver::start(&source);
        let state = observer.state();
        source.deliver(Some(session("u1", Some("a@b.com"))));

        assert!(state.session_held_by(None).is_none());
        assert!(state.session_held_by(Some("handle-u2")).is_none());
        assert_eq!(
            state.session_held_by(Some("handle-u1")).map(|s| s.user.uid),
            Some("u1".to_string())
        );
        assert!(state.session_held_by(Some("id-u1")).is_some());
    }

    #[test]
    fn transition_messages() {
        let signedIn = session("u1", Some("a@b.com"));
        assert_eq!(
            transition_message(Some(&signedIn.user)),
            "Auth state changed: a@b.com"
        );
        assert_eq!(transition_message(None), "Auth state changed: logged out");

        let noEmail = session("u9", None);
        assert_eq!(
            transition_message(Some(&noEmail.user)),
            "Auth state changed: u9"
        );
    }
}
