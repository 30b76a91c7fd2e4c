//! The auth-gated navigator.
//!
//! Subscribes once to the auth client's session channel and decides which
//! flow is visible: the sign-in screens or the main tabs. It never polls and
//! has no manual refresh; every change arrives as a push notification.

use std::pin::pin;

use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::auth::AuthClient;
use crate::models::{Session, SessionChange};

/// Which subtree is visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Unauthenticated,
    Authenticated(Session),
}

impl Flow {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Flow::Authenticated(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            Flow::Authenticated(session) => Some(session),
            Flow::Unauthenticated => None,
        }
    }

    /// True when this flow is what `session` should be routed to.
    pub fn matches(&self, session: Option<&Session>) -> bool {
        match (self, session) {
            (Flow::Unauthenticated, None) => true,
            (Flow::Authenticated(current), Some(session)) => current.same_user(session),
            _ => false,
        }
    }
}

impl From<SessionChange> for Flow {
    fn from(change: SessionChange) -> Self {
        match change {
            SessionChange::SignedIn(session) => Flow::Authenticated(session),
            SessionChange::SignedOut => Flow::Unauthenticated,
        }
    }
}

/// The navigator's state: the visible flow plus a counter bumped on every
/// transition. A new generation means the whole root subtree is remounted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowState {
    pub flow: Flow,
    pub generation: u64,
}

impl FlowState {
    /// `Unauthenticated` until the first notification arrives.
    pub fn initial() -> Self {
        FlowState {
            flow: Flow::Unauthenticated,
            generation: 0,
        }
    }

    /// Apply one notification. Returns true if it caused a transition.
    ///
    /// A token refresh for the signed-in user updates the session in place;
    /// a different user is a transition like any other.
    pub fn apply(&mut self, change: SessionChange) -> bool {
        match (&self.flow, change) {
            (Flow::Unauthenticated, SessionChange::SignedOut) => false,
            (Flow::Authenticated(current), SessionChange::SignedIn(next))
                if current.same_user(&next) =>
            {
                self.flow = Flow::Authenticated(next);
                false
            }
            (_, change) => {
                self.flow = Flow::from(change);
                self.generation += 1;
                true
            }
        }
    }
}

/// Holds the single session subscription for its own lifetime.
pub struct Navigator {
    state: watch::Receiver<FlowState>,
    task: Option<JoinHandle<()>>,
}

impl Navigator {
    /// Subscribe to `auth` and start routing. Must be called inside a tokio
    /// runtime.
    pub fn attach(auth: &AuthClient) -> Self {
        let subscription = auth.subscribe();
        let (state_tx, state_rx) = watch::channel(FlowState::initial());

        let task = tokio::spawn(async move {
            let mut changes = pin!(subscription.into_stream());
            while let Some(change) = changes.next().await {
                state_tx.send_if_modified(|state| {
                    let before = state.clone();
                    if state.apply(change) {
                        info!(
                            event_name = "navigator.transition",
                            authenticated = state.flow.is_authenticated(),
                            generation = state.generation,
                            "Switching to {} flow",
                            if state.flow.is_authenticated() { "main" } else { "auth" }
                        );
                    }
                    *state != before
                });
            }
            debug!("Session channel closed, navigator stopped");
        });

        Navigator {
            state: state_rx,
            task: Some(task),
        }
    }

    pub fn current(&self) -> FlowState {
        self.state.borrow().clone()
    }

    /// Wait until `predicate` holds for the current state and return it.
    /// Returns the last known state if the navigator stops first.
    pub async fn wait_for(&mut self, mut predicate: impl FnMut(&FlowState) -> bool) -> FlowState {
        loop {
            {
                let state = self.state.borrow_and_update();
                if predicate(&*state) {
                    return state.clone();
                }
            }
            if self.state.changed().await.is_err() {
                return self.state.borrow().clone();
            }
        }
    }

    /// Release the subscription and wait for the routing task to finish.
    pub async fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }
}

impl Drop for Navigator {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryStorage;
    use crate::providers::plain_provider::{PlainProvider, PlainProviderConfig};
    use std::sync::Arc;

    fn session(user_id: &str) -> Session {
        Session::new(
            user_id.to_string(),
            format!("{}@example.com", user_id),
            "token".to_string(),
            None,
            3600,
        )
    }

    fn auth_client() -> AuthClient {
        let provider = PlainProvider::new(&PlainProviderConfig {
            name: "TestPlain".to_string(),
            issuer: "booktracker-test".to_string(),
            secret: "test-secret".to_string(),
            token_lifetime: 3600,
            users: vec![],
        });
        AuthClient::new(Box::new(provider), Arc::new(MemoryStorage::new()), "test")
    }

    #[test]
    fn test_transitions() {
        let mut state = FlowState::initial();
        assert!(!state.apply(SessionChange::SignedOut));
        assert_eq!(state.generation, 0);

        assert!(state.apply(SessionChange::SignedIn(session("a"))));
        assert!(state.flow.is_authenticated());
        assert_eq!(state.generation, 1);

        assert!(state.apply(SessionChange::SignedOut));
        assert_eq!(state.flow, Flow::Unauthenticated);
        assert_eq!(state.generation, 2);
    }

    #[test]
    fn test_refresh_is_not_a_transition() {
        let mut state = FlowState::initial();
        state.apply(SessionChange::SignedIn(session("a")));
        let mut refreshed = session("a");
        refreshed.id_token = "fresh".to_string();

        assert!(!state.apply(SessionChange::SignedIn(refreshed.clone())));
        assert_eq!(state.flow, Flow::Authenticated(refreshed));
        assert_eq!(state.generation, 1);

        assert!(state.apply(SessionChange::SignedIn(session("b"))));
        assert_eq!(state.generation, 2);
    }

    /// Whatever the sequence, the flow ends on the last notification's presence.
    #[test]
    fn test_flow_follows_last_notification() {
        let sequences: Vec<Vec<SessionChange>> = vec![
            vec![SessionChange::SignedIn(session("a")), SessionChange::SignedOut],
            vec![
                SessionChange::SignedOut,
                SessionChange::SignedIn(session("a")),
                SessionChange::SignedOut,
                SessionChange::SignedIn(session("b")),
            ],
            vec![SessionChange::SignedIn(session("a")), SessionChange::SignedIn(session("a"))],
        ];
        for sequence in sequences {
            let mut state = FlowState::initial();
            let last = sequence.last().cloned().unwrap();
            for change in sequence {
                state.apply(change);
            }
            assert_eq!(state.flow.is_authenticated(), last.is_signed_in());
        }
    }

    #[tokio::test]
    async fn test_navigator_follows_auth_client() {
        let auth = auth_client();
        let mut navigator = Navigator::attach(&auth);
        assert_eq!(navigator.current().flow, Flow::Unauthenticated);

        auth.register("a@x.com", "secret1").await.unwrap();
        let state = navigator.wait_for(|s| s.flow.is_authenticated()).await;
        assert_eq!(state.flow.session().unwrap().email, "a@x.com");

        // Two rapid toggles: the visible flow must end signed out.
        auth.logout().await.unwrap();
        auth.login("a@x.com", "secret1").await.unwrap();
        auth.logout().await.unwrap();
        let state = navigator.wait_for(|s| !s.flow.is_authenticated()).await;
        assert_eq!(state.flow, Flow::Unauthenticated);

        navigator.shutdown().await;
    }

    #[tokio::test]
    async fn test_subscription_released_on_shutdown_and_drop() {
        let auth = auth_client();
        let navigator = Navigator::attach(&auth);
        assert_eq!(auth.listener_count(), 1);
        navigator.shutdown().await;
        assert_eq!(auth.listener_count(), 0);

        let navigator = Navigator::attach(&auth);
        assert_eq!(auth.listener_count(), 1);
        drop(navigator);
        // The aborted task drops its subscription once the runtime cancels it.
        for _ in 0..100 {
            if auth.listener_count() == 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(auth.listener_count(), 0);
    }
}
