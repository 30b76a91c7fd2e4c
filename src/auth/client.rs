use std::sync::Arc;

use futures::stream::{self, Stream};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::persistence::KeyValueStorage;
use crate::error::AuthError;
use crate::models::{Session, SessionChange};
use crate::providers::IdentityProvider;

/// The auth client: wraps an identity provider, persists the session and
/// pushes every sign-in and sign-out to its subscribers.
pub struct AuthClient {
    provider: Box<dyn IdentityProvider>,
    storage: Arc<dyn KeyValueStorage>,
    storage_key: String,
    session: watch::Sender<Option<Session>>,
}

impl AuthClient {
    pub fn new(
        provider: Box<dyn IdentityProvider>,
        storage: Arc<dyn KeyValueStorage>,
        storage_key: impl Into<String>,
    ) -> Self {
        let (session, _) = watch::channel(None);
        AuthClient {
            provider,
            storage,
            storage_key: storage_key.into(),
            session,
        }
    }

    /// Restore a persisted session, refreshing it if the id token expired.
    ///
    /// Always publishes the outcome, so subscribers get a notification on cold
    /// start even when nobody is signed in.
    pub async fn initialize(&self) -> Option<Session> {
        let restored = match self.load_persisted().await {
            Some(session) if session.is_expired() => {
                debug!("Persisted session for '{}' expired, refreshing", session.email);
                match self.provider.refresh(&session).await {
                    Ok(fresh) => {
                        self.persist(&fresh).await;
                        Some(fresh)
                    }
                    Err(e) => {
                        warn!("Could not refresh persisted session: {}", e);
                        self.forget_persisted().await;
                        None
                    }
                }
            }
            other => other,
        };

        match &restored {
            Some(session) => info!("Restored session for '{}'", session.email),
            None => debug!("No session to restore"),
        }
        self.session.send_replace(restored.clone());
        restored
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        match self.provider.sign_up(email, password).await {
            Ok(session) => {
                info!(
                    event_name = "auth.register.success",
                    user_id = session.user_id.as_str(),
                    "User registered: {}",
                    session.email
                );
                self.accept(session.clone()).await;
                Ok(session)
            }
            Err(e) => {
                warn!(event_name = "auth.register.failure", "Registration failed: {}", e);
                Err(e)
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        match self.provider.sign_in(email, password).await {
            Ok(session) => {
                info!(
                    event_name = "auth.login.success",
                    user_id = session.user_id.as_str(),
                    "User logged in: {}",
                    session.email
                );
                self.accept(session.clone()).await;
                Ok(session)
            }
            Err(e) => {
                warn!(event_name = "auth.login.failure", "Login failed: {}", e);
                Err(e)
            }
        }
    }

    /// Sign out. The local session is cleared and subscribers notified before
    /// the provider is told; a provider failure is returned but changes nothing
    /// locally. Calling this while signed out is a no-op.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.forget_persisted().await;

        let mut signed_out = None;
        self.session.send_if_modified(|current| {
            signed_out = current.take();
            signed_out.is_some()
        });
        let Some(previous) = signed_out else {
            debug!("Logout requested with no active session");
            return Ok(());
        };
        info!(
            event_name = "auth.logout",
            user_id = previous.user_id.as_str(),
            "User logged out: {}",
            previous.email
        );
        self.provider.sign_out(&previous).await
    }

    /// Point-in-time read. May be `None` while a sign-in is still in flight.
    pub fn current_session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    /// The current session with a usable id token. An expired token is
    /// exchanged through the provider first and the fresh session persisted and
    /// published. If the refresh fails the stale session is returned and the
    /// backend call made with it reports the failure.
    pub async fn session(&self) -> Option<Session> {
        let current = self.current_session()?;
        if !current.is_expired() {
            return Some(current);
        }

        debug!("Id token for '{}' expired, refreshing", current.email);
        let fresh = match self.provider.refresh(&current).await {
            Ok(fresh) => fresh,
            Err(e) => {
                warn!(
                    event_name = "auth.refresh.failure",
                    user_id = current.user_id.as_str(),
                    "Token refresh failed: {}",
                    e
                );
                return Some(current);
            }
        };

        // A logout or another sign-in may have happened meanwhile.
        let published = self.session.send_if_modified(|slot| {
            let same_user = slot.as_ref().is_some_and(|active| active.same_user(&fresh));
            if same_user {
                *slot = Some(fresh.clone());
            }
            same_user
        });
        if !published {
            debug!("Session changed during refresh, dropping refreshed tokens");
            return self.current_session();
        }
        info!(
            event_name = "auth.refresh.success",
            user_id = fresh.user_id.as_str(),
            "Refreshed session for {}",
            fresh.email
        );
        self.persist(&fresh).await;
        Some(fresh)
    }

    /// Start listening for session changes. The first `next()` yields the
    /// current state; dropping the subscription releases the listener.
    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            receiver: self.session.subscribe(),
            delivered_initial: false,
        }
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.session.receiver_count()
    }

    pub fn provider_name(&self) -> &str {
        self.provider.get_name()
    }

    pub fn provider_type(&self) -> &str {
        self.provider.get_type()
    }

    async fn accept(&self, session: Session) {
        self.persist(&session).await;
        self.session.send_replace(Some(session));
    }

    async fn persist(&self, session: &Session) {
        let raw = match serde_json::to_string(session) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to serialize session: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set_item(&self.storage_key, raw).await {
            warn!("Failed to persist session: {}", e);
        }
    }

    async fn load_persisted(&self) -> Option<Session> {
        let raw = match self.storage.get_item(&self.storage_key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Failed to read persisted session: {}", e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Discarding unreadable persisted session: {}", e);
                self.forget_persisted().await;
                None
            }
        }
    }

    async fn forget_persisted(&self) {
        if let Err(e) = self.storage.remove_item(&self.storage_key).await {
            warn!("Failed to remove persisted session: {}", e);
        }
    }
}

/// A live listener on the auth client's session channel.
///
/// Notifications coalesce: a slow reader sees the latest state, never a stale
/// one.
pub struct SessionSubscription {
    receiver: watch::Receiver<Option<Session>>,
    delivered_initial: bool,
}

impl SessionSubscription {
    /// Wait for the next notification. `None` once the auth client is gone.
    pub async fn next(&mut self) -> Option<SessionChange> {
        if self.delivered_initial {
            self.receiver.changed().await.ok()?;
        }
        self.delivered_initial = true;
        Some(SessionChange::from(self.receiver.borrow_and_update().clone()))
    }

    pub fn into_stream(self) -> impl Stream<Item = SessionChange> {
        stream::unfold(self, |mut subscription| async move {
            let change = subscription.next().await?;
            Some((change, subscription))
        })
    }
}
