use tracing::debug;

use crate::auth::AuthClient;
use crate::error::AuthError;
use crate::models::Session;

/// Email/password form with register and login actions.
///
/// The screen does not navigate anywhere itself: a successful call changes the
/// session and the navigator swaps the whole root.
#[derive(Default)]
pub struct AuthScreen {
    pub email: String,
    pub password: String,
    error: Option<String>,
    loading: bool,
}

impl AuthScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(email: impl Into<String>, password: impl Into<String>) -> Self {
        AuthScreen {
            email: email.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// The provider's message from the last failed attempt.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True while a register or login call is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub async fn register(&mut self, auth: &AuthClient) -> Option<Session> {
        self.loading = true;
        let outcome = auth.register(&self.email, &self.password).await;
        self.settle(outcome)
    }

    pub async fn login(&mut self, auth: &AuthClient) -> Option<Session> {
        self.loading = true;
        let outcome = auth.login(&self.email, &self.password).await;
        self.settle(outcome)
    }

    fn settle(&mut self, outcome: Result<Session, AuthError>) -> Option<Session> {
        self.loading = false;
        match outcome {
            Ok(session) => {
                debug!("Auth screen signed in user_id='{}'", session.user_id);
                self.error = None;
                Some(session)
            }
            Err(e) => {
                self.error = Some(e.reason);
                None
            }
        }
    }
}
