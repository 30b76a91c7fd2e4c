use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated identity handle issued by the identity provider.
///
/// A `Session` is only ever handed around by reference or clone; nothing in the
/// crate keeps a global "current user". Screens receive it explicitly.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Session {
    /// Provider-issued, stable user id. Keys the favorites document.
    pub user_id: String,
    pub email: String,
    pub id_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        user_id: String,
        email: String,
        id_token: String,
        refresh_token: Option<String>,
        expires_in_secs: i64,
    ) -> Self {
        Session {
            user_id,
            email,
            id_token,
            refresh_token,
            expires_at: Utc::now() + Duration::seconds(expires_in_secs),
        }
    }

    /// True once the id token can no longer be presented to the backend.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Same account, possibly different tokens.
    pub fn same_user(&self, other: &Session) -> bool {
        self.user_id == other.user_id
    }
}

// Tokens are credentials; keep them out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// A push notification from the auth client's session channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    SignedIn(Session),
    SignedOut,
}

impl From<Option<Session>> for SessionChange {
    fn from(session: Option<Session>) -> Self {
        match session {
            Some(s) => SessionChange::SignedIn(s),
            None => SessionChange::SignedOut,
        }
    }
}

impl SessionChange {
    pub fn is_signed_in(&self) -> bool {
        matches!(self, SessionChange::SignedIn(_))
    }
}
