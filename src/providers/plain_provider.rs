use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::AuthError;
use crate::models::Session;
use crate::providers::IdentityProvider;

const MIN_PASSWORD_LEN: usize = 6;

fn default_token_lifetime() -> i64 {
    3600
}

/// PlainProviderConfig defines an in-process account list.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct PlainProviderConfig {
    /// A friendly name for logs.
    pub name: String,
    /// `iss` claim of the issued id tokens.
    pub issuer: String,
    /// HMAC secret the id tokens are signed with.
    pub secret: String,
    /// Lifetime of an id token in seconds.
    #[serde(default = "default_token_lifetime")]
    pub token_lifetime: i64,
    /// Accounts that exist before anyone registers.
    #[serde(default)]
    pub users: Vec<PlainAccountEntry>,
}

/// Represents a single seeded account.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct PlainAccountEntry {
    pub email: String,
    pub password: String,
    /// Fixed user id; a random one is assigned when absent.
    pub user_id: Option<String>,
}

#[derive(Debug, Clone)]
struct Account {
    user_id: String,
    email: String,
    password: String,
}

#[derive(Default)]
struct Accounts {
    /// Keyed by lower-cased email.
    by_email: HashMap<String, Account>,
    /// Live refresh token -> user id.
    refresh_tokens: HashMap<String, String>,
}

/// An identity provider that keeps accounts in memory and signs its own
/// id tokens. Accounts registered at runtime live as long as the process.
pub struct PlainProvider {
    pub config: PlainProviderConfig,
    accounts: RwLock<Accounts>,
}

impl PlainProvider {
    /// Create a new `PlainProvider` from the config struct.
    pub fn new(config: &PlainProviderConfig) -> Self {
        info!(
            "Creating plain identity provider name='{}' with {} seeded account(s)",
            config.name,
            config.users.len()
        );
        let mut accounts = Accounts::default();
        for entry in &config.users {
            let account = Account {
                user_id: entry
                    .user_id
                    .clone()
                    .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string()),
                email: entry.email.clone(),
                password: entry.password.clone(),
            };
            accounts
                .by_email
                .insert(entry.email.to_lowercase(), account);
        }
        Self {
            config: config.clone(),
            accounts: RwLock::new(accounts),
        }
    }

    /// Mint a session for `account` and remember its refresh token.
    fn issue_session(
        &self,
        accounts: &mut Accounts,
        account: &Account,
    ) -> Result<Session, AuthError> {
        #[derive(Serialize)]
        struct Claims<'a> {
            sub: &'a str,
            email: &'a str,
            iss: &'a str,
            iat: i64,
            exp: i64,
        }

        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: &account.user_id,
            email: &account.email,
            iss: &self.config.issuer,
            iat: now,
            exp: now + self.config.token_lifetime,
        };
        let id_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_ref()),
        )
        .map_err(|e| AuthError::new(format!("Failed to encode id token: {}", e)))?;

        let refresh_token = uuid::Uuid::new_v4().to_string();
        accounts
            .refresh_tokens
            .insert(refresh_token.clone(), account.user_id.clone());

        Ok(Session::new(
            account.user_id.clone(),
            account.email.clone(),
            id_token,
            Some(refresh_token),
            self.config.token_lifetime,
        ))
    }
}

/// Loose shape check: something@domain.tld, no whitespace.
fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[async_trait]
impl IdentityProvider for PlainProvider {
    fn get_name(&self) -> &str {
        &self.config.name
    }

    fn get_type(&self) -> &str {
        "plain"
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        if !is_valid_email(email) {
            return Err(AuthError::new("INVALID_EMAIL"));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::new(
                "WEAK_PASSWORD : Password should be at least 6 characters",
            ));
        }

        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        let key = email.to_lowercase();
        if accounts.by_email.contains_key(&key) {
            return Err(AuthError::new("EMAIL_EXISTS"));
        }

        let account = Account {
            user_id: uuid::Uuid::new_v4().simple().to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        debug!("Registered plain account '{}'", email);
        accounts.by_email.insert(key, account.clone());
        self.issue_session(&mut accounts, &account)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        if !is_valid_email(email) {
            return Err(AuthError::new("INVALID_EMAIL"));
        }

        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        let account = match accounts.by_email.get(&email.to_lowercase()) {
            Some(account) => account.clone(),
            None => return Err(AuthError::new("EMAIL_NOT_FOUND")),
        };
        if account.password != password {
            debug!("Wrong password for plain account '{}'", email);
            return Err(AuthError::new("INVALID_PASSWORD"));
        }
        self.issue_session(&mut accounts, &account)
    }

    async fn refresh(&self, session: &Session) -> Result<Session, AuthError> {
        let refresh_token = session
            .refresh_token
            .as_deref()
            .ok_or_else(|| AuthError::new("Session has no refresh token"))?;

        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        match accounts.refresh_tokens.remove(refresh_token) {
            Some(user_id) if user_id == session.user_id => {}
            _ => return Err(AuthError::new("INVALID_REFRESH_TOKEN")),
        }
        let account = accounts
            .by_email
            .values()
            .find(|a| a.user_id == session.user_id)
            .cloned()
            .ok_or_else(|| AuthError::new("USER_NOT_FOUND"))?;
        self.issue_session(&mut accounts, &account)
    }

    /// Revokes the session's refresh token.
    async fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        if let Some(token) = &session.refresh_token {
            let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
            accounts.refresh_tokens.remove(token);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation, decode};

    fn create_test_config() -> PlainProviderConfig {
        PlainProviderConfig {
            name: "TestPlain".to_string(),
            issuer: "booktracker-test".to_string(),
            secret: "test-secret".to_string(),
            token_lifetime: 3600,
            users: vec![PlainAccountEntry {
                email: "reader@example.com".to_string(),
                password: "bookworm".to_string(),
                user_id: Some("uid-reader".to_string()),
            }],
        }
    }

    #[tokio::test]
    async fn test_sign_in_seeded_account() {
        let provider = PlainProvider::new(&create_test_config());
        let session = provider
            .sign_in("Reader@Example.com", "bookworm")
            .await
            .unwrap();
        assert_eq!(session.user_id, "uid-reader");
        assert_eq!(session.email, "reader@example.com");
    }

    #[tokio::test]
    async fn test_id_token_claims() {
        let config = create_test_config();
        let provider = PlainProvider::new(&config);
        let session = provider.sign_in("reader@example.com", "bookworm").await.unwrap();

        let mut validation = Validation::default();
        validation.validate_aud = false;
        validation.set_issuer(&[config.issuer.as_str()]);
        let claims = decode::<serde_json::Value>(
            &session.id_token,
            &DecodingKey::from_secret(config.secret.as_ref()),
            &validation,
        )
        .expect("Failed to decode id token")
        .claims;
        assert_eq!(claims["sub"], "uid-reader");
        assert_eq!(claims["email"], "reader@example.com");
    }

    #[tokio::test]
    async fn test_sign_in_failures() {
        let provider = PlainProvider::new(&create_test_config());
        let wrong = provider.sign_in("reader@example.com", "nope").await.unwrap_err();
        assert_eq!(wrong.reason, "INVALID_PASSWORD");
        let unknown = provider.sign_in("ghost@example.com", "whatever").await.unwrap_err();
        assert_eq!(unknown.reason, "EMAIL_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_sign_up_validation() {
        let provider = PlainProvider::new(&create_test_config());
        let malformed = provider.sign_up("not-an-email", "secret1").await.unwrap_err();
        assert_eq!(malformed.reason, "INVALID_EMAIL");
        let weak = provider.sign_up("a@x.com", "123").await.unwrap_err();
        assert!(weak.reason.starts_with("WEAK_PASSWORD"));
        let taken = provider.sign_up("reader@example.com", "secret1").await.unwrap_err();
        assert_eq!(taken.reason, "EMAIL_EXISTS");
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let provider = PlainProvider::new(&create_test_config());
        let registered = provider.sign_up("a@x.com", "secret1").await.unwrap();
        let logged_in = provider.sign_in("a@x.com", "secret1").await.unwrap();
        assert!(registered.same_user(&logged_in));
    }

    #[tokio::test]
    async fn test_refresh_rotates_token_and_sign_out_revokes() {
        let provider = PlainProvider::new(&create_test_config());
        let first = provider.sign_in("reader@example.com", "bookworm").await.unwrap();

        let second = provider.refresh(&first).await.unwrap();
        assert!(second.same_user(&first));
        assert_ne!(second.refresh_token, first.refresh_token);
        // The old refresh token was consumed.
        assert!(provider.refresh(&first).await.is_err());

        provider.sign_out(&second).await.unwrap();
        let revoked = provider.refresh(&second).await.unwrap_err();
        assert_eq!(revoked.reason, "INVALID_REFRESH_TOKEN");
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("a@x.com"));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email("a@@x.com"));
    }
}
