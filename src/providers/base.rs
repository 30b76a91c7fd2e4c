use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{
    firebase_provider::{FirebaseProvider, FirebaseProviderConfig},
    plain_provider::{PlainProvider, PlainProviderConfig},
};
use crate::error::AuthError;
use crate::models::Session;

/// Configuration options for the identity provider backing the auth client.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
#[serde(tag = "type")]
pub enum ProviderConfig {
    #[serde(rename = "firebase")]
    Firebase(FirebaseProviderConfig),
    #[serde(rename = "plain")]
    Plain(PlainProviderConfig),
}

/// An identity provider turns email/password credentials into a `Session`.
///
/// Providers never retry. Every failure is returned once, with the provider's
/// own message as the reason.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn get_name(&self) -> &str;
    fn get_type(&self) -> &str;
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;
    /// Exchange the session's refresh token for fresh tokens.
    async fn refresh(&self, session: &Session) -> Result<Session, AuthError>;
    /// Providers with server-side session state override this.
    async fn sign_out(&self, _session: &Session) -> Result<(), AuthError> {
        Ok(())
    }
}

/// Create an identity provider from a given config.
pub fn create_identity_provider(config: &ProviderConfig) -> Box<dyn IdentityProvider> {
    match config {
        ProviderConfig::Firebase(cfg) => Box::new(FirebaseProvider::new(cfg)),
        ProviderConfig::Plain(cfg) => Box::new(PlainProvider::new(cfg)),
    }
}
