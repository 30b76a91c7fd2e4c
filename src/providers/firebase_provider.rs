use async_trait::async_trait;
use reqwest::{Client, Response};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::models::Session;
use crate::providers::IdentityProvider;

fn default_identity_uri() -> String {
    "https://identitytoolkit.googleapis.com".to_string()
}

fn default_token_uri() -> String {
    "https://securetoken.googleapis.com".to_string()
}

/// Config for the Firebase Authentication REST API.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct FirebaseProviderConfig {
    pub name: String,
    /// Web API key of the Firebase project.
    pub api_key: String,
    #[serde(default = "default_identity_uri")]
    pub identity_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

/// Response of `accounts:signUp` and `accounts:signInWithPassword`.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    email: String,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

/// Response of the secure token endpoint. Note the snake_case members.
#[derive(Deserialize, Debug)]
struct TokenResponse {
    user_id: String,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

/// An identity provider backed by Firebase Authentication.
pub struct FirebaseProvider {
    pub config: FirebaseProviderConfig,
    client: Client,
}

impl FirebaseProvider {
    pub fn new(config: &FirebaseProviderConfig) -> Self {
        info!(
            "Creating Firebase identity provider name='{}' at '{}'",
            config.name, config.identity_uri
        );
        Self {
            config: config.clone(),
            client: Client::new(),
        }
    }

    async fn password_request(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let url = format!("{}/v1/accounts:{}", self.config.identity_uri, endpoint);
        debug!("Sending Firebase {} request for '{}'", endpoint, email);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await
            .map_err(|e| AuthError::new(format!("Error sending request: {}", e)))?;

        let body: PasswordResponse = parse_response(response).await?;
        Ok(Session::new(
            body.local_id,
            body.email,
            body.id_token,
            Some(body.refresh_token),
            parse_expires_in(&body.expires_in),
        ))
    }
}

#[async_trait]
impl IdentityProvider for FirebaseProvider {
    fn get_name(&self) -> &str {
        &self.config.name
    }

    fn get_type(&self) -> &str {
        "firebase"
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.password_request("signUp", email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.password_request("signInWithPassword", email, password)
            .await
    }

    async fn refresh(&self, session: &Session) -> Result<Session, AuthError> {
        let refresh_token = session
            .refresh_token
            .as_deref()
            .ok_or_else(|| AuthError::new("Session has no refresh token"))?;

        let url = format!("{}/v1/token", self.config.token_uri);
        debug!("Refreshing Firebase session for user_id='{}'", session.user_id);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| AuthError::new(format!("Error sending request: {}", e)))?;

        let body: TokenResponse = parse_response(response).await?;
        Ok(Session::new(
            body.user_id,
            session.email.clone(),
            body.id_token,
            Some(body.refresh_token),
            parse_expires_in(&body.expires_in),
        ))
    }
}

/// Decode a success body, or turn an error body into the provider's message.
async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, AuthError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| AuthError::new(format!("Error reading response body: {}", e)))?;

    if status.is_success() {
        return serde_json::from_str(&body)
            .map_err(|e| AuthError::new(format!("Error parsing JSON: {}", e)));
    }

    match error_message(&body) {
        Some(message) => Err(AuthError::new(message)),
        None => {
            warn!("Firebase returned {} without an error message", status);
            Err(AuthError::new(format!("Unexpected status code: {}", status)))
        }
    }
}

/// Firebase errors look like `{"error": {"code": 400, "message": "EMAIL_EXISTS"}}`.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value["error"]["message"].as_str().map(str::to_string)
}

/// `expiresIn` is a decimal string of seconds. Treat garbage as already expired.
fn parse_expires_in(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn config_for(uri: &str) -> FirebaseProviderConfig {
        FirebaseProviderConfig {
            name: "Test Firebase".to_string(),
            api_key: "test-key".to_string(),
            identity_uri: uri.to_string(),
            token_uri: uri.to_string(),
        }
    }

    /// A successful sign-in yields a session keyed by `localId`.
    #[tokio::test]
    async fn test_sign_in_success() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/v1/accounts:signInWithPassword")
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_body(Matcher::PartialJson(json!({
                "email": "a@x.com",
                "password": "secret1",
                "returnSecureToken": true
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"localId":"uid-1","email":"a@x.com","idToken":"id-1","refreshToken":"rt-1","expiresIn":"3600","registered":true}"#,
            )
            .create_async()
            .await;

        let provider = FirebaseProvider::new(&config_for(&server.url()));
        let session = provider.sign_in("a@x.com", "secret1").await.unwrap();
        m.assert_async().await;

        assert_eq!(session.user_id, "uid-1");
        assert_eq!(session.email, "a@x.com");
        assert_eq!(session.id_token, "id-1");
        assert_eq!(session.refresh_token.as_deref(), Some("rt-1"));
        assert!(!session.is_expired());
    }

    /// The provider's error message is surfaced verbatim.
    #[tokio::test]
    async fn test_sign_up_email_exists() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/v1/accounts:signUp")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error":{"code":400,"message":"EMAIL_EXISTS","errors":[]}}"#)
            .create_async()
            .await;

        let provider = FirebaseProvider::new(&config_for(&server.url()));
        let err = provider.sign_up("a@x.com", "secret1").await.unwrap_err();
        m.assert_async().await;
        assert_eq!(err.reason, "EMAIL_EXISTS");
    }

    /// An error without a JSON body still produces an error.
    #[tokio::test]
    async fn test_sign_in_opaque_failure() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/v1/accounts:signInWithPassword")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("upstream unavailable")
            .create_async()
            .await;

        let provider = FirebaseProvider::new(&config_for(&server.url()));
        let err = provider.sign_in("a@x.com", "secret1").await.unwrap_err();
        assert!(err.reason.contains("503"), "got: {}", err.reason);
    }

    /// Refresh posts the refresh token as a form and keeps the email.
    #[tokio::test]
    async fn test_refresh_session() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/v1/token")
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
                Matcher::UrlEncoded("refresh_token".into(), "rt-old".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"user_id":"uid-1","id_token":"id-new","refresh_token":"rt-new","expires_in":"3600","token_type":"Bearer"}"#,
            )
            .create_async()
            .await;

        let provider = FirebaseProvider::new(&config_for(&server.url()));
        let stale = Session::new(
            "uid-1".to_string(),
            "a@x.com".to_string(),
            "id-old".to_string(),
            Some("rt-old".to_string()),
            -10,
        );
        let fresh = provider.refresh(&stale).await.unwrap();
        m.assert_async().await;

        assert_eq!(fresh.id_token, "id-new");
        assert_eq!(fresh.refresh_token.as_deref(), Some("rt-new"));
        assert_eq!(fresh.email, "a@x.com");
        assert!(fresh.same_user(&stale));
        assert!(!fresh.is_expired());
    }

    #[tokio::test]
    async fn test_refresh_without_token_fails_locally() {
        let provider = FirebaseProvider::new(&config_for("http://127.0.0.1:9"));
        let session = Session::new(
            "uid-1".to_string(),
            "a@x.com".to_string(),
            "id".to_string(),
            None,
            0,
        );
        assert!(provider.refresh(&session).await.is_err());
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"error":{"message":"INVALID_PASSWORD"}}"#).as_deref(),
            Some("INVALID_PASSWORD")
        );
        assert_eq!(error_message("not json"), None);
        assert_eq!(parse_expires_in("3600"), 3600);
        assert_eq!(parse_expires_in("soon"), 0);
    }
}
