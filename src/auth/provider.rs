use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::auth::user::{AuthSession, AuthenticatedUser};
use crate::auth::{AuthError, AuthResult};

/// Result of a sign-up request.
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    /// The account is active and a session was issued immediately.
    SignedIn(AuthSession),
    /// The account exists but must be confirmed by email first.
    ConfirmationRequired(AuthenticatedUser),
}

/// Operations consumed from the hosted authentication service.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome>;
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession>;
    async fn sign_out(&self, access_token: &str) -> AuthResult<()>;
    /// Exchange a refresh token for a new session.
    async fn refresh(&self, refresh_token: &str) -> AuthResult<AuthSession>;
    /// Resolve the user owning `access_token`, verifying it with the service.
    async fn get_user(&self, access_token: &str) -> AuthResult<AuthenticatedUser>;
}

/// HTTP client for a GoTrue-compatible auth API (`{base}/auth/v1/...`).
#[derive(Clone)]
pub struct HostedAuthClient {
    http: Client,
    base_url: String,
    anon_key: String,
}

impl HostedAuthClient {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
            anon_key: anon_key.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.http
            .post(self.endpoint(path))
            .header("apikey", &self.anon_key)
    }
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<UserMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    #[serde(default)]
    role: Option<String>,
}

impl From<UserPayload> for AuthenticatedUser {
    fn from(value: UserPayload) -> Self {
        Self {
            id: value.id,
            email: value.email.unwrap_or_default(),
            role: value.user_metadata.and_then(|metadata| metadata.role),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenPayload {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    #[serde(default)]
    expires_at: Option<i64>,
    user: UserPayload,
}

impl TokenPayload {
    fn into_session(self, now: i64) -> AuthSession {
        AuthSession {
            user: self.user.into(),
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: self.expires_at.unwrap_or(now + self.expires_in),
        }
    }
}

/// Sign-up answers with a token payload when auto-confirm is enabled and
/// with the bare user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpPayload {
    Session(TokenPayload),
    User(UserPayload),
}

#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorPayload {
    fn into_message(self) -> Option<String> {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
    }
}

async fn error_message(response: Response) -> String {
    let status = response.status();
    response
        .json::<ErrorPayload>()
        .await
        .ok()
        .and_then(ErrorPayload::into_message)
        .unwrap_or_else(|| status.to_string())
}

async fn rejected(response: Response) -> AuthError {
    let status = response.status().as_u16();
    AuthError::Rejected {
        status,
        message: error_message(response).await,
    }
}

#[async_trait]
impl AuthProvider for HostedAuthClient {
    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome> {
        let response = self
            .post("signup")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        let outcome = match response.json::<SignUpPayload>().await? {
            SignUpPayload::Session(tokens) => {
                SignUpOutcome::SignedIn(tokens.into_session(Utc::now().timestamp()))
            }
            SignUpPayload::User(user) => SignUpOutcome::ConfirmationRequired(user.into()),
        };

        Ok(outcome)
    }

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        let response = self
            .post("token?grant_type=password")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let tokens = response.json::<TokenPayload>().await?;
                Ok(tokens.into_session(Utc::now().timestamp()))
            }
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => Err(
                AuthError::InvalidCredentials(error_message(response).await),
            ),
            _ => Err(rejected(response).await),
        }
    }

    async fn sign_out(&self, access_token: &str) -> AuthResult<()> {
        let response = self.post("logout").bearer_auth(access_token).send().await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            // The token is already unusable, which is what signing out wants.
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(()),
            _ => Err(rejected(response).await),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> AuthResult<AuthSession> {
        let response = self
            .post("token?grant_type=refresh_token")
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let tokens = response.json::<TokenPayload>().await?;
                Ok(tokens.into_session(Utc::now().timestamp()))
            }
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => Err(AuthError::SessionExpired),
            _ => Err(rejected(response).await),
        }
    }

    async fn get_user(&self, access_token: &str) -> AuthResult<AuthenticatedUser> {
        let response = self
            .http
            .get(self.endpoint("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json::<UserPayload>().await?.into()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AuthError::SessionExpired),
            _ => Err(rejected(response).await),
        }
    }
}
