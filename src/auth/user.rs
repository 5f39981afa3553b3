use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::dev::Payload;
use actix_web::error::ErrorUnauthorized;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use serde::{Deserialize, Serialize};

use crate::auth::AuthResult;

/// Seconds before the real expiry at which a session is treated as expired.
const EXPIRY_SKEW_SECS: i64 = 30;

/// Identity of a signed-in user as reported by the auth API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthenticatedUser {
    /// Opaque user identifier issued by the auth API.
    pub id: String,
    pub email: String,
    /// Role recorded in the user's profile metadata, if any.
    #[serde(default)]
    pub role: Option<String>,
}

/// Tokens obtained from the auth API, kept in the identity cookie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    pub user: AuthenticatedUser,
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp (seconds) at which the access token expires.
    pub expires_at: i64,
}

impl AuthSession {
    /// Whether the access token should be refreshed at time `now`.
    pub fn is_expired(&self, now: i64) -> bool {
        now + EXPIRY_SKEW_SECS >= self.expires_at
    }

    /// Encode the session for storage as the identity id.
    pub fn to_identity(&self) -> AuthResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a session previously stored with [`AuthSession::to_identity`].
    pub fn from_identity(raw: &str) -> AuthResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Session stored in the identity cookie, if it can still be decoded.
pub(crate) fn session_from_request(req: &HttpRequest) -> Option<AuthSession> {
    let identity = req.get_identity().ok()?;
    let raw = identity.id().ok()?;
    match AuthSession::from_identity(&raw) {
        Ok(session) => Some(session),
        Err(err) => {
            log::warn!("Discarding unreadable session: {err}");
            None
        }
    }
}

impl FromRequest for AuthSession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(session_from_request(req).ok_or_else(|| ErrorUnauthorized("not signed in")))
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // The admin middleware stores the freshly validated user here.
        let verified = req.extensions().get::<AuthenticatedUser>().cloned();
        let user = verified.or_else(|| session_from_request(req).map(|session| session.user));
        ready(user.ok_or_else(|| ErrorUnauthorized("not signed in")))
    }
}
