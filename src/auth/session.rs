use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::auth::policy::AdminPolicy;
use crate::auth::provider::{AuthProvider, SignUpOutcome};
use crate::auth::user::{AuthSession, AuthenticatedUser};
use crate::auth::AuthResult;

/// Buffered events per subscriber before it starts lagging.
const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthEventKind {
    SignedUp,
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

/// Notification emitted whenever the authentication state changes.
#[derive(Debug, Clone)]
pub struct AuthEvent {
    pub kind: AuthEventKind,
    /// User after the change; `None` once signed out.
    pub user: Option<AuthenticatedUser>,
    /// Admin status of `user` under the configured policy.
    pub is_admin: bool,
}

/// Session state after [`SessionService::ensure_fresh`].
#[derive(Debug, Clone)]
pub enum Fresh {
    /// The stored session is still valid.
    Current(AuthSession),
    /// The session was refreshed and must be stored again.
    Refreshed(AuthSession),
}

impl Fresh {
    pub fn session(&self) -> &AuthSession {
        match self {
            Fresh::Current(session) | Fresh::Refreshed(session) => session,
        }
    }

    pub fn into_session(self) -> AuthSession {
        match self {
            Fresh::Current(session) | Fresh::Refreshed(session) => session,
        }
    }
}

/// Application-wide entry point for identity questions.
///
/// Built once at startup and shared through `web::Data`. Wraps the hosted
/// auth API, applies the [`AdminPolicy`] and broadcasts [`AuthEvent`]s to
/// subscribers.
pub struct SessionService {
    provider: Arc<dyn AuthProvider>,
    policy: AdminPolicy,
    events: broadcast::Sender<AuthEvent>,
}

impl SessionService {
    pub fn new(provider: Arc<dyn AuthProvider>, policy: AdminPolicy) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            provider,
            policy,
            events,
        }
    }

    pub fn policy(&self) -> &AdminPolicy {
        &self.policy
    }

    pub fn is_admin(&self, user: Option<&AuthenticatedUser>) -> bool {
        self.policy.is_admin(user)
    }

    /// Register for authentication state changes.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        let session = self.provider.sign_in(email, password).await?;
        self.emit(AuthEventKind::SignedIn, Some(&session.user));
        Ok(session)
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome> {
        let outcome = self.provider.sign_up(email, password).await?;
        match &outcome {
            SignUpOutcome::SignedIn(session) => {
                self.emit(AuthEventKind::SignedUp, Some(&session.user));
                self.emit(AuthEventKind::SignedIn, Some(&session.user));
            }
            SignUpOutcome::ConfirmationRequired(user) => {
                self.emit(AuthEventKind::SignedUp, Some(user));
            }
        }
        Ok(outcome)
    }

    /// Revoke the session upstream. The sign-out event is emitted even when
    /// the API call fails since the local session is discarded regardless.
    pub async fn sign_out(&self, session: &AuthSession) -> AuthResult<()> {
        let result = self.provider.sign_out(&session.access_token).await;
        self.emit(AuthEventKind::SignedOut, None);
        result
    }

    /// Refresh `session` when its access token has expired.
    pub async fn ensure_fresh(&self, session: AuthSession) -> AuthResult<Fresh> {
        self.ensure_fresh_at(session, Utc::now().timestamp()).await
    }

    pub async fn ensure_fresh_at(&self, session: AuthSession, now: i64) -> AuthResult<Fresh> {
        if !session.is_expired(now) {
            return Ok(Fresh::Current(session));
        }

        let refreshed = self.provider.refresh(&session.refresh_token).await?;
        self.emit(AuthEventKind::TokenRefreshed, Some(&refreshed.user));
        Ok(Fresh::Refreshed(refreshed))
    }

    /// Look up the session's user with the auth API rather than trusting the
    /// stored copy.
    pub async fn current_user(&self, session: &AuthSession) -> AuthResult<AuthenticatedUser> {
        self.provider.get_user(&session.access_token).await
    }

    fn emit(&self, kind: AuthEventKind, user: Option<&AuthenticatedUser>) {
        let event = AuthEvent {
            kind,
            user: user.cloned(),
            is_admin: self.policy.is_admin(user),
        };
        if self.events.send(event).is_err() {
            log::debug!("No subscribers for auth event {kind:?}");
        }
    }
}

/// Log every auth event until the service is dropped.
pub async fn log_auth_events(mut events: broadcast::Receiver<AuthEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => match &event.user {
                Some(user) => log::info!(
                    "Auth event {:?} for {} (admin: {})",
                    event.kind,
                    user.email,
                    event.is_admin
                ),
                None => log::info!("Auth event {:?}", event.kind),
            },
            Err(RecvError::Lagged(skipped)) => {
                log::warn!("Auth event logger skipped {skipped} events");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
