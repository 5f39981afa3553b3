use serde::Serialize;

use crate::auth::{AuthSession, AuthenticatedUser, Fresh, SessionService, SignUpOutcome};
use crate::forms::auth::{LoginForm, SignUpForm};
use crate::services::{ServiceError, ServiceResult};

/// Where admins land after signing in without an explicit target.
pub const ADMIN_HOME: &str = "/admin";

/// Result of a successful sign-in.
#[derive(Debug)]
pub struct LoginOutcome {
    /// Session to store in the identity cookie.
    pub session: AuthSession,
    pub redirect_to: String,
}

/// Result of a successful sign-up.
#[derive(Debug)]
pub enum RegisterOutcome {
    SignedIn(LoginOutcome),
    /// The account exists but its email address must be confirmed first.
    ConfirmationRequired { email: String },
}

/// Answer of the session diagnostics endpoint.
#[derive(Debug, Serialize)]
pub struct SessionReport {
    pub authenticated: bool,
    pub user: Option<AuthenticatedUser>,
    pub is_admin: bool,
    /// Renewed tokens that must replace the stored session.
    #[serde(skip)]
    pub refreshed: Option<AuthSession>,
}

impl SessionReport {
    fn anonymous() -> Self {
        Self {
            authenticated: false,
            user: None,
            is_admin: false,
            refreshed: None,
        }
    }
}

fn landing_page(
    sessions: &SessionService,
    user: &AuthenticatedUser,
    redirect: Option<String>,
) -> String {
    redirect.unwrap_or_else(|| {
        if sessions.is_admin(Some(user)) {
            ADMIN_HOME.to_string()
        } else {
            "/".to_string()
        }
    })
}

/// Signs in with email and password.
pub async fn login(sessions: &SessionService, form: LoginForm) -> ServiceResult<LoginOutcome> {
    let (credentials, redirect) = form
        .into_credentials()
        .map_err(|_| ServiceError::Form("Enter a valid email address and password.".to_string()))?;

    let session = sessions
        .sign_in(&credentials.email, &credentials.password)
        .await
        .map_err(ServiceError::from)?;
    let redirect_to = landing_page(sessions, &session.user, redirect);

    Ok(LoginOutcome {
        session,
        redirect_to,
    })
}

/// Creates an account and signs in when the auth API allows it right away.
pub async fn register(
    sessions: &SessionService,
    form: SignUpForm,
) -> ServiceResult<RegisterOutcome> {
    let credentials = form.into_credentials().map_err(|_| {
        ServiceError::Form(
            "Enter a valid email address and a password of at least 6 characters.".to_string(),
        )
    })?;

    let outcome = sessions
        .sign_up(&credentials.email, &credentials.password)
        .await
        .map_err(ServiceError::from)?;

    Ok(match outcome {
        SignUpOutcome::SignedIn(session) => {
            let redirect_to = landing_page(sessions, &session.user, None);
            RegisterOutcome::SignedIn(LoginOutcome {
                session,
                redirect_to,
            })
        }
        SignUpOutcome::ConfirmationRequired(user) => {
            RegisterOutcome::ConfirmationRequired { email: user.email }
        }
    })
}

/// Revokes the session upstream. The local session is dropped by the caller
/// whatever the outcome, so failures are only logged.
pub async fn logout(sessions: &SessionService, session: Option<AuthSession>) {
    let Some(session) = session else {
        return;
    };
    if let Err(err) = sessions.sign_out(&session).await {
        log::warn!("Failed to revoke session for {}: {err}", session.user.email);
    }
}

/// Reports who the stored session belongs to, verified against the auth API.
pub async fn describe_session(
    sessions: &SessionService,
    session: Option<AuthSession>,
) -> SessionReport {
    let Some(session) = session else {
        return SessionReport::anonymous();
    };

    let (session, refreshed) = match sessions.ensure_fresh(session).await {
        Ok(Fresh::Current(session)) => (session, None),
        Ok(Fresh::Refreshed(session)) => (session.clone(), Some(session)),
        Err(err) => {
            log::info!("Stored session could not be refreshed: {err}");
            return SessionReport::anonymous();
        }
    };

    match sessions.current_user(&session).await {
        Ok(user) => SessionReport {
            authenticated: true,
            is_admin: sessions.is_admin(Some(&user)),
            user: Some(user),
            refreshed,
        },
        Err(err) => {
            log::info!("Stored session was rejected: {err}");
            SessionReport::anonymous()
        }
    }
}
