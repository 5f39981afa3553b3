use actix_identity::Identity;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use serde::{Deserialize, Serialize};
use tera::Tera;

use crate::auth::{AuthSession, AuthenticatedUser, SessionService};
use crate::forms::auth::{LoginForm, SignUpForm, local_redirect};
use crate::routes::{base_context, redirect, render_template};
use crate::services::ServiceError;
use crate::services::auth::{RegisterOutcome, describe_session, login, logout, register};

/// Query string of the login page.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LoginQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

/// Login page URL that returns to `target` afterwards.
pub fn login_url(target: Option<&str>) -> String {
    let query = LoginQuery {
        redirect: target.and_then(local_redirect),
    };
    match serde_qs::to_string(&query) {
        Ok(encoded) if !encoded.is_empty() => format!("/login?{encoded}"),
        Ok(_) => "/login".to_string(),
        Err(err) => {
            log::warn!("Failed to encode login redirect: {err}");
            "/login".to_string()
        }
    }
}

/// Store `session` as the request's identity.
pub fn remember_session(req: &HttpRequest, session: &AuthSession) -> Result<(), String> {
    let raw = session.to_identity().map_err(|err| err.to_string())?;
    Identity::login(&req.extensions(), raw).map_err(|err| err.to_string())?;
    Ok(())
}

#[get("/login")]
pub async fn show_login(
    params: web::Query<LoginQuery>,
    user: Option<AuthenticatedUser>,
    sessions: web::Data<SessionService>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let is_admin = sessions.is_admin(user.as_ref());
    let mut context = base_context(&flash_messages, user.as_ref(), is_admin, "login");
    let target = params.redirect.as_deref().and_then(local_redirect);
    context.insert("redirect", &target);
    render_template(&tera, "auth/login.html", &context)
}

#[post("/login")]
pub async fn submit_login(
    req: HttpRequest,
    sessions: web::Data<SessionService>,
    web::Form(form): web::Form<LoginForm>,
) -> impl Responder {
    let retry = login_url(form.redirect.as_deref());

    match login(sessions.get_ref(), form).await {
        Ok(outcome) => match remember_session(&req, &outcome.session) {
            Ok(()) => {
                FlashMessage::success(format!("Signed in as {}.", outcome.session.user.email))
                    .send();
                redirect(&outcome.redirect_to)
            }
            Err(err) => {
                log::error!("Failed to store session: {err}");
                FlashMessage::error("Failed to sign in, please try again.").send();
                redirect(&retry)
            }
        },
        Err(ServiceError::Form(message) | ServiceError::Auth(message)) => {
            FlashMessage::error(message).send();
            redirect(&retry)
        }
        Err(err) => {
            log::error!("Failed to sign in: {err}");
            FlashMessage::error("Failed to sign in, please try again.").send();
            redirect(&retry)
        }
    }
}

#[post("/signup")]
pub async fn submit_signup(
    req: HttpRequest,
    sessions: web::Data<SessionService>,
    web::Form(form): web::Form<SignUpForm>,
) -> impl Responder {
    match register(sessions.get_ref(), form).await {
        Ok(RegisterOutcome::SignedIn(outcome)) => match remember_session(&req, &outcome.session) {
            Ok(()) => {
                FlashMessage::success("Account created.").send();
                redirect(&outcome.redirect_to)
            }
            Err(err) => {
                log::error!("Failed to store session: {err}");
                FlashMessage::error("Account created. Please sign in.").send();
                redirect("/login")
            }
        },
        Ok(RegisterOutcome::ConfirmationRequired { email }) => {
            FlashMessage::info(format!(
                "Check {email} for a confirmation link, then sign in."
            ))
            .send();
            redirect("/login")
        }
        Err(ServiceError::Form(message) | ServiceError::Auth(message)) => {
            FlashMessage::error(message).send();
            redirect("/login")
        }
        Err(err) => {
            log::error!("Failed to sign up: {err}");
            FlashMessage::error("Failed to create the account, please try again.").send();
            redirect("/login")
        }
    }
}

#[post("/logout")]
pub async fn submit_logout(
    identity: Option<Identity>,
    session: Option<AuthSession>,
    sessions: web::Data<SessionService>,
) -> impl Responder {
    logout(sessions.get_ref(), session).await;
    if let Some(identity) = identity {
        identity.logout();
    }
    FlashMessage::info("Signed out.").send();
    redirect("/")
}

#[get("/session")]
/// Report the current session as JSON, verified against the auth API.
pub async fn show_session(
    req: HttpRequest,
    identity: Option<Identity>,
    session: Option<AuthSession>,
    sessions: web::Data<SessionService>,
) -> impl Responder {
    let had_session = session.is_some();
    let report = describe_session(sessions.get_ref(), session).await;

    if let Some(refreshed) = report.refreshed.as_ref() {
        if let Err(err) = remember_session(&req, refreshed) {
            log::warn!("Failed to store refreshed session: {err}");
        }
    } else if had_session && !report.authenticated {
        if let Some(identity) = identity {
            identity.logout();
        }
    }

    HttpResponse::Ok().json(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_url_keeps_local_targets_only() {
        let url = login_url(Some("/admin/categories"));
        let query = url.strip_prefix("/login?").expect("query string");
        let decoded: LoginQuery = serde_qs::from_str(query).expect("decode");
        assert_eq!(decoded.redirect.as_deref(), Some("/admin/categories"));

        assert_eq!(login_url(Some("https://evil.test")), "/login");
        assert_eq!(login_url(None), "/login");
    }
}
