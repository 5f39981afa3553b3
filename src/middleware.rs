//! Gate in front of the admin panel.

use actix_identity::{Identity, IdentityExt};
use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::{Error, HttpMessage, HttpResponse, web};
use actix_web_flash_messages::FlashMessage;

use crate::auth::user::session_from_request;
use crate::auth::{Fresh, SessionService};
use crate::routes::auth::login_url;
use crate::routes::{not_admin, redirect};

fn forget_identity(req: &ServiceRequest) {
    if let Ok(identity) = req.get_identity() {
        identity.logout();
    }
}

/// Let only administrators through.
///
/// Visitors without a usable session are sent to the login page with a link
/// back. Expired sessions are refreshed before the admin check. Admins
/// continue with their user stored in the request extensions.
pub async fn require_admin<B: MessageBody + 'static>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    let Some(sessions) = req.app_data::<web::Data<SessionService>>().cloned() else {
        log::error!("Session service is not registered");
        let response = HttpResponse::InternalServerError().finish();
        return Ok(req.into_response(response).map_into_right_body());
    };

    let target = req
        .uri()
        .path_and_query()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| req.path().to_string());

    let Some(session) = session_from_request(req.request()) else {
        let response = redirect(&login_url(Some(&target)));
        return Ok(req.into_response(response).map_into_right_body());
    };

    let session = match sessions.ensure_fresh(session).await {
        Ok(Fresh::Current(session)) => session,
        Ok(Fresh::Refreshed(session)) => {
            match session.to_identity() {
                Ok(raw) => {
                    if let Err(err) = Identity::login(&req.extensions(), raw) {
                        log::warn!("Failed to store refreshed session: {err}");
                    }
                }
                Err(err) => log::warn!("Failed to encode refreshed session: {err}"),
            }
            session
        }
        Err(err) => {
            log::info!("Session refresh failed, signing out: {err}");
            forget_identity(&req);
            FlashMessage::warning("Your session has expired. Please sign in again.").send();
            let response = redirect(&login_url(Some(&target)));
            return Ok(req.into_response(response).map_into_right_body());
        }
    };

    if !sessions.is_admin(Some(&session.user)) {
        log::warn!("Non-admin {} tried to open {target}", session.user.email);
        return Ok(req.into_response(not_admin()).map_into_right_body());
    }

    req.extensions_mut().insert(session.user);
    next.call(req)
        .await
        .map(ServiceResponse::map_into_left_body)
}
