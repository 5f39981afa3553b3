use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, Responder, post, web};
use serde_json::json;

use crate::auth::{AuthenticatedUser, SessionService};
use crate::cdn::CdnClient;
use crate::forms::images::{DeleteImageRequest, UploadImageForm};
use crate::services::ServiceError;
use crate::services::images::{delete_image, upload_image};

fn error_response(action: &str, err: ServiceError) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => {
            HttpResponse::Forbidden().json(json!({ "error": "You do not have admin access." }))
        }
        ServiceError::Form(message) => HttpResponse::BadRequest().json(json!({ "error": message })),
        ServiceError::Upstream(message) => {
            log::error!("Failed to {action}: {message}");
            HttpResponse::BadGateway()
                .json(json!({ "error": format!("Failed to {action}, please try again.") }))
        }
        other => {
            log::error!("Failed to {action}: {other}");
            HttpResponse::InternalServerError()
                .json(json!({ "error": format!("Failed to {action}, please try again.") }))
        }
    }
}

#[post("/images/upload")]
/// Upload a photo and answer with `{ secure_url, public_id }`.
pub async fn upload_image_route(
    user: AuthenticatedUser,
    sessions: web::Data<SessionService>,
    cdn: Option<web::Data<CdnClient>>,
    MultipartForm(form): MultipartForm<UploadImageForm>,
) -> impl Responder {
    let host = cdn.as_ref().map(|cdn| cdn.get_ref());
    match upload_image(host, sessions.policy(), &user, form).await {
        Ok(uploaded) => HttpResponse::Ok().json(uploaded),
        Err(err) => error_response("upload the image", err),
    }
}

#[post("/images/delete")]
pub async fn delete_image_route(
    user: AuthenticatedUser,
    sessions: web::Data<SessionService>,
    cdn: Option<web::Data<CdnClient>>,
    web::Json(request): web::Json<DeleteImageRequest>,
) -> impl Responder {
    let host = cdn.as_ref().map(|cdn| cdn.get_ref());
    match delete_image(host, sessions.policy(), &user, request).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "success": true })),
        Err(err) => error_response("delete the image", err),
    }
}
