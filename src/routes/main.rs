use actix_web::http::header;
use actix_web::{HttpResponse, Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::auth::{AuthenticatedUser, SessionService};
use crate::repository::DieselRepository;
use crate::routes::{base_context, render_template};
use crate::services::main as main_service;

#[get("/")]
pub async fn show_index(
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
    sessions: web::Data<SessionService>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match main_service::load_menu_page(repo.get_ref(), sessions.policy(), user.as_ref()) {
        Ok(data) => {
            let mut context =
                base_context(&flash_messages, user.as_ref(), data.is_admin, "index");
            context.insert("sections", &data.sections);
            context.insert("featured", &data.featured);
            render_template(&tera, "main/index.html", &context)
        }
        Err(err) => {
            log::error!("Failed to load menu: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn moved_permanently(location: &str) -> HttpResponse {
    HttpResponse::PermanentRedirect()
        .insert_header((header::LOCATION, location))
        .finish()
}

#[get("/direct-admin")]
pub async fn legacy_admin() -> impl Responder {
    moved_permanently("/admin")
}

#[get("/direct-admin/categories")]
pub async fn legacy_admin_categories() -> impl Responder {
    moved_permanently("/admin/categories")
}
