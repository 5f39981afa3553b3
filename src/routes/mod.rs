//! HTTP handlers and the helpers they share.

use actix_web::HttpResponse;
use actix_web::http::header;
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level};
use serde::Serialize;
use tera::{Context, Tera};

use crate::auth::AuthenticatedUser;

pub mod api;
pub mod auth;
pub mod categories;
pub mod images;
pub mod main;
pub mod menu_items;

/// Flash message as rendered by `base.html`.
#[derive(Debug, Serialize)]
struct Alert {
    /// Bootstrap contextual class.
    level: &'static str,
    message: String,
}

fn alert_level(level: Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        Level::Info | Level::Debug => "info",
    }
}

/// `303 See Other` to `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Send a signed-in visitor without admin rights back to the public site.
pub fn not_admin() -> HttpResponse {
    FlashMessage::error("You do not have admin access.").send();
    redirect("/")
}

/// Render `template`, answering `500` when rendering fails.
pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type(header::ContentType::html())
            .body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Context shared by every page: flash alerts, the signed-in user, the admin
/// flag for the navbar and the active navigation entry.
pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    user: Option<&AuthenticatedUser>,
    is_admin: bool,
    current_page: &str,
) -> Context {
    let alerts: Vec<Alert> = flash_messages
        .iter()
        .map(|message| Alert {
            level: alert_level(message.level()),
            message: message.content().to_string(),
        })
        .collect();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_user", &user);
    context.insert("is_admin", &is_admin);
    context.insert("current_page", current_page);
    context
}
