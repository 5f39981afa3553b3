use std::sync::Arc;

use actix_files::Files;
use actix_identity::IdentityMiddleware;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::middleware::from_fn;
use actix_web::{App, HttpServer, middleware, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
use dotenvy::dotenv;
use tera::Tera;

use naxos_menu::auth::session::log_auth_events;
use naxos_menu::auth::{AdminPolicy, HostedAuthClient, SessionService};
use naxos_menu::cdn::CdnClient;
use naxos_menu::config::ServerConfig;
use naxos_menu::db::establish_connection_pool;
use naxos_menu::middleware::require_admin;
use naxos_menu::repository::DieselRepository;
use naxos_menu::routes::api::{api_v1_categories, api_v1_menu_item, api_v1_menu_items};
use naxos_menu::routes::auth::{
    show_login, show_session, submit_login, submit_logout, submit_signup,
};
use naxos_menu::routes::categories::{
    add_category, delete_category, edit_category, reorder_categories_route, show_categories,
};
use naxos_menu::routes::images::{delete_image_route, upload_image_route};
use naxos_menu::routes::main::{legacy_admin, legacy_admin_categories, show_index};
use naxos_menu::routes::menu_items::{
    add_menu_item, delete_menu_item, edit_menu_item, reorder_menu_items_route, show_menu_item,
    show_menu_items,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenv().ok(); // Load .env file

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let secret_key = match &config.secret_key {
        Some(key) => Key::derive_from(key.as_bytes()),
        None => {
            log::warn!("SECRET_KEY not set, sessions will not survive a restart");
            Key::generate()
        }
    };

    let pool = match establish_connection_pool(&config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    let repo = DieselRepository::new(pool);

    let policy = AdminPolicy::from_allow_list(&config.admin_emails);
    if policy.is_empty() {
        log::warn!("No admin emails configured, the admin panel is unreachable");
    } else {
        log::info!("{} admin email(s) configured", policy.len());
    }
    let provider = Arc::new(HostedAuthClient::new(
        config.auth_url.clone(),
        config.auth_anon_key.clone(),
    ));
    let sessions = web::Data::new(SessionService::new(provider, policy));
    actix_web::rt::spawn(log_auth_events(sessions.subscribe()));

    let cdn = config.cdn.clone().map(|cdn| web::Data::new(CdnClient::new(cdn)));
    if cdn.is_none() {
        log::warn!("CDN credentials not set, image uploads are disabled");
    }

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = match Tera::new("templates/**/*") {
        Ok(t) => t,
        Err(e) => {
            log::error!("Parsing error(s): {e}");
            std::process::exit(1);
        }
    };

    let domain = config.domain.clone();
    let bind_address = (config.address.clone(), config.port);
    let config = web::Data::new(config);

    HttpServer::new(move || {
        let mut app = App::new()
            .wrap(message_framework.clone())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .cookie_domain(Some(format!(".{domain}")))
                    .build(),
            )
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(Files::new("/assets", "./assets"))
            .service(show_index)
            .service(legacy_admin)
            .service(legacy_admin_categories)
            .service(show_login)
            .service(submit_login)
            .service(submit_signup)
            .service(submit_logout)
            .service(show_session)
            .service(
                web::scope("/api")
                    .service(api_v1_categories)
                    .service(api_v1_menu_items)
                    .service(api_v1_menu_item),
            )
            .service(
                web::scope("/admin")
                    .wrap(from_fn(require_admin))
                    .service(show_menu_items)
                    .service(show_menu_item)
                    .service(add_menu_item)
                    .service(edit_menu_item)
                    .service(delete_menu_item)
                    .service(reorder_menu_items_route)
                    .service(show_categories)
                    .service(add_category)
                    .service(edit_category)
                    .service(delete_category)
                    .service(reorder_categories_route)
                    .service(upload_image_route)
                    .service(delete_image_route),
            )
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(repo.clone()))
            .app_data(sessions.clone())
            .app_data(config.clone());
        if let Some(cdn) = &cdn {
            app = app.app_data(cdn.clone());
        }
        app
    })
    .bind(bind_address)?
    .run()
    .await
}
