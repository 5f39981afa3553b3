use actix_web::{HttpResponse, Responder, get, web};

use crate::repository::DieselRepository;
use crate::services::ServiceError;
use crate::services::catalog::{
    CatalogQuery, get_public_menu_item, list_public_categories, list_public_menu_items,
};

#[get("/v1/categories")]
/// Return every category in display order.
pub async fn api_v1_categories(repo: web::Data<DieselRepository>) -> impl Responder {
    match list_public_categories(repo.get_ref()) {
        Ok(categories) => HttpResponse::Ok().json(categories),
        Err(err) => {
            log::error!("Failed to list categories: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/v1/menu-items")]
/// Return menu items in display order.
///
/// Accepts `category_id`, `uncategorized=true`, `featured=true` and `search`.
pub async fn api_v1_menu_items(
    params: web::Query<CatalogQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match list_public_menu_items(repo.get_ref(), params.into_inner()) {
        Ok(items) => HttpResponse::Ok().json(items),
        Err(err) => {
            log::error!("Failed to list menu items: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/v1/menu-items/{menu_item_id}")]
pub async fn api_v1_menu_item(
    path: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let menu_item_id = path.into_inner();

    match get_public_menu_item(repo.get_ref(), menu_item_id) {
        Ok(item) => HttpResponse::Ok().json(item),
        Err(ServiceError::NotFound) => HttpResponse::NotFound().finish(),
        Err(err) => {
            log::error!("Failed to load menu item {menu_item_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
