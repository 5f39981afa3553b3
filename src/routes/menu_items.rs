use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::{AuthenticatedUser, SessionService};
use crate::domain::menu_item::CategoryFilter;
use crate::forms::menu_items::{AddMenuItemForm, EditMenuItemForm};
use crate::forms::reorder::ReorderForm;
use crate::repository::DieselRepository;
use crate::routes::{base_context, not_admin, redirect, render_template};
use crate::services::ServiceError;
use crate::services::menu_items::{
    MenuItemsQuery, create_menu_item, load_menu_item, load_menu_items, modify_menu_item,
    remove_menu_item, reorder_menu_items,
};

const ADMIN_PAGE: &str = "/admin";

#[get("")]
/// Admin dashboard listing every menu item.
pub async fn show_menu_items(
    params: web::Query<MenuItemsQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    sessions: web::Data<SessionService>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match load_menu_items(repo.get_ref(), sessions.policy(), &user, params.into_inner()) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, Some(&user), true, "menu_items");
            context.insert("menu_items", &data.items);
            context.insert("categories", &data.categories);
            let category_id = match data.category {
                Some(CategoryFilter::Id(id)) => Some(id),
                _ => None,
            };
            context.insert("category_id", &category_id);
            context.insert(
                "uncategorized",
                &(data.category == Some(CategoryFilter::Uncategorized)),
            );
            context.insert("search", &data.search);
            context.insert("can_reorder", &data.can_reorder);
            render_template(&tera, "admin/menu_items.html", &context)
        }
        Err(ServiceError::Unauthorized) => not_admin(),
        Err(err) => {
            log::error!("Failed to list menu items: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/menu-items/{menu_item_id}")]
pub async fn show_menu_item(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    sessions: web::Data<SessionService>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let menu_item_id = path.into_inner();

    match load_menu_item(repo.get_ref(), sessions.policy(), &user, menu_item_id) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, Some(&user), true, "menu_items");
            context.insert("menu_item", &data.item);
            context.insert("categories", &data.categories);
            render_template(&tera, "admin/menu_item.html", &context)
        }
        Err(ServiceError::Unauthorized) => not_admin(),
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Menu item not found.").send();
            redirect(ADMIN_PAGE)
        }
        Err(err) => {
            log::error!("Failed to load menu item {menu_item_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/menu-items/add")]
pub async fn add_menu_item(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    sessions: web::Data<SessionService>,
    web::Form(form): web::Form<AddMenuItemForm>,
) -> impl Responder {
    match create_menu_item(repo.get_ref(), sessions.policy(), &user, form) {
        Ok(item) => {
            FlashMessage::success(format!("\"{}\" added to the menu.", item.title)).send();
            redirect(ADMIN_PAGE)
        }
        Err(ServiceError::Unauthorized) => not_admin(),
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect(ADMIN_PAGE)
        }
        Err(err) => {
            log::error!("Failed to create menu item: {err}");
            FlashMessage::error("Failed to add the menu item, please try again.").send();
            redirect(ADMIN_PAGE)
        }
    }
}

#[post("/menu-items/edit")]
pub async fn edit_menu_item(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    sessions: web::Data<SessionService>,
    web::Form(form): web::Form<EditMenuItemForm>,
) -> impl Responder {
    let item_page = format!("/admin/menu-items/{}", form.menu_item_id);

    match modify_menu_item(repo.get_ref(), sessions.policy(), &user, form) {
        Ok(item) => {
            FlashMessage::success(format!("\"{}\" updated.", item.title)).send();
            redirect(ADMIN_PAGE)
        }
        Err(ServiceError::Unauthorized) => not_admin(),
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect(&item_page)
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Menu item not found.").send();
            redirect(ADMIN_PAGE)
        }
        Err(err) => {
            log::error!("Failed to update menu item: {err}");
            FlashMessage::error("Failed to update the menu item, please try again.").send();
            redirect(&item_page)
        }
    }
}

#[post("/menu-items/{menu_item_id}/delete")]
pub async fn delete_menu_item(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    sessions: web::Data<SessionService>,
) -> impl Responder {
    let menu_item_id = path.into_inner();

    match remove_menu_item(repo.get_ref(), sessions.policy(), &user, menu_item_id) {
        Ok(()) => {
            FlashMessage::success("Menu item deleted.").send();
            redirect(ADMIN_PAGE)
        }
        Err(ServiceError::Unauthorized) => not_admin(),
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Menu item not found or already deleted.").send();
            redirect(ADMIN_PAGE)
        }
        Err(err) => {
            log::error!("Failed to delete menu item {menu_item_id}: {err}");
            FlashMessage::error("Failed to delete the menu item, please try again.").send();
            redirect(ADMIN_PAGE)
        }
    }
}

#[post("/menu-items/reorder")]
pub async fn reorder_menu_items_route(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    sessions: web::Data<SessionService>,
    body: String,
) -> impl Responder {
    let form = match ReorderForm::from_body(&body) {
        Ok(form) => form,
        Err(err) => {
            FlashMessage::error(err.to_string()).send();
            return redirect(ADMIN_PAGE);
        }
    };

    match reorder_menu_items(repo.get_ref(), sessions.policy(), &user, form) {
        Ok(()) => {
            FlashMessage::success("Menu order saved.").send();
            redirect(ADMIN_PAGE)
        }
        Err(ServiceError::Unauthorized) => not_admin(),
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect(ADMIN_PAGE)
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Some menu items no longer exist. The order was not changed.")
                .send();
            redirect(ADMIN_PAGE)
        }
        Err(err) => {
            log::error!("Failed to reorder menu items: {err}");
            FlashMessage::error("Failed to save the order, please try again.").send();
            redirect(ADMIN_PAGE)
        }
    }
}
