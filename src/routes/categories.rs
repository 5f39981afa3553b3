use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::{AuthenticatedUser, SessionService};
use crate::forms::categories::{AddCategoryForm, EditCategoryForm};
use crate::forms::reorder::ReorderForm;
use crate::repository::DieselRepository;
use crate::routes::{base_context, not_admin, redirect, render_template};
use crate::services::ServiceError;
use crate::services::categories::{
    create_category, load_categories, modify_category, remove_category, reorder_categories,
};

const CATEGORIES_PAGE: &str = "/admin/categories";

#[get("/categories")]
pub async fn show_categories(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    sessions: web::Data<SessionService>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match load_categories(repo.get_ref(), sessions.policy(), &user) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, Some(&user), true, "categories");
            context.insert("categories", &data.categories);
            render_template(&tera, "admin/categories.html", &context)
        }
        Err(ServiceError::Unauthorized) => not_admin(),
        Err(err) => {
            log::error!("Failed to list categories: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/categories/add")]
pub async fn add_category(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    sessions: web::Data<SessionService>,
    form: web::Form<AddCategoryForm>,
) -> impl Responder {
    match create_category(repo.get_ref(), sessions.policy(), &user, form.into_inner()) {
        Ok(category) => {
            FlashMessage::success(format!("Category \"{}\" added.", category.name)).send();
            redirect(CATEGORIES_PAGE)
        }
        Err(ServiceError::Unauthorized) => not_admin(),
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect(CATEGORIES_PAGE)
        }
        Err(ServiceError::Conflict) => {
            FlashMessage::error("A category with this name already exists.").send();
            redirect(CATEGORIES_PAGE)
        }
        Err(err) => {
            log::error!("Failed to create category: {err}");
            FlashMessage::error("Failed to add the category, please try again.").send();
            redirect(CATEGORIES_PAGE)
        }
    }
}

#[post("/categories/edit")]
pub async fn edit_category(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    sessions: web::Data<SessionService>,
    form: web::Form<EditCategoryForm>,
) -> impl Responder {
    match modify_category(repo.get_ref(), sessions.policy(), &user, form.into_inner()) {
        Ok(category) => {
            FlashMessage::success(format!("Category \"{}\" updated.", category.name)).send();
            redirect(CATEGORIES_PAGE)
        }
        Err(ServiceError::Unauthorized) => not_admin(),
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect(CATEGORIES_PAGE)
        }
        Err(ServiceError::Conflict) => {
            FlashMessage::error("A category with this name already exists.").send();
            redirect(CATEGORIES_PAGE)
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Category not found.").send();
            redirect(CATEGORIES_PAGE)
        }
        Err(err) => {
            log::error!("Failed to update category: {err}");
            FlashMessage::error("Failed to update the category, please try again.").send();
            redirect(CATEGORIES_PAGE)
        }
    }
}

#[post("/categories/{category_id}/delete")]
pub async fn delete_category(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    sessions: web::Data<SessionService>,
) -> impl Responder {
    let category_id = path.into_inner();

    match remove_category(repo.get_ref(), sessions.policy(), &user, category_id) {
        Ok(()) => {
            FlashMessage::success("Category deleted. Its items are now uncategorized.").send();
            redirect(CATEGORIES_PAGE)
        }
        Err(ServiceError::Unauthorized) => not_admin(),
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Category not found or already deleted.").send();
            redirect(CATEGORIES_PAGE)
        }
        Err(err) => {
            log::error!("Failed to delete category {category_id}: {err}");
            FlashMessage::error("Failed to delete the category, please try again.").send();
            redirect(CATEGORIES_PAGE)
        }
    }
}

#[post("/categories/reorder")]
pub async fn reorder_categories_route(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    sessions: web::Data<SessionService>,
    body: String,
) -> impl Responder {
    let form = match ReorderForm::from_body(&body) {
        Ok(form) => form,
        Err(err) => {
            FlashMessage::error(err.to_string()).send();
            return redirect(CATEGORIES_PAGE);
        }
    };

    match reorder_categories(repo.get_ref(), sessions.policy(), &user, form) {
        Ok(()) => {
            FlashMessage::success("Category order saved.").send();
            redirect(CATEGORIES_PAGE)
        }
        Err(ServiceError::Unauthorized) => not_admin(),
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect(CATEGORIES_PAGE)
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Some categories no longer exist. The order was not changed.")
                .send();
            redirect(CATEGORIES_PAGE)
        }
        Err(err) => {
            log::error!("Failed to reorder categories: {err}");
            FlashMessage::error("Failed to save the order, please try again.").send();
            redirect(CATEGORIES_PAGE)
        }
    }
}
