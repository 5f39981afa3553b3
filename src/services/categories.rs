use crate::auth::{AdminPolicy, AuthenticatedUser};
use crate::domain::category::Category;
use crate::forms::categories::{AddCategoryForm, EditCategoryForm};
use crate::forms::reorder::ReorderForm;
use crate::repository::{CategoryReader, CategoryWriter};
use crate::services::{ServiceError, ServiceResult};

/// Data required to render the categories admin template.
pub struct CategoriesPageData {
    /// Categories in display order.
    pub categories: Vec<Category>,
}

/// Loads the categories admin page.
pub fn load_categories<R>(
    repo: &R,
    policy: &AdminPolicy,
    user: &AuthenticatedUser,
) -> ServiceResult<CategoriesPageData>
where
    R: CategoryReader + ?Sized,
{
    if !policy.is_admin(Some(user)) {
        return Err(ServiceError::Unauthorized);
    }

    let categories = repo.list_categories().map_err(ServiceError::from)?;

    Ok(CategoriesPageData { categories })
}

/// Creates a new category, appended last unless a position is given.
pub fn create_category<R>(
    repo: &R,
    policy: &AdminPolicy,
    user: &AuthenticatedUser,
    form: AddCategoryForm,
) -> ServiceResult<Category>
where
    R: CategoryWriter + ?Sized,
{
    if !policy.is_admin(Some(user)) {
        return Err(ServiceError::Unauthorized);
    }

    let new_category = form
        .into_new_category()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.create_category(&new_category)
        .map_err(ServiceError::from)
}

/// Renames and optionally repositions an existing category.
pub fn modify_category<R>(
    repo: &R,
    policy: &AdminPolicy,
    user: &AuthenticatedUser,
    form: EditCategoryForm,
) -> ServiceResult<Category>
where
    R: CategoryWriter + ?Sized,
{
    if !policy.is_admin(Some(user)) {
        return Err(ServiceError::Unauthorized);
    }

    let payload = form
        .into_update_category()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.update_category(payload.category_id, &payload.update)
        .map_err(ServiceError::from)
}

/// Deletes a category. Its menu items stay and become uncategorized.
pub fn remove_category<R>(
    repo: &R,
    policy: &AdminPolicy,
    user: &AuthenticatedUser,
    category_id: i32,
) -> ServiceResult<()>
where
    R: CategoryWriter + ?Sized,
{
    if !policy.is_admin(Some(user)) {
        return Err(ServiceError::Unauthorized);
    }

    repo.delete_category(category_id)
        .map_err(ServiceError::from)
}

/// Applies a new display order to the listed categories in one batch.
pub fn reorder_categories<R>(
    repo: &R,
    policy: &AdminPolicy,
    user: &AuthenticatedUser,
    form: ReorderForm,
) -> ServiceResult<()>
where
    R: CategoryWriter + ?Sized,
{
    if !policy.is_admin(Some(user)) {
        return Err(ServiceError::Unauthorized);
    }

    let ordered_ids = form
        .into_ordered_ids()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.reorder_categories(&ordered_ids)
        .map_err(ServiceError::from)
}
