use serde::Deserialize;

use crate::auth::{AdminPolicy, AuthenticatedUser};
use crate::domain::category::Category;
use crate::domain::menu_item::{CategoryFilter, MenuItem, MenuItemListQuery, PricedMenuItem};
use crate::forms::category_filter_param;
use crate::forms::menu_items::{AddMenuItemForm, EditMenuItemForm};
use crate::forms::reorder::ReorderForm;
use crate::repository::{CategoryReader, MenuItemReader, MenuItemWriter};
use crate::services::{ServiceError, ServiceResult};

/// Query parameters accepted by the menu items admin page.
#[derive(Debug, Default, Deserialize)]
pub struct MenuItemsQuery {
    /// Show only one category, or only the uncategorized items. Read from
    /// `category_id`, which takes a category id or `uncategorized`.
    #[serde(
        default,
        rename = "category_id",
        deserialize_with = "category_filter_param"
    )]
    pub category: Option<CategoryFilter>,
    /// Case-insensitive search over title and description.
    #[serde(default)]
    pub search: Option<String>,
}

/// Data required to render the menu items admin template.
pub struct MenuItemsPageData {
    pub items: Vec<PricedMenuItem>,
    /// Categories offered in the add/edit forms and the filter.
    pub categories: Vec<Category>,
    pub category: Option<CategoryFilter>,
    pub search: Option<String>,
    /// Whether the listed items are one whole group that can be reordered.
    pub can_reorder: bool,
}

/// Data required to render a single menu item edit page.
pub struct MenuItemPageData {
    pub item: PricedMenuItem,
    pub categories: Vec<Category>,
}

/// Loads the menu items admin page.
pub fn load_menu_items<R>(
    repo: &R,
    policy: &AdminPolicy,
    user: &AuthenticatedUser,
    query: MenuItemsQuery,
) -> ServiceResult<MenuItemsPageData>
where
    R: CategoryReader + MenuItemReader + ?Sized,
{
    if !policy.is_admin(Some(user)) {
        return Err(ServiceError::Unauthorized);
    }

    let MenuItemsQuery { category, search } = query;
    let search = search
        .map(|term| term.trim().to_string())
        .filter(|term| !term.is_empty());

    let mut list_query = MenuItemListQuery::new();
    if let Some(filter) = category {
        list_query = list_query.category(filter);
    }
    if let Some(term) = search.as_ref() {
        list_query = list_query.search(term);
    }

    let items = repo
        .list_menu_items(list_query)
        .map_err(ServiceError::from)?
        .into_iter()
        .map(PricedMenuItem::from)
        .collect();
    let categories = repo.list_categories().map_err(ServiceError::from)?;

    Ok(MenuItemsPageData {
        items,
        categories,
        category,
        can_reorder: category.is_some() && search.is_none(),
        search,
    })
}

/// Loads one menu item for the edit page.
pub fn load_menu_item<R>(
    repo: &R,
    policy: &AdminPolicy,
    user: &AuthenticatedUser,
    menu_item_id: i32,
) -> ServiceResult<MenuItemPageData>
where
    R: CategoryReader + MenuItemReader + ?Sized,
{
    if !policy.is_admin(Some(user)) {
        return Err(ServiceError::Unauthorized);
    }

    let item = repo
        .get_menu_item_by_id(menu_item_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;
    let categories = repo.list_categories().map_err(ServiceError::from)?;

    Ok(MenuItemPageData {
        item: item.into(),
        categories,
    })
}

/// Creates a new menu item.
pub fn create_menu_item<R>(
    repo: &R,
    policy: &AdminPolicy,
    user: &AuthenticatedUser,
    form: AddMenuItemForm,
) -> ServiceResult<MenuItem>
where
    R: CategoryReader + MenuItemWriter + ?Sized,
{
    if !policy.is_admin(Some(user)) {
        return Err(ServiceError::Unauthorized);
    }

    let new_item = form
        .into_new_menu_item()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    ensure_category_exists(repo, new_item.category_id)?;

    repo.create_menu_item(&new_item)
        .map_err(ServiceError::from)
}

/// Replaces the editable fields of an existing menu item.
pub fn modify_menu_item<R>(
    repo: &R,
    policy: &AdminPolicy,
    user: &AuthenticatedUser,
    form: EditMenuItemForm,
) -> ServiceResult<MenuItem>
where
    R: CategoryReader + MenuItemWriter + ?Sized,
{
    if !policy.is_admin(Some(user)) {
        return Err(ServiceError::Unauthorized);
    }

    let payload = form
        .into_update_menu_item()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    ensure_category_exists(repo, payload.update.category_id)?;

    repo.update_menu_item(payload.menu_item_id, &payload.update)
        .map_err(ServiceError::from)
}

/// Deletes a menu item. Its hosted image is left in place.
pub fn remove_menu_item<R>(
    repo: &R,
    policy: &AdminPolicy,
    user: &AuthenticatedUser,
    menu_item_id: i32,
) -> ServiceResult<()>
where
    R: MenuItemWriter + ?Sized,
{
    if !policy.is_admin(Some(user)) {
        return Err(ServiceError::Unauthorized);
    }

    repo.delete_menu_item(menu_item_id)
        .map_err(ServiceError::from)
}

/// Applies a new display order to the listed menu items in one batch.
pub fn reorder_menu_items<R>(
    repo: &R,
    policy: &AdminPolicy,
    user: &AuthenticatedUser,
    form: ReorderForm,
) -> ServiceResult<()>
where
    R: MenuItemWriter + ?Sized,
{
    if !policy.is_admin(Some(user)) {
        return Err(ServiceError::Unauthorized);
    }

    let ordered_ids = form
        .into_ordered_ids()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.reorder_menu_items(&ordered_ids)
        .map_err(ServiceError::from)
}

fn ensure_category_exists<R>(repo: &R, category_id: Option<i32>) -> ServiceResult<()>
where
    R: CategoryReader + ?Sized,
{
    let Some(category_id) = category_id else {
        return Ok(());
    };

    match repo.get_category_by_id(category_id)? {
        Some(_) => Ok(()),
        None => Err(ServiceError::Form(
            "The selected category does not exist.".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::repository::RepositoryError;
    use crate::repository::mock::MockMenuRepository as MockRepo;

    fn fixed_datetime() -> NaiveDateTime {
        match NaiveDate::from_ymd_opt(2024, 1, 1) {
            Some(date) => date.and_hms_opt(0, 0, 0).unwrap_or_default(),
            None => NaiveDateTime::default(),
        }
    }

    fn policy() -> AdminPolicy {
        AdminPolicy::from_allow_list("owner@naxos.test")
    }

    fn user(email: &str) -> AuthenticatedUser {
        AuthenticatedUser {
            id: "user-1".to_string(),
            email: email.to_string(),
            role: None,
        }
    }

    fn admin() -> AuthenticatedUser {
        user("owner@naxos.test")
    }

    fn sample_category(id: i32, name: &str) -> Category {
        Category {
            id,
            name: name.to_string(),
            sequence: 0,
            created_at: fixed_datetime(),
            updated_at: fixed_datetime(),
        }
    }

    fn sample_item(id: i32, title: &str, category_id: Option<i32>) -> MenuItem {
        MenuItem {
            id,
            title: title.to_string(),
            description: None,
            price_cents: 499,
            image_url: None,
            category_id,
            is_featured: false,
            sequence: 0,
            created_at: fixed_datetime(),
            updated_at: fixed_datetime(),
        }
    }

    fn add_form(category_id: Option<&str>) -> AddMenuItemForm {
        AddMenuItemForm {
            title: "Chicken Wrap".to_string(),
            description: None,
            price: "4.99".to_string(),
            image_url: None,
            category_id: category_id.map(str::to_string),
            is_featured: None,
            sequence: None,
        }
    }

    #[test]
    fn load_menu_items_rejects_non_admin() {
        let repo = MockRepo::new();

        let result = load_menu_items(
            &repo,
            &policy(),
            &user("guest@naxos.test"),
            MenuItemsQuery::default(),
        );

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn load_menu_items_applies_filters() {
        let mut repo = MockRepo::new();
        repo.expect_list_menu_items()
            .times(1)
            .withf(|query| {
                assert_eq!(query.category, Some(CategoryFilter::Id(2)));
                assert_eq!(query.search.as_deref(), Some("wrap"));
                assert!(!query.featured_only);
                true
            })
            .returning(|_| Ok(vec![sample_item(1, "Chicken Wrap", Some(2))]));
        repo.expect_list_categories()
            .times(1)
            .returning(|| Ok(vec![sample_category(2, "Wraps")]));

        let query = MenuItemsQuery {
            category: Some(CategoryFilter::Id(2)),
            search: Some(" wrap ".to_string()),
        };

        let data = load_menu_items(&repo, &policy(), &admin(), query).expect("expected success");

        assert_eq!(data.items.len(), 1);
        assert_eq!(data.items[0].price_display, "4.99");
        assert_eq!(data.categories.len(), 1);
        assert_eq!(data.search.as_deref(), Some("wrap"));
        assert!(!data.can_reorder);
    }

    #[test]
    fn load_menu_items_allows_reordering_uncategorized_items() {
        let mut repo = MockRepo::new();
        repo.expect_list_menu_items()
            .times(1)
            .withf(|query| {
                assert_eq!(query.category, Some(CategoryFilter::Uncategorized));
                assert!(query.search.is_none());
                true
            })
            .returning(|_| Ok(vec![sample_item(4, "Baklava", None)]));
        repo.expect_list_categories().returning(|| Ok(Vec::new()));

        let query = MenuItemsQuery {
            category: Some(CategoryFilter::Uncategorized),
            search: Some("  ".to_string()),
        };

        let data = load_menu_items(&repo, &policy(), &admin(), query).expect("expected success");

        assert_eq!(data.category, Some(CategoryFilter::Uncategorized));
        assert!(data.search.is_none());
        assert!(data.can_reorder);
    }

    #[test]
    fn load_menu_items_without_category_cannot_reorder() {
        let mut repo = MockRepo::new();
        repo.expect_list_menu_items()
            .times(1)
            .withf(|query| query.category.is_none())
            .returning(|_| Ok(vec![sample_item(4, "Baklava", None)]));
        repo.expect_list_categories().returning(|| Ok(Vec::new()));

        let data = load_menu_items(&repo, &policy(), &admin(), MenuItemsQuery::default())
            .expect("expected success");

        assert!(!data.can_reorder);
    }

    #[test]
    fn blank_category_filter_means_all_categories() {
        let query: MenuItemsQuery =
            serde_html_form::from_str("category_id=&search=").expect("parse");
        assert_eq!(query.category, None);

        let query: MenuItemsQuery = serde_html_form::from_str("category_id=3").expect("parse");
        assert_eq!(query.category, Some(CategoryFilter::Id(3)));

        let query: MenuItemsQuery =
            serde_html_form::from_str("category_id=uncategorized").expect("parse");
        assert_eq!(query.category, Some(CategoryFilter::Uncategorized));

        assert!(serde_html_form::from_str::<MenuItemsQuery>("category_id=soup").is_err());
    }

    #[test]
    fn load_menu_item_reports_missing_item() {
        let mut repo = MockRepo::new();
        repo.expect_get_menu_item_by_id()
            .withf(|id| *id == 8)
            .returning(|_| Ok(None));

        let result = load_menu_item(&repo, &policy(), &admin(), 8);

        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn create_menu_item_checks_category_and_persists() {
        let mut repo = MockRepo::new();
        repo.expect_get_category_by_id()
            .times(1)
            .withf(|id| *id == 2)
            .returning(|id| Ok(Some(sample_category(id, "Wraps"))));
        repo.expect_create_menu_item()
            .times(1)
            .withf(|new_item| {
                assert_eq!(new_item.title, "Chicken Wrap");
                assert_eq!(new_item.price_cents, 499);
                assert_eq!(new_item.category_id, Some(2));
                true
            })
            .returning(|_| Ok(sample_item(10, "Chicken Wrap", Some(2))));

        let created = create_menu_item(&repo, &policy(), &admin(), add_form(Some("2")))
            .expect("expected success");

        assert_eq!(created.id, 10);
    }

    #[test]
    fn create_menu_item_rejects_unknown_category() {
        let mut repo = MockRepo::new();
        repo.expect_get_category_by_id().returning(|_| Ok(None));
        repo.expect_create_menu_item().never();

        let result = create_menu_item(&repo, &policy(), &admin(), add_form(Some("99")));

        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn create_menu_item_without_category_skips_lookup() {
        let mut repo = MockRepo::new();
        repo.expect_get_category_by_id().never();
        repo.expect_create_menu_item()
            .times(1)
            .withf(|new_item| new_item.category_id.is_none())
            .returning(|_| Ok(sample_item(11, "Chicken Wrap", None)));

        create_menu_item(&repo, &policy(), &admin(), add_form(None)).expect("expected success");
    }

    #[test]
    fn modify_menu_item_requires_admin() {
        let repo = MockRepo::new();
        let form = EditMenuItemForm {
            menu_item_id: 1,
            title: "Wrap".to_string(),
            description: None,
            price: "4.00".to_string(),
            image_url: None,
            category_id: None,
            is_featured: None,
            sequence: None,
        };

        let result = modify_menu_item(&repo, &policy(), &user("guest@naxos.test"), form);

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn modify_menu_item_maps_missing_rows() {
        let mut repo = MockRepo::new();
        repo.expect_update_menu_item()
            .withf(|id, update| *id == 3 && update.price_cents == 400)
            .returning(|_, _| Err(RepositoryError::NotFound));

        let form = EditMenuItemForm {
            menu_item_id: 3,
            title: "Wrap".to_string(),
            description: None,
            price: "4".to_string(),
            image_url: None,
            category_id: None,
            is_featured: None,
            sequence: None,
        };

        let result = modify_menu_item(&repo, &policy(), &admin(), form);

        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn remove_menu_item_deletes_by_identifier() {
        let mut repo = MockRepo::new();
        repo.expect_delete_menu_item()
            .times(1)
            .withf(|id| *id == 4)
            .returning(|_| Ok(()));

        remove_menu_item(&repo, &policy(), &admin(), 4).expect("expected success");
    }

    #[test]
    fn reorder_menu_items_surfaces_unknown_ids() {
        let mut repo = MockRepo::new();
        repo.expect_reorder_menu_items()
            .times(1)
            .withf(|ids| ids == [5, 4])
            .returning(|_| Err(RepositoryError::NotFound));

        let form = ReorderForm { ids: vec![5, 4] };

        let result = reorder_menu_items(&repo, &policy(), &admin(), form);

        assert!(matches!(result, Err(ServiceError::NotFound)));
    }
}
