//! Read-only menu data served to guests and API clients.

use serde::Deserialize;

use crate::domain::category::Category;
use crate::forms::blank_as_none_id;
use crate::domain::menu_item::{CategoryFilter, MenuItemListQuery, PricedMenuItem};
use crate::repository::{CategoryReader, MenuItemReader};
use crate::services::{ServiceError, ServiceResult};

/// Query parameters accepted by the public menu item listing.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    #[serde(default, deserialize_with = "blank_as_none_id")]
    pub category_id: Option<i32>,
    /// List only items without a category. Ignored when `category_id` is set.
    #[serde(default)]
    pub uncategorized: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub search: Option<String>,
}

impl CatalogQuery {
    fn into_list_query(self) -> MenuItemListQuery {
        let mut query = MenuItemListQuery::new();
        if let Some(category_id) = self.category_id {
            query = query.category(CategoryFilter::Id(category_id));
        } else if self.uncategorized {
            query = query.category(CategoryFilter::Uncategorized);
        }
        if self.featured {
            query = query.featured();
        }
        let search = self
            .search
            .map(|term| term.trim().to_string())
            .filter(|term| !term.is_empty());
        if let Some(term) = search {
            query = query.search(term);
        }
        query
    }
}

pub fn list_public_menu_items<R>(
    repo: &R,
    query: CatalogQuery,
) -> ServiceResult<Vec<PricedMenuItem>>
where
    R: MenuItemReader + ?Sized,
{
    let items = repo
        .list_menu_items(query.into_list_query())
        .map_err(ServiceError::from)?;

    Ok(items.into_iter().map(PricedMenuItem::from).collect())
}

pub fn get_public_menu_item<R>(repo: &R, menu_item_id: i32) -> ServiceResult<PricedMenuItem>
where
    R: MenuItemReader + ?Sized,
{
    repo.get_menu_item_by_id(menu_item_id)
        .map_err(ServiceError::from)?
        .map(PricedMenuItem::from)
        .ok_or(ServiceError::NotFound)
}

pub fn list_public_categories<R>(repo: &R) -> ServiceResult<Vec<Category>>
where
    R: CategoryReader + ?Sized,
{
    repo.list_categories().map_err(ServiceError::from)
}
