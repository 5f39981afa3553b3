use serde::Serialize;

use crate::auth::{AdminPolicy, AuthenticatedUser};
use crate::domain::category::Category;
use crate::domain::menu_item::{MenuItemListQuery, PricedMenuItem};
use crate::repository::{CategoryReader, MenuItemReader};
use crate::services::{ServiceError, ServiceResult};

/// Heading used for items without a category.
pub const UNCATEGORIZED_SECTION: &str = "More from our kitchen";

/// One heading of the public menu with the dishes listed under it.
#[derive(Debug, Serialize)]
pub struct MenuSection {
    /// `None` for the uncategorized section.
    pub category_id: Option<i32>,
    pub name: String,
    pub items: Vec<PricedMenuItem>,
}

/// Data required to render the public menu page.
pub struct MenuPageData {
    /// Non-empty sections in category order, uncategorized last.
    pub sections: Vec<MenuSection>,
    pub featured: Vec<PricedMenuItem>,
    /// Whether to offer the admin panel link.
    pub is_admin: bool,
}

/// Loads the public menu grouped by category.
pub fn load_menu_page<R>(
    repo: &R,
    policy: &AdminPolicy,
    user: Option<&AuthenticatedUser>,
) -> ServiceResult<MenuPageData>
where
    R: CategoryReader + MenuItemReader + ?Sized,
{
    let categories = repo.list_categories().map_err(ServiceError::from)?;
    let items = repo
        .list_menu_items(MenuItemListQuery::new())
        .map_err(ServiceError::from)?;

    let featured = items
        .iter()
        .filter(|item| item.is_featured)
        .cloned()
        .map(PricedMenuItem::from)
        .collect();

    let mut sections: Vec<MenuSection> = categories
        .into_iter()
        .map(|Category { id, name, .. }| MenuSection {
            category_id: Some(id),
            name,
            items: Vec::new(),
        })
        .collect();
    let mut uncategorized: Vec<PricedMenuItem> = Vec::new();

    for item in items {
        let section = match item.category_id {
            Some(category_id) => sections
                .iter_mut()
                .find(|section| section.category_id == Some(category_id)),
            None => None,
        };
        match section {
            Some(section) => section.items.push(item.into()),
            None => uncategorized.push(item.into()),
        }
    }

    if !uncategorized.is_empty() {
        sections.push(MenuSection {
            category_id: None,
            name: UNCATEGORIZED_SECTION.to_string(),
            items: uncategorized,
        });
    }
    sections.retain(|section| !section.items.is_empty());

    Ok(MenuPageData {
        sections,
        featured,
        is_admin: policy.is_admin(user),
    })
}
