use crate::db::{DbConnection, DbPool};
use crate::domain::category::{Category, NewCategory, UpdateCategory};
use crate::domain::menu_item::{MenuItem, MenuItemListQuery, NewMenuItem, UpdateMenuItem};

pub mod category;
pub mod errors;
pub mod menu_item;

#[cfg(test)]
pub mod mock;

pub use errors::{RepositoryError, RepositoryResult};

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read-only operations over categories.
pub trait CategoryReader {
    /// All categories ordered by `sequence`, then `id`.
    fn list_categories(&self) -> RepositoryResult<Vec<Category>>;
    fn get_category_by_id(&self, id: i32) -> RepositoryResult<Option<Category>>;
}

/// Write operations over categories.
pub trait CategoryWriter {
    fn create_category(&self, new_category: &NewCategory) -> RepositoryResult<Category>;
    fn update_category(
        &self,
        category_id: i32,
        updates: &UpdateCategory,
    ) -> RepositoryResult<Category>;
    /// Remove a category. Items referencing it are left untouched.
    fn delete_category(&self, category_id: i32) -> RepositoryResult<()>;
    /// Rewrite every listed category's sequence to its index in `ordered_ids`
    /// as a single all-or-nothing batch.
    fn reorder_categories(&self, ordered_ids: &[i32]) -> RepositoryResult<()>;
}

/// Read-only operations over menu items.
pub trait MenuItemReader {
    fn get_menu_item_by_id(&self, id: i32) -> RepositoryResult<Option<MenuItem>>;
    /// Items matching `query` ordered by `sequence`, then `id`.
    fn list_menu_items(&self, query: MenuItemListQuery) -> RepositoryResult<Vec<MenuItem>>;
}

/// Write operations over menu items.
pub trait MenuItemWriter {
    fn create_menu_item(&self, new_item: &NewMenuItem) -> RepositoryResult<MenuItem>;
    fn update_menu_item(
        &self,
        menu_item_id: i32,
        updates: &UpdateMenuItem,
    ) -> RepositoryResult<MenuItem>;
    fn delete_menu_item(&self, menu_item_id: i32) -> RepositoryResult<()>;
    /// Rewrite every listed item's sequence to its index in `ordered_ids`
    /// as a single all-or-nothing batch.
    fn reorder_menu_items(&self, ordered_ids: &[i32]) -> RepositoryResult<()>;
}

/// Reject empty or repeated identifiers before a reorder batch touches rows.
pub(crate) fn ensure_unique_ids(ordered_ids: &[i32]) -> RepositoryResult<()> {
    let mut seen = std::collections::HashSet::with_capacity(ordered_ids.len());
    for id in ordered_ids {
        if !seen.insert(*id) {
            return Err(RepositoryError::Conflict(format!(
                "identifier {id} appears more than once"
            )));
        }
    }
    Ok(())
}
