use std::collections::HashSet;

use chrono::Local;
use diesel::dsl::max;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::menu_item::{
    CategoryFilter, MenuItem as DomainMenuItem, MenuItemListQuery,
    NewMenuItem as DomainNewMenuItem, UpdateMenuItem as DomainUpdateMenuItem,
};
use crate::models::menu_item::{
    MenuItem as DbMenuItem, NewMenuItem as DbNewMenuItem, UpdateMenuItem as DbUpdateMenuItem,
};
use crate::repository::{
    DieselRepository, MenuItemReader, MenuItemWriter, RepositoryError, RepositoryResult,
    ensure_unique_ids,
};

impl MenuItemReader for DieselRepository {
    fn get_menu_item_by_id(&self, id: i32) -> RepositoryResult<Option<DomainMenuItem>> {
        use crate::schema::menu_items;

        let mut conn = self.conn()?;

        let item = menu_items::table
            .filter(menu_items::id.eq(id))
            .first::<DbMenuItem>(&mut conn)
            .optional()?;

        match item {
            Some(item) => {
                let known = existing_category_ids(&mut conn)?;
                Ok(Some(resolve_category(item.into(), &known)))
            }
            None => Ok(None),
        }
    }

    fn list_menu_items(&self, query: MenuItemListQuery) -> RepositoryResult<Vec<DomainMenuItem>> {
        use crate::schema::menu_items;

        let mut conn = self.conn()?;

        let mut items_query = menu_items::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(CategoryFilter::Id(category_id)) = query.category {
            items_query = items_query.filter(menu_items::category_id.eq(category_id));
        }

        if query.featured_only {
            items_query = items_query.filter(menu_items::is_featured.eq(true));
        }

        if let Some(term) = query.search.as_ref() {
            let pattern = format!("%{}%", term);
            items_query = items_query.filter(
                menu_items::title
                    .like(pattern.clone())
                    .or(menu_items::description.like(pattern)),
            );
        }

        items_query = items_query.order((menu_items::sequence.asc(), menu_items::id.asc()));

        let items = items_query.load::<DbMenuItem>(&mut conn)?;
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let known = existing_category_ids(&mut conn)?;

        let items = items
            .into_iter()
            .map(|item| resolve_category(item.into(), &known))
            .filter(|item| match query.category {
                Some(CategoryFilter::Id(category_id)) => item.category_id == Some(category_id),
                Some(CategoryFilter::Uncategorized) => item.category_id.is_none(),
                None => true,
            })
            .collect();

        Ok(items)
    }
}

impl MenuItemWriter for DieselRepository {
    fn create_menu_item(&self, new_item: &DomainNewMenuItem) -> RepositoryResult<DomainMenuItem> {
        use crate::schema::menu_items;

        let mut conn = self.conn()?;

        conn.transaction::<DomainMenuItem, RepositoryError, _>(|conn| {
            let sequence = match new_item.sequence {
                Some(sequence) => sequence,
                None => next_sequence_in_category(conn, new_item.category_id)?,
            };

            let insertable = DbNewMenuItem::with_sequence(new_item, sequence);

            let created = diesel::insert_into(menu_items::table)
                .values(&insertable)
                .get_result::<DbMenuItem>(conn)?;

            let known = existing_category_ids(conn)?;
            Ok(resolve_category(created.into(), &known))
        })
    }

    fn update_menu_item(
        &self,
        menu_item_id: i32,
        updates: &DomainUpdateMenuItem,
    ) -> RepositoryResult<DomainMenuItem> {
        use crate::schema::menu_items;

        let mut conn = self.conn()?;

        let db_updates = DbUpdateMenuItem::from(updates);

        let updated = diesel::update(menu_items::table.filter(menu_items::id.eq(menu_item_id)))
            .set(&db_updates)
            .get_result::<DbMenuItem>(&mut conn)?;

        let known = existing_category_ids(&mut conn)?;
        Ok(resolve_category(updated.into(), &known))
    }

    fn delete_menu_item(&self, menu_item_id: i32) -> RepositoryResult<()> {
        use crate::schema::menu_items;

        let mut conn = self.conn()?;

        let deleted = diesel::delete(menu_items::table.filter(menu_items::id.eq(menu_item_id)))
            .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    fn reorder_menu_items(&self, ordered_ids: &[i32]) -> RepositoryResult<()> {
        use crate::schema::menu_items;

        ensure_unique_ids(ordered_ids)?;

        let mut conn = self.conn()?;

        conn.transaction::<(), RepositoryError, _>(|conn| {
            let now = Local::now().naive_utc();

            for (position, menu_item_id) in ordered_ids.iter().enumerate() {
                let updated =
                    diesel::update(menu_items::table.filter(menu_items::id.eq(*menu_item_id)))
                        .set((
                            menu_items::sequence.eq(position as i32),
                            menu_items::updated_at.eq(now),
                        ))
                        .execute(conn)?;

                if updated == 0 {
                    return Err(RepositoryError::NotFound);
                }
            }

            Ok(())
        })
    }
}

/// Next free position after the last item sharing `category_id`; `0` for an
/// empty category. `None` targets the uncategorized items, including those
/// whose category has been deleted.
fn next_sequence_in_category(
    conn: &mut SqliteConnection,
    category_id: Option<i32>,
) -> RepositoryResult<i32> {
    use crate::schema::menu_items;

    let highest = match category_id {
        Some(category_id) => menu_items::table
            .filter(menu_items::category_id.eq(category_id))
            .select(max(menu_items::sequence))
            .first::<Option<i32>>(conn)?,
        None => {
            let known: Vec<i32> = existing_category_ids(conn)?.into_iter().collect();
            menu_items::table
                .filter(
                    menu_items::category_id
                        .is_null()
                        .or(menu_items::category_id.ne_all(known)),
                )
                .select(max(menu_items::sequence))
                .first::<Option<i32>>(conn)?
        }
    };

    Ok(highest.map_or(0, |value| value + 1))
}

fn existing_category_ids(conn: &mut SqliteConnection) -> RepositoryResult<HashSet<i32>> {
    use crate::schema::categories;

    let ids = categories::table
        .select(categories::id)
        .load::<i32>(conn)?;

    Ok(ids.into_iter().collect())
}

/// Report a reference to a deleted category as uncategorized.
fn resolve_category(mut item: DomainMenuItem, known: &HashSet<i32>) -> DomainMenuItem {
    if item.category_id.is_some_and(|id| !known.contains(&id)) {
        item.category_id = None;
    }
    item
}
