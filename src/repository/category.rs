use chrono::Local;
use diesel::dsl::max;
use diesel::prelude::*;

use crate::domain::category::{
    Category as DomainCategory, NewCategory as DomainNewCategory,
    UpdateCategory as DomainUpdateCategory,
};
use crate::models::category::{
    Category as DbCategory, NewCategory as DbNewCategory, UpdateCategory as DbUpdateCategory,
};
use crate::repository::{
    CategoryReader, CategoryWriter, DieselRepository, RepositoryError, RepositoryResult,
    ensure_unique_ids,
};

impl CategoryReader for DieselRepository {
    fn list_categories(&self) -> RepositoryResult<Vec<DomainCategory>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let categories = categories::table
            .order((categories::sequence.asc(), categories::id.asc()))
            .load::<DbCategory>(&mut conn)?;

        Ok(categories.into_iter().map(DomainCategory::from).collect())
    }

    fn get_category_by_id(&self, id: i32) -> RepositoryResult<Option<DomainCategory>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let category = categories::table
            .filter(categories::id.eq(id))
            .first::<DbCategory>(&mut conn)
            .optional()?;

        Ok(category.map(DomainCategory::from))
    }
}

impl CategoryWriter for DieselRepository {
    fn create_category(
        &self,
        new_category: &DomainNewCategory,
    ) -> RepositoryResult<DomainCategory> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        conn.transaction::<DomainCategory, RepositoryError, _>(|conn| {
            let sequence = match new_category.sequence {
                Some(sequence) => sequence,
                None => {
                    let highest = categories::table
                        .select(max(categories::sequence))
                        .first::<Option<i32>>(conn)?;
                    highest.map_or(0, |value| value + 1)
                }
            };

            let insertable = DbNewCategory::with_sequence(new_category, sequence);

            let created = diesel::insert_into(categories::table)
                .values(&insertable)
                .get_result::<DbCategory>(conn)?;

            Ok(created.into())
        })
    }

    fn update_category(
        &self,
        category_id: i32,
        updates: &DomainUpdateCategory,
    ) -> RepositoryResult<DomainCategory> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let db_updates = DbUpdateCategory::from(updates);

        let updated = diesel::update(categories::table.filter(categories::id.eq(category_id)))
            .set(&db_updates)
            .get_result::<DbCategory>(&mut conn)?;

        Ok(updated.into())
    }

    fn delete_category(&self, category_id: i32) -> RepositoryResult<()> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let deleted = diesel::delete(categories::table.filter(categories::id.eq(category_id)))
            .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    fn reorder_categories(&self, ordered_ids: &[i32]) -> RepositoryResult<()> {
        use crate::schema::categories;

        ensure_unique_ids(ordered_ids)?;

        let mut conn = self.conn()?;

        conn.transaction::<(), RepositoryError, _>(|conn| {
            let now = Local::now().naive_utc();

            for (position, category_id) in ordered_ids.iter().enumerate() {
                let updated =
                    diesel::update(categories::table.filter(categories::id.eq(*category_id)))
                        .set((
                            categories::sequence.eq(position as i32),
                            categories::updated_at.eq(now),
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
