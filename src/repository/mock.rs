use mockall::mock;

use super::{CategoryReader, CategoryWriter, MenuItemReader, MenuItemWriter, RepositoryResult};
use crate::domain::{
    category::{Category, NewCategory, UpdateCategory},
    menu_item::{MenuItem, MenuItemListQuery, NewMenuItem, UpdateMenuItem},
};

mock! {
    pub CategoryReader {}

    impl CategoryReader for CategoryReader {
        fn list_categories(&self) -> RepositoryResult<Vec<Category>>;
        fn get_category_by_id(&self, id: i32) -> RepositoryResult<Option<Category>>;
    }
}

mock! {
    pub CategoryWriter {}

    impl CategoryWriter for CategoryWriter {
        fn create_category(&self, new_category: &NewCategory) -> RepositoryResult<Category>;
        fn update_category(&self, category_id: i32, updates: &UpdateCategory) -> RepositoryResult<Category>;
        fn delete_category(&self, category_id: i32) -> RepositoryResult<()>;
        fn reorder_categories(&self, ordered_ids: &[i32]) -> RepositoryResult<()>;
    }
}

mock! {
    pub MenuItemReader {}

    impl MenuItemReader for MenuItemReader {
        fn get_menu_item_by_id(&self, id: i32) -> RepositoryResult<Option<MenuItem>>;
        fn list_menu_items(&self, query: MenuItemListQuery) -> RepositoryResult<Vec<MenuItem>>;
    }
}

mock! {
    pub MenuItemWriter {}

    impl MenuItemWriter for MenuItemWriter {
        fn create_menu_item(&self, new_item: &NewMenuItem) -> RepositoryResult<MenuItem>;
        fn update_menu_item(&self, menu_item_id: i32, updates: &UpdateMenuItem) -> RepositoryResult<MenuItem>;
        fn delete_menu_item(&self, menu_item_id: i32) -> RepositoryResult<()>;
        fn reorder_menu_items(&self, ordered_ids: &[i32]) -> RepositoryResult<()>;
    }
}

// One mock behind every trait, for services bounded by several of them.
mock! {
    pub MenuRepository {}

    impl CategoryReader for MenuRepository {
        fn list_categories(&self) -> RepositoryResult<Vec<Category>>;
        fn get_category_by_id(&self, id: i32) -> RepositoryResult<Option<Category>>;
    }

    impl CategoryWriter for MenuRepository {
        fn create_category(&self, new_category: &NewCategory) -> RepositoryResult<Category>;
        fn update_category(&self, category_id: i32, updates: &UpdateCategory) -> RepositoryResult<Category>;
        fn delete_category(&self, category_id: i32) -> RepositoryResult<()>;
        fn reorder_categories(&self, ordered_ids: &[i32]) -> RepositoryResult<()>;
    }

    impl MenuItemReader for MenuRepository {
        fn get_menu_item_by_id(&self, id: i32) -> RepositoryResult<Option<MenuItem>>;
        fn list_menu_items(&self, query: MenuItemListQuery) -> RepositoryResult<Vec<MenuItem>>;
    }

    impl MenuItemWriter for MenuRepository {
        fn create_menu_item(&self, new_item: &NewMenuItem) -> RepositoryResult<MenuItem>;
        fn update_menu_item(&self, menu_item_id: i32, updates: &UpdateMenuItem) -> RepositoryResult<MenuItem>;
        fn delete_menu_item(&self, menu_item_id: i32) -> RepositoryResult<()>;
        fn reorder_menu_items(&self, ordered_ids: &[i32]) -> RepositoryResult<()>;
    }
}
