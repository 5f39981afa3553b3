pub mod category;
pub mod menu_item;
