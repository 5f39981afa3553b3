mod errors;

pub use errors::{ServiceError, ServiceResult};

pub mod auth;
pub mod catalog;
pub mod categories;
pub mod images;
pub mod main;
pub mod menu_items;
