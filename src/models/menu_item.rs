use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::menu_item::{
    MenuItem as DomainMenuItem, NewMenuItem as DomainNewMenuItem,
    UpdateMenuItem as DomainUpdateMenuItem,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::menu_items)]
pub struct MenuItem {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub image_url: Option<String>,
    pub category_id: Option<i32>,
    pub is_featured: bool,
    pub sequence: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::menu_items)]
pub struct NewMenuItem<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub price_cents: i64,
    pub image_url: Option<&'a str>,
    pub category_id: Option<i32>,
    pub is_featured: bool,
    pub sequence: i32,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewMenuItem<'a> {
    /// Pair the domain payload with the sequence resolved by the repository.
    pub fn with_sequence(value: &'a DomainNewMenuItem, sequence: i32) -> Self {
        Self {
            title: value.title.as_str(),
            description: value.description.as_deref(),
            price_cents: value.price_cents,
            image_url: value.image_url.as_deref(),
            category_id: value.category_id,
            is_featured: value.is_featured,
            sequence,
            updated_at: value.updated_at,
        }
    }
}

/// Changeset for menu item edits. Nullable columns are always written
/// (`Some(None)` stores NULL); `sequence` is skipped when `None`.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::menu_items)]
pub struct UpdateMenuItem<'a> {
    pub title: &'a str,
    pub description: Option<Option<&'a str>>,
    pub price_cents: i64,
    pub image_url: Option<Option<&'a str>>,
    pub category_id: Option<Option<i32>>,
    pub is_featured: bool,
    pub sequence: Option<i32>,
    pub updated_at: NaiveDateTime,
}

impl From<MenuItem> for DomainMenuItem {
    fn from(value: MenuItem) -> Self {
        Self {
            id: value.id,
            title: value.title,
            description: value.description,
            price_cents: value.price_cents,
            image_url: value.image_url,
            category_id: value.category_id,
            is_featured: value.is_featured,
            sequence: value.sequence,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainUpdateMenuItem> for UpdateMenuItem<'a> {
    fn from(value: &'a DomainUpdateMenuItem) -> Self {
        Self {
            title: value.title.as_str(),
            description: Some(value.description.as_deref()),
            price_cents: value.price_cents,
            image_url: Some(value.image_url.as_deref()),
            category_id: Some(value.category_id),
            is_featured: value.is_featured,
            sequence: value.sequence,
            updated_at: value.updated_at,
        }
    }
}
