use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Domain representation of a dish shown on the menu.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MenuItem {
    /// Unique identifier of the menu item.
    pub id: i32,
    /// Dish name displayed to guests.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Price in minor currency units (pence).
    pub price_cents: i64,
    /// CDN URL of the dish photo.
    pub image_url: Option<String>,
    /// Category the item belongs to; `None` when uncategorized or when the
    /// category has been deleted.
    pub category_id: Option<i32>,
    /// Whether the item is promoted on the landing page.
    pub is_featured: bool,
    /// Display position within the item's category, ascending.
    pub sequence: i32,
    /// Timestamp for when the item was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the item.
    pub updated_at: NaiveDateTime,
}

impl MenuItem {
    /// Price formatted with two decimal places, e.g. `4.99`.
    pub fn price_display(&self) -> String {
        format_price(self.price_cents)
    }
}

/// Format minor units as a decimal amount with two fractional digits.
pub fn format_price(price_cents: i64) -> String {
    let sign = if price_cents < 0 { "-" } else { "" };
    let abs = price_cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Menu item as presented to guests and API clients, with the price exposed
/// both as a number and as display text.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PricedMenuItem {
    #[serde(flatten)]
    pub item: MenuItem,
    /// Price in major units, e.g. `4.99`.
    pub price: f64,
    /// Price formatted with two decimal places.
    pub price_display: String,
}

impl From<MenuItem> for PricedMenuItem {
    fn from(item: MenuItem) -> Self {
        Self {
            price: item.price_cents as f64 / 100.0,
            price_display: item.price_display(),
            item,
        }
    }
}

/// Payload required to insert a new menu item.
#[derive(Debug, Clone)]
pub struct NewMenuItem {
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub image_url: Option<String>,
    pub category_id: Option<i32>,
    pub is_featured: bool,
    /// Explicit display position; `None` appends after the last item of the
    /// same category.
    pub sequence: Option<i32>,
    pub updated_at: NaiveDateTime,
}

impl NewMenuItem {
    /// Build a new menu item payload with the mandatory fields.
    pub fn new(title: impl Into<String>, price_cents: i64) -> Self {
        Self {
            title: title.into(),
            description: None,
            price_cents,
            image_url: None,
            category_id: None,
            is_featured: false,
            sequence: None,
            updated_at: Local::now().naive_utc(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn with_category_id(mut self, category_id: i32) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn featured(mut self, is_featured: bool) -> Self {
        self.is_featured = is_featured;
        self
    }

    pub fn with_sequence(mut self, sequence: i32) -> Self {
        self.sequence = Some(sequence);
        self
    }
}

/// Replacement values applied when editing a menu item.
///
/// Optional fields set to `None` are cleared, except `sequence` which keeps
/// the stored position when absent.
#[derive(Debug, Clone)]
pub struct UpdateMenuItem {
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub image_url: Option<String>,
    pub category_id: Option<i32>,
    pub is_featured: bool,
    pub sequence: Option<i32>,
    pub updated_at: NaiveDateTime,
}

impl UpdateMenuItem {
    /// Build an update that keeps every optional field empty.
    pub fn new(title: impl Into<String>, price_cents: i64) -> Self {
        Self {
            title: title.into(),
            description: None,
            price_cents,
            image_url: None,
            category_id: None,
            is_featured: false,
            sequence: None,
            updated_at: Local::now().naive_utc(),
        }
    }
}

/// Category restriction applied when listing menu items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Items stored under the given category.
    Id(i32),
    /// Items without a category reference.
    Uncategorized,
}

/// Query definition used to filter menu items.
#[derive(Debug, Clone, Default)]
pub struct MenuItemListQuery {
    /// Optional category restriction.
    pub category: Option<CategoryFilter>,
    /// Only return featured items.
    pub featured_only: bool,
    /// Optional substring search over title and description.
    pub search: Option<String>,
}

impl MenuItemListQuery {
    /// Query matching every menu item.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the results to one category.
    pub fn category(mut self, filter: CategoryFilter) -> Self {
        self.category = Some(filter);
        self
    }

    /// Restrict the results to featured items.
    pub fn featured(mut self) -> Self {
        self.featured_only = true;
        self
    }

    /// Filter results by a search term applied to title and description.
    pub fn search(mut self, value: impl Into<String>) -> Self {
        self.search = Some(value.into());
        self
    }
}
