use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::menu_item::{NewMenuItem, UpdateMenuItem};
use crate::forms::{
    PriceError, is_checked, parse_optional_id, parse_optional_sequence, parse_price_cents,
    sanitize_inline_text, sanitize_multiline_text,
};

/// Maximum length allowed for a menu item title.
const TITLE_MAX_LEN: usize = 128;
const TITLE_MAX_LEN_VALIDATOR: u64 = TITLE_MAX_LEN as u64;

/// Maximum length allowed for a menu item description.
const DESCRIPTION_MAX_LEN: usize = 2048;
const DESCRIPTION_MAX_LEN_VALIDATOR: u64 = DESCRIPTION_MAX_LEN as u64;

const IMAGE_URL_MAX_LEN: usize = 1024;
const IMAGE_URL_MAX_LEN_VALIDATOR: u64 = IMAGE_URL_MAX_LEN as u64;

/// Result type returned by the menu item form helpers.
pub type MenuItemFormResult<T> = Result<T, MenuItemFormError>;

/// Errors that can occur while processing menu item forms.
#[derive(Debug, Error)]
pub enum MenuItemFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("title is required")]
    EmptyTitle,
    #[error(transparent)]
    Price(#[from] PriceError),
    #[error("image URL must start with http:// or https://")]
    InvalidImageUrl,
    #[error("invalid category `{0}`")]
    InvalidCategory(String),
    #[error("invalid sequence `{0}`")]
    InvalidSequence(String),
}

/// Fields shared by the add and edit forms after sanitization.
struct MenuItemFields {
    title: String,
    description: Option<String>,
    price_cents: i64,
    image_url: Option<String>,
    category_id: Option<i32>,
    is_featured: bool,
    sequence: Option<i32>,
}

impl MenuItemFields {
    fn parse(
        title: &str,
        description: Option<&str>,
        price: &str,
        image_url: Option<&str>,
        category_id: Option<&str>,
        is_featured: Option<&str>,
        sequence: Option<&str>,
    ) -> MenuItemFormResult<Self> {
        let title = sanitize_inline_text(title);
        if title.is_empty() {
            return Err(MenuItemFormError::EmptyTitle);
        }

        let description = description
            .map(sanitize_multiline_text)
            .filter(|value| !value.is_empty());

        let price_cents = parse_price_cents(price)?;

        let image_url = match image_url.map(str::trim).filter(|value| !value.is_empty()) {
            Some(url) if url.starts_with("https://") || url.starts_with("http://") => {
                Some(url.to_string())
            }
            Some(_) => return Err(MenuItemFormError::InvalidImageUrl),
            None => None,
        };

        let category_id =
            parse_optional_id(category_id).map_err(MenuItemFormError::InvalidCategory)?;
        let sequence =
            parse_optional_sequence(sequence).map_err(MenuItemFormError::InvalidSequence)?;

        Ok(Self {
            title,
            description,
            price_cents,
            image_url,
            category_id,
            is_featured: is_checked(is_featured),
            sequence,
        })
    }
}

/// Form payload emitted when submitting the "Add menu item" form.
#[derive(Debug, Deserialize, Validate)]
pub struct AddMenuItemForm {
    #[validate(length(min = 1, max = TITLE_MAX_LEN_VALIDATOR))]
    pub title: String,
    #[validate(length(max = DESCRIPTION_MAX_LEN_VALIDATOR))]
    #[serde(default)]
    pub description: Option<String>,
    /// Decimal price as typed, e.g. `4.99`.
    pub price: String,
    #[validate(length(max = IMAGE_URL_MAX_LEN_VALIDATOR))]
    #[serde(default)]
    pub image_url: Option<String>,
    /// Selected category identifier; blank means uncategorized.
    #[serde(default)]
    pub category_id: Option<String>,
    /// Checkbox value, present only when ticked.
    #[serde(default)]
    pub is_featured: Option<String>,
    /// Optional explicit position within the category.
    #[serde(default)]
    pub sequence: Option<String>,
}

impl AddMenuItemForm {
    /// Validates and sanitizes the payload into a domain `NewMenuItem`.
    pub fn into_new_menu_item(self) -> MenuItemFormResult<NewMenuItem> {
        self.validate()?;

        let fields = MenuItemFields::parse(
            &self.title,
            self.description.as_deref(),
            &self.price,
            self.image_url.as_deref(),
            self.category_id.as_deref(),
            self.is_featured.as_deref(),
            self.sequence.as_deref(),
        )?;

        let mut new_item =
            NewMenuItem::new(fields.title, fields.price_cents).featured(fields.is_featured);
        if let Some(description) = fields.description {
            new_item = new_item.with_description(description);
        }
        if let Some(image_url) = fields.image_url {
            new_item = new_item.with_image_url(image_url);
        }
        if let Some(category_id) = fields.category_id {
            new_item = new_item.with_category_id(category_id);
        }
        if let Some(sequence) = fields.sequence {
            new_item = new_item.with_sequence(sequence);
        }

        Ok(new_item)
    }
}

/// Normalized payload produced by the "Edit menu item" form.
#[derive(Debug)]
pub struct EditMenuItemPayload {
    pub menu_item_id: i32,
    pub update: UpdateMenuItem,
}

/// Form payload emitted when editing an existing menu item.
#[derive(Debug, Deserialize, Validate)]
pub struct EditMenuItemForm {
    #[validate(range(min = 1))]
    pub menu_item_id: i32,
    #[validate(length(min = 1, max = TITLE_MAX_LEN_VALIDATOR))]
    pub title: String,
    #[validate(length(max = DESCRIPTION_MAX_LEN_VALIDATOR))]
    #[serde(default)]
    pub description: Option<String>,
    pub price: String,
    #[validate(length(max = IMAGE_URL_MAX_LEN_VALIDATOR))]
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub is_featured: Option<String>,
    /// Optional new position; blank keeps the current one.
    #[serde(default)]
    pub sequence: Option<String>,
}

impl EditMenuItemForm {
    /// Validates and sanitizes the payload into a domain `UpdateMenuItem`.
    pub fn into_update_menu_item(self) -> MenuItemFormResult<EditMenuItemPayload> {
        self.validate()?;

        let fields = MenuItemFields::parse(
            &self.title,
            self.description.as_deref(),
            &self.price,
            self.image_url.as_deref(),
            self.category_id.as_deref(),
            self.is_featured.as_deref(),
            self.sequence.as_deref(),
        )?;

        let mut update = UpdateMenuItem::new(fields.title, fields.price_cents);
        update.description = fields.description;
        update.image_url = fields.image_url;
        update.category_id = fields.category_id;
        update.is_featured = fields.is_featured;
        update.sequence = fields.sequence;

        Ok(EditMenuItemPayload {
            menu_item_id: self.menu_item_id,
            update,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_form() -> AddMenuItemForm {
        AddMenuItemForm {
            title: "  Chicken   Shawarma Wrap ".to_string(),
            description: Some(" Tender marinated chicken \n\n\n with salad ".to_string()),
            price: "4.99".to_string(),
            image_url: Some(" https://res.cloudinary.com/naxos/wrap.webp ".to_string()),
            category_id: Some("2".to_string()),
            is_featured: Some("on".to_string()),
            sequence: None,
        }
    }

    #[test]
    fn add_form_sanitizes_and_converts() {
        let item = add_form().into_new_menu_item().expect("conversion");

        assert_eq!(item.title, "Chicken Shawarma Wrap");
        assert_eq!(
            item.description.as_deref(),
            Some("Tender marinated chicken\n\nwith salad")
        );
        assert_eq!(item.price_cents, 499);
        assert_eq!(
            item.image_url.as_deref(),
            Some("https://res.cloudinary.com/naxos/wrap.webp")
        );
        assert_eq!(item.category_id, Some(2));
        assert!(item.is_featured);
        assert!(item.sequence.is_none());
    }

    #[test]
    fn add_form_defaults_optional_fields() {
        let form = AddMenuItemForm {
            description: Some("  ".to_string()),
            image_url: None,
            category_id: Some("".to_string()),
            is_featured: None,
            ..add_form()
        };

        let item = form.into_new_menu_item().expect("conversion");

        assert!(item.description.is_none());
        assert!(item.image_url.is_none());
        assert!(item.category_id.is_none());
        assert!(!item.is_featured);
    }

    #[test]
    fn add_form_rejects_non_positive_price() {
        let form = AddMenuItemForm {
            price: "0".to_string(),
            ..add_form()
        };

        let result = form.into_new_menu_item();

        assert!(matches!(
            result,
            Err(MenuItemFormError::Price(PriceError::NotPositive))
        ));
    }

    #[test]
    fn add_form_rejects_non_http_image() {
        let form = AddMenuItemForm {
            image_url: Some("javascript:alert(1)".to_string()),
            ..add_form()
        };

        let result = form.into_new_menu_item();

        assert!(matches!(result, Err(MenuItemFormError::InvalidImageUrl)));
    }

    #[test]
    fn add_form_rejects_blank_title() {
        let form = AddMenuItemForm {
            title: "   ".to_string(),
            ..add_form()
        };

        let result = form.into_new_menu_item();

        assert!(matches!(result, Err(MenuItemFormError::EmptyTitle)));
    }

    #[test]
    fn edit_form_clears_optional_fields() {
        let form = EditMenuItemForm {
            menu_item_id: 9,
            title: "Roast Pork Wrap".to_string(),
            description: None,
            price: "£5.50".to_string(),
            image_url: Some("".to_string()),
            category_id: None,
            is_featured: None,
            sequence: Some("4".to_string()),
        };

        let payload = form.into_update_menu_item().expect("conversion");

        assert_eq!(payload.menu_item_id, 9);
        assert_eq!(payload.update.price_cents, 550);
        assert!(payload.update.description.is_none());
        assert!(payload.update.image_url.is_none());
        assert!(payload.update.category_id.is_none());
        assert_eq!(payload.update.sequence, Some(4));
    }
}
