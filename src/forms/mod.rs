//! Request payloads and their validation/sanitization into domain types.

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::domain::menu_item::CategoryFilter;

pub mod auth;
pub mod categories;
pub mod images;
pub mod menu_items;
pub mod reorder;

/// Treat blank form fields as missing.
pub fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|value| !value.trim().is_empty()))
}

/// Identifier from a query string where a blank value means "any".
pub fn blank_as_none_id<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = empty_string_as_none(deserializer)?;
    match value {
        Some(raw) => raw
            .trim()
            .parse::<i32>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid identifier `{raw}`"))),
        None => Ok(None),
    }
}

/// Filter value selecting items without a category.
pub const UNCATEGORIZED_PARAM: &str = "uncategorized";

/// Query value naming the admin list's category filter: blank for every
/// category, `uncategorized`, or a category id.
pub fn category_filter_param<'de, D>(deserializer: D) -> Result<Option<CategoryFilter>, D::Error>
where
    D: Deserializer<'de>,
{
    match empty_string_as_none(deserializer)? {
        Some(raw) if raw.trim().eq_ignore_ascii_case(UNCATEGORIZED_PARAM) => {
            Ok(Some(CategoryFilter::Uncategorized))
        }
        Some(raw) => raw
            .trim()
            .parse::<i32>()
            .map(|id| Some(CategoryFilter::Id(id)))
            .map_err(|_| serde::de::Error::custom(format!("invalid category filter `{raw}`"))),
        None => Ok(None),
    }
}

/// Strip surrounding whitespace before validation runs.
pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(value.trim().to_string())
}

/// Failures while parsing a decimal price.
#[derive(Debug, Error, PartialEq)]
pub enum PriceError {
    #[error("price is required")]
    Missing,
    #[error("`{0}` is not a valid price")]
    Malformed(String),
    #[error("price must be a positive number")]
    NotPositive,
}

/// Parse a decimal price such as `4.99`, `12.5` or `£1,250` into minor units.
pub fn parse_price_cents(raw: &str) -> Result<i64, PriceError> {
    let trimmed = raw
        .trim()
        .trim_start_matches(['£', '$', '€'])
        .trim()
        .replace(',', "");
    if trimmed.is_empty() {
        return Err(PriceError::Missing);
    }

    let malformed = || PriceError::Malformed(raw.trim().to_string());

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed.as_str(), ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(malformed());
    }
    if !whole.chars().all(|ch| ch.is_ascii_digit())
        || !fraction.chars().all(|ch| ch.is_ascii_digit())
        || fraction.len() > 2
    {
        return Err(malformed());
    }

    let whole = if whole.is_empty() {
        0
    } else {
        whole.parse::<i64>().map_err(|_| malformed())?
    };
    let fraction = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| malformed())? * 10,
        _ => fraction.parse::<i64>().map_err(|_| malformed())?,
    };

    let cents = whole
        .checked_mul(100)
        .and_then(|value| value.checked_add(fraction))
        .ok_or_else(malformed)?;

    if cents <= 0 {
        return Err(PriceError::NotPositive);
    }

    Ok(cents)
}

/// Parse an optional positive identifier; blank or non-positive input is `None`.
pub fn parse_optional_id(value: Option<&str>) -> Result<Option<i32>, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => match raw.parse::<i32>() {
            Ok(parsed) if parsed > 0 => Ok(Some(parsed)),
            Ok(_) => Ok(None),
            Err(_) => Err(raw.to_string()),
        },
    }
}

/// Parse an optional non-negative display position.
pub fn parse_optional_sequence(value: Option<&str>) -> Result<Option<i32>, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => match raw.parse::<i32>() {
            Ok(parsed) if parsed >= 0 => Ok(Some(parsed)),
            _ => Err(raw.to_string()),
        },
    }
}

/// HTML checkboxes submit `on` when ticked and nothing otherwise.
pub fn is_checked(value: Option<&str>) -> bool {
    matches!(
        value.map(|value| value.trim().to_ascii_lowercase()).as_deref(),
        Some("on" | "true" | "1" | "yes")
    )
}

pub(crate) fn sanitize_inline_text(input: &str) -> String {
    let mut sanitized = String::with_capacity(input.len());
    let mut previous_whitespace = false;

    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            if !previous_whitespace {
                sanitized.push(' ');
                previous_whitespace = true;
            }
        } else if ch.is_control() {
            continue;
        } else {
            sanitized.push(ch);
            previous_whitespace = false;
        }
    }

    sanitized
}

pub(crate) fn sanitize_multiline_text(input: &str) -> String {
    let mut lines: Vec<String> = input.lines().map(sanitize_inline_text).collect();

    while matches!(lines.first(), Some(line) if line.is_empty()) {
        lines.remove(0);
    }

    while matches!(lines.last(), Some(line) if line.is_empty()) {
        lines.pop();
    }

    let mut result = Vec::with_capacity(lines.len());
    let mut previous_empty = false;
    for line in lines {
        let is_empty = line.is_empty();
        if is_empty {
            if previous_empty {
                continue;
            }
            previous_empty = true;
            result.push(String::new());
        } else {
            previous_empty = false;
            result.push(line);
        }
    }

    result.join("\n")
}
