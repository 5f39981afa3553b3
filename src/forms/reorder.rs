use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ReorderFormError {
    #[error("nothing to reorder")]
    Empty,
    #[error("invalid identifier {0}")]
    InvalidIdentifier(i32),
    #[error("identifier {0} is listed more than once")]
    Duplicate(i32),
    #[error("malformed reorder request: {0}")]
    Malformed(String),
}

/// New display order submitted from a drag-and-drop list, one repeated `ids`
/// field per row in the desired order (`ids=3&ids=1&ids=2`).
#[derive(Debug, Default, Deserialize)]
pub struct ReorderForm {
    #[serde(default)]
    pub ids: Vec<i32>,
}

impl ReorderForm {
    /// Decode an urlencoded body with repeated keys.
    pub fn from_body(body: &str) -> Result<Self, ReorderFormError> {
        serde_html_form::from_str(body).map_err(|err| ReorderFormError::Malformed(err.to_string()))
    }

    /// Validated identifiers in their requested order.
    pub fn into_ordered_ids(self) -> Result<Vec<i32>, ReorderFormError> {
        if self.ids.is_empty() {
            return Err(ReorderFormError::Empty);
        }

        let mut seen = HashSet::with_capacity(self.ids.len());
        for id in &self.ids {
            if *id <= 0 {
                return Err(ReorderFormError::InvalidIdentifier(*id));
            }
            if !seen.insert(*id) {
                return Err(ReorderFormError::Duplicate(*id));
            }
        }

        Ok(self.ids)
    }
}
