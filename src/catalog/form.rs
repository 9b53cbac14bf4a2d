//! Add/update payload for catalog entries.

use serde::{Deserialize, Serialize};

use super::book::{Book, Category};
use super::error::CatalogError;

/// Cover used when a book is submitted without an image.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/150";

/// Lowest accepted rating.
pub const MIN_RATING: f64 = 1.0;

/// Highest accepted rating.
pub const MAX_RATING: f64 = 5.0;

/// Fields submitted when adding or replacing a book.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BookForm {
    pub name: String,
    pub author: String,
    pub category: String,
    pub quantity: i64,
    pub rating: f64,
    #[serde(default)]
    pub image: String,
    pub description: String,
}

impl BookForm {
    /// Prefills a form from an existing book, for editing.
    #[must_use]
    pub fn from_book(book: &Book) -> Self {
        Self {
            name: book.name.clone(),
            author: book.author.clone(),
            category: book.category.clone(),
            quantity: book.quantity,
            rating: book.rating,
            image: book.image.clone(),
            description: book.description.clone(),
        }
    }

    /// Checks required fields and ranges, returning the normalized form.
    ///
    /// Normalization trims text fields, canonicalizes the category label and
    /// substitutes [`PLACEHOLDER_IMAGE`] for a blank image.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Invalid`] naming the first offending field.
    pub fn validate(self) -> Result<Self, CatalogError> {
        let name = required("name", &self.name)?;
        let author = required("author", &self.author)?;
        let description = required("description", &self.description)?;
        let category = required("category", &self.category)?
            .parse::<Category>()
            .map_err(CatalogError::invalid)?;

        if self.quantity < 0 {
            return Err(CatalogError::invalid(format!(
                "quantity must not be negative (got {})",
                self.quantity
            )));
        }

        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(CatalogError::invalid(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING} (got {})",
                self.rating
            )));
        }

        let image = match self.image.trim() {
            "" => PLACEHOLDER_IMAGE.to_string(),
            other => other.to_string(),
        };

        Ok(Self {
            name,
            author,
            category: category.as_str().to_string(),
            quantity: self.quantity,
            rating: self.rating,
            image,
            description,
        })
    }
}

fn required(field: &str, value: &str) -> Result<String, CatalogError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::invalid(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}
