//! Client-side search and filtering over a fetched book list.

use super::book::Book;

/// Search and availability filters applied to the catalog listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    /// Case-insensitive substring matched against name or author.
    pub search: Option<String>,
    /// Keep only books with copies left.
    pub available_only: bool,
    /// Keep only books in this category (case-insensitive).
    pub category: Option<String>,
}

impl BookFilter {
    /// True when `book` passes every active filter.
    #[must_use]
    pub fn matches(&self, book: &Book) -> bool {
        if self.available_only && !book.is_available() {
            return false;
        }

        if let Some(category) = self.category.as_deref()
            && !book.category.eq_ignore_ascii_case(category.trim())
        {
            return false;
        }

        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                book.name.to_lowercase().contains(&needle)
                    || book.author.to_lowercase().contains(&needle)
            }
        }
    }

    /// Returns the matching books, preserving catalog order.
    #[must_use]
    pub fn apply(&self, books: &[Book]) -> Vec<Book> {
        books.iter().filter(|book| self.matches(book)).cloned().collect()
    }
}
