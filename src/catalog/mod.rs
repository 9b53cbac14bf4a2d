//! Book catalog: resource model, search filters, and admin edits.
//!
//! # Architecture
//!
//! - [`Book`] / [`BookId`] - catalog resource as served by the store
//! - [`BookFilter`] - name/author search plus availability and category filters
//! - [`BookForm`] - validated add/update payload
//! - [`Catalog`] - service combining a [`RemoteStore`] with a [`TokenProvider`]
//!
//! # Example
//!
//! ```no_run
//! use bookshelf_core::catalog::{BookFilter, Catalog};
//! use bookshelf_core::session::StaticTokenProvider;
//! use bookshelf_core::store::HttpStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = HttpStore::new("https://library.example/api")?;
//! let catalog = Catalog::new(store, StaticTokenProvider::anonymous());
//! let filter = BookFilter { search: Some("herbert".into()), ..BookFilter::default() };
//! for book in catalog.list_books(&filter).await? {
//!     println!("{} ({} left)", book.name, book.quantity);
//! }
//! # Ok(())
//! # }
//! ```

mod book;
mod error;
mod filter;
mod form;

pub use book::{Book, BookId, Category};
pub use error::CatalogError;
pub use filter::BookFilter;
pub use form::{BookForm, MAX_RATING, MIN_RATING, PLACEHOLDER_IMAGE};

use tracing::{debug, info, instrument};

use crate::session::TokenProvider;
use crate::store::RemoteStore;

/// Catalog reads and admin edits against the remote store.
#[derive(Debug, Clone)]
pub struct Catalog<S, P> {
    store: S,
    tokens: P,
}

impl<S: RemoteStore, P: TokenProvider> Catalog<S, P> {
    /// Creates a catalog service.
    #[must_use]
    pub fn new(store: S, tokens: P) -> Self {
        Self { store, tokens }
    }

    /// Fetches every book and applies `filter` locally.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Store`] when the listing fails.
    #[instrument(level = "debug", skip(self))]
    pub async fn list_books(&self, filter: &BookFilter) -> Result<Vec<Book>, CatalogError> {
        let books = self.store.list_books().await?;
        let matched = filter.apply(&books);
        debug!(total = books.len(), matched = matched.len(), "catalog listed");
        Ok(matched)
    }

    /// Fetches one book, sending a credential when the session has one.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Store`] when the book is missing or the store
    /// requires a credential the session cannot supply.
    #[instrument(level = "debug", skip(self), fields(book_id = %id))]
    pub async fn get_book(&self, id: &BookId) -> Result<Book, CatalogError> {
        let token = self.tokens.get_token().await.ok();
        Ok(self.store.get_book(id, token.as_ref()).await?)
    }

    /// Validates and creates a new book, returning its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Invalid`] without contacting the store when the
    /// form is incomplete, [`CatalogError::Unauthenticated`] without a session,
    /// and [`CatalogError::Store`] when the store refuses.
    #[instrument(level = "debug", skip(self, form), fields(name = %form.name))]
    pub async fn add_book(&self, form: BookForm) -> Result<BookId, CatalogError> {
        let form = form.validate()?;
        let token = self.tokens.get_token().await?;
        let id = self.store.create_book(&form, &token).await?;
        info!(book_id = %id, name = %form.name, "book added");
        Ok(id)
    }

    /// Validates and replaces the fields of an existing book.
    ///
    /// # Errors
    ///
    /// Same as [`add_book`](Self::add_book).
    #[instrument(level = "debug", skip(self, form), fields(book_id = %id))]
    pub async fn update_book(&self, id: &BookId, form: BookForm) -> Result<(), CatalogError> {
        let form = form.validate()?;
        let token = self.tokens.get_token().await?;
        self.store.update_book(id, &form, &token).await?;
        info!(book_id = %id, "book updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::StaticTokenProvider;
    use crate::store::testing::FakeStore;

    fn form() -> BookForm {
        BookForm {
            name: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            category: "Sci-Fi".to_string(),
            quantity: 3,
            rating: 4.5,
            image: String::new(),
            description: "Spice.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_book_invalid_form_makes_no_remote_call() {
        let store = FakeStore::new();
        let catalog = Catalog::new(store.clone(), StaticTokenProvider::new("t"));
        let mut bad = form();
        bad.name = String::new();

        let err = catalog.add_book(bad).await.unwrap_err();
        assert!(matches!(err, CatalogError::Invalid { .. }));
        assert_eq!(store.created_books().len(), 0);
    }

    #[tokio::test]
    async fn test_add_book_requires_session() {
        let store = FakeStore::new();
        let catalog = Catalog::new(store.clone(), StaticTokenProvider::anonymous());
        let err = catalog.add_book(form()).await.unwrap_err();
        assert!(matches!(err, CatalogError::Unauthenticated { .. }));
        assert_eq!(store.created_books().len(), 0);
    }

    #[tokio::test]
    async fn test_add_book_sends_normalized_form() {
        let store = FakeStore::new();
        let catalog = Catalog::new(store.clone(), StaticTokenProvider::new("t"));
        let id = catalog.add_book(form()).await.unwrap();

        let created = store.created_books();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].image, PLACEHOLDER_IMAGE);
        assert!(store.book(&id).is_some());
    }

    #[tokio::test]
    async fn test_list_books_applies_filter() {
        let store = FakeStore::new();
        store.put_book(Book {
            id: BookId::new("a"),
            name: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            category: "Sci-Fi".to_string(),
            quantity: 0,
            rating: 4.5,
            image: String::new(),
            description: String::new(),
        });
        let catalog = Catalog::new(store, StaticTokenProvider::anonymous());

        let all = catalog.list_books(&BookFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);

        let available = BookFilter {
            available_only: true,
            ..BookFilter::default()
        };
        assert!(catalog.list_books(&available).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_book_replaces_fields() {
        let store = FakeStore::new();
        let catalog = Catalog::new(store.clone(), StaticTokenProvider::new("t"));
        let id = catalog.add_book(form()).await.unwrap();

        let mut edited = form();
        edited.quantity = 9;
        catalog.update_book(&id, edited).await.unwrap();

        assert_eq!(store.book(&id).unwrap().quantity, 9);
    }
}
