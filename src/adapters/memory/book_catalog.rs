use crate::domain::value_objects::BookId;
use crate::ports::book_catalog::{BookCatalog as BookCatalogTrait, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory implementation of BookCatalog.
///
/// Supports stateful testing by registering book titles.
pub struct InMemoryBookCatalog {
    titles: Mutex<HashMap<BookId, String>>,
}

impl InMemoryBookCatalog {
    pub fn new() -> Self {
        Self {
            titles: Mutex::new(HashMap::new()),
        }
    }

    /// Register a book title.
    pub fn add_book(&self, book_id: BookId, title: impl Into<String>) {
        self.titles.lock().unwrap().insert(book_id, title.into());
    }
}

impl Default for InMemoryBookCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookCatalogTrait for InMemoryBookCatalog {
    async fn get_title(&self, book_id: BookId) -> Result<String> {
        self.titles
            .lock()
            .unwrap()
            .get(&book_id)
            .cloned()
            .ok_or_else(|| format!("book {} is not in the catalog", book_id).into())
    }
}
