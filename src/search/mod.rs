pub mod google_books;

use async_trait::async_trait;

use crate::models::BookRecord;

pub use google_books::{GoogleBooksClient, GoogleBooksConfig};

/// Keyword search over the book catalog.
#[async_trait]
pub trait BookSearch: Send + Sync {
    /// Matching records, in the order the catalog returns them. Empty on a
    /// blank query and on any failure.
    async fn search(&self, query: &str) -> Vec<BookRecord>;
}
