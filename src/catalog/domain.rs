pub mod service;

use async_trait::async_trait;
use crate::books::dto::BookDto;
use crate::core::library::LibraryResult;

// CatalogService turns the library's boolean and optional results into
// errors the HTTP layer can map to status codes.
#[async_trait]
pub trait CatalogService: Sync + Send {
    async fn list_books(&self) -> LibraryResult<Vec<BookDto>>;
    async fn find_book(&self, isbn: &str) -> LibraryResult<BookDto>;
    async fn add_book(&self, book: &BookDto) -> LibraryResult<BookDto>;
    async fn add_book_by_isbn(&self, isbn: &str) -> LibraryResult<BookDto>;
    // returns the normalized ISBN of the removed entry
    async fn remove_book(&self, isbn: &str) -> LibraryResult<String>;
}
