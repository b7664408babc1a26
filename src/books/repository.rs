pub mod json_library;

use std::sync::Arc;
use async_trait::async_trait;
use tokio::sync::RwLock;
use crate::books::domain::model::Book;
use crate::core::library::LibraryResult;

// Author used when enrichment yields neither author names nor a by-statement.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

// Library is the capability set of a catalog backend. Entries are unique by
// normalized ISBN and listed in insertion order.
#[async_trait]
pub trait Library: Sync + Send {
    // snapshot of all entries in insertion order
    fn list_all(&self) -> Vec<Book>;

    // entry whose normalized ISBN matches the normalized input
    fn find(&self, isbn: &str) -> Option<Book>;

    // adds an entry unless its ISBN is already present, returns whether it was added
    async fn add(&mut self, book: Book) -> LibraryResult<bool>;

    // removes the entry for an ISBN, returns whether one was removed
    async fn remove(&mut self, isbn: &str) -> LibraryResult<bool>;

    // creates an entry from the external lookup, or returns the existing one
    async fn add_by_isbn(&mut self, isbn: &str) -> LibraryResult<Option<Book>>;

    // why the latest add_by_isbn lookup could not reach the external service
    async fn last_lookup_failure(&self) -> Option<String>;

    // writes the full catalog to the backing store
    async fn save(&self) -> LibraryResult<()>;

    // replaces the in-memory catalog with the backing store's contents
    async fn load(&mut self) -> LibraryResult<()>;
}

// Shared handle for concurrent callers: reads take the read lock, mutations
// the write lock.
pub type LibraryHandle = Arc<RwLock<Box<dyn Library>>>;

pub fn into_handle(library: Box<dyn Library>) -> LibraryHandle {
    Arc::new(RwLock::new(library))
}
