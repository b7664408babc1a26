use async_trait::async_trait;
use tracing::{info, warn};
use crate::books::domain::{is_isbn_shape, MIN_ISBN_LEN, normalize_isbn};
use crate::books::domain::model::Book;
use crate::books::dto::BookDto;
use crate::books::repository::LibraryHandle;
use crate::catalog::domain::CatalogService;
use crate::core::library::{LibraryError, LibraryResult};

pub(crate) struct CatalogServiceImpl {
    library: LibraryHandle,
}

impl CatalogServiceImpl {
    pub(crate) fn new(library: LibraryHandle) -> Self {
        Self {
            library,
        }
    }
}

// Checks raw ISBN input from a client and returns its normalized form.
pub(crate) fn checked_isbn(raw: &str) -> LibraryResult<String> {
    if raw.trim().is_empty() {
        return Err(LibraryError::validation("ISBN cannot be empty.", Some("isbn".to_string())));
    }
    if !is_isbn_shape(raw) {
        return Err(LibraryError::invalid_format("Invalid ISBN format."));
    }
    let key = normalize_isbn(raw);
    if key.len() < MIN_ISBN_LEN {
        return Err(LibraryError::invalid_format(
            format!("ISBN must be at least {} characters long.", MIN_ISBN_LEN).as_str()));
    }
    Ok(key)
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    async fn list_books(&self) -> LibraryResult<Vec<BookDto>> {
        let library = self.library.read().await;
        Ok(library.list_all().iter().map(BookDto::from).collect())
    }

    async fn find_book(&self, isbn: &str) -> LibraryResult<BookDto> {
        let library = self.library.read().await;
        library.find(isbn)
            .map(|b| BookDto::from(&b))
            .ok_or_else(|| LibraryError::not_found("Book not found."))
    }

    async fn add_book(&self, book: &BookDto) -> LibraryResult<BookDto> {
        let key = checked_isbn(book.isbn.as_str())?;
        let book = Book::try_from(book.clone())?;
        let mut library = self.library.write().await;
        if !library.add(book).await? {
            return Err(LibraryError::duplicate_key("This ISBN already exists."));
        }
        library.find(key.as_str())
            .map(|b| BookDto::from(&b))
            .ok_or_else(|| LibraryError::runtime("added book is missing from the catalog", None))
    }

    async fn add_book_by_isbn(&self, isbn: &str) -> LibraryResult<BookDto> {
        let key = checked_isbn(isbn)?;
        let mut library = self.library.write().await;
        if library.find(key.as_str()).is_some() {
            return Err(LibraryError::duplicate_key("This ISBN already exists."));
        }
        match library.add_by_isbn(key.as_str()).await? {
            Some(book) => {
                info!("catalogued {} from lookup", book.isbn());
                Ok(BookDto::from(&book))
            }
            None => match library.last_lookup_failure().await {
                Some(reason) => {
                    warn!("lookup for {} failed: {}", key, reason);
                    Err(LibraryError::unavailable("Open Library is unavailable.", Some(reason)))
                }
                None => Err(LibraryError::not_found("Book not found on Open Library.")),
            },
        }
    }

    async fn remove_book(&self, isbn: &str) -> LibraryResult<String> {
        let key = normalize_isbn(isbn);
        let mut library = self.library.write().await;
        if library.remove(key.as_str()).await? {
            Ok(key)
        } else {
            Err(LibraryError::not_found("Book to delete not found."))
        }
    }
}
