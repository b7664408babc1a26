use std::fmt;
use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};
use crate::books::domain::{MIN_ISBN_LEN, normalize_isbn};
use crate::books::dto::BookDto;
use crate::core::library::{LibraryError, LibraryResult};

// Book is a validated catalog entry. Title and author are trimmed and never
// empty, and the ISBN normalizes to at least MIN_ISBN_LEN characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BookDto")]
pub struct Book {
    title: String,
    author: String,
    isbn: String,
}

impl Book {
    pub fn new(title: &str, author: &str, isbn: &str) -> LibraryResult<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(LibraryError::validation("Title cannot be empty.", Some("title".to_string())));
        }
        let author = author.trim();
        if author.is_empty() {
            return Err(LibraryError::validation("Author cannot be empty.", Some("author".to_string())));
        }
        if normalize_isbn(isbn).len() < MIN_ISBN_LEN {
            return Err(LibraryError::validation(
                format!("ISBN must be at least {} characters long.", MIN_ISBN_LEN).as_str(),
                Some("isbn".to_string())));
        }
        Ok(Self {
            title: title.to_string(),
            author: author.to_string(),
            isbn: isbn.trim().to_string(),
        })
    }

    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    pub fn author(&self) -> &str {
        self.author.as_str()
    }

    pub fn isbn(&self) -> &str {
        self.isbn.as_str()
    }

    pub fn normalized_isbn(&self) -> String {
        normalize_isbn(self.isbn.as_str())
    }

    // Rewrites the ISBN to its catalog key; done once when the record is stored.
    pub(crate) fn into_normalized(self) -> Self {
        let isbn = self.normalized_isbn();
        Self { isbn, ..self }
    }
}

impl TryFrom<BookDto> for Book {
    type Error = LibraryError;

    fn try_from(other: BookDto) -> Result<Self, Self::Error> {
        Book::new(other.title.as_str(), other.author.as_str(), other.isbn.as_str())
    }
}

impl Display for Book {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {} (ISBN: {})", self.title, self.author, self.isbn)
    }
}
