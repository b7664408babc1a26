use serde::{Deserialize, Serialize};
use crate::books::domain::model::Book;

// BookDto is the wire and file form of a catalog entry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BookDto {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub isbn: String,
}

impl BookDto {
    pub fn new(title: &str, author: &str, isbn: &str) -> BookDto {
        BookDto {
            title: title.to_string(),
            author: author.to_string(),
            isbn: isbn.to_string(),
        }
    }
}

impl From<&Book> for BookDto {
    fn from(other: &Book) -> Self {
        Self {
            title: other.title().to_string(),
            author: other.author().to_string(),
            isbn: other.isbn().to_string(),
        }
    }
}
