use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};

pub struct AddBookCommand {
    catalog_service: Box<dyn CatalogService>,
}

impl AddBookCommand {
    pub fn new(catalog_service: Box<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

// With both title and author the entry is taken as given, otherwise it is
// looked up by ISBN.
#[derive(Debug, Deserialize)]
pub struct AddBookCommandRequest {
    pub isbn: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

impl AddBookCommandRequest {
    pub fn new(isbn: &str) -> Self {
        Self {
            isbn: isbn.to_string(),
            title: None,
            author: None,
        }
    }

    pub fn manual(isbn: &str, title: &str, author: &str) -> Self {
        Self {
            isbn: isbn.to_string(),
            title: Some(title.to_string()),
            author: Some(author.to_string()),
        }
    }

    pub fn build_book(&self) -> Option<BookDto> {
        match (&self.title, &self.author) {
            (Some(title), Some(author)) => Some(BookDto::new(title, author, self.isbn.as_str())),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AddBookCommandResponse {
    pub book: BookDto,
}

impl AddBookCommandResponse {
    pub fn new(book: BookDto) -> Self {
        Self {
            book,
        }
    }
}

#[async_trait]
impl Command<AddBookCommandRequest, AddBookCommandResponse> for AddBookCommand {
    async fn execute(&self, req: AddBookCommandRequest) -> Result<AddBookCommandResponse, CommandError> {
        let res = match req.build_book() {
            Some(book) => self.catalog_service.add_book(&book).await,
            None => self.catalog_service.add_book_by_isbn(req.isbn.as_str()).await,
        };
        res.map_err(CommandError::from).map(AddBookCommandResponse::new)
    }
}
