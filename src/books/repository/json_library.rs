use std::path::{Path, PathBuf};
use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, info, warn};
use crate::books::domain::{MIN_ISBN_LEN, normalize_isbn};
use crate::books::domain::model::Book;
use crate::books::repository::{Library, UNKNOWN_AUTHOR};
use crate::core::library::LibraryResult;
use crate::gateway::lookup::{BookLookup, BookMetadata};

// JsonFileLibrary keeps the catalog in memory and rewrites the whole file as
// a JSON list after every change. It does no locking of its own.
pub struct JsonFileLibrary {
    path: PathBuf,
    books: Vec<Book>,
    lookup: Box<dyn BookLookup>,
}

impl JsonFileLibrary {
    // Creates the file (and its parent directories) as an empty list when it
    // is missing, then loads it.
    pub async fn open(path: &Path, lookup: Box<dyn BookLookup>) -> LibraryResult<Self> {
        let mut library = Self {
            path: path.to_path_buf(),
            books: vec![],
            lookup,
        };
        library.ensure_file().await?;
        library.load().await?;
        Ok(library)
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    async fn ensure_file(&self) -> LibraryResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        if !fs::try_exists(&self.path).await? {
            fs::write(&self.path, "[]").await?;
        }
        Ok(())
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.books.iter().position(|b| b.isbn() == key)
    }

    async fn resolve_author(&self, meta: &BookMetadata) -> String {
        let mut names = Vec::with_capacity(meta.author_refs.len());
        for reference in &meta.author_refs {
            match self.lookup.resolve_author_name(reference).await {
                Some(name) if !name.trim().is_empty() => names.push(name.trim().to_string()),
                _ => debug!("skipping unresolved author {}", reference),
            }
        }
        if !names.is_empty() {
            return names.join(", ");
        }
        meta.by_statement.as_deref()
            .and_then(|stmt| stmt.split(';').next())
            .map(str::trim)
            .filter(|stmt| !stmt.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

// Invalid records are dropped one by one, as are later records repeating an
// ISBN. A body that is not a JSON list yields an empty catalog.
fn parse_catalog(body: &str, path: &Path) -> Vec<Book> {
    if body.trim().is_empty() {
        return vec![];
    }
    let items = match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            warn!("{} does not hold a list of books, starting with an empty catalog", path.display());
            return vec![];
        }
        Err(err) => {
            warn!("{} is not valid json ({}), starting with an empty catalog", path.display(), err);
            return vec![];
        }
    };
    let mut books: Vec<Book> = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<Book>(item) {
            Ok(book) => {
                let book = book.into_normalized();
                if books.iter().any(|b| b.isbn() == book.isbn()) {
                    warn!("dropping duplicate record for {} in {}", book.isbn(), path.display());
                } else {
                    books.push(book);
                }
            }
            Err(err) => {
                warn!("dropping invalid record in {}: {}", path.display(), err);
            }
        }
    }
    books
}

#[async_trait]
impl Library for JsonFileLibrary {
    fn list_all(&self) -> Vec<Book> {
        self.books.clone()
    }

    fn find(&self, isbn: &str) -> Option<Book> {
        let key = normalize_isbn(isbn);
        self.position(key.as_str()).map(|pos| self.books[pos].clone())
    }

    async fn add(&mut self, book: Book) -> LibraryResult<bool> {
        let book = book.into_normalized();
        if self.position(book.isbn()).is_some() {
            debug!("{} is already in the catalog", book.isbn());
            return Ok(false);
        }
        info!("adding {}", book);
        self.books.push(book);
        if let Err(err) = self.save().await {
            self.books.pop();
            return Err(err);
        }
        Ok(true)
    }

    async fn remove(&mut self, isbn: &str) -> LibraryResult<bool> {
        let key = normalize_isbn(isbn);
        let Some(pos) = self.position(key.as_str()) else {
            return Ok(false);
        };
        let removed = self.books.remove(pos);
        if let Err(err) = self.save().await {
            self.books.insert(pos, removed);
            return Err(err);
        }
        info!("removed {}", removed);
        Ok(true)
    }

    async fn add_by_isbn(&mut self, isbn: &str) -> LibraryResult<Option<Book>> {
        let key = normalize_isbn(isbn);
        if key.len() < MIN_ISBN_LEN {
            debug!("{:?} is too short to look up", isbn);
            return Ok(None);
        }
        if let Some(existing) = self.find(key.as_str()) {
            return Ok(Some(existing));
        }
        let Some(meta) = self.lookup.lookup_by_isbn(key.as_str()).await else {
            return Ok(None);
        };
        let Some(title) = meta.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
            warn!("edition {} has no title", key);
            return Ok(None);
        };
        let author = self.resolve_author(&meta).await;
        let book = match Book::new(title, author.as_str(), key.as_str()) {
            Ok(book) => book,
            Err(err) => {
                warn!("edition {} is not a valid book: {}", key, err);
                return Ok(None);
            }
        };
        self.add(book).await?;
        Ok(self.find(key.as_str()))
    }

    async fn last_lookup_failure(&self) -> Option<String> {
        self.lookup.last_failure().await
    }

    async fn save(&self) -> LibraryResult<()> {
        let body = serde_json::to_string_pretty(&self.books)?;
        let tmp = tmp_path(&self.path);
        fs::write(&tmp, body).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn load(&mut self) -> LibraryResult<()> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => vec![],
            Err(err) => return Err(err.into()),
        };
        self.books = match String::from_utf8(bytes) {
            Ok(body) => parse_catalog(body.as_str(), &self.path),
            Err(_) => {
                warn!("{} is not utf-8, starting with an empty catalog", self.path.display());
                vec![]
            }
        };
        info!("loaded {} books from {}", self.books.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;
    use crate::books::domain::model::Book;
    use crate::books::repository::json_library::{JsonFileLibrary, parse_catalog, tmp_path};
    use crate::books::repository::Library;
    use crate::core::library::LibraryError;
    use crate::gateway::lookup::BookMetadata;
    use crate::gateway::lookup::stub::StubLookup;

    fn book(title: &str, author: &str, isbn: &str) -> Book {
        Book::new(title, author, isbn).expect("should build book")
    }

    async fn open(path: &Path, lookup: StubLookup) -> JsonFileLibrary {
        JsonFileLibrary::open(path, Box::new(lookup)).await.expect("should open library")
    }

    fn library_file(dir: &TempDir) -> PathBuf {
        dir.path().join("library.json")
    }

    #[tokio::test]
    async fn test_should_create_missing_file() {
        let dir = TempDir::new().expect("should create temp dir");
        let path = dir.path().join("nested").join("books.json");
        let lib = open(&path, StubLookup::new()).await;
        assert!(lib.list_all().is_empty());
        assert_eq!("[]", std::fs::read_to_string(&path).expect("should read file"));
        assert_eq!(path.as_path(), lib.path());
    }

    #[tokio::test]
    async fn test_should_add_and_find() {
        let dir = TempDir::new().expect("should create temp dir");
        let mut lib = open(&library_file(&dir), StubLookup::new()).await;

        assert!(lib.add(book("Martin Eden", "Jack London", "1111")).await.expect("should add"));
        assert!(!lib.add(book("Martin Eden", "Jack London", "1111")).await.expect("should not fail"));

        let found = lib.find("1111").expect("should find book");
        assert_eq!("Martin Eden", found.title());
        assert!(lib.find("9999").is_none());
        assert!(lib.find("not an isbn").is_none());
    }

    #[tokio::test]
    async fn test_should_dedup_by_normalized_isbn() {
        let dir = TempDir::new().expect("should create temp dir");
        let mut lib = open(&library_file(&dir), StubLookup::new()).await;

        assert!(lib.add(book("Dune", "Herbert", "9780441013593")).await.expect("should add"));
        assert!(!lib.add(book("X", "Y", "978-0441013593")).await.expect("should not fail"));
        assert_eq!(1, lib.list_all().len());

        let found = lib.find("978 0441 013593").expect("should find book");
        assert_eq!("Dune", found.title());
        assert_eq!("9780441013593", found.isbn());
    }

    #[tokio::test]
    async fn test_should_store_normalized_isbn() {
        let dir = TempDir::new().expect("should create temp dir");
        let mut lib = open(&library_file(&dir), StubLookup::new()).await;

        assert!(lib.add(book("X", "Y", "978-975-342-4080")).await.expect("should add"));
        assert!(!lib.add(book("X2", "Y2", "978 9753424080")).await.expect("should not fail"));
        assert_eq!("9789753424080", lib.list_all()[0].isbn());
    }

    #[tokio::test]
    async fn test_should_list_in_insertion_order() {
        let dir = TempDir::new().expect("should create temp dir");
        let mut lib = open(&library_file(&dir), StubLookup::new()).await;
        for (title, isbn) in [("C", "3333"), ("A", "1111"), ("B", "2222")] {
            lib.add(book(title, "Author", isbn)).await.expect("should add");
        }
        let titles: Vec<String> = lib.list_all().iter().map(|b| b.title().to_string()).collect();
        assert_eq!(vec!["C", "A", "B"], titles);
    }

    #[tokio::test]
    async fn test_should_remove_once() {
        let dir = TempDir::new().expect("should create temp dir");
        let mut lib = open(&library_file(&dir), StubLookup::new()).await;

        lib.add(book("Thus Spoke Zarathustra", "Friedrich Nietzsche", "3333")).await.expect("should add");
        assert!(lib.remove("3333").await.expect("should remove"));
        assert!(!lib.remove("3333").await.expect("should not fail"));
        assert!(!lib.remove("").await.expect("should not fail"));
        assert!(lib.list_all().is_empty());
    }

    #[tokio::test]
    async fn test_should_persist_across_instances() {
        let dir = TempDir::new().expect("should create temp dir");
        let path = library_file(&dir);
        let mut first = open(&path, StubLookup::new()).await;
        first.add(book("Martin Eden", "Jack London", "1111")).await.expect("should add");
        first.add(book("A Room of One's Own", "Virginia Woolf", "2222")).await.expect("should add");
        first.remove("1111").await.expect("should remove");
        first.add(book("Dune", "Frank Herbert", "978-0441013593")).await.expect("should add");

        let second = open(&path, StubLookup::new()).await;
        assert_eq!(first.list_all(), second.list_all());
        assert_eq!(Some(book("Dune", "Frank Herbert", "9780441013593")), second.find("9780441013593"));
        assert!(!tmp_path(&path).exists());
    }

    #[tokio::test]
    async fn test_should_write_title_author_isbn_list() {
        let dir = TempDir::new().expect("should create temp dir");
        let path = library_file(&dir);
        let mut lib = open(&path, StubLookup::new()).await;
        lib.add(book("Sana Gül Bahçesi Vadetmedim", "Joanne Greenberg", "978-975-342-4080")).await.expect("should add");

        let json: serde_json::Value = serde_json::from_str(
            std::fs::read_to_string(&path).expect("should read file").as_str()).expect("should parse file");
        assert_eq!(serde_json::json!([{
            "title": "Sana Gül Bahçesi Vadetmedim",
            "author": "Joanne Greenberg",
            "isbn": "9789753424080",
        }]), json);
    }

    #[tokio::test]
    async fn test_should_drop_invalid_records_on_load() {
        let dir = TempDir::new().expect("should create temp dir");
        let path = library_file(&dir);
        std::fs::write(&path, r#"[
            {"title": "Good", "author": "Writer", "isbn": "978-0441013593"},
            {"title": "", "author": "Writer", "isbn": "1111"},
            {"title": "Short", "author": "Writer", "isbn": "12"},
            {"title": "Twin", "author": "Writer", "isbn": "9780441013593"},
            "not a record",
            {"title": "Also Good", "author": "Writer", "isbn": "2222"}
        ]"#).expect("should write file");

        let lib = open(&path, StubLookup::new()).await;
        let isbns: Vec<String> = lib.list_all().iter().map(|b| b.isbn().to_string()).collect();
        assert_eq!(vec!["9780441013593", "2222"], isbns);
        assert_eq!("Good", lib.find("9780441013593").expect("should find book").title());
    }

    #[tokio::test]
    async fn test_should_start_empty_on_malformed_file() {
        let dir = TempDir::new().expect("should create temp dir");
        let path = library_file(&dir);
        for body in ["{not json", r#"{"title": "T", "author": "A", "isbn": "1234"}"#, "   "] {
            std::fs::write(&path, body).expect("should write file");
            let lib = open(&path, StubLookup::new()).await;
            assert!(lib.list_all().is_empty(), "body {:?}", body);
            assert_eq!(body, std::fs::read_to_string(&path).expect("should read file"));
        }
    }

    #[tokio::test]
    async fn test_should_overwrite_malformed_file_on_next_change() {
        let dir = TempDir::new().expect("should create temp dir");
        let path = library_file(&dir);
        std::fs::write(&path, [0xff_u8, 0xfe, 0x00]).expect("should write file");

        let mut lib = open(&path, StubLookup::new()).await;
        assert!(lib.list_all().is_empty());
        lib.add(book("T", "A", "1234")).await.expect("should add");

        let reopened = open(&path, StubLookup::new()).await;
        assert_eq!(1, reopened.list_all().len());
    }

    #[tokio::test]
    async fn test_should_propagate_persistence_failure() {
        let dir = TempDir::new().expect("should create temp dir");
        let path = library_file(&dir);
        let mut lib = open(&path, StubLookup::new()).await;
        // a directory in place of the temp file makes the write fail
        std::fs::create_dir(tmp_path(&path)).expect("should create blocking dir");

        let res = lib.add(book("T", "A", "1234")).await;
        assert!(matches!(res, Err(LibraryError::Storage { .. })));
        assert!(lib.list_all().is_empty());
    }

    #[tokio::test]
    async fn test_should_parse_empty_catalog() {
        assert!(parse_catalog("[]", Path::new("library.json")).is_empty());
        assert!(parse_catalog("", Path::new("library.json")).is_empty());
    }

    #[tokio::test]
    async fn test_should_skip_lookup_for_short_isbn() {
        let dir = TempDir::new().expect("should create temp dir");
        let lookup = StubLookup::new();
        let mut lib = open(&library_file(&dir), lookup.clone()).await;

        assert_eq!(None, lib.add_by_isbn("12-3").await.expect("should not fail"));
        assert_eq!(None, lib.add_by_isbn("abcdef").await.expect("should not fail"));
        assert_eq!(0, lookup.call_count());
    }

    #[tokio::test]
    async fn test_should_return_existing_without_lookup() {
        let dir = TempDir::new().expect("should create temp dir");
        let lookup = StubLookup::new();
        let mut lib = open(&library_file(&dir), lookup.clone()).await;
        lib.add(book("Dune", "Herbert", "9780441013593")).await.expect("should add");

        let existing = lib.add_by_isbn("978-0441013593").await.expect("should not fail");
        assert_eq!(Some(book("Dune", "Herbert", "9780441013593")), existing);
        assert_eq!(0, lookup.call_count());
        assert_eq!(1, lib.list_all().len());
    }

    #[tokio::test]
    async fn test_should_join_resolved_authors() {
        let dir = TempDir::new().expect("should create temp dir");
        let lookup = StubLookup::new()
            .with_edition("1111111111111", BookMetadata::new(Some("T"), &["/authors/A1", "/authors/A2"], None))
            .with_author("/authors/A1", "One")
            .with_author("/authors/A2", "Two");
        let mut lib = open(&library_file(&dir), lookup).await;

        let added = lib.add_by_isbn("1111111111111").await.expect("should not fail").expect("should add book");
        assert_eq!("T", added.title());
        assert_eq!("One, Two", added.author());
        assert_eq!("1111111111111", added.isbn());
        assert_eq!(Some(added), lib.find("1111111111111"));
    }

    #[tokio::test]
    async fn test_should_skip_unresolved_authors() {
        let dir = TempDir::new().expect("should create temp dir");
        let lookup = StubLookup::new()
            .with_edition("1111111111111", BookMetadata::new(Some("T"), &["/authors/A1", "/authors/GONE", "/authors/A2"], Some("Ignored")))
            .with_author("/authors/A1", "One")
            .with_author("/authors/A2", "Two");
        let mut lib = open(&library_file(&dir), lookup).await;

        let added = lib.add_by_isbn("1111111111111").await.expect("should not fail").expect("should add book");
        assert_eq!("One, Two", added.author());
    }

    #[tokio::test]
    async fn test_should_fall_back_to_by_statement() {
        let dir = TempDir::new().expect("should create temp dir");
        let lookup = StubLookup::new()
            .with_edition("2222222222222", BookMetadata::new(Some("T"), &[], Some("Somebody; Other")))
            .with_edition("3333333333333", BookMetadata::new(Some("T3"), &["/authors/GONE"], Some(" Someone Else ")));
        let mut lib = open(&library_file(&dir), lookup).await;

        let added = lib.add_by_isbn("2222222222222").await.expect("should not fail").expect("should add book");
        assert_eq!("Somebody", added.author());
        let added = lib.add_by_isbn("3333333333333").await.expect("should not fail").expect("should add book");
        assert_eq!("Someone Else", added.author());
    }

    #[tokio::test]
    async fn test_should_use_unknown_author() {
        let dir = TempDir::new().expect("should create temp dir");
        let lookup = StubLookup::new()
            .with_edition("4444444444444", BookMetadata::new(Some("T"), &[], Some(" ; Other")));
        let mut lib = open(&library_file(&dir), lookup).await;

        let added = lib.add_by_isbn("4444444444444").await.expect("should not fail").expect("should add book");
        assert_eq!("Unknown Author", added.author());
    }

    #[tokio::test]
    async fn test_should_return_none_when_not_found() {
        let dir = TempDir::new().expect("should create temp dir");
        let path = library_file(&dir);
        let lookup = StubLookup::new();
        let mut lib = open(&path, lookup.clone()).await;

        assert_eq!(None, lib.add_by_isbn("0000000000000").await.expect("should not fail"));
        assert_eq!(1, lookup.call_count());
        assert!(lib.list_all().is_empty());
        assert_eq!("[]", std::fs::read_to_string(&path).expect("should read file"));
        assert_eq!(None, lib.last_lookup_failure().await);
    }

    #[tokio::test]
    async fn test_should_expose_lookup_failure() {
        let dir = TempDir::new().expect("should create temp dir");
        let mut lib = open(&library_file(&dir), StubLookup::new().unreachable()).await;

        assert_eq!(None, lib.add_by_isbn("9780441013593").await.expect("should not fail"));
        assert!(lib.last_lookup_failure().await.is_some());
        assert!(lib.list_all().is_empty());
    }

    #[tokio::test]
    async fn test_should_return_none_without_title() {
        let dir = TempDir::new().expect("should create temp dir");
        let lookup = StubLookup::new()
            .with_edition("5555555555555", BookMetadata::new(Some("   "), &[], Some("Somebody")))
            .with_edition("6666666666666", BookMetadata::new(None, &[], Some("Somebody")));
        let mut lib = open(&library_file(&dir), lookup).await;

        assert_eq!(None, lib.add_by_isbn("5555555555555").await.expect("should not fail"));
        assert_eq!(None, lib.add_by_isbn("6666666666666").await.expect("should not fail"));
        assert!(lib.list_all().is_empty());
    }

    #[tokio::test]
    async fn test_should_persist_enriched_book() {
        let dir = TempDir::new().expect("should create temp dir");
        let path = library_file(&dir);
        let lookup = StubLookup::new()
            .with_edition("9789753424080", BookMetadata::new(Some("Sana Gül Bahçesi Vadetmedim"), &["/authors/OL12345A"], None))
            .with_author("/authors/OL12345A", "Joanne Greenberg");
        let mut lib = open(&path, lookup).await;
        lib.add_by_isbn("978-975-342-4080").await.expect("should not fail").expect("should add book");

        let reopened = open(&path, StubLookup::new()).await;
        let found = reopened.find("9789753424080").expect("should find book");
        assert_eq!("Joanne Greenberg", found.author());
    }
}
