use async_trait::async_trait;
use serde_json::Value;

// BookLookup is the boundary to a bibliographic service keyed by ISBN.
// Every failure, including transport errors and malformed bodies, comes back
// as None. `last_failure` tells a miss apart from an unreachable service.
#[async_trait]
pub trait BookLookup: Sync + Send {
    async fn lookup_by_isbn(&self, isbn: &str) -> Option<BookMetadata>;
    async fn resolve_author_name(&self, reference: &str) -> Option<String>;

    // reason the most recent edition lookup failed, None after a hit or a plain miss
    async fn last_failure(&self) -> Option<String> {
        None
    }
}

// BookMetadata is the subset of an edition record used for enrichment
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BookMetadata {
    pub title: Option<String>,
    pub author_refs: Vec<String>,
    pub by_statement: Option<String>,
}

impl BookMetadata {
    pub fn new(title: Option<&str>, author_refs: &[&str], by_statement: Option<&str>) -> Self {
        Self {
            title: title.map(str::to_string),
            author_refs: author_refs.iter().map(|r| r.to_string()).collect(),
            by_statement: by_statement.map(str::to_string),
        }
    }

    // Author references are either `{"key": ..}` or `{"author": {"key": ..}}`.
    pub fn from_json(json: &Value) -> Option<Self> {
        let obj = json.as_object()?;
        let title = obj.get("title").and_then(Value::as_str).map(str::to_string);
        let author_refs = obj.get("authors")
            .and_then(Value::as_array)
            .map(|authors| authors.iter().filter_map(author_key).collect())
            .unwrap_or_default();
        let by_statement = obj.get("by_statement").and_then(Value::as_str).map(str::to_string);
        Some(Self { title, author_refs, by_statement })
    }
}

fn author_key(entry: &Value) -> Option<String> {
    entry.get("key")
        .and_then(Value::as_str)
        .or_else(|| entry.get("author").and_then(|a| a.get("key")).and_then(Value::as_str))
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}
