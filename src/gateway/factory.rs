use std::time::Duration;
use crate::core::domain::Configuration;
use crate::core::library::LibraryResult;
use crate::gateway::lookup::BookLookup;
use crate::gateway::openlibrary::OpenLibraryClient;

pub fn create_lookup(config: &Configuration) -> LibraryResult<Box<dyn BookLookup>> {
    let client = OpenLibraryClient::new(
        config.lookup_base_url.as_str(), Duration::from_secs(config.lookup_timeout_secs))?;
    Ok(Box::new(client))
}
