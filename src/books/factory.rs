use crate::books::repository::json_library::JsonFileLibrary;
use crate::books::repository::Library;
use crate::core::domain::Configuration;
use crate::core::library::LibraryResult;
use crate::gateway::factory::create_lookup;
use crate::gateway::lookup::BookLookup;

pub async fn create_library(config: &Configuration) -> LibraryResult<Box<dyn Library>> {
    let lookup = create_lookup(config)?;
    create_library_with(config, lookup).await
}

pub async fn create_library_with(config: &Configuration, lookup: Box<dyn BookLookup>) -> LibraryResult<Box<dyn Library>> {
    let library = JsonFileLibrary::open(config.library_file.as_path(), lookup).await?;
    Ok(Box::new(library))
}


#[cfg(test)]
pub(crate) async fn create_test_handle(dir: &tempfile::TempDir, lookup: Box<dyn BookLookup>) -> crate::books::repository::LibraryHandle {
    let mut config = Configuration::new();
    config.library_file = dir.path().join("library.json");
    let library = create_library_with(&config, lookup).await.expect("should create library");
    crate::books::repository::into_handle(library)
}
