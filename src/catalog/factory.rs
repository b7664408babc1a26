use crate::books::repository::LibraryHandle;
use crate::catalog::domain::CatalogService;
use crate::catalog::domain::service::CatalogServiceImpl;

pub fn create_catalog_service(library: LibraryHandle) -> Box<dyn CatalogService> {
    Box::new(CatalogServiceImpl::new(library))
}
