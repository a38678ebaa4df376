use crate::books::factory::create_book_repository;
use crate::catalog::domain::CatalogService;
use crate::catalog::domain::service::CatalogServiceImpl;
use crate::catalog::domain::validation::FieldValidator;
use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::owners::factory::create_store_owner_repository;
#[cfg(test)]
use async_trait::async_trait;
#[cfg(test)]
use crate::books::repository::memory_book_repository::MemoryBookRepository;
#[cfg(test)]
use crate::catalog::controller::CatalogProvider;
#[cfg(test)]
use crate::owners::repository::memory_store_owner_repository::MemoryStoreOwnerRepository;

pub async fn create_catalog_service(config: &Configuration, store: RepositoryStore) -> Box<dyn CatalogService> {
    let book_repo = create_book_repository(config, store).await;
    let owner_repo = create_store_owner_repository(config, store).await;
    Box::new(CatalogServiceImpl::new(config, book_repo, owner_repo, Box::new(FieldValidator::new())))
}

// MemoryCatalog hands out services that share one in-memory store seeded with two owners.
#[cfg(test)]
#[derive(Clone)]
pub(crate) struct MemoryCatalog {
    pub(crate) config: Configuration,
    pub(crate) books: MemoryBookRepository,
    pub(crate) owners: MemoryStoreOwnerRepository,
}

#[cfg(test)]
impl MemoryCatalog {
    pub(crate) async fn new() -> Self {
        use crate::owners::domain::model::StoreOwnerEntity;
        let catalog = Self {
            config: Configuration::new(),
            books: MemoryBookRepository::new(),
            owners: MemoryStoreOwnerRepository::new(),
        };
        for name in ["Corner Books", "Harbor Books"] {
            let _ = catalog.owners.create(&StoreOwnerEntity::new(name)).await;
        }
        catalog
    }

    pub(crate) fn service(&self) -> Box<dyn CatalogService> {
        Box::new(CatalogServiceImpl::new(&self.config, Box::new(self.books.clone()),
                                          Box::new(self.owners.clone()), Box::new(FieldValidator::new())))
    }
}

#[cfg(test)]
#[async_trait]
impl CatalogProvider for MemoryCatalog {
    fn config(&self) -> &Configuration {
        &self.config
    }

    async fn catalog_service(&self) -> Box<dyn CatalogService> {
        self.service()
    }
}
