use async_trait::async_trait;
use models::Check;

use crate::errors::StoreError;
use crate::pagination::PageSize;
use crate::storage::FileCheckStore;

/// Persistence seam consumed by [`crate::health::CheckService`].
#[async_trait]
pub trait CheckRepository: Send + Sync {
    async fn create(&self, check: Check) -> Result<(), StoreError>;
    async fn read(&self, id: &str) -> Result<Check, StoreError>;
    async fn list(&self, page: usize, size: PageSize) -> Result<(usize, Vec<Check>), StoreError>;
    /// Returns whether a check was removed.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

#[async_trait]
impl CheckRepository for FileCheckStore {
    async fn create(&self, check: Check) -> Result<(), StoreError> { FileCheckStore::create(self, check).await }
    async fn read(&self, id: &str) -> Result<Check, StoreError> { FileCheckStore::read(self, id).await }
    async fn list(&self, page: usize, size: PageSize) -> Result<(usize, Vec<Check>), StoreError> {
        Ok(FileCheckStore::list(self, page, size).await)
    }
    async fn delete(&self, id: &str) -> Result<bool, StoreError> { FileCheckStore::delete(self, id).await }
}

