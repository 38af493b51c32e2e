//! Port interfaces for batch runs

use async_trait::async_trait;
use diradmin_domain::{Result, ScanState, UserSummary};

/// An entity a batch run can visit. The key identifies it in the result
/// cache and the cursor.
pub trait ScanEntity: Send + Sync {
    fn key(&self) -> &str;
}

impl ScanEntity for UserSummary {
    fn key(&self) -> &str {
        &self.email
    }
}

/// One page of entities plus the token of the page after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityPage<E> {
    pub entities: Vec<E>,
    pub next_page_token: Option<String>,
}

/// Paginated listing of the entities to visit.
#[async_trait]
pub trait EntitySource<E: ScanEntity>: Send + Sync {
    /// Fetch the page at `page_token` (`None` for the first page).
    async fn fetch_page(&self, page_token: Option<&str>, page_size: u32) -> Result<EntityPage<E>>;
}

/// Work applied to each entity. Errors are classified by
/// [`DirAdminError::class`](diradmin_domain::DirAdminError::class).
#[async_trait]
pub trait EntityProcessor<E: ScanEntity, T>: Send + Sync {
    async fn process(&self, entity: &E) -> Result<T>;
}

/// Durable storage for one scan's state.
///
/// `save` must be atomic: after a crash the stored document is either the
/// previous checkpoint or the new one.
#[async_trait]
pub trait ScanStore<T: Send + Sync>: Send + Sync {
    async fn load(&self) -> Result<Option<ScanState<T>>>;

    async fn save(&self, state: &ScanState<T>) -> Result<()>;

    async fn discard(&self) -> Result<()>;
}
