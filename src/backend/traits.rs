use std::any::Any;

use async_trait::async_trait;
use serde_json::Value;

use crate::bulk::BulkCommand;
use crate::document::Document;
use crate::error::SyncError;

/// Whether a bulk write becomes searchable immediately or waits for the
/// next explicit refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshMode {
    /// Written documents are queryable as soon as the call returns.
    #[default]
    Immediate,
    /// Written documents stay invisible until the index is refreshed.
    Deferred,
}

/// Held while a named lock is owned; dropping it releases the lock.
pub type LockGuard = Box<dyn Any + Send>;

/// Named mutual-exclusion lock service.
///
/// In-process by default ([`super::memory::LocalLockService`]); a
/// distributed implementation extends exclusivity cluster-wide.
#[async_trait]
pub trait LockService: Send + Sync {
    /// Acquire `name`, waiting if it is currently held. The returned guard
    /// releases on drop, on every exit path including failure.
    async fn acquire(&self, name: &str) -> Result<LockGuard, SyncError>;
}

/// The host document store, read-only from the engine's perspective.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Total number of documents in the corpus.
    async fn count_all(&self) -> Result<u64, SyncError>;

    /// One keyset-pagination page: up to `limit` documents with ids strictly
    /// greater than `after_id` (or from the beginning when `None`), sorted
    /// ascending by id.
    async fn fetch_after(
        &self,
        after_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Document>, SyncError>;
}

/// The search engine's admin and bulk write surface.
///
/// Wire protocol is the client's concern; the engine only needs these five
/// operations. Index names are lowercase ASCII letters only.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Catalog listing of existing index names.
    async fn list_indexes(&self) -> Result<Vec<String>, SyncError>;

    /// Create one index with its field mapping and merged settings.
    async fn create_index(
        &self,
        name: &str,
        mapping: Value,
        settings: Value,
    ) -> Result<(), SyncError>;

    /// Delete the given indexes in one batched call.
    async fn delete_indexes(&self, names: &[String]) -> Result<(), SyncError>;

    /// Submit one combined bulk write.
    async fn bulk_write(
        &self,
        commands: &[BulkCommand],
        refresh: RefreshMode,
    ) -> Result<(), SyncError>;

    /// Make recently written documents in `name` queryable.
    async fn refresh(&self, name: &str) -> Result<(), SyncError>;
}
