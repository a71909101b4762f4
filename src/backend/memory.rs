//! In-memory collaborator implementations.
//!
//! Used by tests and demos, and sufficient for single-process deployments.
//! [`InMemorySearchBackend`] models the refresh boundary explicitly (deferred
//! writes stay in a pending set until refreshed) and counts calls so
//! pagination and refresh behavior can be asserted on.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use super::traits::{DocumentStore, LockGuard, LockService, RefreshMode, SearchBackend};
use crate::bulk::BulkCommand;
use crate::document::Document;
use crate::error::SyncError;

/// Ordered in-memory document store.
///
/// `BTreeMap` keeps documents sorted by id, which is exactly the contract
/// [`DocumentStore::fetch_after`] needs.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    docs: RwLock<BTreeMap<String, Document>>,
    fetch_calls: AtomicUsize,
}

impl InMemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document.
    pub fn insert(&self, doc: Document) {
        self.docs.write().insert(doc.id.clone(), doc);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    /// How many pages were fetched so far.
    #[must_use]
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::Acquire)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn count_all(&self) -> Result<u64, SyncError> {
        Ok(self.docs.read().len() as u64)
    }

    async fn fetch_after(
        &self,
        after_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Document>, SyncError> {
        self.fetch_calls.fetch_add(1, Ordering::AcqRel);
        let docs = self.docs.read();
        let page: Vec<Document> = match after_id {
            Some(after) => docs
                .range::<str, _>((Bound::Excluded(after), Bound::Unbounded))
                .take(limit)
                .map(|(_, doc)| doc.clone())
                .collect(),
            None => docs.values().take(limit).cloned().collect(),
        };
        Ok(page)
    }
}

/// State of one simulated physical index.
#[derive(Debug, Default, Clone)]
struct IndexState {
    mapping: Value,
    settings: Value,
    /// Documents visible to queries.
    visible: HashMap<String, Map<String, Value>>,
    /// Deferred writes waiting for the next refresh, in arrival order.
    pending: Vec<(String, Map<String, Value>)>,
}

/// In-memory search engine with observable refresh semantics.
#[derive(Default)]
pub struct InMemorySearchBackend {
    indexes: RwLock<BTreeMap<String, IndexState>>,
    bulk_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
}

impl InMemorySearchBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing index names, sorted.
    #[must_use]
    pub fn index_names(&self) -> Vec<String> {
        self.indexes.read().keys().cloned().collect()
    }

    /// Number of queryable documents in an index (0 if it does not exist).
    #[must_use]
    pub fn doc_count(&self, index: &str) -> usize {
        self.indexes
            .read()
            .get(index)
            .map_or(0, |state| state.visible.len())
    }

    /// Number of written-but-not-yet-refreshed documents in an index.
    #[must_use]
    pub fn pending_count(&self, index: &str) -> usize {
        self.indexes
            .read()
            .get(index)
            .map_or(0, |state| state.pending.len())
    }

    /// A queryable document's body, if present.
    #[must_use]
    pub fn visible_doc(&self, index: &str, id: &str) -> Option<Map<String, Value>> {
        self.indexes
            .read()
            .get(index)
            .and_then(|state| state.visible.get(id).cloned())
    }

    /// The mapping an index was created with.
    #[must_use]
    pub fn mapping(&self, index: &str) -> Option<Value> {
        self.indexes
            .read()
            .get(index)
            .map(|state| state.mapping.clone())
    }

    /// The merged settings an index was created with.
    #[must_use]
    pub fn settings(&self, index: &str) -> Option<Value> {
        self.indexes
            .read()
            .get(index)
            .map(|state| state.settings.clone())
    }

    #[must_use]
    pub fn bulk_calls(&self) -> usize {
        self.bulk_calls.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::Acquire)
    }
}

#[async_trait]
impl SearchBackend for InMemorySearchBackend {
    async fn list_indexes(&self) -> Result<Vec<String>, SyncError> {
        Ok(self.index_names())
    }

    async fn create_index(
        &self,
        name: &str,
        mapping: Value,
        settings: Value,
    ) -> Result<(), SyncError> {
        let mut indexes = self.indexes.write();
        indexes.insert(
            name.to_string(),
            IndexState {
                mapping,
                settings,
                ..IndexState::default()
            },
        );
        Ok(())
    }

    async fn delete_indexes(&self, names: &[String]) -> Result<(), SyncError> {
        let mut indexes = self.indexes.write();
        for name in names {
            indexes.remove(name);
        }
        Ok(())
    }

    async fn bulk_write(
        &self,
        commands: &[BulkCommand],
        refresh: RefreshMode,
    ) -> Result<(), SyncError> {
        self.bulk_calls.fetch_add(1, Ordering::AcqRel);
        let mut indexes = self.indexes.write();
        for command in commands {
            // Auto-create on write, like a real engine's default behavior.
            let state = indexes.entry(command.action.index.clone()).or_default();
            match refresh {
                RefreshMode::Immediate => {
                    state
                        .visible
                        .insert(command.action.id.clone(), command.body.clone());
                }
                RefreshMode::Deferred => {
                    state
                        .pending
                        .push((command.action.id.clone(), command.body.clone()));
                }
            }
        }
        Ok(())
    }

    async fn refresh(&self, name: &str) -> Result<(), SyncError> {
        self.refresh_calls.fetch_add(1, Ordering::AcqRel);
        let mut indexes = self.indexes.write();
        if let Some(state) = indexes.get_mut(name) {
            // Apply in arrival order: last write wins per id.
            for (id, body) in state.pending.drain(..) {
                state.visible.insert(id, body);
            }
        }
        Ok(())
    }
}

/// In-process named lock service.
///
/// One `tokio::sync::Mutex` per name; owned guards travel as
/// [`LockGuard`] and release on drop.
#[derive(Default)]
pub struct LocalLockService {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl LocalLockService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LockService for LocalLockService {
    async fn acquire(&self, name: &str) -> Result<LockGuard, SyncError> {
        let lock = self.locks.entry(name.to_string()).or_default().clone();
        let guard = lock.lock_owned().await;
        Ok(Box::new(guard))
    }
}
