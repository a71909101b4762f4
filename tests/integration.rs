//! Integration tests for the search sync engine.
//!
//! Everything runs against the in-memory collaborators, so these cover the
//! full pipeline end to end without external services.
//!
//! # Test organization
//! - `happy_*` - normal operation: reindex scenarios, incremental saves
//! - `failure_*` - failure scenarios: backend errors mid-pipeline, lock release

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use search_sync::{
    BulkCommand, Document, InMemoryDocumentStore, InMemorySearchBackend, LocalLockService,
    LocaleSource, LockService, RefreshMode, ReindexStage, SearchBackend, SearchSync,
    SearchSyncConfig, StaticLocales, SyncError,
};

// =============================================================================
// Helpers
// =============================================================================

fn seeded_store(count: usize) -> Arc<InMemoryDocumentStore> {
    let store = Arc::new(InMemoryDocumentStore::new());
    for i in 0..count {
        store.insert(Document::from_json(
            format!("doc-{i:05}"),
            json!({
                "title": format!("Title {i}"),
                "body": format!("Body text for document number {i}"),
                "tags": ["test"],
            }),
        ));
    }
    store
}

fn engine(
    store: Arc<InMemoryDocumentStore>,
    backend: Arc<dyn SearchBackend>,
    locales: LocaleSource,
) -> SearchSync {
    SearchSync::new(
        SearchSyncConfig::default(),
        store,
        backend,
        Arc::new(LocalLockService::new()),
        locales,
    )
}

/// Wraps the in-memory backend and fails a chosen operation after N calls.
struct FailingBackend {
    inner: InMemorySearchBackend,
    create_calls: AtomicUsize,
    bulk_writes: AtomicUsize,
    fail_create_on: Option<usize>,
    fail_bulk_on: Option<usize>,
}

impl FailingBackend {
    fn new(fail_create_on: Option<usize>, fail_bulk_on: Option<usize>) -> Self {
        Self {
            inner: InMemorySearchBackend::new(),
            create_calls: AtomicUsize::new(0),
            bulk_writes: AtomicUsize::new(0),
            fail_create_on,
            fail_bulk_on,
        }
    }
}

#[async_trait]
impl SearchBackend for FailingBackend {
    async fn list_indexes(&self) -> Result<Vec<String>, SyncError> {
        self.inner.list_indexes().await
    }

    async fn create_index(
        &self,
        name: &str,
        mapping: Value,
        settings: Value,
    ) -> Result<(), SyncError> {
        let call = self.create_calls.fetch_add(1, Ordering::AcqRel) + 1;
        if Some(call) == self.fail_create_on {
            return Err(SyncError::Backend(format!("create '{name}' refused")));
        }
        self.inner.create_index(name, mapping, settings).await
    }

    async fn delete_indexes(&self, names: &[String]) -> Result<(), SyncError> {
        self.inner.delete_indexes(names).await
    }

    async fn bulk_write(
        &self,
        commands: &[BulkCommand],
        refresh: RefreshMode,
    ) -> Result<(), SyncError> {
        let call = self.bulk_writes.fetch_add(1, Ordering::AcqRel) + 1;
        if Some(call) == self.fail_bulk_on {
            return Err(SyncError::Backend("bulk write refused".into()));
        }
        self.inner.bulk_write(commands, refresh).await
    }

    async fn refresh(&self, name: &str) -> Result<(), SyncError> {
        self.inner.refresh(name).await
    }
}

// =============================================================================
// Happy path - reindex scenarios
// =============================================================================

#[tokio::test]
async fn happy_250_documents_default_locale() {
    // 250 documents, no locale provider, batch size 100:
    // 3 non-empty pages (100, 100, 50), 3 bulk writes, one refresh of the
    // single default index.
    let store = seeded_store(250);
    let backend = Arc::new(InMemorySearchBackend::new());
    let engine = engine(store.clone(), backend.clone(), LocaleSource::SingleDefault);

    let report = engine.reindex().await.unwrap();

    assert_eq!(report.total, 250);
    assert_eq!(report.indexed, 250);
    assert_eq!(report.pages, 3);
    assert_eq!(backend.bulk_calls(), 3);
    // Pages plus the terminating empty fetch.
    assert_eq!(store.fetch_calls(), 4);
    assert_eq!(backend.refresh_calls(), 1);
    assert_eq!(backend.index_names(), vec!["documentsdefault"]);
    assert_eq!(backend.doc_count("documentsdefault"), 250);
    assert_eq!(engine.reindex_stage(), ReindexStage::Refreshed);
}

#[tokio::test]
async fn happy_reindex_is_idempotent() {
    let store = seeded_store(42);
    let backend = Arc::new(InMemorySearchBackend::new());
    let engine = engine(store, backend.clone(), LocaleSource::SingleDefault);

    let first = engine.reindex().await.unwrap();
    let count_first = backend.doc_count("documentsdefault");
    let sample_first = backend.visible_doc("documentsdefault", "doc-00007").unwrap();

    let second = engine.reindex().await.unwrap();
    let count_second = backend.doc_count("documentsdefault");
    let sample_second = backend.visible_doc("documentsdefault", "doc-00007").unwrap();

    assert_eq!(first.indexed, second.indexed);
    assert_eq!(count_first, count_second);
    assert_eq!(sample_first, sample_second);
    // The second run dropped the index the first run created.
    assert_eq!(second.dropped, 1);
}

#[tokio::test]
async fn happy_multi_locale_reindex_fans_out() {
    let store = seeded_store(10);
    let backend = Arc::new(InMemorySearchBackend::new());
    let locales = LocaleSource::provider(Arc::new(StaticLocales::new(["en", "fr", "de"])));
    let engine = engine(store, backend.clone(), locales);

    let report = engine.reindex().await.unwrap();

    assert_eq!(report.created, 3);
    // Locale-less documents land in every locale index.
    for index in ["documentsen", "documentsfr", "documentsde"] {
        assert_eq!(backend.doc_count(index), 10, "missing docs in {index}");
    }
    assert_eq!(backend.refresh_calls(), 3);
}

#[tokio::test]
async fn happy_locale_tagged_documents_stay_in_their_index() {
    let store = Arc::new(InMemoryDocumentStore::new());
    store.insert(Document::from_json("doc-a", json!({"title": "English"})).with_locale("en"));
    store.insert(Document::from_json("doc-b", json!({"title": "French"})).with_locale("fr"));
    store.insert(Document::from_json("doc-c", json!({"title": "Everywhere"})));

    let backend = Arc::new(InMemorySearchBackend::new());
    let locales = LocaleSource::provider(Arc::new(StaticLocales::new(["en", "fr"])));
    let engine = engine(store, backend.clone(), locales);

    engine.reindex().await.unwrap();

    // Tagged docs: exactly one index each. Untagged: both.
    assert_eq!(backend.doc_count("documentsen"), 2); // doc-a + doc-c
    assert_eq!(backend.doc_count("documentsfr"), 2); // doc-b + doc-c
    assert!(backend.visible_doc("documentsfr", "doc-a").is_none());
    assert!(backend.visible_doc("documentsen", "doc-b").is_none());
}

#[tokio::test]
async fn happy_hello_world_document_body() {
    let store = Arc::new(InMemoryDocumentStore::new());
    store.insert(Document::from_json("x", json!({"title": "Hello World"})).with_locale("en"));

    let backend = Arc::new(InMemorySearchBackend::new());
    let locales = LocaleSource::provider(Arc::new(StaticLocales::new(["en"])));
    let engine = engine(store, backend.clone(), locales);

    engine.reindex().await.unwrap();

    let body = backend.visible_doc("documentsen", "x").unwrap();
    assert_eq!(body["title"], "Hello World");
    assert_eq!(body["titleExact"], "Hello World");
    assert_eq!(body.len(), 2);
}

#[tokio::test]
async fn happy_reindex_replaces_stale_indexes() {
    let store = seeded_store(5);
    let backend = Arc::new(InMemorySearchBackend::new());

    // A leftover index from an older locale set, plus a foreign index that
    // must survive (different prefix).
    backend
        .create_index("documentsstale", json!({}), json!({}))
        .await
        .unwrap();
    backend
        .create_index("othersystem", json!({}), json!({}))
        .await
        .unwrap();

    let engine = engine(store, backend.clone(), LocaleSource::SingleDefault);
    let report = engine.reindex().await.unwrap();

    assert_eq!(report.dropped, 1);
    assert_eq!(
        backend.index_names(),
        vec!["documentsdefault", "othersystem"]
    );
}

// =============================================================================
// Happy path - incremental saves
// =============================================================================

#[tokio::test]
async fn happy_incremental_save_during_normal_operation() {
    let store = seeded_store(3);
    let backend = Arc::new(InMemorySearchBackend::new());
    let engine = engine(store, backend.clone(), LocaleSource::SingleDefault);
    engine.reindex().await.unwrap();

    // A save after the rebuild is visible immediately.
    let doc = Document::from_json("doc-new", json!({"title": "Fresh"}));
    engine.index_document(&doc).await.unwrap();

    assert_eq!(backend.doc_count("documentsdefault"), 4);
    assert_eq!(
        backend.visible_doc("documentsdefault", "doc-new").unwrap()["title"],
        "Fresh"
    );
}

#[tokio::test]
async fn happy_incremental_save_overwrites_by_id() {
    let backend = Arc::new(InMemorySearchBackend::new());
    let engine = engine(
        Arc::new(InMemoryDocumentStore::new()),
        backend.clone(),
        LocaleSource::SingleDefault,
    );

    let v1 = Document::from_json("doc-1", json!({"title": "old"}));
    let v2 = Document::from_json("doc-1", json!({"title": "new"}));
    engine.index_document(&v1).await.unwrap();
    engine.index_document(&v2).await.unwrap();

    assert_eq!(backend.doc_count("documentsdefault"), 1);
    assert_eq!(
        backend.visible_doc("documentsdefault", "doc-1").unwrap()["title"],
        "new"
    );
}

// =============================================================================
// Failure scenarios
// =============================================================================

#[tokio::test]
async fn failure_locale_collision_aborts_create_stage() {
    let store = seeded_store(3);
    let backend = Arc::new(InMemorySearchBackend::new());
    let locales = LocaleSource::provider(Arc::new(StaticLocales::new(["en-US", "en_us"])));
    let engine = engine(store, backend.clone(), locales);

    let err = engine.reindex().await.unwrap_err();
    assert!(matches!(err, SyncError::LocaleCollision { .. }));
    assert!(err.is_config_error());
    // Nothing was streamed.
    assert_eq!(backend.bulk_calls(), 0);
    assert_eq!(engine.reindex_stage(), ReindexStage::Dropped);
}

#[tokio::test]
async fn failure_create_error_stops_before_indexing() {
    let store = seeded_store(10);
    // Second create call fails.
    let backend = Arc::new(FailingBackend::new(Some(2), None));
    let locales = LocaleSource::provider(Arc::new(StaticLocales::new(["en", "fr", "de"])));
    let engine = engine(store, backend.clone(), locales);

    let err = engine.reindex().await.unwrap_err();
    assert!(matches!(err, SyncError::Backend(_)));
    // Fail-fast: the third create never ran.
    assert_eq!(backend.create_calls.load(Ordering::Acquire), 2);
    assert_eq!(backend.bulk_writes.load(Ordering::Acquire), 0);
}

#[tokio::test]
async fn failure_page_write_error_halts_reindex() {
    let store = seeded_store(25);
    // Batch size 10 -> pages of 10/10/5; the second bulk write fails.
    let backend = Arc::new(FailingBackend::new(None, Some(2)));
    let engine = SearchSync::new(
        SearchSyncConfig {
            batch_size: 10,
            ..Default::default()
        },
        store.clone(),
        backend.clone(),
        Arc::new(LocalLockService::new()),
        LocaleSource::SingleDefault,
    );

    let err = engine.reindex().await.unwrap_err();
    assert!(matches!(err, SyncError::Backend(_)));
    // No continuation after the failed page.
    assert_eq!(backend.bulk_writes.load(Ordering::Acquire), 2);
    assert_eq!(engine.reindex_stage(), ReindexStage::Created);

    // No rollback: the first page's writes are still there (unrefreshed),
    // and rerunning from scratch completes cleanly.
    assert_eq!(backend.inner.pending_count("documentsdefault"), 10);
    let report = engine.reindex().await.unwrap();
    assert_eq!(report.indexed, 25);
    assert_eq!(backend.inner.doc_count("documentsdefault"), 25);
}

#[tokio::test]
async fn failure_releases_lock_for_next_run() {
    let store = seeded_store(5);
    let backend = Arc::new(FailingBackend::new(Some(1), None));
    let lock = Arc::new(LocalLockService::new());
    let config = SearchSyncConfig::default();
    let lock_name = config.reindex_lock.clone();

    let engine = SearchSync::new(
        config,
        store,
        backend,
        lock.clone(),
        LocaleSource::SingleDefault,
    );

    engine.reindex().await.unwrap_err();

    // The failed run released its lock; acquiring it must not hang.
    let guard = tokio::time::timeout(
        std::time::Duration::from_millis(200),
        lock.acquire(&lock_name),
    )
    .await
    .expect("lock was not released after a failed reindex")
    .unwrap();
    drop(guard);
}

#[tokio::test]
async fn failure_only_one_reindex_at_a_time() {
    let store = seeded_store(5);
    let backend = Arc::new(InMemorySearchBackend::new());
    let lock = Arc::new(LocalLockService::new());
    let config = SearchSyncConfig::default();
    let lock_name = config.reindex_lock.clone();
    let engine = Arc::new(SearchSync::new(
        config,
        store,
        backend,
        lock.clone(),
        LocaleSource::SingleDefault,
    ));

    // Hold the reindex lock externally; the pipeline must wait on it.
    let guard = lock.acquire(&lock_name).await.unwrap();
    let engine2 = engine.clone();
    let run = tokio::spawn(async move { engine2.reindex().await });

    tokio::time::sleep(std::time::Duration::from_millis(30)).await;
    assert!(!run.is_finished());

    drop(guard);
    run.await.unwrap().unwrap();
}
