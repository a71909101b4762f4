//! Engine facade tying the components together.
//!
//! [`SearchSync`] owns the shared pieces (namer, field set, settings layers)
//! and exposes the two write paths:
//!
//! - **Incremental**: [`SearchSync::index_document`], invoked on every
//!   document save. One projection, one bulk write, caller-chosen refresh
//!   semantics (immediate by default). Not covered by the reindex lock —
//!   a save racing a reindex is an accepted, documented window.
//! - **Full reindex**: [`SearchSync::reindex`], the destroy-and-rebuild
//!   pipeline behind the named lock.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use search_sync::{
//!     Document, InMemoryDocumentStore, InMemorySearchBackend, LocalLockService,
//!     LocaleSource, SearchSync, SearchSyncConfig,
//! };
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), search_sync::SyncError> {
//! let store = Arc::new(InMemoryDocumentStore::new());
//! let backend = Arc::new(InMemorySearchBackend::new());
//! let engine = SearchSync::new(
//!     SearchSyncConfig::default(),
//!     store.clone(),
//!     backend.clone(),
//!     Arc::new(LocalLockService::new()),
//!     LocaleSource::SingleDefault,
//! );
//!
//! store.insert(Document::from_json("doc-1", json!({"title": "Hello"})));
//! let report = engine.reindex().await?;
//! assert_eq!(report.indexed, 1);
//! assert_eq!(backend.doc_count("documentsdefault"), 1);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::backend::traits::{DocumentStore, LockService, RefreshMode, SearchBackend};
use crate::bulk::BulkCommandBuilder;
use crate::config::SearchSyncConfig;
use crate::document::Document;
use crate::error::SyncError;
use crate::lifecycle::{IndexLifecycle, IndexSettingsLayers};
use crate::locale::{IndexNamer, LocaleSource};
use crate::projector::FieldSet;
use crate::reindex::{ReindexOrchestrator, ReindexReport, ReindexStage};

/// Keeps a full-text search index synchronized with a primary document
/// store, across one or more locales.
pub struct SearchSync {
    config: SearchSyncConfig,
    backend: Arc<dyn SearchBackend>,
    builder: BulkCommandBuilder,
    lifecycle: IndexLifecycle,
    orchestrator: ReindexOrchestrator,
}

impl SearchSync {
    pub fn new(
        config: SearchSyncConfig,
        store: Arc<dyn DocumentStore>,
        backend: Arc<dyn SearchBackend>,
        lock: Arc<dyn LockService>,
        locales: LocaleSource,
    ) -> Self {
        let namer = Arc::new(IndexNamer::new(config.index_base.clone()));
        let field_set = FieldSet::new(&config.extra_fields);
        let layers = IndexSettingsLayers::from_config(&config);

        let builder = BulkCommandBuilder::new(field_set.clone(), namer.clone(), locales.clone());
        let lifecycle = IndexLifecycle::new(
            backend.clone(),
            namer,
            locales,
            field_set,
            layers,
        );
        let orchestrator = ReindexOrchestrator::new(
            store,
            backend.clone(),
            lifecycle.clone(),
            builder.clone(),
            lock,
            config.reindex_lock.clone(),
            config.batch_size,
        );

        Self {
            config,
            backend,
            builder,
            lifecycle,
            orchestrator,
        }
    }

    /// Index one document immediately (the per-save incremental path).
    ///
    /// Returns the number of bulk commands written (one per locale target).
    pub async fn index_document(&self, doc: &Document) -> Result<usize, SyncError> {
        self.index_document_with(doc, RefreshMode::Immediate).await
    }

    /// Index one document with explicit refresh semantics.
    ///
    /// Errors surface to the caller; a failed index write must be visible
    /// to the save flow, never silently dropped.
    #[tracing::instrument(skip(self, doc), fields(document_id = %doc.id))]
    pub async fn index_document_with(
        &self,
        doc: &Document,
        refresh: RefreshMode,
    ) -> Result<usize, SyncError> {
        let commands = self.builder.commands_for(doc)?;
        self.backend.bulk_write(&commands, refresh).await?;
        debug!(commands = commands.len(), "document indexed");
        Ok(commands.len())
    }

    /// Run the full destroy-and-rebuild pipeline.
    pub async fn reindex(&self) -> Result<ReindexReport, SyncError> {
        self.orchestrator.run().await
    }

    /// Current reindex pipeline stage.
    #[must_use]
    pub fn reindex_stage(&self) -> ReindexStage {
        self.orchestrator.stage()
    }

    /// Watch reindex stage transitions.
    #[must_use]
    pub fn reindex_stage_receiver(&self) -> watch::Receiver<ReindexStage> {
        self.orchestrator.stage_receiver()
    }

    /// The engine's configuration.
    #[must_use]
    pub fn config(&self) -> &SearchSyncConfig {
        &self.config
    }

    /// The index lifecycle manager (drop/create/refresh).
    #[must_use]
    pub fn lifecycle(&self) -> &IndexLifecycle {
        &self.lifecycle
    }

    /// The bulk command builder.
    #[must_use]
    pub fn builder(&self) -> &BulkCommandBuilder {
        &self.builder
    }
}
