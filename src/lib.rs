//! # search-sync
//!
//! A document-to-search-index synchronization engine with per-locale
//! physical indexes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Reindex Orchestrator                      │
//! │  Locked → Dropped → Created → Indexed → Refreshed           │
//! │  • named lock guards the whole run                          │
//! │  • keyset pagination over the document corpus               │
//! └─────────────────────────────────────────────────────────────┘
//!               │                               │
//!               ▼                               ▼
//! ┌───────────────────────────┐   ┌───────────────────────────┐
//! │  Index Lifecycle Manager  │   │   Bulk Command Builder    │
//! │  • drop by prefix         │   │  • one body per document  │
//! │  • create per locale      │   │  • fan-out per locale     │
//! │  • layered settings merge │   │  • also the per-save path │
//! └───────────────────────────┘   └───────────────────────────┘
//!               │                               │
//!               ▼                               ▼
//! ┌───────────────────────────┐   ┌───────────────────────────┐
//! │    Locale Index Namer     │   │      Field Projector      │
//! │  • lowercase, a-z only    │   │  • flat values only       │
//! │  • collision guard        │   │  • <field>Exact shadows   │
//! └───────────────────────────┘   └───────────────────────────┘
//! ```
//!
//! The engine only maintains index *content* and *existence*. It reads
//! documents from a host store and drives a search engine client, both
//! behind narrow async traits ([`DocumentStore`], [`SearchBackend`]), plus
//! a named lock service ([`LockService`]) for reindex exclusivity.
//!
//! ## Quick start
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
//!
//! let engine = SearchSync::new(
//!     SearchSyncConfig::default(),
//!     store.clone(),
//!     backend.clone(),
//!     Arc::new(LocalLockService::new()),
//!     LocaleSource::SingleDefault,
//! );
//!
//! // Incremental path: index on save, immediately searchable.
//! let doc = Document::from_json("doc-1", json!({"title": "Hello World"}));
//! engine.index_document(&doc).await?;
//! assert_eq!(backend.doc_count("documentsdefault"), 1);
//!
//! // Full rebuild: drop, recreate, stream the corpus, refresh.
//! store.insert(doc);
//! let report = engine.reindex().await?;
//! assert_eq!(report.indexed, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`engine`]: the [`SearchSync`] facade (incremental + reindex paths)
//! - [`reindex`]: the staged full-rebuild pipeline
//! - [`lifecycle`]: index create/drop/refresh and settings layering
//! - [`bulk`]: bulk command construction and locale fan-out
//! - [`projector`]: field projection and exact-match shadows
//! - [`locale`]: locale sources and collision-safe index naming
//! - [`backend`]: collaborator traits and in-memory implementations
//! - [`task`]: the operational "reindex" entry point

pub mod backend;
pub mod bulk;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod locale;
pub mod merge;
pub mod projector;
pub mod reindex;
pub mod task;

pub use backend::memory::{InMemoryDocumentStore, InMemorySearchBackend, LocalLockService};
pub use backend::traits::{DocumentStore, LockGuard, LockService, RefreshMode, SearchBackend};
pub use bulk::{BulkCommand, BulkCommandBuilder, IndexAction};
pub use config::SearchSyncConfig;
pub use document::{Document, ID_FIELD};
pub use engine::SearchSync;
pub use error::SyncError;
pub use lifecycle::{strip_draft, IndexLifecycle, IndexSettingsLayers, DRAFT_SUFFIX};
pub use locale::{
    normalize, IndexNamer, LocaleProvider, LocaleSource, StaticLocales, DEFAULT_LOCALE,
};
pub use projector::{FieldSet, DEFAULT_FIELDS, EXACT_MAX_BYTES, EXACT_SUFFIX};
pub use reindex::{ReindexOrchestrator, ReindexReport, ReindexStage};
pub use task::{init_logging, run_reindex};
