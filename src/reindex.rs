//! Full-corpus reindex pipeline.
//!
//! The [`ReindexOrchestrator`] runs the destroy-and-rebuild pipeline as a
//! sequential state machine, each stage gating the next:
//!
//! ```text
//! Idle → Locked → Dropped → Created → Indexed → Refreshed
//! ```
//!
//! The whole run is guarded by one named lock: at most one reindex at a time
//! (cluster-wide, if the lock service is distributed). The lock guard is
//! released on every exit path, including failure. Any stage failure aborts
//! the run without rollback; indexes may be left incomplete but never
//! corrupted, and the run is safe to re-trigger from scratch.
//!
//! The corpus is streamed with keyset pagination as an explicit iterative
//! loop: each page requests ids strictly greater than the previous page's
//! last id, ascending, capped at the batch size. A page with zero documents
//! terminates the stream. Pages are independent and writes are idempotent by
//! id, which is what makes the rerun-from-scratch recovery story sound.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::backend::traits::{DocumentStore, LockService, RefreshMode, SearchBackend};
use crate::bulk::{BulkCommand, BulkCommandBuilder};
use crate::error::SyncError;
use crate::lifecycle::IndexLifecycle;

/// Pipeline stage, broadcast to watchers as the run progresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReindexStage {
    /// No run in progress.
    Idle,
    /// Exclusivity acquired, nothing destructive done yet.
    Locked,
    /// Old indexes removed.
    Dropped,
    /// Fresh indexes created for every locale.
    Created,
    /// Full corpus streamed and written.
    Indexed,
    /// All locale indexes refreshed; run complete.
    Refreshed,
}

impl std::fmt::Display for ReindexStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Locked => write!(f, "Locked"),
            Self::Dropped => write!(f, "Dropped"),
            Self::Created => write!(f, "Created"),
            Self::Indexed => write!(f, "Indexed"),
            Self::Refreshed => write!(f, "Refreshed"),
        }
    }
}

/// Outcome of a completed reindex run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReindexReport {
    /// Corpus size counted up front.
    pub total: u64,
    /// Documents actually streamed and written.
    pub indexed: u64,
    /// Non-empty pages processed (one bulk write each).
    pub pages: usize,
    /// Indexes dropped before the rebuild.
    pub dropped: usize,
    /// Indexes created for the rebuild.
    pub created: usize,
}

/// Drives the five-stage full reindex pipeline.
pub struct ReindexOrchestrator {
    store: Arc<dyn DocumentStore>,
    backend: Arc<dyn SearchBackend>,
    lifecycle: IndexLifecycle,
    builder: BulkCommandBuilder,
    lock: Arc<dyn LockService>,
    lock_name: String,
    batch_size: usize,
    stage: watch::Sender<ReindexStage>,
    stage_rx: watch::Receiver<ReindexStage>,
}

impl ReindexOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        backend: Arc<dyn SearchBackend>,
        lifecycle: IndexLifecycle,
        builder: BulkCommandBuilder,
        lock: Arc<dyn LockService>,
        lock_name: impl Into<String>,
        batch_size: usize,
    ) -> Self {
        let (stage_tx, stage_rx) = watch::channel(ReindexStage::Idle);
        Self {
            store,
            backend,
            lifecycle,
            builder,
            lock,
            lock_name: lock_name.into(),
            batch_size: batch_size.max(1),
            stage: stage_tx,
            stage_rx,
        }
    }

    /// Current pipeline stage.
    #[must_use]
    pub fn stage(&self) -> ReindexStage {
        *self.stage_rx.borrow()
    }

    /// Watch stage transitions.
    #[must_use]
    pub fn stage_receiver(&self) -> watch::Receiver<ReindexStage> {
        self.stage_rx.clone()
    }

    /// Run the pipeline to completion or first error.
    ///
    /// On failure the stage stays at the last one reached, the lock is
    /// released, and the error propagates unmodified.
    #[tracing::instrument(skip(self), fields(lock = %self.lock_name))]
    pub async fn run(&self) -> Result<ReindexReport, SyncError> {
        self.set_stage(ReindexStage::Idle);

        let _guard = self.lock.acquire(&self.lock_name).await?;
        self.set_stage(ReindexStage::Locked);
        info!("reindex lock acquired");

        let dropped = self.lifecycle.drop_all().await?;
        self.set_stage(ReindexStage::Dropped);

        let created = self.lifecycle.create_all().await?;
        self.set_stage(ReindexStage::Created);

        let total = self.store.count_all().await?;
        info!(total, batch_size = self.batch_size, "streaming corpus");

        let mut last_id: Option<String> = None;
        let mut indexed = 0u64;
        let mut pages = 0usize;
        loop {
            let page = self
                .store
                .fetch_after(last_id.as_deref(), self.batch_size)
                .await?;
            if page.is_empty() {
                break;
            }

            let mut commands: Vec<BulkCommand> = Vec::with_capacity(page.len());
            for doc in &page {
                commands.extend(self.builder.commands_for(doc)?);
            }
            self.backend
                .bulk_write(&commands, RefreshMode::Deferred)
                .await?;

            indexed += page.len() as u64;
            pages += 1;
            info!(indexed, total, page = pages, "indexed page");

            last_id = page.last().map(|doc| doc.id.clone());
        }
        self.set_stage(ReindexStage::Indexed);

        self.lifecycle.refresh_all().await?;
        self.set_stage(ReindexStage::Refreshed);

        info!(indexed, dropped, created, "reindex complete");
        Ok(ReindexReport {
            total,
            indexed,
            pages,
            dropped,
            created,
        })
    }

    fn set_stage(&self, stage: ReindexStage) {
        let _ = self.stage.send(stage);
    }
}
