//! Bulk command construction.
//!
//! A [`BulkCommand`] is one (action-descriptor, body) pair consumed by the
//! search engine's batched write API. The [`BulkCommandBuilder`] combines a
//! document's projected body with its locale target(s):
//!
//! - a document with an explicit locale targets only that locale's index;
//! - a locale-less document fans out into **every** currently known locale
//!   index, so it stays visible regardless of the active locale filter.
//!
//! Commands are transient: built per document per target, consumed
//! immediately by the write path, never persisted.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use search_sync::{BulkCommandBuilder, Document, FieldSet, IndexNamer, LocaleSource};
//! use serde_json::json;
//!
//! let builder = BulkCommandBuilder::new(
//!     FieldSet::default(),
//!     Arc::new(IndexNamer::new("documents")),
//!     LocaleSource::SingleDefault,
//! );
//!
//! let doc = Document::from_json("x", json!({"title": "Hello World"})).with_locale("en");
//! let commands = builder.commands_for(&doc).unwrap();
//!
//! assert_eq!(commands.len(), 1);
//! assert_eq!(commands[0].action.index, "documentsen");
//! assert_eq!(commands[0].body["title"], "Hello World");
//! assert_eq!(commands[0].body["titleExact"], "Hello World");
//! ```

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::document::Document;
use crate::error::SyncError;
use crate::locale::{IndexNamer, LocaleSource};
use crate::projector::FieldSet;

/// Addressing half of a bulk command: which index, which document id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexAction {
    /// Physical index name (lowercase ASCII letters only).
    pub index: String,
    /// Document id, carried here rather than in the body.
    pub id: String,
}

/// One (action-descriptor, body) pair for the bulk write API.
#[derive(Debug, Clone, Serialize)]
pub struct BulkCommand {
    pub action: IndexAction,
    pub body: Map<String, Value>,
}

/// Builds the ordered command sequence for one document.
#[derive(Clone)]
pub struct BulkCommandBuilder {
    field_set: FieldSet,
    namer: Arc<IndexNamer>,
    locales: LocaleSource,
}

impl BulkCommandBuilder {
    pub fn new(field_set: FieldSet, namer: Arc<IndexNamer>, locales: LocaleSource) -> Self {
        Self {
            field_set,
            namer,
            locales,
        }
    }

    /// One bulk command per locale target.
    ///
    /// The body is projected once and shared across all targets; projection
    /// is locale-independent. Command order follows the locale source's
    /// iteration order, which matters only for reproducibility: the bulk
    /// API is order-insensitive for independent documents.
    ///
    /// The only error path is the namer's collision guard.
    pub fn commands_for(&self, doc: &Document) -> Result<Vec<BulkCommand>, SyncError> {
        let body = self.field_set.project(doc);

        let targets = match &doc.locale {
            Some(locale) => vec![locale.clone()],
            None => self.locales.locales(),
        };

        let mut commands = Vec::with_capacity(targets.len());
        for locale in &targets {
            let index = self.namer.index_for(locale)?;
            commands.push(BulkCommand {
                action: IndexAction {
                    index,
                    id: doc.id.clone(),
                },
                body: body.clone(),
            });
        }
        Ok(commands)
    }

    /// The namer shared with the rest of the engine.
    #[must_use]
    pub fn namer(&self) -> &Arc<IndexNamer> {
        &self.namer
    }

    /// The configured field set.
    #[must_use]
    pub fn field_set(&self) -> &FieldSet {
        &self.field_set
    }
}
