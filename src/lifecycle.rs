//! Index lifecycle: create, drop, and refresh the per-locale indexes.
//!
//! `drop_all` trusts the engine's own catalog as the source of truth for
//! what exists (prefix match on the base name), because the exact set of
//! locale-derived names is not recorded anywhere else. `create_all` builds
//! one index per known locale with a text mapping for every projected field,
//! a keyword mapping for every exact shadow field, and settings composed
//! from layered partial configs.
//!
//! Settings layers, in increasing priority:
//! 1. global index settings
//! 2. global analyzer override
//! 3. per-locale settings (keyed by the locale with any `-draft` suffix stripped)
//! 4. per-locale analyzer override
//!
//! Layers are deep-merged, never replaced wholesale; see [`crate::merge`].

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::backend::traits::SearchBackend;
use crate::config::SearchSyncConfig;
use crate::error::SyncError;
use crate::locale::{IndexNamer, LocaleSource};
use crate::merge::deep_merge;
use crate::projector::{FieldSet, EXACT_SUFFIX};

/// Suffix stripped from locale names when looking up per-locale settings,
/// so a draft variant shares its base locale's configuration.
pub const DRAFT_SUFFIX: &str = "-draft";

/// The ordered partial settings layers for index creation.
#[derive(Debug, Clone, Default)]
pub struct IndexSettingsLayers {
    pub global: Value,
    pub analyzer: Option<Value>,
    pub per_locale: HashMap<String, Value>,
    pub per_locale_analyzer: HashMap<String, Value>,
}

impl IndexSettingsLayers {
    #[must_use]
    pub fn from_config(config: &SearchSyncConfig) -> Self {
        Self {
            global: config.index_settings.clone(),
            analyzer: config.analyzer.clone(),
            per_locale: config.locale_settings.clone(),
            per_locale_analyzer: config.locale_analyzers.clone(),
        }
    }

    /// Merge the layers for one locale, later layers winning on conflicts.
    #[must_use]
    pub fn settings_for(&self, locale: &str) -> Value {
        let key = strip_draft(locale);
        let mut merged = Value::Object(Map::new());
        deep_merge(&mut merged, &self.global);
        if let Some(analyzer) = &self.analyzer {
            deep_merge(&mut merged, analyzer);
        }
        if let Some(settings) = self.per_locale.get(key) {
            deep_merge(&mut merged, settings);
        }
        if let Some(analyzer) = self.per_locale_analyzer.get(key) {
            deep_merge(&mut merged, analyzer);
        }
        merged
    }
}

/// Drop a trailing `-draft` suffix for settings lookup.
#[must_use]
pub fn strip_draft(locale: &str) -> &str {
    locale.strip_suffix(DRAFT_SUFFIX).unwrap_or(locale)
}

/// Creates and drops the physical indexes, one per locale.
#[derive(Clone)]
pub struct IndexLifecycle {
    backend: Arc<dyn SearchBackend>,
    namer: Arc<IndexNamer>,
    locales: LocaleSource,
    field_set: FieldSet,
    layers: IndexSettingsLayers,
}

impl IndexLifecycle {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        namer: Arc<IndexNamer>,
        locales: LocaleSource,
        field_set: FieldSet,
        layers: IndexSettingsLayers,
    ) -> Self {
        Self {
            backend,
            namer,
            locales,
            field_set,
            layers,
        }
    }

    /// Drop every existing index whose name starts with the base name.
    ///
    /// No-op success when nothing matches; otherwise one batched delete.
    /// Returns the number of indexes dropped.
    pub async fn drop_all(&self) -> Result<usize, SyncError> {
        let existing = self.backend.list_indexes().await?;
        let matching: Vec<String> = existing
            .into_iter()
            .filter(|name| name.starts_with(self.namer.base()))
            .collect();
        if matching.is_empty() {
            debug!(base = %self.namer.base(), "no indexes to drop");
            return Ok(0);
        }
        self.backend.delete_indexes(&matching).await?;
        info!(dropped = matching.len(), base = %self.namer.base(), "dropped search indexes");
        Ok(matching.len())
    }

    /// Create one index per known locale, in the locale source's stable
    /// order. The first per-locale failure aborts the remaining creates.
    /// Returns the number of indexes created.
    pub async fn create_all(&self) -> Result<usize, SyncError> {
        let mapping = self.mapping();
        let locales = self.locales.locales();
        for locale in &locales {
            let index = self.namer.index_for(locale)?;
            let settings = self.layers.settings_for(locale);
            self.backend
                .create_index(&index, mapping.clone(), settings)
                .await?;
            debug!(%locale, %index, "created search index");
        }
        info!(created = locales.len(), "created search indexes");
        Ok(locales.len())
    }

    /// Refresh every locale's index so recent writes become queryable.
    pub async fn refresh_all(&self) -> Result<(), SyncError> {
        for locale in self.locales.locales() {
            let index = self.namer.index_for(&locale)?;
            self.backend.refresh(&index).await?;
            debug!(%index, "refreshed search index");
        }
        Ok(())
    }

    /// Field mapping shared by every locale index: full-text analyzable
    /// type per projected field, exact/keyword type per shadow field.
    #[must_use]
    pub fn mapping(&self) -> Value {
        let mut properties = Map::new();
        for field in self.field_set.fields() {
            properties.insert(field.clone(), json!({"type": "text"}));
            properties.insert(format!("{field}{EXACT_SUFFIX}"), json!({"type": "keyword"}));
        }
        json!({ "properties": properties })
    }

    /// Merged settings for one locale (exposed for inspection).
    #[must_use]
    pub fn settings_for(&self, locale: &str) -> Value {
        self.layers.settings_for(locale)
    }
}
