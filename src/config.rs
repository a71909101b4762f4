//! Configuration for the sync engine.
//!
//! # Example
//!
//! ```
//! use search_sync::SearchSyncConfig;
//! use serde_json::json;
//!
//! // Minimal config (uses defaults)
//! let config = SearchSyncConfig::default();
//! assert_eq!(config.index_base, "documents");
//! assert_eq!(config.batch_size, 100);
//!
//! // Full config
//! let config = SearchSyncConfig {
//!     index_base: "articles".into(),
//!     extra_fields: vec!["summary".into()],
//!     index_settings: json!({"number_of_shards": 1}),
//!     ..Default::default()
//! };
//! ```

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

/// Configuration for the sync engine.
///
/// All fields have sensible defaults. Settings and analyzer overrides are
/// partial JSON objects that get deep-merged per locale at index creation;
/// see [`crate::lifecycle::IndexSettingsLayers`].
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSyncConfig {
    /// Base name every physical index name starts with.
    /// Must be lowercase ASCII letters only.
    #[serde(default = "default_index_base")]
    pub index_base: String,

    /// Extra field names projected on top of the default field set.
    #[serde(default)]
    pub extra_fields: Vec<String>,

    /// Page size for the reindex corpus stream.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Global index settings, applied to every locale index.
    #[serde(default = "default_index_settings")]
    pub index_settings: Value,

    /// Global analyzer override, merged over the global settings.
    #[serde(default)]
    pub analyzer: Option<Value>,

    /// Per-locale settings. Keys are locale names with any trailing
    /// `-draft` suffix already stripped.
    #[serde(default)]
    pub locale_settings: HashMap<String, Value>,

    /// Per-locale analyzer overrides, highest priority layer.
    #[serde(default)]
    pub locale_analyzers: HashMap<String, Value>,

    /// Name of the mutual-exclusion lock guarding full reindex runs.
    #[serde(default = "default_reindex_lock")]
    pub reindex_lock: String,
}

fn default_index_base() -> String {
    "documents".to_string()
}
fn default_batch_size() -> usize {
    100
}
fn default_index_settings() -> Value {
    Value::Object(Map::new())
}
fn default_reindex_lock() -> String {
    "search-sync-reindex".to_string()
}

impl Default for SearchSyncConfig {
    fn default() -> Self {
        Self {
            index_base: default_index_base(),
            extra_fields: Vec::new(),
            batch_size: default_batch_size(),
            index_settings: default_index_settings(),
            analyzer: None,
            locale_settings: HashMap::new(),
            locale_analyzers: HashMap::new(),
            reindex_lock: default_reindex_lock(),
        }
    }
}
