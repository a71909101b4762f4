//! Document data structure.
//!
//! A [`Document`] is the unit the engine reads from the host store: an opaque
//! field map identified by a unique, totally-ordered string id, optionally
//! tagged with a locale. The engine never mutates documents.
//!
//! # Example
//!
//! ```
//! use search_sync::Document;
//! use serde_json::json;
//!
//! let doc = Document::from_json("doc-1", json!({
//!     "title": "Hello World",
//!     "tags": ["greeting", "demo"],
//! }))
//! .with_locale("en");
//!
//! assert_eq!(doc.id, "doc-1");
//! assert_eq!(doc.locale.as_deref(), Some("en"));
//! assert_eq!(doc.fields["title"], "Hello World");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the primary identifier field in the host store.
///
/// Carried in the bulk action descriptor, never in an indexed body.
pub const ID_FIELD: &str = "_id";

/// A document as read from the host store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique, totally-ordered identifier.
    pub id: String,
    /// Optional partition tag. Documents without one are replicated into
    /// every known locale index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Raw field map, owned by the host store.
    pub fields: Map<String, Value>,
}

impl Document {
    /// Create a document from an explicit field map.
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            locale: None,
            fields,
        }
    }

    /// Create a document from a JSON value.
    ///
    /// Objects become the field map directly; any other value is stored
    /// under a single `value` key.
    pub fn from_json(id: impl Into<String>, value: Value) -> Self {
        let fields = match value {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        Self::new(id, fields)
    }

    /// Tag the document with an explicit locale.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Look up a raw field value.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}
