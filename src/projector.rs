//! Field projection: turning a raw document into an indexable body.
//!
//! The projector selects a configured [`FieldSet`] from a document and keeps
//! only "flat" values the search engine can analyze: scalars, or arrays whose
//! first element is not itself a compound structure. Nested objects and
//! arrays of objects are silently skipped.
//!
//! Every included field also gets a `<field>Exact` shadow carrying the
//! unmodified value, unless the value's serialized form reaches the size
//! threshold. The shadows back exact-match queries without bloating the
//! index for large values.
//!
//! # Example
//!
//! ```
//! use search_sync::FieldSet;
//! use search_sync::Document;
//! use serde_json::json;
//!
//! let fields = FieldSet::default();
//! let doc = Document::from_json("x", json!({
//!     "title": "Hello World",
//!     "body": {"nested": "skipped"},
//! }));
//!
//! let body = fields.project(&doc);
//! assert_eq!(body["title"], "Hello World");
//! assert_eq!(body["titleExact"], "Hello World");
//! assert!(!body.contains_key("body"));
//! ```

use serde_json::{Map, Value};

use crate::document::{Document, ID_FIELD};

/// Fields projected when no extras are configured.
pub const DEFAULT_FIELDS: &[&str] = &["title", "body", "tags"];

/// Suffix of the exact-match shadow key.
pub const EXACT_SUFFIX: &str = "Exact";

/// Values whose serialized form reaches this many bytes get no shadow.
pub const EXACT_MAX_BYTES: usize = 4096;

/// Ordered, duplicate-free set of field names to project.
///
/// Fixed at configuration time: the default set plus additive extras.
/// Order only affects emitted body key order, never correctness.
#[derive(Debug, Clone)]
pub struct FieldSet {
    fields: Vec<String>,
}

impl Default for FieldSet {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl FieldSet {
    /// Default field set plus additive configured extras, deduplicated
    /// while preserving first-seen order.
    pub fn new(extra: &[String]) -> Self {
        let mut fields: Vec<String> = DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect();
        for field in extra {
            if !fields.iter().any(|f| f == field) {
                fields.push(field.clone());
            }
        }
        Self { fields }
    }

    /// An explicit field set, bypassing the defaults.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !fields.iter().any(|f| f == &name) {
                fields.push(name);
            }
        }
        Self { fields }
    }

    /// The configured field names, in emission order.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Project a document into an indexable body.
    ///
    /// Pure and total: no error conditions, no side effects. The primary
    /// identifier field is always excluded (it travels in the bulk action
    /// descriptor, not the body).
    #[must_use]
    pub fn project(&self, doc: &Document) -> Map<String, Value> {
        let mut body = Map::new();
        for field in &self.fields {
            if field == ID_FIELD {
                continue;
            }
            let Some(value) = doc.fields.get(field) else {
                continue;
            };
            if !is_flat(value) {
                continue;
            }
            body.insert(field.clone(), value.clone());
            if wants_exact_shadow(value) {
                body.insert(format!("{field}{EXACT_SUFFIX}"), value.clone());
            }
        }
        body
    }
}

/// A value the search engine can analyze directly: a scalar, or an array
/// whose first element is not a compound structure.
fn is_flat(value: &Value) -> bool {
    match value {
        Value::Object(_) => false,
        Value::Array(items) => !matches!(items.first(), Some(Value::Object(_) | Value::Array(_))),
        _ => true,
    }
}

/// Empty values and values under the size threshold get an exact shadow.
fn wants_exact_shadow(value: &Value) -> bool {
    is_empty(value) || serialized_len(value) < EXACT_MAX_BYTES
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn serialized_len(value: &Value) -> usize {
    serde_json::to_string(value).map_or(usize::MAX, |s| s.len())
}
