//! Recursive merge of JSON configuration layers.
//!
//! Index settings are composed from an ordered list of partial layers
//! (global settings, analyzer overrides, per-locale settings) reduced
//! left-to-right. Maps merge key-by-key, recursively; every other value
//! type is replaced wholesale by the later layer.
//!
//! # Example
//!
//! ```
//! use search_sync::merge::merge_layers;
//! use serde_json::json;
//!
//! let merged = merge_layers([
//!     &json!({"analysis": {"analyzer": {"default": {"type": "standard"}}}}),
//!     &json!({"analysis": {"analyzer": {"default": {"type": "german"}}}}),
//!     &json!({"number_of_shards": 1}),
//! ]);
//!
//! assert_eq!(merged["analysis"]["analyzer"]["default"]["type"], "german");
//! assert_eq!(merged["number_of_shards"], 1);
//! ```

use serde_json::{Map, Value};

/// Merge `overlay` into `base` in place.
///
/// Conflicting object keys recurse; conflicting non-objects take the
/// overlay's value.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}

/// Reduce an ordered sequence of layers into one merged object.
///
/// Later layers win on conflicting keys. An empty sequence yields `{}`.
pub fn merge_layers<'a>(layers: impl IntoIterator<Item = &'a Value>) -> Value {
    let mut merged = Value::Object(Map::new());
    for layer in layers {
        deep_merge(&mut merged, layer);
    }
    merged
}
