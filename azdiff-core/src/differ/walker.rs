//! Structural diff between two JSON trees.
//!
//! Produces the same bucket layout as the Python `deepdiff` library so that
//! diffs generated elsewhere can be fed straight into the detector.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Old and new value at a changed path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueChange {
    pub old_value: Value,
    pub new_value: Value,
}

/// Structural differences, keyed by bracketed path (`root['a'][0]`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DeepDiff {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dictionary_item_added: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dictionary_item_removed: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub iterable_item_added: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub iterable_item_removed: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values_changed: BTreeMap<String, ValueChange>,
}

impl DeepDiff {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of entries across all buckets.
    pub fn len(&self) -> usize {
        self.dictionary_item_added.len()
            + self.dictionary_item_removed.len()
            + self.iterable_item_added.len()
            + self.iterable_item_removed.len()
            + self.values_changed.len()
    }
}

/// Compute the structural diff from `base` to `diff`.
pub fn deep_diff(base: &Value, diff: &Value) -> DeepDiff {
    let mut out = DeepDiff::default();
    walk("root", base, diff, &mut out);
    out
}

fn walk(path: &str, base: &Value, diff: &Value, out: &mut DeepDiff) {
    match (base, diff) {
        (Value::Object(b), Value::Object(d)) => {
            for (key, b_val) in b {
                let child = format!("{}['{}']", path, key);
                match d.get(key) {
                    Some(d_val) => walk(&child, b_val, d_val, out),
                    None => out.dictionary_item_removed.push(child),
                }
            }
            for key in d.keys().filter(|k| !b.contains_key(*k)) {
                out.dictionary_item_added.push(format!("{}['{}']", path, key));
            }
        }
        (Value::Array(b), Value::Array(d)) => {
            for (i, (b_val, d_val)) in b.iter().zip(d).enumerate() {
                walk(&format!("{}[{}]", path, i), b_val, d_val, out);
            }
            for (i, item) in b.iter().enumerate().skip(d.len()) {
                out.iterable_item_removed
                    .insert(format!("{}[{}]", path, i), item.clone());
            }
            for (i, item) in d.iter().enumerate().skip(b.len()) {
                out.iterable_item_added
                    .insert(format!("{}[{}]", path, i), item.clone());
            }
        }
        _ if base != diff => {
            out.values_changed.insert(
                path.to_string(),
                ValueChange {
                    old_value: base.clone(),
                    new_value: diff.clone(),
                },
            );
        }
        _ => {}
    }
}
