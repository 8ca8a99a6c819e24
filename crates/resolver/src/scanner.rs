//! Reference scanning
//!
//! Walks a document tree and yields every `$ref` together with the JSON
//! pointer of the object holding it, in deterministic document order. Passes
//! take this index up front and then edit the tree by pointer, so the walk
//! itself never observes a partially edited document.

use serde_json::Value;

use crate::tree;

/// One `$ref` occurrence in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefSite {
    /// JSON pointer to the object carrying the `$ref` key
    pub location: String,

    /// The raw `$ref` string
    pub target: String,
}

/// Collect every `$ref` in `node`, depth-first in key order.
///
/// Locations are relative to `node`; callers scanning a subtree prefix them
/// with the subtree's own pointer.
pub fn collect_refs(node: &Value) -> Vec<RefSite> {
    let mut sites = Vec::new();
    walk(node, "", &mut sites);
    sites
}

fn walk(node: &Value, path: &str, sites: &mut Vec<RefSite>) {
    match node {
        Value::Object(map) => {
            if let Some(Value::String(target)) = map.get("$ref") {
                sites.push(RefSite {
                    location: path.to_string(),
                    target: target.clone(),
                });
            }
            for (key, child) in map {
                walk(child, &format!("{path}/{}", tree::escape_token(key)), sites);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                walk(child, &format!("{path}/{index}"), sites);
            }
        }
        _ => {}
    }
}
