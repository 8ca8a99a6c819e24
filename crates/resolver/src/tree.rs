//! JSON tree helpers
//!
//! Pointer-based access (RFC 6901) and the merge primitive used by allOf
//! composition. All resolver passes edit the document through these helpers so
//! that pointer handling (escaping, intermediate creation) lives in one place.

use serde_json::{Map, Value};
use swagger_resolver_common::{ResolverError, Result};

/// Look up a value by JSON pointer. An empty pointer addresses the root.
pub fn get<'a>(tree: &'a Value, pointer: &str) -> Option<&'a Value> {
    tree.pointer(pointer)
}

/// Mutable lookup by JSON pointer.
pub fn get_mut<'a>(tree: &'a mut Value, pointer: &str) -> Option<&'a mut Value> {
    tree.pointer_mut(pointer)
}

/// Write `value` at `pointer`, creating intermediate objects as needed.
///
/// Existing non-container values along the path are replaced by objects.
/// Array segments must name an existing index.
pub fn set(tree: &mut Value, pointer: &str, value: Value) -> Result<()> {
    if pointer.is_empty() {
        *tree = value;
        return Ok(());
    }
    let rest = pointer.strip_prefix('/').ok_or_else(|| {
        ResolverError::InvalidArgument(format!("pointer {pointer:?} must start with '/'"))
    })?;
    let tokens: Vec<String> = rest.split('/').map(unescape_token).collect();

    let mut current = tree;
    for token in &tokens[..tokens.len() - 1] {
        if !current.is_object() && !current.is_array() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Object(map) => map
                .entry(token.as_str())
                .or_insert_with(|| Value::Object(Map::new())),
            Value::Array(arr) => {
                let index = parse_index(token, pointer)?;
                arr.get_mut(index).ok_or_else(|| ResolverError::InvalidArgument(format!(
                    "index {index} out of bounds in pointer {pointer:?}"
                )))?
            }
            _ => {
                return Err(ResolverError::InvalidArgument(format!(
                    "cannot descend into scalar at pointer {pointer:?}"
                )))
            }
        };
    }

    let last = &tokens[tokens.len() - 1];
    if !current.is_object() && !current.is_array() {
        *current = Value::Object(Map::new());
    }
    match current {
        Value::Object(map) => {
            map.insert(last.clone(), value);
        }
        Value::Array(arr) => {
            let index = parse_index(last, pointer)?;
            let slot = arr.get_mut(index).ok_or_else(|| {
                ResolverError::InvalidArgument(format!(
                    "index {index} out of bounds in pointer {pointer:?}"
                ))
            })?;
            *slot = value;
        }
        _ => {}
    }
    Ok(())
}

/// Merge `source` into `target`. Keys already present in `target` win; when
/// both sides hold objects the merge recurses so nested target keys survive.
pub fn deep_merge(target: &mut Value, source: &Value) {
    let (Value::Object(target_map), Value::Object(source_map)) = (target, source) else {
        return;
    };
    for (key, source_value) in source_map {
        match target_map.get_mut(key) {
            Some(existing) => {
                if existing.is_object() && source_value.is_object() {
                    deep_merge(existing, source_value);
                }
            }
            None => {
                target_map.insert(key.clone(), source_value.clone());
            }
        }
    }
}

/// Escape a key for use as a pointer token (`~` -> `~0`, `/` -> `~1`).
pub fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Reverse of [`escape_token`].
pub fn unescape_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

fn parse_index(token: &str, pointer: &str) -> Result<usize> {
    token.parse().map_err(|_| {
        ResolverError::InvalidArgument(format!(
            "expected array index, found {token:?} in pointer {pointer:?}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_by_pointer() {
        let tree = json!({ "definitions": { "Cat": { "type": "object" } } });
        assert_eq!(
            get(&tree, "/definitions/Cat/type"),
            Some(&json!("object"))
        );
        assert_eq!(get(&tree, "/definitions/Dog"), None);
        assert_eq!(get(&tree, ""), Some(&tree));
    }

    #[test]
    fn test_set_creates_intermediate_objects() {
        let mut tree = json!({});
        set(&mut tree, "/definitions/Cat/type", json!("object")).unwrap();
        assert_eq!(tree, json!({ "definitions": { "Cat": { "type": "object" } } }));
    }

    #[test]
    fn test_set_overwrites_existing() {
        let mut tree = json!({ "a": { "b": 1 } });
        set(&mut tree, "/a/b", json!(2)).unwrap();
        assert_eq!(tree["a"]["b"], json!(2));
    }

    #[test]
    fn test_set_into_array_index() {
        let mut tree = json!({ "allOf": [{ "$ref": "#/definitions/A" }] });
        set(&mut tree, "/allOf/0/$ref", json!("#/definitions/B")).unwrap();
        assert_eq!(tree["allOf"][0]["$ref"], json!("#/definitions/B"));
    }

    #[test]
    fn test_set_escaped_key() {
        let mut tree = json!({});
        set(&mut tree, "/paths/~1pets~1{id}/get", json!({})).unwrap();
        assert!(tree["paths"]["/pets/{id}"]["get"].is_object());
    }

    #[test]
    fn test_deep_merge_target_wins() {
        let mut target = json!({ "name": { "type": "string", "readOnly": true } });
        let source = json!({
            "name": { "type": "integer", "description": "inherited" },
            "id": { "type": "string" }
        });
        deep_merge(&mut target, &source);
        assert_eq!(target["name"]["type"], json!("string"));
        assert_eq!(target["name"]["description"], json!("inherited"));
        assert_eq!(target["name"]["readOnly"], json!(true));
        assert_eq!(target["id"]["type"], json!("string"));
    }

    #[test]
    fn test_token_escaping_round_trip() {
        assert_eq!(escape_token("a/b~c"), "a~1b~0c");
        assert_eq!(unescape_token("a~1b~0c"), "a/b~c");
    }
}
