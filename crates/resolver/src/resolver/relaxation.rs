//! Pure-object relaxation
//!
//! Azure specs use empty object schemas to mean "anything goes". Validators
//! take schemas literally, so this pass makes the permissiveness explicit:
//! a `type: "object"` schema with no properties and no `additionalProperties`
//! gets `additionalProperties: true`, and a bare `{type: "object"}` in
//! `additionalProperties` position collapses to `true`. Binary payloads are
//! exempt: body schemas under an `application/octet-stream` consumes (and
//! response schemas under such a produces) are left alone.

use serde_json::{Map, Value};

use super::{SpecResolver, HTTP_METHODS};

const OCTET_STREAM: &str = "application/octet-stream";

impl SpecResolver<'_> {
    pub(crate) fn resolve_pure_objects(&mut self) {
        let spec_consumes = media_type_list(self.tree.get("consumes"));
        let spec_produces = media_type_list(self.tree.get("produces"));
        let spec_octet_in = has_octet_stream(&spec_consumes, &None);

        if let Some(definitions) = self.tree.get_mut("definitions").and_then(Value::as_object_mut)
        {
            for (_name, model) in definitions.iter_mut() {
                relax_model_like(model);
            }
        }

        if let Some(parameters) = self.tree.get_mut("parameters").and_then(Value::as_object_mut) {
            for (_name, parameter) in parameters.iter_mut() {
                relax_parameter(parameter, spec_octet_in);
            }
        }

        let Some(paths) = self.tree.get_mut("paths").and_then(Value::as_object_mut) else {
            return;
        };
        for (_path, item) in paths.iter_mut() {
            let Some(item_map) = item.as_object_mut() else {
                continue;
            };
            if let Some(parameters) = item_map.get_mut("parameters").and_then(Value::as_array_mut)
            {
                for parameter in parameters.iter_mut() {
                    relax_parameter(parameter, spec_octet_in);
                }
            }
            for (key, operation) in item_map.iter_mut() {
                if !HTTP_METHODS.contains(&key.as_str()) {
                    continue;
                }
                let Some(operation) = operation.as_object_mut() else {
                    continue;
                };
                let octet_in =
                    has_octet_stream(&spec_consumes, &media_type_list(operation.get("consumes")));
                let octet_out =
                    has_octet_stream(&spec_produces, &media_type_list(operation.get("produces")));

                if let Some(parameters) =
                    operation.get_mut("parameters").and_then(Value::as_array_mut)
                {
                    for parameter in parameters.iter_mut() {
                        relax_parameter(parameter, octet_in);
                    }
                }
                if let Some(responses) =
                    operation.get_mut("responses").and_then(Value::as_object_mut)
                {
                    for (_status, response) in responses.iter_mut() {
                        if octet_out {
                            continue;
                        }
                        if let Some(schema) = response.get_mut("schema") {
                            relax_model_like(schema);
                        }
                    }
                }
            }
        }
    }
}

/// Recursively make "bag of anything" schemas explicitly permissive.
pub(crate) fn relax_model_like(schema: &mut Value) {
    let Some(map) = schema.as_object_mut() else {
        return;
    };
    if let Some(properties) = map.get_mut("properties").and_then(Value::as_object_mut) {
        for (_name, property) in properties.iter_mut() {
            relax_model_like(property);
        }
    }
    for keyword in ["allOf", "oneOf", "anyOf"] {
        if let Some(items) = map.get_mut(keyword).and_then(Value::as_array_mut) {
            for item in items.iter_mut() {
                relax_model_like(item);
            }
        }
    }
    if let Some(items) = map.get_mut("items") {
        if items.is_object() {
            relax_model_like(items);
        }
    }

    let collapse = match map.get_mut("additionalProperties") {
        Some(additional) if additional.is_object() => {
            if is_pure_object(additional) {
                true
            } else {
                relax_model_like(additional);
                false
            }
        }
        _ => false,
    };
    if collapse {
        map.insert("additionalProperties".to_string(), Value::Bool(true));
    }

    if is_pure_object_map(map) {
        map.insert("additionalProperties".to_string(), Value::Bool(true));
    }
}

/// Relax one parameter: body parameters relax their schema (unless the
/// payload is a binary stream), other parameters become permissive objects
/// when they declare no type at all.
fn relax_parameter(parameter: &mut Value, octet_stream: bool) {
    let Some(map) = parameter.as_object_mut() else {
        return;
    };
    if map.contains_key("$ref") || map.contains_key("oneOf") {
        return;
    }
    if map.get("in").and_then(Value::as_str) == Some("body") {
        if !octet_stream {
            if let Some(schema) = map.get_mut("schema") {
                relax_model_like(schema);
            }
        }
    } else if !map.contains_key("type") {
        map.insert("type".to_string(), Value::String("object".to_string()));
        map.insert("additionalProperties".to_string(), Value::Bool(true));
    }
}

fn is_pure_object(schema: &Value) -> bool {
    schema.as_object().is_some_and(is_pure_object_map)
}

fn is_pure_object_map(map: &Map<String, Value>) -> bool {
    map.get("type").and_then(Value::as_str) == Some("object")
        && map
            .get("properties")
            .and_then(Value::as_object)
            .map_or(true, |properties| properties.is_empty())
        && !map.contains_key("additionalProperties")
}

/// Effective media types: the operation's list when present, else the
/// spec-global one, else `application/json`.
fn has_octet_stream(global: &Option<Vec<String>>, operation: &Option<Vec<String>>) -> bool {
    match operation.as_ref().or(global.as_ref()) {
        Some(list) => list.iter().any(|media| media == OCTET_STREAM),
        None => false,
    }
}

fn media_type_list(value: Option<&Value>) -> Option<Vec<String>> {
    value.and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::FileLoader;
    use crate::options::ResolverOptions;
    use crate::resolver::SpecResolver;
    use serde_json::json;

    fn pure_objects_only() -> ResolverOptions {
        ResolverOptions {
            should_resolve_all_of: Some(false),
            should_set_additional_properties_false: Some(false),
            should_resolve_pure_objects: Some(true),
            should_resolve_discriminator: Some(false),
            should_resolve_nullable_types: Some(false),
            ..Default::default()
        }
    }

    fn resolve(tree: Value) -> Value {
        SpecResolver::new(
            tree,
            "/specs/test.json",
            &FileLoader::new(),
            &pure_objects_only(),
        )
        .unwrap()
        .resolve()
        .unwrap()
    }

    #[test]
    fn test_pure_object_becomes_permissive() {
        let resolved = resolve(json!({
            "definitions": {
                "Anything": { "type": "object" },
                "Empty": { "type": "object", "properties": {} }
            }
        }));
        assert_eq!(
            resolved["definitions"]["Anything"]["additionalProperties"],
            json!(true)
        );
        assert_eq!(
            resolved["definitions"]["Empty"]["additionalProperties"],
            json!(true)
        );
    }

    #[test]
    fn test_typed_object_untouched() {
        let input = json!({
            "definitions": {
                "Pet": { "type": "object", "properties": { "name": { "type": "string" } } }
            }
        });
        let resolved = resolve(input.clone());
        assert_eq!(resolved, input);
    }

    #[test]
    fn test_nested_pure_objects_relaxed() {
        let resolved = resolve(json!({
            "definitions": {
                "Wrapper": {
                    "type": "object",
                    "properties": {
                        "payload": { "type": "object" },
                        "tags": { "type": "array", "items": { "type": "object" } }
                    }
                }
            }
        }));
        let wrapper = &resolved["definitions"]["Wrapper"]["properties"];
        assert_eq!(wrapper["payload"]["additionalProperties"], json!(true));
        assert_eq!(wrapper["tags"]["items"]["additionalProperties"], json!(true));
    }

    #[test]
    fn test_bare_object_additional_properties_collapses() {
        let resolved = resolve(json!({
            "definitions": {
                "Map": { "type": "object", "additionalProperties": { "type": "object" } }
            }
        }));
        assert_eq!(
            resolved["definitions"]["Map"]["additionalProperties"],
            json!(true)
        );
    }

    #[test]
    fn test_constrained_additional_properties_kept() {
        let resolved = resolve(json!({
            "definitions": {
                "Map": { "type": "object", "additionalProperties": { "type": "string" } }
            }
        }));
        assert_eq!(
            resolved["definitions"]["Map"]["additionalProperties"],
            json!({ "type": "string" })
        );
    }

    #[test]
    fn test_untyped_non_body_parameter_relaxed() {
        let resolved = resolve(json!({
            "paths": {
                "/a": {
                    "get": {
                        "parameters": [
                            { "name": "filter", "in": "query" },
                            { "name": "top", "in": "query", "type": "integer" }
                        ],
                        "responses": {}
                    }
                }
            }
        }));
        let parameters = resolved["paths"]["/a"]["get"]["parameters"].as_array().unwrap();
        assert_eq!(parameters[0]["type"], json!("object"));
        assert_eq!(parameters[0]["additionalProperties"], json!(true));
        assert_eq!(parameters[1], json!({ "name": "top", "in": "query", "type": "integer" }));
    }

    #[test]
    fn test_body_schema_relaxed_unless_octet_stream() {
        let resolved = resolve(json!({
            "paths": {
                "/json": {
                    "post": {
                        "parameters": [
                            { "name": "body", "in": "body", "schema": { "type": "object" } }
                        ],
                        "responses": {}
                    }
                },
                "/upload": {
                    "post": {
                        "consumes": ["application/octet-stream"],
                        "parameters": [
                            { "name": "body", "in": "body", "schema": { "type": "object" } }
                        ],
                        "responses": {}
                    }
                }
            }
        }));
        assert_eq!(
            resolved["paths"]["/json"]["post"]["parameters"][0]["schema"]["additionalProperties"],
            json!(true)
        );
        assert_eq!(
            resolved["paths"]["/upload"]["post"]["parameters"][0]["schema"],
            json!({ "type": "object" })
        );
    }

    #[test]
    fn test_response_schema_gated_on_produces() {
        let resolved = resolve(json!({
            "produces": ["application/octet-stream"],
            "paths": {
                "/download": {
                    "get": {
                        "responses": { "200": { "schema": { "type": "object" } } }
                    }
                },
                "/info": {
                    "get": {
                        "produces": ["application/json"],
                        "responses": { "200": { "schema": { "type": "object" } } }
                    }
                }
            }
        }));
        assert_eq!(
            resolved["paths"]["/download"]["get"]["responses"]["200"]["schema"],
            json!({ "type": "object" })
        );
        assert_eq!(
            resolved["paths"]["/info"]["get"]["responses"]["200"]["schema"]["additionalProperties"],
            json!(true)
        );
    }

    #[test]
    fn test_referenced_parameter_untouched() {
        let input = json!({
            "parameters": {
                "ApiVersion": { "name": "api-version", "in": "query", "type": "string" }
            },
            "paths": {
                "/a": {
                    "get": {
                        "parameters": [{ "$ref": "#/parameters/ApiVersion" }],
                        "responses": {}
                    }
                }
            }
        });
        let resolved = resolve(input.clone());
        assert_eq!(resolved, input);
    }
}
