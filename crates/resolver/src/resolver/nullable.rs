//! Nullable-type rewriting
//!
//! Azure services routinely return `null` for optional fields. Downstream
//! validators see that as a type violation, so this pass widens properties to
//! `oneOf [T, null]`: explicitly when `x-nullable` is true, implicitly when a
//! property is not required. `x-nullable: false` pins a property to its
//! declared type. Already-widened schemas are recognized and left alone, so
//! the rewrite is idempotent.

use serde_json::{json, Value};

use super::{SpecResolver, HTTP_METHODS};

impl SpecResolver<'_> {
    pub(crate) fn resolve_nullable_types(&mut self) {
        if let Some(definitions) = self.tree.get_mut("definitions").and_then(Value::as_object_mut)
        {
            for (_name, model) in definitions.iter_mut() {
                allow_nullable(model);
            }
        }
        if let Some(parameters) = self.tree.get_mut("parameters").and_then(Value::as_object_mut) {
            for (_name, parameter) in parameters.iter_mut() {
                allow_nullable_param(parameter);
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
                    allow_nullable_param(parameter);
                }
            }
            for (key, operation) in item_map.iter_mut() {
                if !HTTP_METHODS.contains(&key.as_str()) {
                    continue;
                }
                let Some(operation) = operation.as_object_mut() else {
                    continue;
                };
                if let Some(parameters) =
                    operation.get_mut("parameters").and_then(Value::as_array_mut)
                {
                    for parameter in parameters.iter_mut() {
                        allow_nullable_param(parameter);
                    }
                }
                if let Some(responses) =
                    operation.get_mut("responses").and_then(Value::as_object_mut)
                {
                    for (_status, response) in responses.iter_mut() {
                        if let Some(schema) = response.get_mut("schema") {
                            allow_nullable(schema);
                        }
                    }
                }
            }
        }
    }
}

/// Widen the properties of an object schema per the nullable rules, keyed on
/// the schema's own `required` array. Nested objects are handled first so a
/// wrapped property keeps its inner rewrites.
pub(crate) fn allow_nullable(schema: &mut Value) {
    let Some(map) = schema.as_object_mut() else {
        return;
    };
    let required: Vec<String> = map
        .get("required")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    let Some(properties) = map.get_mut("properties").and_then(Value::as_object_mut) else {
        return;
    };
    for (name, property) in properties.iter_mut() {
        if property.get("properties").is_some() {
            allow_nullable(property);
        }
        let is_required = required.iter().any(|entry| entry == name);
        if should_accept_null(property, is_required) {
            wrap_nullable(property);
        }
    }
}

/// Widen a parameter: body parameters widen their schema, other parameters
/// widen in place, both keyed on the parameter's own `required` flag.
fn allow_nullable_param(parameter: &mut Value) {
    if parameter.get("$ref").is_some() {
        return;
    }
    let required = parameter
        .get("required")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if parameter.get("in").and_then(Value::as_str) == Some("body") {
        if let Some(schema) = parameter.get_mut("schema") {
            if should_accept_null(schema, required) {
                wrap_nullable(schema);
            }
        }
    } else if should_accept_null(parameter, required) {
        wrap_nullable(parameter);
    }
}

fn should_accept_null(entity: &Value, is_required: bool) -> bool {
    if is_nullable_union(entity) {
        return false;
    }
    match entity.get("x-nullable").and_then(Value::as_bool) {
        Some(explicit) => explicit,
        None => !is_required,
    }
}

/// A `oneOf` that already carries a `{type: "null"}` branch.
fn is_nullable_union(entity: &Value) -> bool {
    entity
        .get("oneOf")
        .and_then(Value::as_array)
        .is_some_and(|branches| {
            branches
                .iter()
                .any(|branch| branch.get("type").and_then(Value::as_str) == Some("null"))
        })
}

fn wrap_nullable(entity: &mut Value) {
    let original = entity.take();
    *entity = json!({ "oneOf": [original, { "type": "null" }] });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::FileLoader;
    use crate::options::ResolverOptions;
    use crate::resolver::SpecResolver;
    use pretty_assertions::assert_eq;

    fn nullable_only() -> ResolverOptions {
        ResolverOptions {
            should_resolve_all_of: Some(false),
            should_set_additional_properties_false: Some(false),
            should_resolve_pure_objects: Some(false),
            should_resolve_discriminator: Some(false),
            should_resolve_nullable_types: Some(true),
            ..Default::default()
        }
    }

    fn resolve(tree: Value) -> Value {
        SpecResolver::new(
            tree,
            "/specs/test.json",
            &FileLoader::new(),
            &nullable_only(),
        )
        .unwrap()
        .resolve()
        .unwrap()
    }

    #[test]
    fn test_explicit_nullable_wrapped_even_when_required() {
        let resolved = resolve(json!({
            "definitions": {
                "M": {
                    "properties": { "x": { "type": "integer", "x-nullable": true } },
                    "required": ["x"]
                }
            }
        }));
        assert_eq!(
            resolved["definitions"]["M"]["properties"]["x"],
            json!({
                "oneOf": [
                    { "type": "integer", "x-nullable": true },
                    { "type": "null" }
                ]
            })
        );
    }

    #[test]
    fn test_optional_property_wrapped_implicitly() {
        let resolved = resolve(json!({
            "definitions": {
                "M": { "properties": { "x": { "type": "integer" } } }
            }
        }));
        assert_eq!(
            resolved["definitions"]["M"]["properties"]["x"],
            json!({ "oneOf": [{ "type": "integer" }, { "type": "null" }] })
        );
    }

    #[test]
    fn test_required_property_left_alone() {
        let resolved = resolve(json!({
            "definitions": {
                "M": {
                    "properties": { "x": { "type": "integer" } },
                    "required": ["x"]
                }
            }
        }));
        assert_eq!(
            resolved["definitions"]["M"]["properties"]["x"],
            json!({ "type": "integer" })
        );
    }

    #[test]
    fn test_nullable_false_pins_property() {
        let resolved = resolve(json!({
            "definitions": {
                "M": { "properties": { "x": { "type": "integer", "x-nullable": false } } }
            }
        }));
        assert_eq!(
            resolved["definitions"]["M"]["properties"]["x"],
            json!({ "type": "integer", "x-nullable": false })
        );
    }

    #[test]
    fn test_nested_properties_widened_before_wrapping() {
        let resolved = resolve(json!({
            "definitions": {
                "Outer": {
                    "properties": {
                        "inner": {
                            "properties": { "leaf": { "type": "string" } },
                            "required": ["leaf"]
                        }
                    },
                    "required": ["inner"]
                }
            }
        }));
        // inner is required, so not wrapped; leaf is required inside inner
        assert_eq!(
            resolved["definitions"]["Outer"]["properties"]["inner"]["properties"]["leaf"],
            json!({ "type": "string" })
        );
    }

    #[test]
    fn test_already_widened_property_stable() {
        let input = json!({
            "definitions": {
                "M": {
                    "properties": {
                        "x": { "oneOf": [{ "type": "integer" }, { "type": "null" }] }
                    }
                }
            }
        });
        let resolved = resolve(input.clone());
        assert_eq!(resolved, input);
    }

    #[test]
    fn test_optional_body_parameter_schema_wrapped() {
        let resolved = resolve(json!({
            "paths": {
                "/a": {
                    "post": {
                        "parameters": [
                            { "name": "body", "in": "body", "schema": { "$ref": "#/definitions/M" } },
                            { "name": "id", "in": "query", "required": true, "type": "string" }
                        ],
                        "responses": {}
                    }
                }
            },
            "definitions": { "M": { "properties": {} } }
        }));
        let parameters = resolved["paths"]["/a"]["post"]["parameters"].as_array().unwrap();
        assert_eq!(
            parameters[0]["schema"],
            json!({ "oneOf": [{ "$ref": "#/definitions/M" }, { "type": "null" }] })
        );
        // required non-body parameter is untouched
        assert_eq!(
            parameters[1],
            json!({ "name": "id", "in": "query", "required": true, "type": "string" })
        );
    }

    #[test]
    fn test_optional_query_parameter_widened_in_place() {
        let resolved = resolve(json!({
            "paths": {
                "/a": {
                    "get": {
                        "parameters": [{ "name": "filter", "in": "query", "type": "string" }],
                        "responses": {}
                    }
                }
            }
        }));
        assert_eq!(
            resolved["paths"]["/a"]["get"]["parameters"][0],
            json!({
                "oneOf": [
                    { "name": "filter", "in": "query", "type": "string" },
                    { "type": "null" }
                ]
            })
        );
    }

    #[test]
    fn test_response_schema_properties_widened() {
        let resolved = resolve(json!({
            "paths": {
                "/a": {
                    "get": {
                        "responses": {
                            "200": {
                                "schema": { "properties": { "x": { "type": "string" } } }
                            }
                        }
                    }
                }
            }
        }));
        assert_eq!(
            resolved["paths"]["/a"]["get"]["responses"]["200"]["schema"]["properties"]["x"],
            json!({ "oneOf": [{ "type": "string" }, { "type": "null" }] })
        );
    }
}
