//! Canonical error-model definitions
//!
//! Azure operations that model no error response of their own are given a
//! `default` response referencing these definitions. The shapes are written in
//! the resolver's own output form (nullable unions for optional properties,
//! closed or explicitly open objects) so resolving an already-resolved
//! document leaves them unchanged.

use serde_json::{json, Value};

/// The `CloudError` body: code, message, and optional diagnostic fields.
pub fn cloud_error() -> Value {
    json!({
        "type": "object",
        "properties": {
            "code": {
                "type": "string",
                "description": "An identifier for the error. Codes are invariant and are intended to be consumed programmatically."
            },
            "message": {
                "type": "string",
                "description": "A message describing the error, intended to be suitable for display in a user interface."
            },
            "target": {
                "oneOf": [
                    {
                        "type": "string",
                        "description": "The target of the particular error. For example, the name of the property in error."
                    },
                    { "type": "null" }
                ]
            },
            "details": {
                "oneOf": [
                    {
                        "type": "array",
                        "items": { "type": "object", "additionalProperties": true },
                        "description": "A list of additional details about the error."
                    },
                    { "type": "null" }
                ]
            },
            "additionalInfo": {
                "oneOf": [
                    {
                        "type": "array",
                        "items": { "type": "object", "additionalProperties": true },
                        "description": "A list of additional info about an error."
                    },
                    { "type": "null" }
                ]
            },
            "innererror": {
                "oneOf": [
                    { "type": "object", "additionalProperties": true },
                    { "type": "null" }
                ]
            }
        },
        "required": ["code", "message"],
        "additionalProperties": false
    })
}

/// The wrapper object carrying a `CloudError` under its `error` key.
pub fn cloud_error_wrapper() -> Value {
    json!({
        "type": "object",
        "properties": {
            "error": {
                "oneOf": [
                    { "$ref": "#/definitions/CloudError" },
                    { "type": "null" }
                ]
            }
        },
        "additionalProperties": false
    })
}

/// The `default` response injected into operations that lack one.
pub fn default_error_response() -> Value {
    json!({
        "description": "Error response describing why the operation failed.",
        "schema": { "$ref": "#/definitions/CloudErrorWrapper" }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloud_error_requires_code_and_message() {
        let model = cloud_error();
        assert_eq!(model["required"], json!(["code", "message"]));
        assert_eq!(model["additionalProperties"], json!(false));
    }

    #[test]
    fn test_default_response_references_wrapper() {
        let response = default_error_response();
        assert_eq!(
            response["schema"]["$ref"],
            json!("#/definitions/CloudErrorWrapper")
        );
    }
}
