//! Resolver options
//!
//! Every pass except `x-ms-paths` unification is gated by a flag. Unset flags
//! take document-dependent defaults: allOf flattening (and the passes that
//! build on composed models) defaults on only when the document has a
//! `definitions` object.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Caller-facing option set. Unset fields take the defaults described on each
/// flag; interactions between flags are applied by [`ResolverOptions::effective`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverOptions {
    /// Inline cross-file `$ref`s. Default: true.
    pub should_resolve_relative_paths: Option<bool>,

    /// Include `x-ms-examples` subtrees when inlining. Default: true; forced
    /// off when relative paths are not resolved.
    pub should_resolve_xms_examples: Option<bool>,

    /// Flatten `allOf` composition. Default: true iff the document has a
    /// `definitions` key.
    pub should_resolve_all_of: Option<bool>,

    /// Close open objects that declare properties. Default: follows allOf.
    pub should_set_additional_properties_false: Option<bool>,

    /// Make untyped/empty object schemas explicitly permissive. Default: true.
    pub should_resolve_pure_objects: Option<bool>,

    /// Expand discriminator roots into `oneOf` unions. Default: follows
    /// allOf; enabling it forces allOf on (expansion needs composed models).
    pub should_resolve_discriminator: Option<bool>,

    /// Fold `x-ms-parameterized-host` parameters into operations. Default: true.
    pub should_resolve_parameterized_host: Option<bool>,

    /// Rewrite nullable properties as `oneOf [T, null]`. Default: follows allOf.
    pub should_resolve_nullable_types: Option<bool>,

    /// Inject the CloudError default response. Default: false.
    pub should_model_implicit_default_response: Option<bool>,
}

/// Fully defaulted option set driving one resolution run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EffectiveOptions {
    pub resolve_relative_paths: bool,
    pub resolve_xms_examples: bool,
    pub resolve_all_of: bool,
    pub set_additional_properties_false: bool,
    pub resolve_pure_objects: bool,
    pub resolve_discriminator: bool,
    pub resolve_parameterized_host: bool,
    pub resolve_nullable_types: bool,
    pub model_implicit_default_response: bool,
}

impl ResolverOptions {
    pub(crate) fn effective(&self, tree: &Value) -> EffectiveOptions {
        let has_definitions = tree.get("definitions").is_some();

        let resolve_relative_paths = self.should_resolve_relative_paths.unwrap_or(true);
        let mut resolve_xms_examples = self.should_resolve_xms_examples.unwrap_or(true);
        if !resolve_relative_paths {
            resolve_xms_examples = false;
        }

        let mut resolve_all_of = self.should_resolve_all_of.unwrap_or(has_definitions);
        let set_additional_properties_false = self
            .should_set_additional_properties_false
            .unwrap_or(resolve_all_of);
        let resolve_discriminator = self.should_resolve_discriminator.unwrap_or(resolve_all_of);
        let resolve_nullable_types = self.should_resolve_nullable_types.unwrap_or(resolve_all_of);
        // discriminator expansion works on composed models
        if resolve_discriminator {
            resolve_all_of = true;
        }

        EffectiveOptions {
            resolve_relative_paths,
            resolve_xms_examples,
            resolve_all_of,
            set_additional_properties_false,
            resolve_pure_objects: self.should_resolve_pure_objects.unwrap_or(true),
            resolve_discriminator,
            resolve_parameterized_host: self.should_resolve_parameterized_host.unwrap_or(true),
            resolve_nullable_types,
            model_implicit_default_response: self
                .should_model_implicit_default_response
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_with_definitions() {
        let effective = ResolverOptions::default().effective(&json!({ "definitions": {} }));
        assert!(effective.resolve_relative_paths);
        assert!(effective.resolve_xms_examples);
        assert!(effective.resolve_all_of);
        assert!(effective.set_additional_properties_false);
        assert!(effective.resolve_discriminator);
        assert!(effective.resolve_nullable_types);
        assert!(effective.resolve_pure_objects);
        assert!(effective.resolve_parameterized_host);
        assert!(!effective.model_implicit_default_response);
    }

    #[test]
    fn test_defaults_without_definitions() {
        let effective = ResolverOptions::default().effective(&json!({ "paths": {} }));
        assert!(!effective.resolve_all_of);
        assert!(!effective.set_additional_properties_false);
        assert!(!effective.resolve_discriminator);
        assert!(!effective.resolve_nullable_types);
        assert!(effective.resolve_pure_objects);
    }

    #[test]
    fn test_discriminator_forces_all_of() {
        let options = ResolverOptions {
            should_resolve_all_of: Some(false),
            should_resolve_discriminator: Some(true),
            ..Default::default()
        };
        let effective = options.effective(&json!({}));
        assert!(effective.resolve_all_of);
        // the other allOf-derived defaults follow the explicit false
        assert!(!effective.set_additional_properties_false);
        assert!(!effective.resolve_nullable_types);
    }

    #[test]
    fn test_disabled_relative_paths_force_examples_off() {
        let options = ResolverOptions {
            should_resolve_relative_paths: Some(false),
            should_resolve_xms_examples: Some(true),
            ..Default::default()
        };
        let effective = options.effective(&json!({}));
        assert!(!effective.resolve_relative_paths);
        assert!(!effective.resolve_xms_examples);
    }

    #[test]
    fn test_camel_case_deserialization() {
        let options: ResolverOptions = serde_json::from_value(json!({
            "shouldResolveAllOf": false,
            "shouldModelImplicitDefaultResponse": true
        }))
        .unwrap();
        assert_eq!(options.should_resolve_all_of, Some(false));
        assert_eq!(options.should_model_implicit_default_response, Some(true));
    }
}
