//! The resolution pipeline
//!
//! [`SpecResolver`] owns the document for the duration of one `resolve` call
//! and drives the passes in a fixed order, each gated by its option flag:
//!
//! 1. `x-ms-paths` unification (always)
//! 2. cross-file `$ref` inlining
//! 3. allOf composition
//! 4. discriminator expansion (needs `allOf` arrays, so it runs before 5)
//! 5. allOf deletion
//! 6. closing open objects (`additionalProperties: false`)
//! 7. parameterized-host fold-in
//! 8. pure-object relaxation
//! 9. nullable-type rewriting
//! 10. implicit default response injection
//!
//! Passes mutate the tree through pointer-based edits; the caches
//! (`visited_entities`, `resolved_all_of_models`) only ever grow, which is
//! what breaks reference and composition cycles.

mod composition;
mod discriminator;
mod nullable;
mod relative;
mod relaxation;

use std::collections::HashMap;

use serde_json::{Map, Value};
use swagger_resolver_common::{
    cloud_error, cloud_error_wrapper, default_error_response, ResolveSpecError, ResolverError,
    Result,
};

use crate::loader::{self, DocumentLoader};
use crate::options::{EffectiveOptions, ResolverOptions};
use crate::tree;

/// Operation keys of a path item, in Swagger order.
pub(crate) const HTTP_METHODS: &[&str] =
    &["get", "put", "post", "delete", "options", "head", "patch"];

/// Rewrites a parsed Swagger 2.0 document into its self-contained,
/// validation-ready form.
///
/// # Example
/// ```rust,ignore
/// let resolver = SpecResolver::new(doc, "/specs/service.json", &FileLoader::new(), &options)?;
/// let resolved = resolver.resolve()?;
/// ```
pub struct SpecResolver<'a> {
    /// The document being rewritten; exclusively owned until `resolve` returns
    tree: Value,

    /// Absolute path or URL the document was loaded from
    doc_path: String,

    /// Directory portion of `doc_path`, the base for relative references
    doc_dir: String,

    options: EffectiveOptions,

    loader: &'a dyn DocumentLoader,

    /// Local pointers already spliced in from external documents
    visited_entities: HashMap<String, Value>,

    /// Model pointers whose allOf chains are already flattened
    resolved_all_of_models: HashMap<String, Value>,
}

impl<'a> SpecResolver<'a> {
    /// Validate the inputs and compute the effective option set.
    pub fn new(
        tree: Value,
        doc_path: &str,
        loader: &'a dyn DocumentLoader,
        options: &ResolverOptions,
    ) -> Result<Self> {
        if !tree.is_object() {
            return Err(ResolverError::InvalidArgument(
                "specification document must be a JSON object".to_string(),
            ));
        }
        if doc_path.trim().is_empty() {
            return Err(ResolverError::InvalidArgument(
                "document path must be a non-empty string".to_string(),
            ));
        }
        let effective = options.effective(&tree);
        Ok(Self {
            doc_dir: loader::parent_dir(doc_path),
            doc_path: doc_path.to_string(),
            tree,
            options: effective,
            loader,
            visited_entities: HashMap::new(),
            resolved_all_of_models: HashMap::new(),
        })
    }

    /// Run the pipeline and return the resolved document.
    ///
    /// Any pass failure aborts the run; the partially edited tree is dropped
    /// and the failure surfaces as a [`ResolveSpecError`].
    pub fn resolve(mut self) -> std::result::Result<Value, ResolveSpecError> {
        if let Err(inner) = self.run_pipeline() {
            tracing::error!(spec = %self.doc_path, error = %inner, "spec resolution failed");
            return Err(ResolveSpecError::new(self.doc_path, inner));
        }
        Ok(self.tree)
    }

    fn run_pipeline(&mut self) -> Result<()> {
        self.unify_x_ms_paths();
        if self.options.resolve_relative_paths {
            tracing::debug!(spec = %self.doc_path, "resolving relative references");
            self.resolve_relative_paths()?;
        }
        if self.options.resolve_all_of {
            self.resolve_all_of_in_definitions()?;
        }
        if self.options.resolve_discriminator {
            self.resolve_discriminator()?;
        }
        if self.options.resolve_all_of {
            self.delete_references_to_all_of();
        }
        if self.options.set_additional_properties_false {
            self.set_additional_properties_false(false);
        }
        if self.options.resolve_parameterized_host {
            self.resolve_parameterized_host();
        }
        if self.options.resolve_pure_objects {
            self.resolve_pure_objects();
        }
        if self.options.resolve_nullable_types {
            self.resolve_nullable_types();
        }
        if self.options.model_implicit_default_response {
            self.model_implicit_default_response();
        }
        Ok(())
    }

    /// Fold `x-ms-paths` entries into `paths`. The two key sets are disjoint
    /// by contract; on collision the `paths` entry wins. The extension key
    /// itself stays in place.
    fn unify_x_ms_paths(&mut self) {
        let extra = match self.tree.get("x-ms-paths").and_then(Value::as_object) {
            Some(map) if !map.is_empty() => map.clone(),
            _ => return,
        };
        let Some(root) = self.tree.as_object_mut() else {
            return;
        };
        let paths = root
            .entry("paths")
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(paths_map) = paths.as_object_mut() else {
            return;
        };
        for (key, value) in extra {
            if paths_map.contains_key(&key) {
                tracing::warn!(path = %key, "x-ms-paths entry collides with paths; keeping the paths entry");
            } else {
                paths_map.insert(key, value);
            }
        }
    }

    /// Append the `x-ms-parameterized-host` parameters to every operation.
    /// Parameters an operation already carries are not duplicated, so
    /// resolving a resolved document is a no-op.
    fn resolve_parameterized_host(&mut self) {
        let host_params = match tree::get(&self.tree, "/x-ms-parameterized-host/parameters")
            .and_then(Value::as_array)
        {
            Some(params) if !params.is_empty() => params.clone(),
            _ => return,
        };
        for_each_operation(&mut self.tree, |operation| {
            let params = operation
                .entry("parameters")
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Some(existing) = params.as_array_mut() {
                for host_param in &host_params {
                    if !existing.contains(host_param) {
                        existing.push(host_param.clone());
                    }
                }
            }
        });
    }

    /// Give every operation without a `default` response the canonical
    /// CloudError response, injecting the CloudError definitions if absent.
    fn model_implicit_default_response(&mut self) {
        let Some(root) = self.tree.as_object_mut() else {
            return;
        };
        let definitions = root
            .entry("definitions")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Some(definitions) = definitions.as_object_mut() {
            if !definitions.contains_key("CloudError") {
                definitions.insert("CloudErrorWrapper".to_string(), cloud_error_wrapper());
                definitions.insert("CloudError".to_string(), cloud_error());
            }
        }
        for_each_operation(&mut self.tree, |operation| {
            let responses = operation
                .entry("responses")
                .or_insert_with(|| Value::Object(Map::new()));
            if let Some(responses) = responses.as_object_mut() {
                if !responses.contains_key("default") {
                    responses.insert("default".to_string(), default_error_response());
                }
            }
        });
    }
}

/// Apply `f` to every operation object under `paths`.
pub(crate) fn for_each_operation(tree: &mut Value, mut apply: impl FnMut(&mut Map<String, Value>)) {
    let Some(paths) = tree.get_mut("paths").and_then(Value::as_object_mut) else {
        return;
    };
    for (_path, item) in paths.iter_mut() {
        let Some(item_map) = item.as_object_mut() else {
            continue;
        };
        for (key, operation) in item_map.iter_mut() {
            if !HTTP_METHODS.contains(&key.as_str()) {
                continue;
            }
            if let Some(operation) = operation.as_object_mut() {
                apply(operation);
            }
        }
    }
}
