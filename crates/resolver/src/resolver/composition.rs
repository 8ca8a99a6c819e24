//! allOf composition
//!
//! Flattens inheritance chains so every model carries the full union of its
//! ancestors' properties. Parents compose before they merge into children;
//! `resolved_all_of_models` short-circuits repeat visits, and a model whose
//! pointer is mid-composition counts as composed, which terminates cyclic
//! allOf chains.

use serde_json::Value;
use swagger_resolver_common::{ResolverError, Result};

use super::SpecResolver;
use crate::reference::Reference;
use crate::tree;

impl SpecResolver<'_> {
    pub(crate) fn resolve_all_of_in_definitions(&mut self) -> Result<()> {
        let names: Vec<String> = match self.tree.get("definitions").and_then(Value::as_object) {
            Some(definitions) => definitions.keys().cloned().collect(),
            None => return Ok(()),
        };
        for name in names {
            let model_ref = format!("/definitions/{}", tree::escape_token(&name));
            self.compose_model(&model_ref)?;
        }
        Ok(())
    }

    fn compose_model(&mut self, model_ref: &str) -> Result<()> {
        if self.resolved_all_of_models.contains_key(model_ref) {
            return Ok(());
        }
        let model = tree::get(&self.tree, model_ref)
            .cloned()
            .ok_or_else(|| ResolverError::PointerNotFound {
                pointer: model_ref.to_string(),
                path: self.doc_path.clone(),
            })?;
        let all_of = match model.get("allOf").and_then(Value::as_array) {
            Some(items) => items.clone(),
            None => {
                self.resolved_all_of_models
                    .insert(model_ref.to_string(), model);
                return Ok(());
            }
        };
        // recorded before recursing so a cyclic chain re-entering this model
        // sees it as composed
        self.resolved_all_of_models
            .insert(model_ref.to_string(), model);

        for item in &all_of {
            let parent = match item.get("$ref").and_then(Value::as_str) {
                Some(raw) => {
                    let reference = Reference::parse(raw)?;
                    let pointer = reference.local_pointer.ok_or_else(|| {
                        ResolverError::MalformedReference(raw.to_string())
                    })?;
                    self.compose_model(&pointer)?;
                    tree::get(&self.tree, &pointer).cloned().ok_or_else(|| {
                        ResolverError::PointerNotFound {
                            pointer,
                            path: self.doc_path.clone(),
                        }
                    })?
                }
                // inline allOf item: merge it as-is
                None => item.clone(),
            };
            self.merge_parent_into_child(&parent, model_ref);
        }

        if let Some(composed) = tree::get(&self.tree, model_ref) {
            self.resolved_all_of_models
                .insert(model_ref.to_string(), composed.clone());
        }
        Ok(())
    }

    /// Pull the parent's properties, required list, and `x-ms-azure-resource`
    /// marker into the child. Child values win on collision; nothing else
    /// crosses over.
    fn merge_parent_into_child(&mut self, parent: &Value, child_ref: &str) {
        let Some(parent_map) = parent.as_object() else {
            return;
        };
        let Some(child_map) = tree::get_mut(&mut self.tree, child_ref).and_then(Value::as_object_mut)
        else {
            return;
        };

        if let Some(parent_properties) = parent_map.get("properties") {
            match child_map.get_mut("properties") {
                Some(child_properties) => tree::deep_merge(child_properties, parent_properties),
                None => {
                    child_map.insert("properties".to_string(), parent_properties.clone());
                }
            }
        }

        if let Some(parent_required) = parent_map.get("required").and_then(Value::as_array) {
            let child_required = child_map
                .get("required")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            let mut union: Vec<Value> = Vec::new();
            for entry in parent_required.iter().chain(child_required.iter()) {
                if !union.contains(entry) {
                    union.push(entry.clone());
                }
            }
            child_map.insert("required".to_string(), Value::Array(union));
        }

        if let Some(marker) = parent_map.get("x-ms-azure-resource") {
            child_map.insert("x-ms-azure-resource".to_string(), marker.clone());
        }
    }

    /// Strip `allOf` from every top-level definition once composition and
    /// discriminator expansion are done with it.
    pub(crate) fn delete_references_to_all_of(&mut self) {
        let Some(definitions) = self.tree.get_mut("definitions").and_then(Value::as_object_mut)
        else {
            return;
        };
        for (_name, model) in definitions.iter_mut() {
            if let Some(model) = model.as_object_mut() {
                model.remove("allOf");
            }
        }
    }

    /// Close models that declare properties. With `force` every model is
    /// closed; otherwise only models with a non-empty `properties` object and
    /// no `additionalProperties` of their own. Models with zero properties
    /// stay open.
    pub(crate) fn set_additional_properties_false(&mut self, force: bool) {
        let Some(definitions) = self.tree.get_mut("definitions").and_then(Value::as_object_mut)
        else {
            return;
        };
        for (_name, model) in definitions.iter_mut() {
            let Some(model) = model.as_object_mut() else {
                continue;
            };
            let has_properties = model
                .get("properties")
                .and_then(Value::as_object)
                .is_some_and(|properties| !properties.is_empty());
            if force || (!model.contains_key("additionalProperties") && has_properties) {
                model.insert("additionalProperties".to_string(), Value::Bool(false));
            }
        }
    }
}
