//! Discriminator expansion
//!
//! For every discriminator-bearing model this pass pins the discriminator
//! property of the model and each descendant to a single-value enum carrying
//! the on-wire name, then rewrites plain references to the root into a
//! `oneOf` union over the root and all descendants. It runs after allOf
//! composition (descendants are found through the still-present `allOf`
//! arrays) and before those arrays are deleted.

use serde_json::{json, Value};
use swagger_resolver_common::Result;

use super::SpecResolver;
use crate::polymorphic::PolymorphicTree;
use crate::scanner;
use crate::tree;

impl SpecResolver<'_> {
    pub(crate) fn resolve_discriminator(&mut self) -> Result<()> {
        let Some(definitions) = self.tree.get("definitions").and_then(Value::as_object) else {
            return Ok(());
        };
        let roots: Vec<(String, String)> = definitions
            .iter()
            .filter_map(|(name, model)| {
                model
                    .get("discriminator")
                    .and_then(Value::as_str)
                    .map(|discriminator| (name.clone(), discriminator.to_string()))
            })
            .collect();
        if roots.is_empty() {
            return Ok(());
        }

        let mut subtrees = Vec::with_capacity(roots.len());
        for (root, discriminator) in &roots {
            let mut stack = Vec::new();
            subtrees.push(self.build_polymorphic_tree(root, discriminator, &mut stack)?);
        }
        self.update_references_with_one_of(&subtrees);
        Ok(())
    }

    /// Build the subtree rooted at `name`, pinning each node's discriminator
    /// enum along the way. A name already on the construction stack returns
    /// its node without recursing, so malformed cyclic hierarchies terminate.
    fn build_polymorphic_tree(
        &mut self,
        name: &str,
        discriminator: &str,
        stack: &mut Vec<String>,
    ) -> Result<PolymorphicTree> {
        let mut node = PolymorphicTree::new(name)?;
        if stack.iter().any(|entry| entry == name) {
            return Ok(node);
        }
        stack.push(name.to_string());
        self.pin_discriminator_enum(name, discriminator);
        for child in self.find_children(name) {
            let child_tree = self.build_polymorphic_tree(&child, discriminator, stack)?;
            node.add_child(child_tree);
        }
        stack.pop();
        Ok(node)
    }

    /// Turn the discriminator property of `name` into a single-value enum
    /// carrying the model's on-wire name (`x-ms-discriminator-value` wins
    /// over the definition key).
    fn pin_discriminator_enum(&mut self, name: &str, discriminator: &str) {
        let pointer = format!("/definitions/{}", tree::escape_token(name));
        let Some(model) = tree::get_mut(&mut self.tree, &pointer).and_then(Value::as_object_mut)
        else {
            return;
        };
        let wire_name = model
            .get("x-ms-discriminator-value")
            .and_then(Value::as_str)
            .unwrap_or(name)
            .to_string();
        let Some(property) = model
            .get_mut("properties")
            .and_then(|properties| properties.get_mut(discriminator))
            .and_then(Value::as_object_mut)
        else {
            return;
        };
        property.remove("$ref");
        if !property.contains_key("type") {
            property.insert("type".to_string(), Value::String("string".to_string()));
        }
        property.insert("enum".to_string(), json!([wire_name]));
    }

    /// Definitions whose `allOf` references `name` directly, in definition
    /// order.
    fn find_children(&self, name: &str) -> Vec<String> {
        let target = format!("#/definitions/{name}");
        let Some(definitions) = self.tree.get("definitions").and_then(Value::as_object) else {
            return Vec::new();
        };
        definitions
            .iter()
            .filter(|(_, model)| {
                model
                    .get("allOf")
                    .and_then(Value::as_array)
                    .is_some_and(|items| {
                        items.iter().any(|item| {
                            item.get("$ref").and_then(Value::as_str) == Some(target.as_str())
                        })
                    })
            })
            .map(|(child, _)| child.clone())
            .collect()
    }

    /// Replace every plain `$ref` to a root that has children with a `oneOf`
    /// union over the root and its descendants. References inside `allOf`
    /// (inheritance links) and `oneOf` (already expanded) stay untouched.
    fn update_references_with_one_of(&mut self, subtrees: &[PolymorphicTree]) {
        let sites = scanner::collect_refs(&self.tree);
        for subtree in subtrees {
            let descendants = subtree.descendant_names();
            if descendants.is_empty() {
                continue;
            }
            let target = format!("#/definitions/{}", subtree.name);
            let mut variants = vec![subtree.name.clone()];
            for name in descendants {
                if !variants.contains(&name) {
                    variants.push(name);
                }
            }
            for site in &sites {
                if site.target != target
                    || site
                        .location
                        .split('/')
                        .any(|segment| segment == "allOf" || segment == "oneOf")
                {
                    continue;
                }
                let Some(holder) =
                    tree::get_mut(&mut self.tree, &site.location).and_then(Value::as_object_mut)
                else {
                    continue;
                };
                if holder.get("$ref").and_then(Value::as_str) != Some(target.as_str()) {
                    continue;
                }
                holder.remove("$ref");
                let union: Vec<Value> = variants
                    .iter()
                    .map(|name| json!({ "$ref": format!("#/definitions/{name}") }))
                    .collect();
                holder.insert("oneOf".to_string(), Value::Array(union));
            }
        }
    }
}
