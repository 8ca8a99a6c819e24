//! Polymorphism trees
//!
//! A [`PolymorphicTree`] captures a discriminator-bearing model and its
//! transitive descendants. Children are keyed by model name in insertion
//! order, so rewritten `oneOf` arrays come out in a reproducible order.

use indexmap::IndexMap;
use swagger_resolver_common::{ResolverError, Result};

/// A discriminator root or descendant, with its ordered children.
#[derive(Debug, Clone, PartialEq)]
pub struct PolymorphicTree {
    pub name: String,
    pub children: IndexMap<String, PolymorphicTree>,
}

impl PolymorphicTree {
    /// Create a node. The name must be non-empty.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(ResolverError::InvalidArgument(
                "polymorphic tree node name must be a non-empty string".to_string(),
            ));
        }
        Ok(Self {
            name,
            children: IndexMap::new(),
        })
    }

    /// Add a child subtree. Adding a name that is already present is a no-op.
    pub fn add_child(&mut self, child: PolymorphicTree) {
        if !self.children.contains_key(&child.name) {
            self.children.insert(child.name.clone(), child);
        }
    }

    /// All descendant names in depth-first order, parents before children.
    pub fn descendant_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for child in self.children.values() {
            names.push(child.name.clone());
            names.extend(child.descendant_names());
        }
        names
    }
}
