//! Cross-file reference resolution
//!
//! Inlines every `$ref` that crosses a document boundary. Whole-file imports
//! are spliced in place of the reference; pointered references are rewritten
//! to the purely local form and their target is copied into the host document
//! under the same local pointer it had in its source file. Resolution is
//! strictly sequential: every step mutates the shared tree and the
//! `visited_entities` cache, and a second encounter of a local pointer
//! short-circuits, which is what terminates mutually referencing files.

use serde_json::Value;
use swagger_resolver_common::{ResolverError, Result};

use super::SpecResolver;
use crate::loader;
use crate::reference::Reference;
use crate::scanner;
use crate::tree;

/// Which references a resolution sweep visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RefFilter {
    /// Only references with a file component.
    External,
    /// Every reference. Used when sweeping a freshly spliced subtree: what
    /// was local in the external file is still relative from the host's
    /// perspective.
    All,
}

impl SpecResolver<'_> {
    pub(crate) fn resolve_relative_paths(&mut self) -> Result<()> {
        let doc_path = self.doc_path.clone();
        self.resolve_references_in("", &doc_path, RefFilter::External)
    }

    /// Sweep the subtree at `scope`, resolving each reference in scan order.
    fn resolve_references_in(
        &mut self,
        scope: &str,
        base_doc_path: &str,
        filter: RefFilter,
    ) -> Result<()> {
        let Some(scope_node) = tree::get(&self.tree, scope) else {
            return Ok(());
        };
        let sites = scanner::collect_refs(scope_node);
        for site in sites {
            let location = format!("{scope}{}", site.location);
            self.resolve_reference(&location, &site.target, base_doc_path, filter)?;
        }
        Ok(())
    }

    fn resolve_reference(
        &mut self,
        location: &str,
        target: &str,
        base_doc_path: &str,
        filter: RefFilter,
    ) -> Result<()> {
        // earlier splices may have rewritten or removed this site
        let ref_pointer = format!("{location}/$ref");
        match tree::get(&self.tree, &ref_pointer).and_then(Value::as_str) {
            Some(current) if current == target => {}
            _ => return Ok(()),
        }

        let reference = Reference::parse(target)?;
        if reference.file_path.is_none() && filter == RefFilter::External {
            return Ok(());
        }

        let base_dir = if base_doc_path == self.doc_path {
            self.doc_dir.clone()
        } else {
            loader::parent_dir(base_doc_path)
        };
        let external_path = match &reference.file_path {
            Some(file) => loader::join_document_path(&base_dir, file)?,
            None => base_doc_path.to_string(),
        };

        match reference.local_pointer {
            None => {
                // whole-file import, e.g. an x-ms-examples entry
                if !self.options.resolve_xms_examples
                    && location.to_ascii_lowercase().contains("x-ms-examples")
                {
                    return Ok(());
                }
                let external = self.loader.load(&external_path)?;
                tree::set(&mut self.tree, location, external)?;
            }
            Some(pointer) => {
                if reference.file_path.is_some() {
                    tree::set(
                        &mut self.tree,
                        &ref_pointer,
                        Value::String(format!("#{pointer}")),
                    )?;
                }
                if self.visited_entities.contains_key(&pointer) {
                    return Ok(());
                }
                let external = self.loader.load(&external_path)?;
                let entity = tree::get(&external, &pointer).cloned().ok_or_else(|| {
                    ResolverError::PointerNotFound {
                        pointer: pointer.clone(),
                        path: external_path.clone(),
                    }
                })?;
                self.visited_entities.insert(pointer.clone(), entity.clone());
                tree::set(&mut self.tree, &pointer, entity)?;
                self.resolve_references_in(&pointer, &external_path, RefFilter::All)?;
                self.splice_composed_definitions(&external, &external_path)?;
            }
        }
        Ok(())
    }

    /// Pull in every allOf-bearing definition of an external file that has not
    /// been visited yet. Composed children are often never referenced
    /// directly, but their base models are needed once anything from the file
    /// is spliced in.
    fn splice_composed_definitions(
        &mut self,
        external: &Value,
        external_path: &str,
    ) -> Result<()> {
        let Some(definitions) = external.get("definitions").and_then(Value::as_object) else {
            return Ok(());
        };
        for (name, definition) in definitions {
            if definition.get("allOf").is_none() {
                continue;
            }
            let pointer = format!("/definitions/{}", tree::escape_token(name));
            if self.visited_entities.contains_key(&pointer) {
                continue;
            }
            self.visited_entities
                .insert(pointer.clone(), definition.clone());
            tree::set(&mut self.tree, &pointer, definition.clone())?;
            self.resolve_references_in(&pointer, external_path, RefFilter::All)?;
        }
        Ok(())
    }
}
