//! Swagger/OpenAPI 2.0 specification resolution
//!
//! This crate rewrites a parsed Swagger 2.0 document into a fully
//! self-contained, validation-ready form: cross-file `$ref`s are inlined,
//! `allOf` chains are flattened, discriminator hierarchies expand into
//! `oneOf` unions, and the various shorthand permissions of real-world specs
//! (pure objects, implicitly nullable properties, parameterized hosts) are
//! made explicit so downstream validators can take the document literally.
//!
//! The output keeps the input's shape: same top-level keys, same operations,
//! same definitions by name.
//!
//! ## Usage
//! ```rust,ignore
//! use swagger_resolver::{resolve_spec, FileLoader, ResolverOptions};
//!
//! let loader = FileLoader::new();
//! let doc = loader.load("/specs/service.json")?;
//! let resolved = resolve_spec(doc, "/specs/service.json", &loader, &ResolverOptions::default())?;
//! ```
//!
//! Documents are plain `serde_json::Value` trees (key order preserved), so
//! YAML specs work as soon as they are decoded into JSON values; the
//! bundled [`FileLoader`] does that transparently.

mod loader;
mod options;
mod polymorphic;
mod reference;
mod resolver;
mod scanner;
pub mod tree;

pub use loader::{join_document_path, parse_document, DocumentLoader, FileLoader};
pub use options::ResolverOptions;
pub use polymorphic::PolymorphicTree;
pub use reference::{RefKind, Reference};
pub use resolver::SpecResolver;
pub use scanner::{collect_refs, RefSite};
pub use swagger_resolver_common::{ResolveSpecError, ResolverError, Result};

use serde_json::Value;

/// Resolve a parsed Swagger 2.0 document loaded from `doc_path`.
///
/// Convenience wrapper over [`SpecResolver`]; see [`ResolverOptions`] for the
/// pass gating.
pub fn resolve_spec(
    tree: Value,
    doc_path: &str,
    loader: &dyn DocumentLoader,
    options: &ResolverOptions,
) -> std::result::Result<Value, ResolveSpecError> {
    let resolver = SpecResolver::new(tree, doc_path, loader, options)
        .map_err(|inner| ResolveSpecError::new(doc_path, inner))?;
    resolver.resolve()
}
