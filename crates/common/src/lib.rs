//! Common types for the swagger resolver
//!
//! This crate contains the shared error taxonomy and the canonical error-model
//! schema constants used across the resolver components.
//!
//! ## Error model
//!
//! Resolution failures flow through two layers:
//! 1. **`ResolverError`**: the concrete failure (bad argument, malformed
//!    reference, loader failure, missing pointer).
//! 2. **`ResolveSpecError`**: the umbrella surfaced to callers, carrying the
//!    path of the document that was being resolved plus the inner cause.

mod cloud_error;

pub use cloud_error::{cloud_error, cloud_error_wrapper, default_error_response};

use thiserror::Error;

/// Errors that can occur while resolving a specification
#[derive(Error, Debug)]
pub enum ResolverError {
    /// A caller-supplied value failed up-front validation (non-object tree,
    /// empty document path, empty model name).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A `$ref` string with neither a file component nor a local pointer.
    #[error("malformed reference {0:?}: neither a file path nor a local pointer")]
    MalformedReference(String),

    /// A reference target that does not exist in the document it should
    /// occur in.
    #[error("pointer {pointer} not found in {path}")]
    PointerNotFound { pointer: String, path: String },

    /// A document could not be fetched or parsed by the loader.
    #[error("failed to load document {path}: {reason}")]
    Loader { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for resolver operations
pub type Result<T> = std::result::Result<T, ResolverError>;

/// Umbrella error for a failed resolution run
///
/// Carries the path of the spec that was being resolved; the concrete cause
/// is available through [`std::error::Error::source`].
#[derive(Error, Debug)]
#[error("failed to resolve spec {spec_path}: {inner}")]
pub struct ResolveSpecError {
    /// Path or URL of the document that failed to resolve
    pub spec_path: String,

    /// The failure that aborted the pipeline
    #[source]
    pub inner: ResolverError,
}

impl ResolveSpecError {
    pub fn new(spec_path: impl Into<String>, inner: ResolverError) -> Self {
        Self {
            spec_path: spec_path.into(),
            inner,
        }
    }
}
