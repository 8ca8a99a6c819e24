//! JSON-Reference string parsing
//!
//! A `$ref` has the form `[file][#pointer]`: `#/definitions/Cat` is local,
//! `./common.json` imports a whole file, `./common.json#/definitions/Cat`
//! addresses a fragment of another file.

use swagger_resolver_common::{ResolverError, Result};

/// Parsed form of a `$ref` string. At least one component is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// File or URL portion, when the reference crosses documents
    pub file_path: Option<String>,

    /// RFC 6901 pointer within the target document
    pub local_pointer: Option<String>,
}

/// Where a reference points, relative to the host document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// Same document (`#/...`)
    Local,
    /// Another file reached by relative path
    Relative,
    /// An http(s) URL
    Remote,
}

impl Reference {
    /// Parse a raw `$ref` string. Fails with [`ResolverError::MalformedReference`]
    /// when neither component is present (e.g. `""` or `"#"`).
    pub fn parse(raw: &str) -> Result<Self> {
        let (file, pointer) = match raw.split_once('#') {
            Some((file, pointer)) => (file, pointer),
            None => (raw, ""),
        };
        let file_path = (!file.is_empty()).then(|| file.to_string());
        let local_pointer = (!pointer.is_empty()).then(|| pointer.to_string());
        if file_path.is_none() && local_pointer.is_none() {
            return Err(ResolverError::MalformedReference(raw.to_string()));
        }
        Ok(Self {
            file_path,
            local_pointer,
        })
    }

    pub fn kind(&self) -> RefKind {
        match &self.file_path {
            None => RefKind::Local,
            Some(path) if path.starts_with("http://") || path.starts_with("https://") => {
                RefKind::Remote
            }
            Some(_) => RefKind::Relative,
        }
    }

    /// The purely local `#/...` form, if this reference has a pointer.
    pub fn local_form(&self) -> Option<String> {
        self.local_pointer.as_ref().map(|p| format!("#{p}"))
    }
}
