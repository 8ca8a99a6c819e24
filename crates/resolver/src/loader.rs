//! Document loading
//!
//! [`DocumentLoader`] is the contract the resolver consumes: given an absolute
//! path or URL, produce a parsed document tree. [`FileLoader`] is the default
//! implementation covering local files and http(s) URLs, accepting JSON with a
//! YAML fallback so `.yaml` specs load transparently.

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde_json::Value;
use swagger_resolver_common::{ResolverError, Result};
use url::Url;

/// Loads a document at an absolute path or URL into a parsed tree.
///
/// Implementations may cache; the resolver copies whatever it splices out of
/// loaded documents and never writes back into them.
pub trait DocumentLoader {
    fn load(&self, path: &str) -> Result<Value>;
}

/// Default loader: filesystem paths and http(s) URLs, JSON or YAML bodies.
#[derive(Debug, Default)]
pub struct FileLoader;

impl FileLoader {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentLoader for FileLoader {
    fn load(&self, path: &str) -> Result<Value> {
        tracing::debug!(path, "loading document");
        let body = if is_url(path) {
            reqwest::blocking::get(path)
                .and_then(|response| response.error_for_status())
                .and_then(|response| response.text())
                .map_err(|e| loader_error(path, e))?
        } else {
            fs::read_to_string(path).map_err(|e| loader_error(path, e))?
        };
        parse_document(path, &body)
    }
}

/// Parse a document body as JSON, falling back to YAML.
pub fn parse_document(path: &str, body: &str) -> Result<Value> {
    match serde_json::from_str(body) {
        Ok(tree) => Ok(tree),
        Err(json_err) => serde_yaml::from_str(body).map_err(|yaml_err| ResolverError::Loader {
            path: path.to_string(),
            reason: format!("not valid JSON ({json_err}) or YAML ({yaml_err})"),
        }),
    }
}

/// Join a reference's file component onto the directory of the host document.
///
/// Absolute URLs pass through; URL bases join per RFC 3986; filesystem paths
/// join lexically with `.`/`..` normalization.
pub fn join_document_path(base_dir: &str, relative: &str) -> Result<String> {
    if is_url(relative) {
        return Ok(relative.to_string());
    }
    if is_url(base_dir) {
        let base = Url::parse(&format!("{}/", base_dir.trim_end_matches('/')))
            .map_err(|e| loader_error(base_dir, e))?;
        let joined = base.join(relative).map_err(|e| loader_error(relative, e))?;
        return Ok(joined.to_string());
    }
    Ok(normalize_path(&Path::new(base_dir).join(relative))
        .to_string_lossy()
        .into_owned())
}

/// Directory portion of a document path or URL.
pub(crate) fn parent_dir(doc_path: &str) -> String {
    if is_url(doc_path) {
        if let Some(scheme_end) = doc_path.find("://") {
            let after = scheme_end + 3;
            if let Some(slash) = doc_path[after..].rfind('/') {
                return doc_path[..after + slash].to_string();
            }
        }
        return doc_path.to_string();
    }
    Path::new(doc_path)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| ".".to_string())
}

fn is_url(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

fn loader_error(path: &str, reason: impl std::fmt::Display) -> ResolverError {
    ResolverError::Loader {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}
