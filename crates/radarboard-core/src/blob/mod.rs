//! Blob stores holding the markdown archive
//!
//! Archive documents live as text blobs addressed by `/`-separated relative
//! paths. Every read returns a version stamp and writes are conditional on
//! it, so a migration never clobbers a file that changed underneath it.

mod fs;
mod github;
mod memory;

pub use fs::FsBlobStore;
pub use github::{GithubBlobStore, GithubSettings, TOKEN_ENV};
pub use memory::MemoryBlobStore;

use crate::error::CoreError;
use async_trait::async_trait;

/// A fetched document and its version stamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub path: String,
    pub content: String,
    pub version: String,
}

/// A file found by [`BlobStore::list`]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct BlobEntry {
    /// Path relative to the store root
    pub path: String,
    /// Last path segment
    pub name: String,
}

impl BlobEntry {
    pub fn new(dir: &str, name: &str) -> Self {
        Self {
            path: join_path(dir, name),
            name: name.to_string(),
        }
    }
}

/// Result of a conditional write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    Written { version: String },
    /// The stored version no longer matches the expected one
    Conflict,
}

/// Text blob storage with optimistic concurrency.
///
/// `put` with `expected: None` creates a blob and conflicts if one already
/// exists; with `Some(version)` it replaces the blob only while that version
/// is current.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Short label for logs
    fn name(&self) -> &'static str;

    /// Files directly under `dir`, sorted by name
    async fn list(&self, dir: &str) -> Result<Vec<BlobEntry>, CoreError>;

    async fn get(&self, path: &str) -> Result<Blob, CoreError>;

    async fn put(
        &self,
        path: &str,
        content: &str,
        expected: Option<&str>,
        message: &str,
    ) -> Result<PutOutcome, CoreError>;
}

/// Join a directory and a file name with a single `/`
pub fn join_path(dir: &str, name: &str) -> String {
    let dir = dir.trim_matches('/');
    let name = name.trim_start_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Reject paths that could escape the store root
pub fn validate_path(path: &str) -> Result<(), CoreError> {
    let invalid = |reason: &str| {
        Err(CoreError::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        })
    };

    if path.is_empty() {
        return invalid("empty path");
    }
    if path.starts_with('/') || path.starts_with('\\') {
        return invalid("absolute paths are not allowed");
    }
    if path.contains('\0') {
        return invalid("null byte in path");
    }
    if path.split(['/', '\\']).any(|segment| segment == "..") {
        return invalid("parent directory segments are not allowed");
    }
    Ok(())
}

/// Content version used by stores without native revisions
pub(crate) fn content_version(content: &str) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("radar", "a.md"), "radar/a.md");
        assert_eq!(join_path("radar/", "/a.md"), "radar/a.md");
        assert_eq!(join_path("", "x-drafts.md"), "x-drafts.md");
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("radar/content-radar-2026-02-14.md").is_ok());
        assert!(validate_path("notes/..hidden.md").is_ok());

        for bad in ["", "/etc/passwd", "../secret.md", "radar/../../x", "a\\..\\b", "a\0b"] {
            assert!(
                matches!(validate_path(bad), Err(CoreError::InvalidPath { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_content_version_is_stable() {
        let a = content_version("hello");
        assert_eq!(a, content_version("hello"));
        assert_ne!(a, content_version("hello!"));
        assert_eq!(a.len(), 64);
    }
}
