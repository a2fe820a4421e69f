//! In-memory store for tests and dry runs

use super::{content_version, validate_path, Blob, BlobEntry, BlobStore, PutOutcome};
use crate::error::CoreError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Blob store over a sorted map of path → content
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<BTreeMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a blob unconditionally
    pub fn insert(&self, path: impl Into<String>, content: impl Into<String>) {
        if let Ok(mut blobs) = self.blobs.lock() {
            blobs.insert(path.into(), content.into());
        }
    }

    /// Current content of a blob
    pub fn content(&self, path: &str) -> Option<String> {
        self.blobs.lock().ok()?.get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list(&self, dir: &str) -> Result<Vec<BlobEntry>, CoreError> {
        let dir = dir.trim_matches('/');
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{}/", dir)
        };

        let blobs = self.blobs.lock().map_err(|_| CoreError::LockPoisoned)?;
        let mut seen_dir = prefix.is_empty();
        let mut entries = Vec::new();
        for path in blobs.keys() {
            let Some(rest) = path.strip_prefix(&prefix) else {
                continue;
            };
            seen_dir = true;
            if !rest.contains('/') {
                entries.push(BlobEntry::new(dir, rest));
            }
        }

        if !seen_dir {
            return Err(CoreError::DirectoryNotFound {
                path: PathBuf::from(dir),
            });
        }
        Ok(entries)
    }

    async fn get(&self, path: &str) -> Result<Blob, CoreError> {
        validate_path(path)?;
        let blobs = self.blobs.lock().map_err(|_| CoreError::LockPoisoned)?;
        let content = blobs.get(path).cloned().ok_or_else(|| CoreError::BlobNotFound {
            path: path.to_string(),
        })?;

        Ok(Blob {
            path: path.to_string(),
            version: content_version(&content),
            content,
        })
    }

    async fn put(
        &self,
        path: &str,
        content: &str,
        expected: Option<&str>,
        _message: &str,
    ) -> Result<PutOutcome, CoreError> {
        validate_path(path)?;
        let mut blobs = self.blobs.lock().map_err(|_| CoreError::LockPoisoned)?;

        let current = blobs.get(path).map(|c| content_version(c));
        if current.as_deref() != expected {
            return Ok(PutOutcome::Conflict);
        }

        blobs.insert(path.to_string(), content.to_string());
        Ok(PutOutcome::Written {
            version: content_version(content),
        })
    }
}
