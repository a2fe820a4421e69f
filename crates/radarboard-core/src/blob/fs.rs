//! Local checkout of the archive

use super::{content_version, validate_path, Blob, BlobEntry, BlobStore, PutOutcome};
use crate::error::CoreError;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Blob store over a directory tree.
///
/// Versions are SHA-256 digests of the content. Writes go to a sibling temp
/// file and are renamed into place.
#[derive(Debug)]
pub struct FsBlobStore {
    root: PathBuf,
    // Serializes compare-and-write within this process
    write_lock: Mutex<()>,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, CoreError> {
        validate_path(path)?;
        Ok(self.root.join(path))
    }

    async fn read(&self, path: &str, full: &Path) -> Result<Option<String>, CoreError> {
        match tokio::fs::read_to_string(full).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == ErrorKind::InvalidData => Err(CoreError::BlobEncoding {
                path: path.to_string(),
            }),
            Err(e) => Err(CoreError::FileRead {
                path: full.to_path_buf(),
                source: e,
            }),
        }
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    fn name(&self) -> &'static str {
        "fs"
    }

    async fn list(&self, dir: &str) -> Result<Vec<BlobEntry>, CoreError> {
        let full = if dir.trim_matches('/').is_empty() {
            self.root.clone()
        } else {
            self.resolve(dir)?
        };

        let mut reader = tokio::fs::read_dir(&full).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                CoreError::DirectoryNotFound { path: full.clone() }
            } else {
                CoreError::FileRead {
                    path: full.clone(),
                    source: e,
                }
            }
        })?;

        let mut entries = Vec::new();
        loop {
            let entry = match reader.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    return Err(CoreError::FileRead {
                        path: full.clone(),
                        source: e,
                    })
                }
            };

            let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            // Skip our own temp files and anything with a non-UTF-8 name
            let Some(name) = entry.file_name().to_str().map(String::from) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            entries.push(BlobEntry::new(dir, &name));
        }

        entries.sort();
        Ok(entries)
    }

    async fn get(&self, path: &str) -> Result<Blob, CoreError> {
        let full = self.resolve(path)?;
        let content = self
            .read(path, &full)
            .await?
            .ok_or_else(|| CoreError::BlobNotFound {
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
        let full = self.resolve(path)?;
        let _guard = self.write_lock.lock().await;

        let current = self.read(path, &full).await?.map(|c| content_version(&c));
        if current.as_deref() != expected {
            tracing::debug!(path, ?expected, ?current, "Version mismatch on write");
            return Ok(PutOutcome::Conflict);
        }

        let write_err = |source: std::io::Error| CoreError::FileWrite {
            path: full.clone(),
            source,
        };

        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let file_name = full
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("blob");
        let tmp = full.with_file_name(format!(".{}.tmp", file_name));

        tokio::fs::write(&tmp, content).await.map_err(write_err)?;
        if let Err(e) = tokio::fs::rename(&tmp, &full).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(write_err(e));
        }

        Ok(PutOutcome::Written {
            version: content_version(content),
        })
    }
}
