//! radarboard-core - Core library for radarboard
//!
//! Parsers, renderers and the format migrator for the markdown content
//! archive (radar scans, newsletter digests, social drafts), plus the blob
//! and record stores the archive is read from and loaded into.

pub mod blob;
pub mod config;
pub mod document;
pub mod error;
pub mod import;
pub mod migrate;
pub mod models;
pub mod parsers;
pub mod records;
pub mod render;

pub use blob::{BlobStore, FsBlobStore, GithubBlobStore, MemoryBlobStore, PutOutcome};
pub use config::{ArchiveLayout, BoardConfig};
pub use document::{ArchiveName, Document, DocumentKind};
pub use error::{CoreError, ErrorSeverity, LoadError};
pub use import::{import_archive, ImportReport};
pub use migrate::{Migration, MigrationReport, Migrator};
pub use records::{RecordStore, TableCounts};
