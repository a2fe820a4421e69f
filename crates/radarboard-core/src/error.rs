//! Error types for radarboard-core
//!
//! Parsers never fail (malformed lines are tolerated and reported through
//! [`crate::parsers::ParseReport`]). These errors cover the I/O edges: blob
//! stores, the record store and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for radarboard operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // IO Errors
    // ===================
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Invalid path: {path} - {reason}")]
    InvalidPath { path: String, reason: String },

    // ===================
    // Blob Store Errors
    // ===================
    #[error("Blob not found: {path}")]
    BlobNotFound { path: String },

    #[error("Blob {path} is not valid UTF-8 markdown")]
    BlobEncoding { path: String },

    #[error("Request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GitHub API returned {status} for {url}: {message}")]
    Http {
        url: String,
        status: u16,
        message: String,
    },

    // ===================
    // Parse Errors
    // ===================
    #[error("Failed to parse JSON from {context}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration in {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    // ===================
    // Store Errors
    // ===================
    #[error("Store lock poisoned")]
    LockPoisoned,

    // ===================
    // Config Errors
    // ===================
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Missing credential: set {name}")]
    MissingCredential { name: String },
}

/// Severity level for per-document failures in a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Document skipped, nothing lost
    Warning,
    /// Document failed (fetch or conditional write)
    Error,
}

/// Individual error entry in a batch report
#[derive(Debug, Clone)]
pub struct LoadError {
    pub source: String,
    pub message: String,
    pub severity: ErrorSeverity,
    /// Actionable suggestion for user (optional)
    pub suggestion: Option<String>,
}

impl LoadError {
    pub fn warning(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
            severity: ErrorSeverity::Warning,
            suggestion: None,
        }
    }

    pub fn error(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
            severity: ErrorSeverity::Error,
            suggestion: None,
        }
    }

    /// Add an actionable suggestion to this error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Create user-friendly error from CoreError with context-aware suggestions
    pub fn from_core_error(source: impl Into<String>, error: &CoreError) -> Self {
        let source = source.into();
        let (message, suggestion) = match error {
            CoreError::BlobNotFound { path } => (
                format!("Blob not found: {}", path),
                Some("Check the archive layout in radarboard.toml".to_string()),
            ),
            CoreError::FileRead { path, .. } => (
                format!("Cannot read file: {}", path.display()),
                Some(format!("Check permissions: chmod +r {}", path.display())),
            ),
            CoreError::Http { status, url, .. } if *status == 401 || *status == 403 => (
                format!("GitHub rejected credentials ({}) for {}", status, url),
                Some("Check that GITHUB_TOKEN has contents:write scope".to_string()),
            ),
            CoreError::MissingCredential { name } => (
                format!("Missing credential {}", name),
                Some(format!("export {}=...", name)),
            ),
            _ => (error.to_string(), None),
        };

        Self {
            source,
            message,
            severity: ErrorSeverity::Error,
            suggestion,
        }
    }
}
