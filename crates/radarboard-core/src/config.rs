//! radarboard configuration
//!
//! Read from a TOML file: `--config`, `RADARBOARD_CONFIG`, or
//! `<config_dir>/radarboard/config.toml`. Every field has a default, so a
//! missing default file is not an error. Credentials never live here.

use crate::blob::GithubSettings;
use crate::error::CoreError;
use crate::parsers::{LaneRule, LaneTable};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "RADARBOARD_CONFIG";

/// Where each document kind lives inside the archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveLayout {
    pub radar_dir: String,
    pub newsletter_dir: String,
    pub drafts_path: String,
}

impl Default for ArchiveLayout {
    fn default() -> Self {
        Self {
            radar_dir: "radar".to_string(),
            newsletter_dir: "newsletter".to_string(),
            drafts_path: crate::document::DRAFTS_FILE_NAME.to_string(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Local checkout of the markdown archive
    pub archive_dir: PathBuf,

    /// SQLite record store
    pub database: PathBuf,

    pub github: GithubSettings,

    pub layout: ArchiveLayout,

    /// Replaces the built-in lane rules when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lanes: Option<Vec<LaneRule>>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            archive_dir: PathBuf::from("."),
            database: default_database_path(),
            github: GithubSettings::default(),
            layout: ArchiveLayout::default(),
            lanes: None,
        }
    }
}

impl BoardConfig {
    /// `<config_dir>/radarboard/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("radarboard").join("config.toml"))
    }

    /// Load from an explicit path, or from the default location.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CoreError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    tracing::debug!("No config file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|source| CoreError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|source| CoreError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Lane rules in effect
    pub fn lane_table(&self) -> LaneTable {
        match &self.lanes {
            Some(rules) => LaneTable::new(rules.clone()),
            None => LaneTable::default(),
        }
    }
}

fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("radarboard").join("radarboard.db"))
        .unwrap_or_else(|| PathBuf::from("radarboard.db"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = BoardConfig::from_toml("").unwrap();
        assert_eq!(config, BoardConfig::default());
        assert_eq!(config.layout.drafts_path, "x-drafts.md");
        assert_eq!(config.github.branch, "main");
        assert_eq!(config.lane_table(), LaneTable::default());
    }

    #[test]
    fn test_partial_config() {
        let config = BoardConfig::from_toml(
            r#"
            archive_dir = "/srv/archive"

            [github]
            repo = "acme/archive"

            [layout]
            radar_dir = "scans"

            [[lanes]]
            keyword = "Lobsters"
            lane = "Community"
            "#,
        )
        .unwrap();

        assert_eq!(config.archive_dir, PathBuf::from("/srv/archive"));
        assert_eq!(config.github.repo, "acme/archive");
        assert_eq!(config.github.api_base, "https://api.github.com");
        assert_eq!(config.layout.radar_dir, "scans");
        assert_eq!(config.layout.newsletter_dir, "newsletter");

        let lanes = config.lane_table();
        assert_eq!(lanes.lookup("## Lobsters front page"), "Community");
        // Custom rules replace the defaults entirely
        assert_eq!(lanes.lookup("Hacker News"), "Hacker News");
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "archive_dir = [").unwrap();

        let err = BoardConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, CoreError::ConfigParse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let dir = tempdir().unwrap();
        let err = BoardConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, CoreError::FileRead { .. }));
    }
}
