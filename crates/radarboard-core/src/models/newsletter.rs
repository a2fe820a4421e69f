//! Data models for newsletter digests

use serde::{Deserialize, Serialize};

/// One article entry in a newsletter digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterArticle {
    pub title: String,
    pub description: String,
    pub source: String,
    pub link: String,
    pub category: Option<String>,
}
