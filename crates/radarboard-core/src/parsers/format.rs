//! Radar dialect detection
//!
//! Radar scans were written in three markdown dialects over time:
//!
//! - **v1**: `**Title** — why it matters [Source](url)`
//! - **v2**: `**[Title](url)** — why it matters`
//! - **v3**: `### Title` followed by `- Source:` / `- Lane:` / `- Why:` lines

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static V3_HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^### .+$").expect("valid regex"));
static V3_SOURCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^- Source:").expect("valid regex"));
static V2_BOLD_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\*\*\[.+?\]\(.+?\)\*\*").expect("valid regex"));
static V1_BOLD_DASH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\*\*.+?\*\*\s*[—–-]").expect("valid regex"));

/// Radar markdown dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RadarFormat {
    V1,
    V2,
    V3,
}

impl RadarFormat {
    /// Classify a document body (frontmatter already stripped).
    ///
    /// v3 is checked first: the heading + `- Source:` pair is the most specific
    /// signature, and v3 documents may still contain bold text elsewhere.
    /// Bodies matching nothing (including empty ones) are treated as v3.
    pub fn detect(body: &str) -> Self {
        if V3_HEADING_RE.is_match(body) && V3_SOURCE_RE.is_match(body) {
            Self::V3
        } else if V2_BOLD_LINK_RE.is_match(body) {
            Self::V2
        } else if V1_BOLD_DASH_RE.is_match(body) {
            Self::V1
        } else {
            Self::V3
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
            Self::V3 => "v3",
        }
    }

    pub fn is_legacy(&self) -> bool {
        !matches!(self, Self::V3)
    }
}

impl fmt::Display for RadarFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_v3() {
        let body = "## Hacker News\n\n### New CLI tool\n- Source: Hacker News — https://x.example/b\n";
        assert_eq!(RadarFormat::detect(body), RadarFormat::V3);
    }

    #[test]
    fn test_detect_v3_regardless_of_order_and_bold() {
        let body = "- Source: somewhere\n**Bold** — text\n## A\n### Heading later\n";
        assert_eq!(RadarFormat::detect(body), RadarFormat::V3);
    }

    #[test]
    fn test_detect_v2() {
        let body = "## Hacker News\n**[Big Launch](https://x.example/a)** — ships a tool\n";
        assert_eq!(RadarFormat::detect(body), RadarFormat::V2);
    }

    #[test]
    fn test_detect_v1() {
        let body = "## Hacker News\n**Big Launch (120 pts)** — Company ships new tool\n";
        assert_eq!(RadarFormat::detect(body), RadarFormat::V1);
    }

    #[test]
    fn test_heading_without_source_is_not_v3_signature() {
        let body = "### Just a heading\n**Old item** - with a hyphen\n";
        assert_eq!(RadarFormat::detect(body), RadarFormat::V1);
    }

    #[test]
    fn test_empty_defaults_to_v3() {
        assert_eq!(RadarFormat::detect(""), RadarFormat::V3);
        assert_eq!(RadarFormat::detect("just prose\n"), RadarFormat::V3);
    }

    #[test]
    fn test_detect_is_deterministic() {
        let body = "**[A](u)** — b\n";
        assert_eq!(RadarFormat::detect(body), RadarFormat::detect(body));
    }
}
