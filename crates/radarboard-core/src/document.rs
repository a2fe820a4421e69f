//! Archive documents: frontmatter split, kind and dialect dispatch

use crate::models::{Draft, Meta, NewsletterArticle, RadarDay};
use crate::parsers::{
    DraftsParser, Frontmatter, NewsletterParser, ParseReport, RadarFormat, RadarParser,
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

static RADAR_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^content-radar-(\d{4}-\d{2}-\d{2})\.md$").expect("valid regex"));
static NEWSLETTER_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^newsletter-digest-(\d{4}-\d{2}-\d{2})\.md$").expect("valid regex"));

/// File name of the single drafts document
pub const DRAFTS_FILE_NAME: &str = "x-drafts.md";

/// Kind of archive document, from its file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Radar,
    Newsletter,
    Drafts,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Radar => "radar",
            Self::Newsletter => "newsletter",
            Self::Drafts => "drafts",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "radar" => Some(Self::Radar),
            "newsletter" | "digest" => Some(Self::Newsletter),
            "drafts" => Some(Self::Drafts),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind and date decoded from an archive file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveName {
    pub kind: DocumentKind,
    /// Present for radar and newsletter files
    pub date: Option<NaiveDate>,
}

impl ArchiveName {
    /// Decode `content-radar-YYYY-MM-DD.md`, `newsletter-digest-YYYY-MM-DD.md`
    /// or `x-drafts.md`. Accepts a full path; only the last segment is used.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let name = name.rsplit('/').next().unwrap_or(name);

        if name == DRAFTS_FILE_NAME {
            return Some(Self {
                kind: DocumentKind::Drafts,
                date: None,
            });
        }

        let (kind, caps) = if let Some(caps) = RADAR_NAME_RE.captures(name) {
            (DocumentKind::Radar, caps)
        } else if let Some(caps) = NEWSLETTER_NAME_RE.captures(name) {
            (DocumentKind::Newsletter, caps)
        } else {
            return None;
        };

        // A name with an impossible date is not an archive file
        let date = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok()?;
        Some(Self {
            kind,
            date: Some(date),
        })
    }
}

/// A markdown document split into frontmatter and body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document<'a> {
    pub meta: Meta,
    pub body: &'a str,
    pub has_frontmatter: bool,
}

impl<'a> Document<'a> {
    pub fn parse(text: &'a str) -> Self {
        match Frontmatter::parse(text) {
            Some(block) => Self {
                meta: block.meta,
                body: block.body,
                has_frontmatter: true,
            },
            None => Self {
                meta: Meta::new(),
                body: text,
                has_frontmatter: false,
            },
        }
    }

    /// The `format:` frontmatter value, if any
    pub fn format(&self) -> Option<&str> {
        self.meta.get_str("format")
    }

    /// Radar dialect of the body
    pub fn radar_format(&self) -> RadarFormat {
        RadarFormat::detect(self.body)
    }

    /// Whether frontmatter declares a v2-or-later format
    fn declares_current_format(&self) -> Option<bool> {
        self.format()
            .map(|f| f.ends_with("-v2") || f.ends_with("-v3"))
    }

    /// Drafts entries use `###` headings (declared, else structural)
    pub fn is_drafts_v2(&self) -> bool {
        self.declares_current_format()
            .unwrap_or_else(|| DraftsParser::detect_v2(self.body))
    }

    /// Digest articles use `###` blocks (declared, else structural)
    pub fn is_newsletter_v2(&self) -> bool {
        self.declares_current_format()
            .unwrap_or_else(|| NewsletterParser::detect_v2(self.body))
    }

    pub fn radar_day(&self, parser: &RadarParser) -> (RadarDay, ParseReport) {
        parser.parse_day_with_report(self.body)
    }

    pub fn drafts(&self) -> (Vec<Draft>, ParseReport) {
        DraftsParser::parse_with_report(self.body, self.is_drafts_v2())
    }

    pub fn articles(&self) -> (Vec<NewsletterArticle>, ParseReport) {
        NewsletterParser::parse_with_report(self.body, self.is_newsletter_v2())
    }
}
