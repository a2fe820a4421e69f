//! Rewrites legacy archive documents into the current formats
//!
//! - radar v1/v2 (or v3 without frontmatter) → radar v3 with frontmatter
//! - drafts v1 → drafts v2
//! - legacy newsletter digests → newsletter v2
//!
//! Migration is a pure text transform; [`batch`] drives it over a blob store.

pub mod batch;

use crate::document::Document;
use crate::parsers::{DraftsParser, DropReason, NewsletterParser, RadarFormat, RadarParser};
use crate::render::{self, RADAR_FORMAT};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

pub use batch::{
    migrate_drafts_file, migrate_newsletter_archive, migrate_radar_archive, MigrationReport,
};

static LEGACY_TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^# Content Radar.*(?:\n|$)").expect("valid regex"));
static RESERVED_HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^## (?:Topic Clusters|Scan Quality)").expect("valid regex"));

/// Result of migrating one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Migration {
    /// Already in the current format
    Current,
    /// Rewritten content and the number of records it carries
    Rewritten { content: String, records: usize },
    /// Legacy document that yielded no records; left alone
    NothingParsed,
    /// Rewriting would drop entries the writer cannot express; left alone
    WouldLose { dropped: usize },
}

impl Migration {
    /// Content to write back, or the original text
    pub fn into_text(self, original: &str) -> String {
        match self {
            Self::Rewritten { content, .. } => content,
            Self::Current | Self::NothingParsed | Self::WouldLose { .. } => original.to_string(),
        }
    }
}

/// Document migrator
#[derive(Debug, Clone, Default)]
pub struct Migrator {
    radar: RadarParser,
}

impl Migrator {
    pub fn new(radar: RadarParser) -> Self {
        Self { radar }
    }

    /// Rewrite a radar document as v3, returning the new text.
    ///
    /// Documents already carrying `format: radar-v3` come back unchanged.
    pub fn migrate_to_v3(&self, text: &str, date: NaiveDate) -> String {
        self.plan_radar(text, date).into_text(text)
    }

    /// Decide how a radar document migrates
    pub fn plan_radar(&self, text: &str, date: NaiveDate) -> Migration {
        let doc = Document::parse(text);
        if doc.format() == Some(RADAR_FORMAT) {
            return Migration::Current;
        }

        let body = LEGACY_TITLE_RE.replace_all(doc.body, "");
        let format = RadarFormat::detect(&body);

        // v3 body without a header only needs the frontmatter
        if format == RadarFormat::V3 && !doc.has_frontmatter {
            return Self::prepend_v3_frontmatter(&body, date);
        }

        let day = self.radar.parse_day(&body);
        if day.item_count == 0 && format.is_legacy() {
            tracing::warn!(%date, %format, "Legacy radar document produced no items, leaving as is");
            return Migration::NothingParsed;
        }

        tracing::debug!(%date, %format, items = day.item_count, "Rewriting radar document as v3");
        Migration::Rewritten {
            records: day.item_count,
            content: render::radar_v3(&day, date),
        }
    }

    /// Count `###` items and collect `##` headings without re-parsing items
    fn prepend_v3_frontmatter(body: &str, date: NaiveDate) -> Migration {
        let mut item_count = 0;
        let mut scan_sources: Vec<String> = Vec::new();

        for line in body.lines() {
            if line.starts_with("### ") {
                item_count += 1;
            } else if let Some(heading) = line.strip_prefix("## ") {
                let heading = heading.trim();
                if !RESERVED_HEADING_RE.is_match(line)
                    && !heading.is_empty()
                    && !scan_sources.iter().any(|s| s == heading)
                {
                    scan_sources.push(heading.to_string());
                }
            }
        }

        let meta = render::radar_meta(date, &scan_sources, item_count);
        let content = format!("\n{}", body.trim_start_matches('\n'));
        Migration::Rewritten {
            records: item_count,
            content: crate::parsers::Frontmatter::serialize(&meta, &content),
        }
    }

    /// Rewrite a legacy drafts document as v2
    pub fn plan_drafts(&self, text: &str) -> Migration {
        let doc = Document::parse(text);
        if doc.is_drafts_v2() {
            return Migration::Current;
        }

        let (drafts, report) = DraftsParser::parse_with_report(doc.body, false);
        // Entries with impossible dates have no v2 heading to live under
        let undated = report.count(DropReason::InvalidDate);
        if undated > 0 {
            tracing::warn!(undated, "Drafts with invalid dates would be lost, leaving as is");
            return Migration::WouldLose { dropped: undated };
        }
        if drafts.is_empty() {
            tracing::warn!("Legacy drafts document produced no drafts, leaving as is");
            return Migration::NothingParsed;
        }

        Migration::Rewritten {
            records: drafts.len(),
            content: render::drafts_v2(&drafts),
        }
    }

    /// Rewrite a legacy newsletter digest as v2
    pub fn plan_newsletter(&self, text: &str, date: NaiveDate) -> Migration {
        let doc = Document::parse(text);
        if doc.is_newsletter_v2() {
            return Migration::Current;
        }

        let articles = NewsletterParser::parse(doc.body, false);
        if articles.is_empty() {
            tracing::warn!(%date, "Legacy digest produced no articles, leaving as is");
            return Migration::NothingParsed;
        }

        Migration::Rewritten {
            records: articles.len(),
            content: render::newsletter_v2(&articles, date),
        }
    }
}
