//! Parser for newsletter digests (`newsletter-digest-YYYY-MM-DD.md`)
//!
//! Legacy digests hold one bullet per article:
//!
//! ```text
//! - **"AI raises $1B"** — Startup closes mega-round. [Source: TechCrunch](https://example.com/x)
//! ```
//!
//! v2 digests give each article a `###` heading, metadata lines and a
//! free-text description.

use crate::models::NewsletterArticle;
use crate::parsers::diagnostics::{DropReason, ParseReport};
use once_cell::sync::Lazy;
use regex::Regex;

static HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^### (.+)$").expect("valid regex"));
static META_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^- (source|link|category):\s*(.+)$").expect("valid regex"));
static LEGACY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-\s+\*\*(.+?)\*\*\s*—\s*(.+?)\s*\[Source:\s*(.+?)\]\((.+?)\)\s*$")
        .expect("valid regex")
});
static V2_DETECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?mi)^- source:\s*\S").expect("valid regex"));

/// Article under construction
#[derive(Default)]
struct PendingArticle {
    title: String,
    description: Vec<String>,
    source: String,
    link: String,
    category: Option<String>,
}

impl PendingArticle {
    fn finish(self) -> Result<NewsletterArticle, DropReason> {
        if self.title.is_empty() {
            return Err(DropReason::MissingTitle);
        }
        if self.source.is_empty() {
            return Err(DropReason::MissingSource);
        }
        if self.link.is_empty() {
            return Err(DropReason::MissingLink);
        }

        Ok(NewsletterArticle {
            title: self.title,
            description: self.description.join(" "),
            source: self.source,
            link: self.link,
            category: self.category,
        })
    }
}

/// Parser for newsletter digest bodies
pub struct NewsletterParser;

impl NewsletterParser {
    /// Parse articles from a body (frontmatter already stripped)
    pub fn parse(body: &str, is_v2: bool) -> Vec<NewsletterArticle> {
        Self::parse_with_report(body, is_v2).0
    }

    /// Parse articles, also returning dropped candidates
    pub fn parse_with_report(body: &str, is_v2: bool) -> (Vec<NewsletterArticle>, ParseReport) {
        let mut report = ParseReport::new();
        let articles = if is_v2 {
            Self::parse_v2(body, &mut report)
        } else {
            Self::parse_legacy(body, &mut report)
        };

        tracing::debug!(
            articles = articles.len(),
            dropped = report.dropped.len(),
            is_v2,
            "Parsed newsletter body"
        );
        (articles, report)
    }

    /// Whether a body uses `### Title` + `- source:` blocks
    pub fn detect_v2(body: &str) -> bool {
        body.lines().any(|line| HEADING_RE.is_match(line)) && V2_DETECT_RE.is_match(body)
    }

    fn parse_v2(body: &str, report: &mut ParseReport) -> Vec<NewsletterArticle> {
        let mut articles = Vec::new();
        let mut current: Option<(usize, PendingArticle)> = None;

        for (index, line) in body.lines().enumerate() {
            if let Some(caps) = HEADING_RE.captures(line) {
                if let Some((start, article)) = current.take() {
                    articles.extend(report.keep(start, article.finish()));
                }
                let article = PendingArticle {
                    title: caps[1].trim().to_string(),
                    ..Default::default()
                };
                current = Some((index + 1, article));
                continue;
            }

            let Some((_, article)) = current.as_mut() else {
                continue;
            };

            let trimmed = line.trim();
            // Blank lines, separators and group headings are not description
            if trimmed.is_empty() || trimmed == "---" || trimmed.starts_with("## ") {
                continue;
            }

            if let Some(meta) = META_RE.captures(line) {
                let value = meta[2].trim().to_string();
                match meta[1].to_lowercase().as_str() {
                    "source" => article.source = value,
                    "link" => article.link = value,
                    _ => article.category = Some(value),
                }
                continue;
            }

            article.description.push(trimmed.to_string());
        }

        if let Some((start, article)) = current {
            articles.extend(report.keep(start, article.finish()));
        }

        articles
    }

    fn parse_legacy(body: &str, report: &mut ParseReport) -> Vec<NewsletterArticle> {
        let mut articles = Vec::new();
        let mut category: Option<String> = None;

        for (index, line) in body.lines().enumerate() {
            if let Some(heading) = line.strip_prefix("## ") {
                category = Some(heading.trim().to_string());
                continue;
            }

            let Some(caps) = LEGACY_RE.captures(line) else {
                continue;
            };

            let title = caps[1]
                .trim()
                .trim_matches(|c: char| matches!(c, '"' | '“' | '”' | '\''))
                .trim()
                .to_string();
            let description = caps[2].trim();
            let description = description.strip_suffix('.').unwrap_or(description);

            let article = PendingArticle {
                title,
                description: vec![description.to_string()],
                source: caps[3].trim().to_string(),
                link: caps[4].trim().to_string(),
                category: category.clone(),
            };
            articles.extend(report.keep(index + 1, article.finish()));
        }

        articles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_line() {
        let body = r#"- **"AI raises $1B"** — Startup closes mega-round. [Source: TechCrunch](https://example.com/x)"#;
        let articles = NewsletterParser::parse(body, false);

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "AI raises $1B");
        assert_eq!(articles[0].description, "Startup closes mega-round");
        assert_eq!(articles[0].source, "TechCrunch");
        assert_eq!(articles[0].link, "https://example.com/x");
        assert_eq!(articles[0].category, None);
    }

    #[test]
    fn test_legacy_strips_only_one_period_and_tracks_category() {
        let body = "## Funding\n- **Deal** — Wait for it... [Source: Wire](https://w.example)\nnot an article\n";
        let articles = NewsletterParser::parse(body, false);

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].description, "Wait for it..");
        assert_eq!(articles[0].category.as_deref(), Some("Funding"));
    }

    #[test]
    fn test_legacy_quote_only_title_dropped() {
        let body = r#"- **""** — Nothing. [Source: Wire](https://w.example)"#;
        let (articles, report) = NewsletterParser::parse_with_report(body, false);
        assert!(articles.is_empty());
        assert_eq!(report.count(DropReason::MissingTitle), 1);
    }

    #[test]
    fn test_v2_blocks() {
        let body = "### Big raise\n- source: TechCrunch\n- link: https://example.com/x\n- category: Funding\nStartup closes\nmega-round.\n\n### No link here\n- Source: Wire\nDescription\n### Another\n- LINK: https://example.com/y\n- source: Verge\n";
        let (articles, report) = NewsletterParser::parse_with_report(body, true);

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Big raise");
        assert_eq!(articles[0].description, "Startup closes mega-round.");
        assert_eq!(articles[0].category.as_deref(), Some("Funding"));
        assert_eq!(articles[1].title, "Another");
        assert_eq!(articles[1].link, "https://example.com/y");

        assert_eq!(report.dropped.len(), 1);
        assert_eq!(report.dropped[0].line, 8);
        assert_eq!(report.dropped[0].reason, DropReason::MissingLink);
    }

    #[test]
    fn test_detect_v2() {
        assert!(NewsletterParser::detect_v2("### A\n- source: B\n"));
        assert!(!NewsletterParser::detect_v2(
            "- **A** — b [Source: C](https://c.example)\n"
        ));
    }
}
