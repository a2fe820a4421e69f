//! Renderers for the current document formats
//!
//! Each renderer emits text its parser reads back into the same records:
//! radar v3, drafts v2 and newsletter v2.

use crate::models::{Draft, DraftStatus, DraftType, Meta, NewsletterArticle, RadarDay};
use crate::parsers::Frontmatter;
use chrono::NaiveDate;
use std::fmt::Write;

pub const RADAR_FORMAT: &str = "radar-v3";
pub const DRAFTS_FORMAT: &str = "drafts-v2";
pub const NEWSLETTER_FORMAT: &str = "newsletter-v2";

/// Frontmatter written on top of a v3 radar document
pub fn radar_meta(date: NaiveDate, scan_sources: &[String], item_count: usize) -> Meta {
    Meta::new()
        .with("format", RADAR_FORMAT)
        .with("date", date.format("%Y-%m-%d").to_string())
        .with("scan_sources", scan_sources.to_vec())
        .with("item_count", item_count)
}

/// Render a radar day as a v3 document.
///
/// Every why-bullet is written on its own indented line.
pub fn radar_v3(day: &RadarDay, date: NaiveDate) -> String {
    let mut body = String::new();

    for section in &day.sections {
        let _ = write!(body, "\n## {}\n", section.heading);

        for item in &section.items {
            let _ = write!(body, "\n### {}\n", item.title);
            if item.link.is_empty() {
                let _ = writeln!(body, "- Source: {}", item.source);
            } else {
                let _ = writeln!(body, "- Source: {} — {}", item.source, item.link);
            }
            let _ = writeln!(body, "- Lane: {}", item.lane);

            let mut bullets = item.bullets().peekable();
            if bullets.peek().is_some() {
                body.push_str("- Why:\n");
                for bullet in bullets {
                    let _ = writeln!(body, "  - {}", bullet.trim());
                }
            }
        }
    }

    if !day.cluster_lines.is_empty() {
        body.push_str("\n## Topic Clusters\n\n");
        for line in &day.cluster_lines {
            body.push_str(line);
            body.push('\n');
        }
    }

    let meta = radar_meta(date, &day.scan_sources, day.item_count);
    Frontmatter::serialize(&meta, &body)
}

/// Render drafts as a v2 drafts document, grouped by status section
pub fn drafts_v2(drafts: &[Draft]) -> String {
    let meta = Meta::new()
        .with("format", DRAFTS_FORMAT)
        .with("draft_count", drafts.len());

    let mut body = String::from("# X Drafts\n");
    for status in DraftStatus::ALL {
        let _ = write!(body, "\n## {}\n", status.section_heading());
        for draft in drafts.iter().filter(|d| d.status == status) {
            body.push('\n');
            write_draft(&mut body, draft);
        }
    }

    Frontmatter::serialize(&meta, &body)
}

fn write_draft(out: &mut String, draft: &Draft) {
    let label = match (draft.kind, draft.reply_to.as_deref()) {
        (DraftType::Reply, Some(handle)) => format!("Reply to @{handle}"),
        (DraftType::Reply, None) => "Reply".to_string(),
        (DraftType::Original, _) => "Original".to_string(),
    };

    let _ = write!(out, "### {}", draft.date.format("%Y-%m-%d"));
    if let Some(time) = &draft.time {
        let _ = write!(out, " {time}");
    }
    let _ = writeln!(out, " | {label}");

    if let Some(priority) = draft.priority {
        let _ = writeln!(out, "- priority: {}", priority.as_str());
    }
    if let Some(context) = &draft.reply_context {
        let _ = writeln!(out, "- context: {context}");
    }
    if let Some(tweet_id) = &draft.tweet_id {
        let _ = writeln!(out, "- tweet-id: {tweet_id}");
    }

    for line in draft.content.lines() {
        if line.trim().is_empty() {
            out.push_str(">\n");
        } else {
            let _ = writeln!(out, "> {}", line.trim());
        }
    }

    if let Some(feedback) = &draft.feedback {
        let _ = writeln!(out, "_Feedback: {feedback}_");
    }
}

/// Render articles as a v2 newsletter digest
pub fn newsletter_v2(articles: &[NewsletterArticle], date: NaiveDate) -> String {
    let date = date.format("%Y-%m-%d").to_string();
    let meta = Meta::new()
        .with("format", NEWSLETTER_FORMAT)
        .with("date", date.clone())
        .with("article_count", articles.len());

    let mut body = format!("# Newsletter Digest {date}\n");
    for article in articles {
        let _ = write!(body, "\n### {}\n", article.title);
        let _ = writeln!(body, "- source: {}", article.source);
        let _ = writeln!(body, "- link: {}", article.link);
        if let Some(category) = &article.category {
            let _ = writeln!(body, "- category: {category}");
        }
        if !article.description.is_empty() {
            let _ = writeln!(body, "{}", article.description);
        }
    }

    Frontmatter::serialize(&meta, &body)
}
