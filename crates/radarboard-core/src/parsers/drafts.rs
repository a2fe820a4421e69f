//! Parser for the social drafts file (`x-drafts.md`)
//!
//! The file is organised into status sections (`## Pending Approval`,
//! `## Approved`, `## Posted`, `## Rejected`). Two entry formats exist:
//!
//! Legacy (v1), one bold heading line followed by quoted content:
//!
//! ```text
//! **2026-02-10 | Reply candidate to @someone (their thread on evals)** ✅
//! > Content of the reply
//! _Posted, tweet ID 1234567890_
//! ```
//!
//! v2, a `###` heading followed by a block of metadata and quoted paragraphs:
//!
//! ```text
//! ### 2026-02-14 09:00 | Reply to @someone
//! - priority: high
//! - context: their thread on evals
//! > First paragraph
//! >
//! > Second paragraph
//! _Feedback: tighten the opener_
//! ```

use crate::models::{Draft, DraftStatus, DraftType, Priority};
use crate::parsers::diagnostics::{DropReason, ParseReport};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static SECTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^##\s+(pending approval|pending|approved|posted|rejected)\b")
        .expect("valid regex")
});

static V2_HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^### (\d{4}-\d{2}-\d{2})(?:\s+(\d{2}:\d{2}))?\s*\|\s*(.+)$").expect("valid regex")
});
static V2_REPLY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Reply to @(\S+)").expect("valid regex"));
static META_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^- ([\w-]+):\s*(.+)$").expect("valid regex"));
static FEEDBACK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^_Feedback:(.*)_$").expect("valid regex"));
static V2_DETECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^### \d{4}-\d{2}-\d{2}").expect("valid regex"));

static V1_HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\*\*(\d{4}-\d{2}-\d{2})(?:\s+([\d:]+))?\s*\|\s*(.+?)\*\*\s*(.*)$")
        .expect("valid regex")
});
static V1_REPLY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Reply\s+(?:to|candidate to)\s+@(\S+)(?:\s*\(([^)]+)\))?").expect("valid regex")
});
static TWEET_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)tweet ID (\d+)").expect("valid regex"));

static BLANK_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Fields shared by both entry formats while a block is being read
struct PendingDraft {
    date: String,
    time: Option<String>,
    kind: DraftType,
    reply_to: Option<String>,
    reply_context: Option<String>,
    content: String,
    status: DraftStatus,
    feedback: Option<String>,
    tweet_id: Option<String>,
    priority: Option<Priority>,
}

impl PendingDraft {
    fn finish(self) -> Result<Draft, DropReason> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|_| DropReason::InvalidDate)?;
        if self.content.trim().is_empty() {
            return Err(DropReason::EmptyContent);
        }

        Ok(Draft {
            date,
            time: self.time,
            kind: self.kind,
            reply_to: self.reply_to,
            reply_context: self.reply_context,
            content: self.content,
            status: self.status,
            feedback: self.feedback,
            tweet_id: self.tweet_id,
            priority: self.priority,
        })
    }
}

/// Parser for drafts documents
pub struct DraftsParser;

impl DraftsParser {
    /// Parse drafts from a body (frontmatter already stripped)
    pub fn parse(body: &str, is_v2: bool) -> Vec<Draft> {
        Self::parse_with_report(body, is_v2).0
    }

    /// Parse drafts, also returning dropped candidates
    pub fn parse_with_report(body: &str, is_v2: bool) -> (Vec<Draft>, ParseReport) {
        let lines: Vec<&str> = body.lines().collect();
        let mut report = ParseReport::new();
        let mut drafts = Vec::new();
        let mut section = DraftStatus::Pending;
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];

            if let Some(caps) = SECTION_RE.captures(line) {
                if let Some(status) = DraftStatus::parse(&caps[1]) {
                    section = status;
                }
                i += 1;
                continue;
            }

            let block = if is_v2 {
                V2_HEADING_RE
                    .captures(line)
                    .map(|caps| Self::read_v2_block(&lines, i, &caps, section))
            } else {
                V1_HEADING_RE
                    .captures(line)
                    .map(|caps| Self::read_v1_block(&lines, i, &caps, section))
            };

            match block {
                Some((candidate, next)) => {
                    if let Some(draft) = report.keep(i + 1, candidate.finish()) {
                        drafts.push(draft);
                    }
                    i = next;
                }
                None => i += 1,
            }
        }

        tracing::debug!(
            drafts = drafts.len(),
            dropped = report.dropped.len(),
            is_v2,
            "Parsed drafts body"
        );
        (drafts, report)
    }

    /// Whether a body uses `### YYYY-MM-DD | ...` entry headings
    pub fn detect_v2(body: &str) -> bool {
        V2_DETECT_RE.is_match(body)
    }

    /// Read a v2 block; returns the candidate and the index of the first unread line
    fn read_v2_block(
        lines: &[&str],
        start: usize,
        caps: &Captures<'_>,
        section: DraftStatus,
    ) -> (PendingDraft, usize) {
        let label = caps[3].trim();
        let (kind, reply_to) = match V2_REPLY_RE.captures(label) {
            Some(reply) => (DraftType::Reply, Some(reply[1].to_string())),
            None => (DraftType::Original, None),
        };

        let mut draft = PendingDraft {
            date: caps[1].to_string(),
            time: caps.get(2).map(|m| m.as_str().to_string()),
            kind,
            reply_to,
            reply_context: None,
            content: String::new(),
            status: resolve_status(section, label, false),
            feedback: None,
            tweet_id: None,
            priority: None,
        };

        let mut paragraphs: Vec<String> = Vec::new();
        let mut j = start + 1;
        while j < lines.len() {
            let line = lines[j];
            if line.starts_with("### ") || line.starts_with("## ") {
                break;
            }
            j += 1;

            if line.trim().is_empty() {
                continue;
            }

            if let Some(meta) = META_RE.captures(line) {
                let value = meta[2].trim().to_string();
                match meta[1].to_lowercase().as_str() {
                    "priority" => draft.priority = Priority::parse(&value),
                    "context" => draft.reply_context = Some(value),
                    "tweet-id" => draft.tweet_id = Some(value),
                    _ => {}
                }
                continue;
            }

            if let Some(quoted) = quote_remainder(line) {
                // An empty quote line marks a paragraph break
                if quoted.is_empty() {
                    paragraphs.push("\n".to_string());
                } else {
                    paragraphs.push(quoted.to_string());
                }
                continue;
            }

            if let Some(feedback) = FEEDBACK_RE.captures(line) {
                draft.feedback = Some(feedback[1].trim().to_string());
                continue;
            }

            if let Some(italic) = italic_interior(line) {
                draft.feedback = Some(italic.to_string());
            }
        }

        let joined = paragraphs.join("\n");
        draft.content = BLANK_RUN_RE.replace_all(&joined, "\n\n").trim().to_string();
        (draft, j)
    }

    /// Read a legacy block; stops at a blank line, `**`, `##` or `---`
    fn read_v1_block(
        lines: &[&str],
        start: usize,
        caps: &Captures<'_>,
        section: DraftStatus,
    ) -> (PendingDraft, usize) {
        let label = caps[3].trim();
        let trailing = caps.get(4).map_or("", |m| m.as_str()).trim();

        let (kind, reply_to, reply_context) = match V1_REPLY_RE.captures(label) {
            Some(reply) => (
                DraftType::Reply,
                Some(reply[1].to_string()),
                reply.get(2).map(|m| m.as_str().trim().to_string()),
            ),
            None => (DraftType::Original, None, None),
        };

        let markers = format!("{label} {trailing}");
        let mut draft = PendingDraft {
            date: caps[1].to_string(),
            time: caps.get(2).and_then(|m| normalize_time(m.as_str())),
            kind,
            reply_to,
            reply_context,
            content: String::new(),
            status: resolve_status(section, &markers, true),
            feedback: None,
            tweet_id: TWEET_ID_RE.captures(trailing).map(|c| c[1].to_string()),
            priority: None,
        };

        let mut quoted_lines: Vec<&str> = Vec::new();
        let mut j = start + 1;
        while j < lines.len() {
            let line = lines[j];
            if line.trim().is_empty()
                || line.starts_with("**")
                || line.starts_with("##")
                || line.starts_with("---")
            {
                break;
            }
            j += 1;

            if let Some(quoted) = quote_remainder(line) {
                if !quoted.is_empty() {
                    quoted_lines.push(quoted);
                }
                continue;
            }

            if let Some(italic) = italic_interior(line) {
                if let Some(id) = TWEET_ID_RE.captures(italic) {
                    draft.tweet_id = Some(id[1].to_string());
                }
                draft.feedback = Some(italic.to_string());
            }
        }

        draft.content = quoted_lines.join(" ").trim().to_string();
        (draft, j)
    }
}

/// Legacy headings carry loose times (`9:30`, `14:30:00`); keep `HH:MM`
/// and drop anything that is not a clock time.
fn normalize_time(raw: &str) -> Option<String> {
    let mut parts = raw.split(':');
    let hour: u32 = parts.next()?.parse().ok()?;
    let minute: u32 = parts.next()?.parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some(format!("{hour:02}:{minute:02}"))
}

/// Final status: inline markers override the ambient section.
///
/// A checkmark alone only promotes to `approved`; it means `posted` only when
/// the entry already sits in the Posted section.
fn resolve_status(section: DraftStatus, markers: &str, legacy: bool) -> DraftStatus {
    let rejected = markers.contains("REJECTED")
        || markers.contains('❌')
        || (legacy && (markers.contains("STALE") || markers.contains("KILLED")));

    if rejected {
        DraftStatus::Rejected
    } else if markers.contains('✅') {
        if section == DraftStatus::Posted {
            DraftStatus::Posted
        } else {
            DraftStatus::Approved
        }
    } else {
        section
    }
}

/// Text after a `> ` quote marker (a bare `>` yields an empty string)
fn quote_remainder(line: &str) -> Option<&str> {
    if line == ">" {
        return Some("");
    }
    line.strip_prefix("> ").map(str::trim)
}

/// Interior of a line wrapped in underscores
fn italic_interior(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.len() >= 2 && line.starts_with('_') && line.ends_with('_') {
        Some(line[1..line.len() - 1].trim())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v2_checkmark_in_pending_is_approved() {
        let body = "## Pending Approval\n\n### 2026-02-14 09:00 | Original ✅\n> Hello world\n";
        let drafts = DraftsParser::parse(body, true);

        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].status, DraftStatus::Approved);
        assert_eq!(drafts[0].content, "Hello world");
        assert_eq!(drafts[0].time.as_deref(), Some("09:00"));
        assert_eq!(drafts[0].kind, DraftType::Original);
    }

    #[test]
    fn test_v2_checkmark_in_posted_stays_posted() {
        let body = "## Posted\n### 2026-02-14 | Original ✅\n> Shipped\n";
        let drafts = DraftsParser::parse(body, true);
        assert_eq!(drafts[0].status, DraftStatus::Posted);
        assert!(drafts[0].time.is_none());
    }

    #[test]
    fn test_v2_rejected_markers() {
        let body = "## Approved\n### 2026-02-14 | Original ❌\n> One\n### 2026-02-15 | Original REJECTED ✅\n> Two\n";
        let drafts = DraftsParser::parse(body, true);
        assert!(drafts.iter().all(|d| d.status == DraftStatus::Rejected));
    }

    #[test]
    fn test_v2_stale_is_not_a_marker() {
        let body = "## Approved\n### 2026-02-14 | Original STALE\n> One\n";
        let drafts = DraftsParser::parse(body, true);
        assert_eq!(drafts[0].status, DraftStatus::Approved);
    }

    #[test]
    fn test_v2_reply_with_metadata_and_paragraphs() {
        let body = "### 2026-02-14 | Reply to @someone\n- priority: high\n- context: their thread on evals\n- tweet-id: 42\n- mood: ignored\n> First paragraph\n> continues here\n>\n>\n> Second paragraph\n\n_Feedback: tighten the opener_\n";
        let drafts = DraftsParser::parse(body, true);

        assert_eq!(drafts.len(), 1);
        let d = &drafts[0];
        assert_eq!(d.kind, DraftType::Reply);
        assert_eq!(d.reply_to.as_deref(), Some("someone"));
        assert_eq!(d.reply_context.as_deref(), Some("their thread on evals"));
        assert_eq!(d.tweet_id.as_deref(), Some("42"));
        assert_eq!(d.priority, Some(Priority::High));
        assert_eq!(
            d.content,
            "First paragraph\ncontinues here\n\nSecond paragraph"
        );
        assert_eq!(d.feedback.as_deref(), Some("tighten the opener"));
        assert_eq!(d.status, DraftStatus::Pending);
    }

    #[test]
    fn test_v2_generic_italic_feedback() {
        let body = "### 2026-02-14 | Original\n> Body\n_too long_\n";
        let drafts = DraftsParser::parse(body, true);
        assert_eq!(drafts[0].feedback.as_deref(), Some("too long"));
    }

    #[test]
    fn test_v2_block_ends_at_next_section() {
        let body = "## Pending Approval\n### 2026-02-14 | Original\n> Pending one\n## Rejected\n> stray quote\n### 2026-02-15 | Original\n> Rejected one\n";
        let drafts = DraftsParser::parse(body, true);

        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].content, "Pending one");
        assert_eq!(drafts[1].status, DraftStatus::Rejected);
    }

    #[test]
    fn test_v2_empty_content_dropped_and_reported() {
        let body = "### 2026-02-14 | Original\n- priority: low\n### 2026-02-30 | Original\n> bad date\n";
        let (drafts, report) = DraftsParser::parse_with_report(body, true);

        assert!(drafts.is_empty());
        assert_eq!(report.count(DropReason::EmptyContent), 1);
        assert_eq!(report.count(DropReason::InvalidDate), 1);
        assert_eq!(report.dropped[0].line, 1);
    }

    #[test]
    fn test_v1_reply_candidate_with_context() {
        let body = "## Posted\n**2026-02-10 14:30 | Reply candidate to @someone (their thread on evals)** ✅\n> Great point\n> about evals\n_Posted, tweet ID 1234567890_\n";
        let drafts = DraftsParser::parse(body, false);

        assert_eq!(drafts.len(), 1);
        let d = &drafts[0];
        assert_eq!(d.kind, DraftType::Reply);
        assert_eq!(d.reply_to.as_deref(), Some("someone"));
        assert_eq!(d.reply_context.as_deref(), Some("their thread on evals"));
        assert_eq!(d.content, "Great point about evals");
        assert_eq!(d.tweet_id.as_deref(), Some("1234567890"));
        assert_eq!(d.status, DraftStatus::Posted);
        assert_eq!(d.time.as_deref(), Some("14:30"));
    }

    #[test]
    fn test_v1_stale_and_killed_reject() {
        let body = "## Pending Approval\n**2026-02-10 | Original** STALE\n> a\n\n**2026-02-11 | Original KILLED**\n> b\n";
        let drafts = DraftsParser::parse(body, false);

        assert_eq!(drafts.len(), 2);
        assert!(drafts.iter().all(|d| d.status == DraftStatus::Rejected));
    }

    #[test]
    fn test_v1_block_stops_at_blank_line() {
        let body = "**2026-02-10 | Original**\n> kept\n\n> not part of the draft\n";
        let drafts = DraftsParser::parse(body, false);
        assert_eq!(drafts[0].content, "kept");
    }

    #[test]
    fn test_v1_checkmark_in_pending_is_approved() {
        let body = "## Pending\n**2026-02-10 | Original** ✅\n> hi\n";
        let drafts = DraftsParser::parse(body, false);
        assert_eq!(drafts[0].status, DraftStatus::Approved);
    }

    #[test]
    fn test_detect_v2() {
        assert!(DraftsParser::detect_v2("## Posted\n### 2026-02-14 | Original\n"));
        assert!(!DraftsParser::detect_v2("**2026-02-14 | Original**\n"));
    }

    #[test]
    fn test_v1_loose_times_normalized() {
        let body = "## Pending Approval\n**2026-01-19 9:30 | Original**\n> a\n\n**2026-01-20 14:30:00 | Original**\n> b\n\n**2026-01-21 25:10 | Original**\n> c\n";
        let drafts = DraftsParser::parse(body, false);
        let times: Vec<_> = drafts.iter().map(|d| d.time.as_deref()).collect();
        assert_eq!(times, vec![Some("09:30"), Some("14:30"), None]);
    }
}
