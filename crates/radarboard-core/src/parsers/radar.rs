//! Parser for content radar scans (`content-radar-YYYY-MM-DD.md`)
//!
//! A scan body is split into `##` sections plus a "Topic Clusters" block, then
//! each section is scanned line by line. The item scanner accepts all three
//! dialects (see [`crate::parsers::RadarFormat`]) at once, since older files mix
//! them within a single section.
//!
//! Items are not de-duplicated: content written twice in two dialects yields
//! two items.

use crate::models::{RadarDay, RadarItem, RadarSection};
use crate::parsers::diagnostics::{DropReason, ParseReport};
use crate::parsers::lanes::LaneTable;
use once_cell::sync::Lazy;
use regex::Regex;

static CLUSTERS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^## Topic Clusters").expect("valid regex"));
static SCAN_QUALITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^## Scan Quality").expect("valid regex"));

static ITEM_HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^### (.+)$").expect("valid regex"));
static SOURCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^- Source:\s*(.+?)\s*[—–-]\s*(\S+)\s*$").expect("valid regex"));
static LANE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^- Lane:\s*(.+)$").expect("valid regex"));
static WHY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^- Why:\s*$").expect("valid regex"));
static WHY_BULLET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s+-\s+(.+)$").expect("valid regex"));

// **[Title](url)** — why
static BOLD_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\*\*\[(.+?)\]\(([^)]+)\)\*\*\s*[—–-]\s*(.+)$").expect("valid regex")
});
// **Title** — why [text](url)
static BOLD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\*\*(.+?)\*\*\s*[—–-]\s*(.+)$").expect("valid regex"));
static TRAILING_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]*)\]\(([^)]+)\)\s*$").expect("valid regex"));

static POINTS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\(\d+\s*pts?\)\s*$").expect("valid regex"));
static WHY_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^why matt cares:\s*").expect("valid regex"));

/// A body line with its 1-based position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub number: usize,
    pub text: String,
}

impl SourceLine {
    /// Number every line of `text`, starting at 1
    pub fn numbered(text: &str) -> Vec<SourceLine> {
        text.lines()
            .enumerate()
            .map(|(i, line)| SourceLine {
                number: i + 1,
                text: line.to_string(),
            })
            .collect()
    }
}

/// Lines collected under one `##` heading, before item scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSection {
    pub heading: String,
    pub lines: Vec<SourceLine>,
}

/// Result of splitting a scan body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionSplit {
    pub sections: Vec<RawSection>,
    pub cluster_lines: Vec<String>,
}

/// Item under construction
struct PendingItem {
    title: Option<String>,
    link: String,
    lane: String,
    why: Vec<String>,
    line: usize,
}

impl PendingItem {
    fn empty(lane: &str) -> Self {
        Self {
            title: None,
            link: String::new(),
            lane: lane.to_string(),
            why: Vec::new(),
            line: 0,
        }
    }

    fn titled(title: &str, lane: &str, line: usize) -> Self {
        Self {
            title: Some(title.trim().to_string()),
            line,
            ..Self::empty(lane)
        }
    }

    fn is_touched(&self) -> bool {
        self.title.is_some() || !self.link.is_empty() || !self.why.is_empty()
    }

    fn finish(self, source: &str) -> Result<RadarItem, DropReason> {
        let title = self.title.unwrap_or_default();
        if title.is_empty() {
            return Err(DropReason::MissingTitle);
        }

        Ok(RadarItem {
            title,
            source: source.to_string(),
            link: self.link,
            lane: self.lane,
            note: self.why.join("\n"),
        })
    }
}

/// Parser for radar scan bodies
#[derive(Debug, Clone, Default)]
pub struct RadarParser {
    lanes: LaneTable,
}

impl RadarParser {
    pub fn new(lanes: LaneTable) -> Self {
        Self { lanes }
    }

    pub fn lanes(&self) -> &LaneTable {
        &self.lanes
    }

    /// Parse a full scan body into a day aggregate
    pub fn parse_day(&self, body: &str) -> RadarDay {
        self.parse_day_with_report(body).0
    }

    /// Parse a full scan body, also returning dropped candidates
    pub fn parse_day_with_report(&self, body: &str) -> (RadarDay, ParseReport) {
        let mut report = ParseReport::new();
        let split = Self::split_sections(body);

        let sections = split
            .sections
            .iter()
            .map(|raw| RadarSection {
                heading: raw.heading.clone(),
                items: self.parse_items_with_report(&raw.heading, &raw.lines, &mut report),
            })
            .collect();

        let day = RadarDay::from_sections(sections, split.cluster_lines);
        tracing::debug!(
            sections = day.sections.len(),
            items = day.item_count,
            clusters = day.clusters.len(),
            dropped = report.dropped.len(),
            "Parsed radar body"
        );
        (day, report)
    }

    /// Split a body into `##` sections and the Topic Clusters lines.
    ///
    /// "Scan Quality" content and anything before the first heading is
    /// discarded. A `---` line closes the current section unless we are inside
    /// the clusters block.
    pub fn split_sections(body: &str) -> SectionSplit {
        let mut split = SectionSplit::default();
        let mut heading = String::new();
        let mut lines: Vec<SourceLine> = Vec::new();
        let mut in_clusters = false;

        for line in SourceLine::numbered(body) {
            let text = line.text.as_str();

            if CLUSTERS_RE.is_match(text) {
                Self::flush_section(&mut split, &mut heading, &mut lines);
                in_clusters = true;
                continue;
            }

            let is_rule = text == "---";
            if SCAN_QUALITY_RE.is_match(text) || (is_rule && !in_clusters) {
                if in_clusters {
                    heading.clear();
                    lines.clear();
                } else {
                    Self::flush_section(&mut split, &mut heading, &mut lines);
                }
                // Scan Quality must not leak into the clusters block
                if !is_rule {
                    in_clusters = false;
                }
                continue;
            }

            if is_rule {
                continue;
            }

            if let Some(rest) = text.strip_prefix("## ") {
                if in_clusters {
                    lines.clear();
                } else {
                    Self::flush_section(&mut split, &mut heading, &mut lines);
                }
                heading = rest.trim().to_string();
                in_clusters = false;
                continue;
            }

            if in_clusters && text.starts_with("**") {
                split.cluster_lines.push(line.text);
            } else {
                lines.push(line);
            }
        }

        if !in_clusters {
            Self::flush_section(&mut split, &mut heading, &mut lines);
        }

        split
    }

    fn flush_section(split: &mut SectionSplit, heading: &mut String, lines: &mut Vec<SourceLine>) {
        let heading = std::mem::take(heading);
        let lines = std::mem::take(lines);
        // Lines with no heading above them are dropped with it
        if !heading.is_empty() && !lines.is_empty() {
            split.sections.push(RawSection { heading, lines });
        }
    }

    /// Scan one section's lines into items
    pub fn parse_items(&self, heading: &str, lines: &[SourceLine]) -> Vec<RadarItem> {
        let mut report = ParseReport::new();
        self.parse_items_with_report(heading, lines, &mut report)
    }

    /// Scan one section's lines into items, recording dropped candidates
    pub fn parse_items_with_report(
        &self,
        heading: &str,
        lines: &[SourceLine],
        report: &mut ParseReport,
    ) -> Vec<RadarItem> {
        let default_lane = self.lanes.lookup(heading);
        let mut items = Vec::new();
        let mut current = PendingItem::empty(&default_lane);
        let mut in_why = false;

        let mut emit = |item: PendingItem, items: &mut Vec<RadarItem>| {
            if item.is_touched() {
                let line = item.line;
                if let Some(done) = report.keep(line, item.finish(heading)) {
                    items.push(done);
                }
            }
        };

        for line in lines {
            let text = line.text.as_str();

            // v3 item heading
            if let Some(caps) = ITEM_HEADING_RE.captures(text) {
                let next = PendingItem::titled(&caps[1], &default_lane, line.number);
                emit(std::mem::replace(&mut current, next), &mut items);
                in_why = false;
                continue;
            }

            // v3 metadata; the source name is informational, the section heading wins
            if let Some(caps) = SOURCE_RE.captures(text) {
                if current.title.is_some() {
                    current.link = caps[2].to_string();
                }
                continue;
            }

            if let Some(caps) = LANE_RE.captures(text) {
                current.lane = caps[1].trim().to_string();
                continue;
            }

            if WHY_RE.is_match(text) {
                in_why = true;
                continue;
            }

            if in_why {
                if let Some(caps) = WHY_BULLET_RE.captures(text) {
                    current.why.push(caps[1].trim().to_string());
                    continue;
                }
                if text.trim().is_empty() {
                    continue;
                }
                // Anything else ends the bullet list and is handled below
                in_why = false;
            }

            // v2: **[Title](url)** — why
            if let Some(caps) = BOLD_LINK_RE.captures(text) {
                let mut next = PendingItem::titled(&strip_points(&caps[1]), &default_lane, line.number);
                next.link = caps[2].to_string();
                next.why.push(caps[3].trim().to_string());
                emit(std::mem::replace(&mut current, next), &mut items);
                continue;
            }

            // v1: **Title** — why [Source](url)
            if let Some(caps) = BOLD_RE.captures(text) {
                let mut next = PendingItem::titled(&strip_points(&caps[1]), &default_lane, line.number);
                let rest = &caps[2];
                let why = match TRAILING_LINK_RE.captures(rest) {
                    Some(link_caps) => {
                        next.link = link_caps[2].to_string();
                        let start = link_caps.get(0).map_or(rest.len(), |m| m.start());
                        rest[..start].trim().to_string()
                    }
                    None => rest.trim().to_string(),
                };
                if !why.is_empty() {
                    next.why.push(why);
                }
                emit(std::mem::replace(&mut current, next), &mut items);
                continue;
            }

            if let Some(quote) = text.strip_prefix("> ") {
                let why = WHY_PREFIX_RE.replace(quote.trim(), "");
                let why = why.trim();
                if !why.is_empty() {
                    current.why.push(why.to_string());
                }
                continue;
            }

            if text.len() >= 2 && text.starts_with('*') && text.ends_with('*') {
                let why = text.trim_matches('*').trim();
                if !why.is_empty() {
                    current.why.push(why.to_string());
                }
            }
        }

        emit(current, &mut items);
        items
    }
}

/// Drop a trailing `(123 pts)` score annotation
fn strip_points(title: &str) -> String {
    POINTS_RE.replace(title, "").trim().to_string()
}
