//! Data models for content radar scans

use serde::{Deserialize, Serialize};

/// Single item discovered by a radar scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarItem {
    /// Item title (never empty)
    pub title: String,

    /// Section heading the item was found under
    pub source: String,

    /// URL, or empty when the scan line carried none
    pub link: String,

    /// Category tag (e.g. "HN", "AI", "dev-tools")
    pub lane: String,

    /// "Why this matters" bullets joined by newline
    pub note: String,
}

impl RadarItem {
    /// Individual why-bullets, in document order
    pub fn bullets(&self) -> impl Iterator<Item = &str> {
        self.note.lines().filter(|line| !line.trim().is_empty())
    }
}

/// Items grouped under one `##` heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarSection {
    pub heading: String,
    pub items: Vec<RadarItem>,
}

/// One day's radar scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarDay {
    /// Sections that produced at least one item, in document order
    pub sections: Vec<RadarSection>,

    /// Cluster titles from the "Topic Clusters" block
    pub clusters: Vec<String>,

    /// Raw cluster lines, kept for verbatim re-serialization
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cluster_lines: Vec<String>,

    /// Distinct section headings that contributed items (provenance)
    pub scan_sources: Vec<String>,

    /// Total item count across sections
    pub item_count: usize,
}

impl RadarDay {
    /// Build a day from parsed sections, deriving provenance and counts
    pub fn from_sections(sections: Vec<RadarSection>, cluster_lines: Vec<String>) -> Self {
        let sections: Vec<RadarSection> = sections
            .into_iter()
            .filter(|s| !s.items.is_empty())
            .collect();

        let mut scan_sources: Vec<String> = Vec::new();
        for section in &sections {
            if !scan_sources.contains(&section.heading) {
                scan_sources.push(section.heading.clone());
            }
        }

        let item_count = sections.iter().map(|s| s.items.len()).sum();
        let clusters = cluster_lines
            .iter()
            .filter_map(|line| cluster_title(line))
            .collect();

        Self {
            sections,
            clusters,
            cluster_lines,
            scan_sources,
            item_count,
        }
    }

    /// Iterate over every item across all sections
    pub fn items(&self) -> impl Iterator<Item = &RadarItem> {
        self.sections.iter().flat_map(|s| s.items.iter())
    }
}

/// Extract the bolded title from a cluster line (`**Agents** — 3 items`)
fn cluster_title(line: &str) -> Option<String> {
    let rest = line.trim().strip_prefix("**")?;
    let end = rest.find("**")?;
    let title = rest[..end].trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, source: &str) -> RadarItem {
        RadarItem {
            title: title.to_string(),
            source: source.to_string(),
            link: String::new(),
            lane: "HN".to_string(),
            note: String::new(),
        }
    }

    #[test]
    fn test_from_sections_drops_empty_and_counts() {
        let sections = vec![
            RadarSection {
                heading: "Hacker News".to_string(),
                items: vec![item("A", "Hacker News"), item("B", "Hacker News")],
            },
            RadarSection {
                heading: "Reddit".to_string(),
                items: vec![],
            },
        ];

        let day = RadarDay::from_sections(sections, vec![]);
        assert_eq!(day.sections.len(), 1);
        assert_eq!(day.item_count, 2);
        assert_eq!(day.scan_sources, vec!["Hacker News"]);
    }

    #[test]
    fn test_cluster_titles_extracted() {
        let day = RadarDay::from_sections(
            vec![],
            vec![
                "**Agent tooling** — three launches this week".to_string(),
                "**Unclosed".to_string(),
            ],
        );
        assert_eq!(day.clusters, vec!["Agent tooling"]);
        assert_eq!(day.cluster_lines.len(), 2);
    }

    #[test]
    fn test_bullets_split_note() {
        let mut it = item("A", "HN");
        it.note = "Saves setup time\nGood docs".to_string();
        assert_eq!(it.bullets().collect::<Vec<_>>(), vec!["Saves setup time", "Good docs"]);
    }
}
