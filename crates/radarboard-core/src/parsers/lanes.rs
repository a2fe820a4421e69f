//! Heading keyword → lane lookup
//!
//! Radar sections do not always say which lane an item belongs to. The lane is
//! then inferred from the section heading via an ordered list of keyword
//! rules; the first case-insensitive substring match wins.

use serde::{Deserialize, Serialize};

/// One `keyword → lane` rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneRule {
    pub keyword: String,
    pub lane: String,
}

impl LaneRule {
    pub fn new(keyword: impl Into<String>, lane: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            lane: lane.into(),
        }
    }
}

/// Ordered lane rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaneTable {
    rules: Vec<LaneRule>,
}

impl Default for LaneTable {
    fn default() -> Self {
        Self::new(vec![
            LaneRule::new("hacker news", "HN"),
            LaneRule::new("anthropic", "AI"),
            LaneRule::new("openai", "AI"),
            LaneRule::new("claude", "AI"),
            LaneRule::new("reddit", "Community"),
            LaneRule::new("twitter", "Social"),
            LaneRule::new("x.com", "Social"),
            LaneRule::new("github", "Dev Tools"),
            LaneRule::new("product hunt", "Products"),
            LaneRule::new("newsletter", "Newsletter"),
            LaneRule::new("research", "Research"),
        ])
    }
}

impl LaneTable {
    pub fn new(rules: Vec<LaneRule>) -> Self {
        // Keywords are matched lowercase
        let rules = rules
            .into_iter()
            .map(|r| LaneRule::new(r.keyword.to_lowercase(), r.lane))
            .collect();
        Self { rules }
    }

    /// Empty table: every heading maps to itself
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule with lowest priority
    pub fn push(&mut self, rule: LaneRule) {
        self.rules.push(LaneRule::new(rule.keyword.to_lowercase(), rule.lane));
    }

    pub fn rules(&self) -> &[LaneRule] {
        &self.rules
    }

    /// Lane for a section heading.
    ///
    /// Falls back to the heading itself with leading `#` and whitespace removed.
    pub fn lookup(&self, heading: &str) -> String {
        let lower = heading.to_lowercase();
        self.rules
            .iter()
            .find(|rule| lower.contains(&rule.keyword.to_lowercase()))
            .map(|rule| rule.lane.clone())
            .unwrap_or_else(|| {
                heading
                    .trim_start_matches(|c: char| c == '#' || c.is_whitespace())
                    .to_string()
            })
    }
}
