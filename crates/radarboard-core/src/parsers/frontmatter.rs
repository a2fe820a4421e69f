//! Frontmatter codec
//!
//! Reads and writes the flat `key: value` header block that radar, digest and
//! drafts documents carry between two `---` lines:
//!
//! ```text
//! ---
//! format: radar-v3
//! date: 2026-02-14
//! scan_sources: [Hacker News, Reddit]
//! item_count: 12
//! ---
//! ## Hacker News
//! ```
//!
//! This is deliberately not YAML: no nesting, no quoting, and list elements
//! cannot contain commas.

use crate::models::{Meta, MetaValue};
use once_cell::sync::Lazy;
use regex::Regex;

// CRLF files and a closing `---` at end of input both count as a block
static BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\A---\r?\n(?:(.*?)\r?\n)?---(?:\r?\n|\z)(.*)\z").expect("valid block regex")
});

static LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_]\w*(?:-\w+)*):\s*(.*)$").expect("valid frontmatter line regex")
});

/// A document split into its header and the remaining markdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontmatterBlock<'a> {
    pub meta: Meta,
    pub body: &'a str,
}

/// Frontmatter parser/serializer
pub struct Frontmatter;

impl Frontmatter {
    /// Parse a leading frontmatter block.
    ///
    /// Returns `None` when the text does not start with a complete block; the
    /// caller should then treat the whole text as body. Lines inside the block
    /// that are not `key: value` are skipped.
    pub fn parse(text: &str) -> Option<FrontmatterBlock<'_>> {
        let caps = BLOCK_RE.captures(text)?;
        let body = caps.get(2).map_or("", |m| m.as_str());

        let mut meta = Meta::new();
        if let Some(block) = caps.get(1) {
            for line in block.as_str().lines() {
                let Some(line_caps) = LINE_RE.captures(line) else {
                    continue;
                };
                meta.insert(&line_caps[1], Self::coerce(&line_caps[2]));
            }
        }

        Some(FrontmatterBlock { meta, body })
    }

    /// Split text into metadata and body, with empty metadata when absent
    pub fn split(text: &str) -> (Meta, &str) {
        match Self::parse(text) {
            Some(block) => (block.meta, block.body),
            None => (Meta::new(), text),
        }
    }

    /// Render `meta` as a header block followed by `body`
    pub fn serialize(meta: &Meta, body: &str) -> String {
        let mut out = String::from("---\n");
        for (key, value) in meta.iter() {
            out.push_str(key);
            out.push_str(": ");
            out.push_str(&value.to_string());
            out.push('\n');
        }
        out.push_str("---\n");
        out.push_str(body);
        out
    }

    /// Value coercion: list, then bool, then integer, then plain string
    fn coerce(raw: &str) -> MetaValue {
        let value = raw.trim();

        if let Some(inner) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
            let items = inner
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(String::from)
                .collect();
            return MetaValue::List(items);
        }

        match value {
            "true" => return MetaValue::Bool(true),
            "false" => return MetaValue::Bool(false),
            _ => {}
        }

        if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
            // Digit strings too long for i64 stay text
            if let Ok(n) = value.parse::<i64>() {
                return MetaValue::Int(n);
            }
        }

        MetaValue::Text(value.to_string())
    }
}
