//! Data models for social post drafts (`x-drafts.md`)

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Draft kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftType {
    Original,
    Reply,
}

/// Approval status of a draft
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftStatus {
    #[default]
    Pending,
    Approved,
    Posted,
    Rejected,
}

/// Draft priority from the `- priority:` metadata line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Normal,
    Low,
}

/// One social post candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub date: NaiveDate,

    /// `HH:MM`, when the heading carried one
    pub time: Option<String>,

    #[serde(rename = "type")]
    pub kind: DraftType,

    /// Handle without `@`, only for replies
    pub reply_to: Option<String>,

    pub reply_context: Option<String>,

    /// Post body; paragraph breaks preserved as blank lines
    pub content: String,

    pub status: DraftStatus,

    pub feedback: Option<String>,

    pub tweet_id: Option<String>,

    pub priority: Option<Priority>,
}

impl DraftType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Reply => "reply",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "original" => Some(Self::Original),
            "reply" => Some(Self::Reply),
            _ => None,
        }
    }
}

impl DraftStatus {
    /// All statuses in file section order
    pub const ALL: [DraftStatus; 4] = [
        DraftStatus::Pending,
        DraftStatus::Approved,
        DraftStatus::Posted,
        DraftStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Posted => "posted",
            Self::Rejected => "rejected",
        }
    }

    /// Heading text used for this status' section in a drafts file
    pub fn section_heading(&self) -> &'static str {
        match self {
            Self::Pending => "Pending Approval",
            Self::Approved => "Approved",
            Self::Posted => "Posted",
            Self::Rejected => "Rejected",
        }
    }

    /// Parse a status from a section heading or stored value
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "pending" | "pending approval" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "posted" => Some(Self::Posted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" => Some(Self::High),
            "normal" | "medium" => Some(Self::Normal),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DraftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for DraftStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for DraftStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Self::parse(s).ok_or_else(|| FromSqlError::Other(format!("unknown draft status: {s}").into()))
    }
}

impl ToSql for DraftType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for DraftType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Self::parse(s).ok_or_else(|| FromSqlError::Other(format!("unknown draft type: {s}").into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_accepts_section_headings() {
        assert_eq!(DraftStatus::parse("Pending Approval"), Some(DraftStatus::Pending));
        assert_eq!(DraftStatus::parse("POSTED"), Some(DraftStatus::Posted));
        assert_eq!(DraftStatus::parse("stale"), None);
    }

    #[test]
    fn test_status_heading_round_trip() {
        for status in DraftStatus::ALL {
            assert_eq!(DraftStatus::parse(status.section_heading()), Some(status));
        }
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!(Priority::parse(" High "), Some(Priority::High));
        assert_eq!(Priority::parse("medium"), Some(Priority::Normal));
        assert_eq!(Priority::parse("urgent"), None);
    }

    #[test]
    fn test_draft_serializes_type_field() {
        let draft = Draft {
            date: NaiveDate::from_ymd_opt(2026, 2, 14).unwrap(),
            time: None,
            kind: DraftType::Reply,
            reply_to: Some("someone".to_string()),
            reply_context: None,
            content: "Hello".to_string(),
            status: DraftStatus::Pending,
            feedback: None,
            tweet_id: None,
            priority: None,
        };

        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["type"], "reply");
        assert_eq!(json["replyTo"], "someone");
        assert_eq!(json["date"], "2026-02-14");
    }
}
