//! SQLite record store for parsed archive content
//!
//! Schema:
//! - radar_items: one row per radar item, keyed by scan date + position
//! - radar_clusters: topic cluster titles per scan date
//! - newsletter_articles: digest entries per digest date
//! - drafts: social post drafts
//! - content_feedback: reviewer feedback attached to a draft row
//!
//! Rows are appended as-is; importing the same document twice stores it twice.

use crate::models::{Draft, DraftStatus, NewsletterArticle, RadarDay, RadarItem};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS radar_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        scan_date TEXT NOT NULL,
        position INTEGER NOT NULL,
        title TEXT NOT NULL,
        source TEXT NOT NULL,
        link TEXT NOT NULL,
        lane TEXT NOT NULL,
        note TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS radar_clusters (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        scan_date TEXT NOT NULL,
        title TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS newsletter_articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        digest_date TEXT NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        source TEXT NOT NULL,
        link TEXT NOT NULL,
        category TEXT
    );

    CREATE TABLE IF NOT EXISTS drafts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        draft_date TEXT NOT NULL,
        draft_time TEXT,
        type TEXT NOT NULL,
        reply_to TEXT,
        reply_context TEXT,
        content TEXT NOT NULL,
        status TEXT NOT NULL,
        feedback TEXT,
        tweet_id TEXT,
        priority TEXT
    );

    CREATE TABLE IF NOT EXISTS content_feedback (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        draft_id INTEGER NOT NULL REFERENCES drafts(id),
        status TEXT NOT NULL,
        feedback TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_radar_items_date ON radar_items(scan_date);
    CREATE INDEX IF NOT EXISTS idx_articles_date ON newsletter_articles(digest_date);
    CREATE INDEX IF NOT EXISTS idx_drafts_status ON drafts(status);
"#;

/// Row counts per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCounts {
    pub radar_items: usize,
    pub radar_clusters: usize,
    pub newsletter_articles: usize,
    pub drafts: usize,
    pub content_feedback: usize,
}

impl TableCounts {
    /// `(table, rows)` pairs in schema order
    pub fn rows(&self) -> [(&'static str, usize); 5] {
        [
            ("radar_items", self.radar_items),
            ("radar_clusters", self.radar_clusters),
            ("newsletter_articles", self.newsletter_articles),
            ("drafts", self.drafts),
            ("content_feedback", self.content_feedback),
        ]
    }

    pub fn total(&self) -> usize {
        self.rows().iter().map(|(_, n)| n).sum()
    }
}

/// SQLite-backed record store (thread-safe)
pub struct RecordStore {
    conn: Mutex<Connection>,
    in_memory: bool,
}

impl RecordStore {
    /// Create or open the database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open record store: {}", path.display()))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .context("Failed to enable WAL mode")?;

        let store = Self::init(conn, false)?;
        debug!(path = %path.display(), "Record store opened");
        Ok(store)
    }

    /// Throwaway database for tests and dry runs
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::init(conn, true)
    }

    fn init(conn: Connection, in_memory: bool) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")
            .context("Failed to enable foreign keys")?;
        conn.execute_batch(SCHEMA).context("Failed to create schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
            in_memory,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Record store lock poisoned: {}", e))
    }

    /// Insert every item and cluster of one scan. Returns the item rows written.
    pub fn insert_radar_day(&self, date: NaiveDate, day: &RadarDay) -> Result<usize> {
        let date = date_key(date);
        let mut conn = self.lock()?;
        let tx = conn.transaction().context("Failed to start transaction")?;

        let mut written = 0;
        {
            let mut insert_item = tx
                .prepare(
                    r#"
                    INSERT INTO radar_items (scan_date, position, title, source, link, lane, note)
                    VALUES (?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .context("Failed to prepare radar item insert")?;

            for (position, item) in day.items().enumerate() {
                insert_item
                    .execute(params![
                        date,
                        position as i64,
                        item.title,
                        item.source,
                        item.link,
                        item.lane,
                        item.note,
                    ])
                    .with_context(|| format!("Failed to insert radar item: {}", item.title))?;
                written += 1;
            }

            let mut insert_cluster = tx
                .prepare("INSERT INTO radar_clusters (scan_date, title) VALUES (?, ?)")
                .context("Failed to prepare cluster insert")?;
            for title in &day.clusters {
                insert_cluster
                    .execute(params![date, title])
                    .context("Failed to insert cluster")?;
            }
        }

        tx.commit().context("Failed to commit radar day")?;
        debug!(%date, items = written, clusters = day.clusters.len(), "Radar day stored");
        Ok(written)
    }

    /// Insert one digest's articles
    pub fn insert_articles(&self, date: NaiveDate, articles: &[NewsletterArticle]) -> Result<usize> {
        let date = date_key(date);
        let mut conn = self.lock()?;
        let tx = conn.transaction().context("Failed to start transaction")?;

        {
            let mut insert = tx
                .prepare(
                    r#"
                    INSERT INTO newsletter_articles
                    (digest_date, title, description, source, link, category)
                    VALUES (?, ?, ?, ?, ?, ?)
                    "#,
                )
                .context("Failed to prepare article insert")?;

            for article in articles {
                insert
                    .execute(params![
                        date,
                        article.title,
                        article.description,
                        article.source,
                        article.link,
                        article.category,
                    ])
                    .with_context(|| format!("Failed to insert article: {}", article.title))?;
            }
        }

        tx.commit().context("Failed to commit articles")?;
        debug!(%date, articles = articles.len(), "Digest stored");
        Ok(articles.len())
    }

    /// Insert drafts; drafts carrying feedback also get a `content_feedback` row
    pub fn insert_drafts(&self, drafts: &[Draft]) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().context("Failed to start transaction")?;

        let mut feedback_rows = 0;
        {
            let mut insert = tx
                .prepare(
                    r#"
                    INSERT INTO drafts
                    (draft_date, draft_time, type, reply_to, reply_context, content,
                     status, feedback, tweet_id, priority)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .context("Failed to prepare draft insert")?;
            let mut insert_feedback = tx
                .prepare("INSERT INTO content_feedback (draft_id, status, feedback) VALUES (?, ?, ?)")
                .context("Failed to prepare feedback insert")?;

            for draft in drafts {
                let draft_id = insert
                    .insert(params![
                        date_key(draft.date),
                        draft.time,
                        draft.kind,
                        draft.reply_to,
                        draft.reply_context,
                        draft.content,
                        draft.status,
                        draft.feedback,
                        draft.tweet_id,
                        draft.priority.map(|p| p.as_str()),
                    ])
                    .context("Failed to insert draft")?;

                if let Some(feedback) = &draft.feedback {
                    insert_feedback
                        .execute(params![draft_id, draft.status, feedback])
                        .context("Failed to insert feedback")?;
                    feedback_rows += 1;
                }
            }
        }

        tx.commit().context("Failed to commit drafts")?;
        debug!(drafts = drafts.len(), feedback = feedback_rows, "Drafts stored");
        Ok(drafts.len())
    }

    /// Radar items for one scan date, in document order
    pub fn radar_items_for(&self, date: NaiveDate) -> Result<Vec<RadarItem>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                r#"
                SELECT title, source, link, lane, note FROM radar_items
                WHERE scan_date = ? ORDER BY position, id
                "#,
            )
            .context("Failed to prepare query")?;

        let rows = stmt
            .query_map(params![date_key(date)], |row| {
                Ok(RadarItem {
                    title: row.get(0)?,
                    source: row.get(1)?,
                    link: row.get(2)?,
                    lane: row.get(3)?,
                    note: row.get(4)?,
                })
            })
            .context("Failed to query radar items")?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row.context("Failed to read row")?);
        }
        Ok(items)
    }

    /// Drafts in one status, oldest first
    pub fn drafts_with_status(&self, status: DraftStatus) -> Result<Vec<Draft>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                r#"
                SELECT draft_date, draft_time, type, reply_to, reply_context, content,
                       status, feedback, tweet_id, priority
                FROM drafts WHERE status = ? ORDER BY draft_date, id
                "#,
            )
            .context("Failed to prepare query")?;

        let rows = stmt
            .query_map(params![status], |row| {
                let date: String = row.get(0)?;
                let priority: Option<String> = row.get(9)?;
                Ok((
                    date,
                    Draft {
                        date: NaiveDate::MIN,
                        time: row.get(1)?,
                        kind: row.get(2)?,
                        reply_to: row.get(3)?,
                        reply_context: row.get(4)?,
                        content: row.get(5)?,
                        status: row.get(6)?,
                        feedback: row.get(7)?,
                        tweet_id: row.get(8)?,
                        priority: priority.as_deref().and_then(crate::models::Priority::parse),
                    },
                ))
            })
            .context("Failed to query drafts")?;

        let mut drafts = Vec::new();
        for row in rows {
            let (date, mut draft) = row.context("Failed to read row")?;
            draft.date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .with_context(|| format!("Invalid draft date in store: {}", date))?;
            drafts.push(draft);
        }
        Ok(drafts)
    }

    /// Row counts for every table
    pub fn table_counts(&self) -> Result<TableCounts> {
        let conn = self.lock()?;
        let count = |table: &str| -> Result<usize> {
            let n: i64 = conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
                .with_context(|| format!("Failed to count {}", table))?;
            Ok(n as usize)
        };

        Ok(TableCounts {
            radar_items: count("radar_items")?,
            radar_clusters: count("radar_clusters")?,
            newsletter_articles: count("newsletter_articles")?,
            drafts: count("drafts")?,
            content_feedback: count("content_feedback")?,
        })
    }
}

impl Drop for RecordStore {
    fn drop(&mut self) {
        if self.in_memory {
            return;
        }
        // Fold the WAL back into the main file so it does not grow across runs
        if let Ok(conn) = self.conn.lock() {
            if let Err(e) = conn.pragma_update(None, "wal_checkpoint", "TRUNCATE") {
                warn!("Failed to checkpoint WAL on RecordStore drop: {}", e);
            }
        }
    }
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
