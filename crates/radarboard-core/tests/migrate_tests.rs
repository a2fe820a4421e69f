//! Integration tests for document migration and batch runs

use async_trait::async_trait;
use chrono::NaiveDate;
use radarboard_core::blob::{Blob, BlobEntry, BlobStore, FsBlobStore, MemoryBlobStore, PutOutcome};
use radarboard_core::migrate::{
    migrate_drafts_file, migrate_newsletter_archive, migrate_radar_archive,
};
use radarboard_core::parsers::{DraftsParser, Frontmatter, RadarFormat, RadarParser};
use radarboard_core::{CoreError, Document, Migrator};
use tempfile::TempDir;

const RADAR_V1: &str = include_str!("fixtures/radar-v1.md");
const RADAR_V2: &str = include_str!("fixtures/radar-v2.md");
const RADAR_V3: &str = include_str!("fixtures/radar-v3.md");
const DRAFTS_V1: &str = include_str!("fixtures/drafts-v1.md");
const NEWSLETTER_LEGACY: &str = include_str!("fixtures/newsletter-legacy.md");

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 20).unwrap()
}

#[test]
fn test_v1_migration_preserves_records() {
    let parser = RadarParser::default();
    let migrated = Migrator::default().migrate_to_v3(RADAR_V1, date());

    let doc = Document::parse(&migrated);
    assert_eq!(doc.format(), Some("radar-v3"));
    assert_eq!(doc.meta.get_str("date"), Some("2026-01-20"));
    assert_eq!(doc.meta.get("item_count").and_then(|v| v.as_int()), Some(3));
    assert_eq!(doc.radar_format(), RadarFormat::V3);

    let before = parser.parse_day(RADAR_V1);
    let (after, report) = doc.radar_day(&parser);
    assert!(report.is_clean());
    assert_eq!(after, before);
}

#[test]
fn test_v2_migration_preserves_records() {
    let parser = RadarParser::default();
    let migrated = Migrator::default().migrate_to_v3(RADAR_V2, date());

    let after = parser.parse_day(Document::parse(&migrated).body);
    assert_eq!(after, parser.parse_day(RADAR_V2));
    assert!(migrated.contains("## Topic Clusters\n\n**Tooling** — ratatui\n"));
}

#[test]
fn test_v3_without_frontmatter_keeps_body() {
    let migrated = Migrator::default().migrate_to_v3(RADAR_V3, date());
    let block = Frontmatter::parse(&migrated).expect("frontmatter added");

    assert_eq!(block.meta.get("item_count").and_then(|v| v.as_int()), Some(2));
    assert_eq!(
        block.meta.get("scan_sources").and_then(|v| v.as_list()),
        Some(&["Hacker News".to_string()][..])
    );
    // Title line removed, everything else verbatim
    assert!(!block.body.contains("# Content Radar"));
    assert!(block.body.contains("### No-link note\n- Lane: Research\n"));
    assert!(block.body.contains("## Scan Quality\n**Coverage** — HN only\n"));
}

#[test]
fn test_migration_idempotent_for_every_dialect() {
    let migrator = Migrator::default();
    for text in [RADAR_V1, RADAR_V2, RADAR_V3] {
        let once = migrator.migrate_to_v3(text, date());
        let twice = migrator.migrate_to_v3(&once, date());
        assert_eq!(once, twice);
        assert_eq!(once.matches("format: radar-v3").count(), 1);
    }
}

#[test]
fn test_header_only_and_crlf_documents_not_wrapped_twice() {
    let migrator = Migrator::default();

    let header_only = "---\nformat: radar-v3\ndate: 2026-02-14\n---";
    assert_eq!(migrator.migrate_to_v3(header_only, date()), header_only);

    let crlf = "---\r\nformat: radar-v3\r\n---\r\n## HN\r\n### Item\r\n- Source: HN — https://x.example\r\n";
    let out = migrator.migrate_to_v3(crlf, date());
    assert_eq!(out.matches("format: radar-v3").count(), 1);
    assert_eq!(out, crlf);
}

#[test]
fn test_drafts_migration_keeps_loose_legacy_times() {
    let legacy = "## Pending Approval\n**2026-01-19 9:30 | Original**\n> keep me\n\n**2026-01-20 14:30:00 | Original**\n> and me\n";
    let migrated = Migrator::default()
        .plan_drafts(legacy)
        .into_text(legacy);

    assert!(migrated.contains("### 2026-01-19 09:30 | Original"));
    assert!(migrated.contains("### 2026-01-20 14:30 | Original"));

    let body = Frontmatter::parse(&migrated).unwrap().body;
    let after = DraftsParser::parse(body, true);
    assert_eq!(after.len(), 2);
    assert_eq!(after[0].content, "keep me");
    assert_eq!(after[1].time.as_deref(), Some("14:30"));
}

#[test]
fn test_drafts_migration_roundtrip() {
    let migrator = Migrator::default();
    let before = DraftsParser::parse(DRAFTS_V1, false);

    let migrated = match migrator.plan_drafts(DRAFTS_V1) {
        radarboard_core::Migration::Rewritten { content, records } => {
            assert_eq!(records, before.len());
            content
        }
        other => panic!("expected rewrite, got {:?}", other),
    };

    let doc = Document::parse(&migrated);
    assert!(doc.is_drafts_v2());
    let (after, report) = doc.drafts();
    assert!(report.is_clean());

    // Section order groups by status; compare as sets per status
    assert_eq!(after.len(), before.len());
    for draft in &before {
        assert!(after.contains(draft), "lost draft {:?}", draft);
    }
}

#[test]
fn test_newsletter_migration_roundtrip() {
    let migrator = Migrator::default();
    let migrated = migrator
        .plan_newsletter(NEWSLETTER_LEGACY, date())
        .into_text(NEWSLETTER_LEGACY);

    let doc = Document::parse(&migrated);
    assert_eq!(doc.format(), Some("newsletter-v2"));
    let (after, _) = doc.articles();
    let (before, _) = Document::parse(NEWSLETTER_LEGACY).articles();
    assert_eq!(after, before);
}

// ============================================================================
// Batch runs
// ============================================================================

/// Store that edits every document right after it is read
struct EditingStore {
    inner: MemoryBlobStore,
}

#[async_trait]
impl BlobStore for EditingStore {
    fn name(&self) -> &'static str {
        "editing"
    }

    async fn list(&self, dir: &str) -> Result<Vec<BlobEntry>, CoreError> {
        self.inner.list(dir).await
    }

    async fn get(&self, path: &str) -> Result<Blob, CoreError> {
        let blob = self.inner.get(path).await?;
        self.inner.insert(path, format!("{}\n<!-- edited -->\n", blob.content));
        Ok(blob)
    }

    async fn put(
        &self,
        path: &str,
        content: &str,
        expected: Option<&str>,
        message: &str,
    ) -> Result<PutOutcome, CoreError> {
        self.inner.put(path, content, expected, message).await
    }
}

#[tokio::test]
async fn test_conflict_is_counted_not_fatal() {
    let inner = MemoryBlobStore::new();
    inner.insert("radar/content-radar-2026-01-20.md", RADAR_V1);
    inner.insert("radar/content-radar-2026-01-21.md", RADAR_V2);
    let store = EditingStore { inner };

    let report = migrate_radar_archive(&store, &Migrator::default(), "radar", false)
        .await
        .unwrap();

    assert_eq!(report.conflicts, 2);
    assert_eq!(report.migrated, 0);
    assert_eq!(report.errors.len(), 2);

    // The concurrent edit survives
    let content = store.inner.content("radar/content-radar-2026-01-20.md").unwrap();
    assert!(content.ends_with("<!-- edited -->\n"));
}

#[tokio::test]
async fn test_fs_archive_full_run() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("radar")).unwrap();
    std::fs::create_dir_all(root.join("newsletter")).unwrap();
    std::fs::write(root.join("radar/content-radar-2026-01-20.md"), RADAR_V1).unwrap();
    std::fs::write(root.join("radar/notes.md"), "scratch").unwrap();
    std::fs::write(root.join("newsletter/newsletter-digest-2026-01-20.md"), NEWSLETTER_LEGACY).unwrap();
    std::fs::write(root.join("x-drafts.md"), DRAFTS_V1).unwrap();

    let store = FsBlobStore::new(root);
    let migrator = Migrator::default();

    let radar = migrate_radar_archive(&store, &migrator, "radar", false).await.unwrap();
    let news = migrate_newsletter_archive(&store, &migrator, "newsletter", false)
        .await
        .unwrap();
    let drafts = migrate_drafts_file(&store, &migrator, "x-drafts.md", false)
        .await
        .unwrap();

    assert_eq!((radar.migrated, news.migrated, drafts.migrated), (1, 1, 1));
    assert_eq!(radar.records, 3);
    assert_eq!(news.records, 3);
    assert_eq!(drafts.records, 5);

    let radar_text = std::fs::read_to_string(root.join("radar/content-radar-2026-01-20.md")).unwrap();
    assert!(radar_text.starts_with("---\nformat: radar-v3\n"));
    assert_eq!(std::fs::read_to_string(root.join("radar/notes.md")).unwrap(), "scratch");

    // Second pass finds everything current
    let again = migrate_radar_archive(&store, &migrator, "radar", false).await.unwrap();
    assert_eq!((again.migrated, again.unchanged), (0, 1));
    let again = migrate_drafts_file(&store, &migrator, "x-drafts.md", false).await.unwrap();
    assert_eq!((again.migrated, again.unchanged), (0, 1));
}
