//! Load the markdown archive into the record store

use crate::blob::BlobStore;
use crate::config::ArchiveLayout;
use crate::document::{ArchiveName, Document, DocumentKind};
use crate::error::{CoreError, LoadError};
use crate::parsers::RadarParser;
use crate::records::{RecordStore, TableCounts};
use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

/// What an import wrote and what it could not read
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// Documents fetched and parsed
    pub documents: usize,
    /// Rows inserted per table
    pub inserted: TableCounts,
    /// Candidates the parsers dropped for missing required fields
    pub dropped: usize,
    #[serde(skip)]
    pub errors: Vec<LoadError>,
}

impl ImportReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parse every radar scan, newsletter digest and the drafts file, inserting
/// the records. Per-document failures are recorded and skipped.
pub async fn import_archive<S: BlobStore + ?Sized>(
    blobs: &S,
    records: &RecordStore,
    layout: &ArchiveLayout,
    parser: &RadarParser,
) -> Result<ImportReport> {
    let mut report = ImportReport::default();

    for (path, date) in dated_documents(blobs, DocumentKind::Radar, &layout.radar_dir, &mut report).await? {
        let Some(text) = fetch(blobs, &path, &mut report).await else {
            continue;
        };
        let (day, parsed) = Document::parse(&text).radar_day(parser);
        report.dropped += parsed.dropped.len();

        match records.insert_radar_day(date, &day) {
            Ok(n) => {
                report.inserted.radar_items += n;
                report.inserted.radar_clusters += day.clusters.len();
            }
            Err(e) => report.errors.push(LoadError::error(&path, format!("{:#}", e))),
        }
    }

    for (path, date) in
        dated_documents(blobs, DocumentKind::Newsletter, &layout.newsletter_dir, &mut report).await?
    {
        let Some(text) = fetch(blobs, &path, &mut report).await else {
            continue;
        };
        let (articles, parsed) = Document::parse(&text).articles();
        report.dropped += parsed.dropped.len();

        match records.insert_articles(date, &articles) {
            Ok(n) => report.inserted.newsletter_articles += n,
            Err(e) => report.errors.push(LoadError::error(&path, format!("{:#}", e))),
        }
    }

    if let Some(text) = fetch(blobs, &layout.drafts_path, &mut report).await {
        let (drafts, parsed) = Document::parse(&text).drafts();
        report.dropped += parsed.dropped.len();

        match records.insert_drafts(&drafts) {
            Ok(n) => {
                report.inserted.drafts += n;
                report.inserted.content_feedback += drafts.iter().filter(|d| d.feedback.is_some()).count();
            }
            Err(e) => report
                .errors
                .push(LoadError::error(&layout.drafts_path, format!("{:#}", e))),
        }
    }

    tracing::info!(
        store = blobs.name(),
        documents = report.documents,
        rows = report.inserted.total(),
        dropped = report.dropped,
        errors = report.errors.len(),
        "Import finished"
    );
    Ok(report)
}

/// Dated archive files of one kind under `dir`, oldest first
async fn dated_documents<S: BlobStore + ?Sized>(
    blobs: &S,
    kind: DocumentKind,
    dir: &str,
    report: &mut ImportReport,
) -> Result<Vec<(String, NaiveDate)>, CoreError> {
    let entries = match blobs.list(dir).await {
        Ok(entries) => entries,
        Err(CoreError::DirectoryNotFound { .. }) => {
            tracing::warn!(dir, %kind, "Archive directory not found");
            report
                .errors
                .push(LoadError::warning(dir, format!("No {} directory in archive", kind)));
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    Ok(entries
        .into_iter()
        .filter_map(|entry| {
            let name = ArchiveName::from_file_name(&entry.name)?;
            (name.kind == kind).then_some((entry.path, name.date?))
        })
        .collect())
}

async fn fetch<S: BlobStore + ?Sized>(
    blobs: &S,
    path: &str,
    report: &mut ImportReport,
) -> Option<String> {
    match blobs.get(path).await {
        Ok(blob) => {
            report.documents += 1;
            Some(blob.content)
        }
        Err(e) => {
            tracing::warn!(path, error = %e, "Skipping unreadable document");
            report.errors.push(LoadError::from_core_error(path, &e));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::MemoryBlobStore;
    use crate::models::DraftStatus;

    #[tokio::test]
    async fn test_import_all_kinds() {
        let blobs = MemoryBlobStore::new();
        blobs.insert(
            "radar/content-radar-2026-02-14.md",
            "## GitHub\n**[repo](https://g.example)** — stars\n",
        );
        blobs.insert(
            "newsletter/newsletter-digest-2026-02-14.md",
            "### Funding round\n- source: Wire\n- link: https://w.example\nDetails\n",
        );
        blobs.insert(
            "x-drafts.md",
            "---\nformat: drafts-v2\n---\n## Rejected\n\n### 2026-02-14 | Original\n> Nope\n_Feedback: off topic_\n",
        );

        let records = RecordStore::open_in_memory().unwrap();
        let report = import_archive(&blobs, &records, &ArchiveLayout::default(), &RadarParser::default())
            .await
            .unwrap();

        assert_eq!(report.documents, 3);
        assert!(!report.has_errors());
        assert_eq!(report.inserted.radar_items, 1);
        assert_eq!(report.inserted.newsletter_articles, 1);
        assert_eq!(report.inserted.drafts, 1);
        assert_eq!(report.inserted.content_feedback, 1);
        assert_eq!(records.table_counts().unwrap(), report.inserted);

        let rejected = records.drafts_with_status(DraftStatus::Rejected).unwrap();
        assert_eq!(rejected[0].feedback.as_deref(), Some("off topic"));
    }

    #[tokio::test]
    async fn test_missing_pieces_are_reported_not_fatal() {
        let blobs = MemoryBlobStore::new();
        blobs.insert("radar/content-radar-2026-02-14.md", "## Reddit\n**[t](https://r.example)** — x\n");

        let records = RecordStore::open_in_memory().unwrap();
        let report = import_archive(&blobs, &records, &ArchiveLayout::default(), &RadarParser::default())
            .await
            .unwrap();

        assert_eq!(report.inserted.radar_items, 1);
        // newsletter dir and drafts file are both absent
        assert_eq!(report.errors.len(), 2);
    }
}
