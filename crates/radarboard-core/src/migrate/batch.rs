//! Migrate whole archive directories through a [`BlobStore`]
//!
//! Files are processed one at a time. A failed fetch, a conflicting write or
//! an unparseable document is recorded in the [`MigrationReport`] and the
//! batch moves on.

use super::{Migration, Migrator};
use crate::blob::{BlobStore, PutOutcome};
use crate::document::{ArchiveName, DocumentKind};
use crate::error::{CoreError, LoadError};
use chrono::NaiveDate;

/// Outcome counts for one batch
#[derive(Debug, Clone, Default)]
pub struct MigrationReport {
    /// Rewritten (or, on a dry run, would be rewritten)
    pub migrated: usize,
    /// Already in the current format
    pub unchanged: usize,
    /// Legacy documents with nothing to migrate
    pub skipped: usize,
    /// Changed underneath us between read and write
    pub conflicts: usize,
    /// Fetch or write failures
    pub failed: usize,
    /// Records carried by migrated documents
    pub records: usize,
    pub errors: Vec<LoadError>,
    pub dry_run: bool,
}

impl MigrationReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    pub fn total(&self) -> usize {
        self.migrated + self.unchanged + self.skipped + self.conflicts + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.conflicts > 0 || self.failed > 0
    }

    pub fn merge(&mut self, other: MigrationReport) {
        self.migrated += other.migrated;
        self.unchanged += other.unchanged;
        self.skipped += other.skipped;
        self.conflicts += other.conflicts;
        self.failed += other.failed;
        self.records += other.records;
        self.errors.extend(other.errors);
    }
}

/// Migrate every `content-radar-YYYY-MM-DD.md` under `dir` to radar v3
pub async fn migrate_radar_archive<S: BlobStore + ?Sized>(
    store: &S,
    migrator: &Migrator,
    dir: &str,
    dry_run: bool,
) -> Result<MigrationReport, CoreError> {
    migrate_dated(store, DocumentKind::Radar, dir, dry_run, |text, date| {
        migrator.plan_radar(text, date)
    })
    .await
}

/// Migrate every `newsletter-digest-YYYY-MM-DD.md` under `dir` to newsletter v2
pub async fn migrate_newsletter_archive<S: BlobStore + ?Sized>(
    store: &S,
    migrator: &Migrator,
    dir: &str,
    dry_run: bool,
) -> Result<MigrationReport, CoreError> {
    migrate_dated(store, DocumentKind::Newsletter, dir, dry_run, |text, date| {
        migrator.plan_newsletter(text, date)
    })
    .await
}

/// Migrate the drafts document at `path` to drafts v2
pub async fn migrate_drafts_file<S: BlobStore + ?Sized>(
    store: &S,
    migrator: &Migrator,
    path: &str,
    dry_run: bool,
) -> Result<MigrationReport, CoreError> {
    let mut report = MigrationReport::new(dry_run);
    migrate_one(store, path, dry_run, &mut report, |text| migrator.plan_drafts(text)).await;
    Ok(report)
}

async fn migrate_dated<S, F>(
    store: &S,
    kind: DocumentKind,
    dir: &str,
    dry_run: bool,
    plan: F,
) -> Result<MigrationReport, CoreError>
where
    S: BlobStore + ?Sized,
    F: Fn(&str, NaiveDate) -> Migration,
{
    let mut report = MigrationReport::new(dry_run);

    let entries = match store.list(dir).await {
        Ok(entries) => entries,
        Err(CoreError::DirectoryNotFound { .. }) => {
            tracing::warn!(store = store.name(), dir, %kind, "Archive directory not found");
            report
                .errors
                .push(LoadError::warning(dir, format!("No {} directory in archive", kind)));
            return Ok(report);
        }
        Err(e) => return Err(e),
    };

    let dated: Vec<_> = entries
        .iter()
        .filter_map(|entry| {
            let name = ArchiveName::from_file_name(&entry.name)?;
            (name.kind == kind).then_some((entry, name.date?))
        })
        .collect();

    tracing::info!(
        store = store.name(),
        dir,
        %kind,
        files = dated.len(),
        dry_run,
        "Migrating archive"
    );

    for (entry, date) in dated {
        migrate_one(store, &entry.path, dry_run, &mut report, |text| plan(text, date)).await;
    }

    tracing::info!(
        %kind,
        migrated = report.migrated,
        unchanged = report.unchanged,
        skipped = report.skipped,
        conflicts = report.conflicts,
        failed = report.failed,
        "Migration finished"
    );
    Ok(report)
}

async fn migrate_one<S, F>(
    store: &S,
    path: &str,
    dry_run: bool,
    report: &mut MigrationReport,
    plan: F,
) where
    S: BlobStore + ?Sized,
    F: FnOnce(&str) -> Migration,
{
    let blob = match store.get(path).await {
        Ok(blob) => blob,
        Err(e) => {
            tracing::warn!(path, error = %e, "Failed to fetch document");
            report.failed += 1;
            report.errors.push(LoadError::from_core_error(path, &e));
            return;
        }
    };

    let (content, records) = match plan(&blob.content) {
        Migration::Current => {
            tracing::debug!(path, "Already current");
            report.unchanged += 1;
            return;
        }
        Migration::NothingParsed => {
            report.skipped += 1;
            report.errors.push(
                LoadError::warning(path, "Legacy document produced no records")
                    .with_suggestion("Check the file by hand with `radarboard parse --diagnostics`"),
            );
            return;
        }
        Migration::WouldLose { dropped } => {
            report.skipped += 1;
            report.errors.push(
                LoadError::warning(
                    path,
                    format!("{} entries have invalid dates and would be lost", dropped),
                )
                .with_suggestion("Fix the dates by hand, then re-run the migration"),
            );
            return;
        }
        Migration::Rewritten { content, records } => (content, records),
    };

    if dry_run {
        tracing::info!(path, records, "Would migrate");
        report.migrated += 1;
        report.records += records;
        return;
    }

    let message = format!("Migrate {} to current format", path);
    match store.put(path, &content, Some(&blob.version), &message).await {
        Ok(PutOutcome::Written { version }) => {
            tracing::info!(path, records, %version, "Migrated");
            report.migrated += 1;
            report.records += records;
        }
        Ok(PutOutcome::Conflict) => {
            tracing::warn!(path, "Document changed during migration, not written");
            report.conflicts += 1;
            report.errors.push(
                LoadError::error(path, "Document changed between read and write")
                    .with_suggestion("Re-run the migration"),
            );
        }
        Err(e) => {
            tracing::warn!(path, error = %e, "Failed to write document");
            report.failed += 1;
            report.errors.push(LoadError::from_core_error(path, &e));
        }
    }
}
