//! Output formatting for CLI commands
//!
//! Tables via comfy-table; every formatter takes `no_color` so output can be
//! piped into logs.

use anyhow::{bail, Result};
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};
use radarboard_core::migrate::MigrationReport;
use radarboard_core::models::{Draft, NewsletterArticle, RadarDay};
use radarboard_core::parsers::ParseReport;
use radarboard_core::{ArchiveName, DocumentKind, ErrorSeverity, ImportReport, LoadError, TableCounts};
use std::path::Path;

// ============================================================================
// Kind Resolution
// ============================================================================

/// Document kind from `--kind`, else from the file name
pub fn resolve_kind(path: &Path, explicit: Option<&str>) -> Result<DocumentKind> {
    if let Some(kind) = explicit {
        return match DocumentKind::parse(kind) {
            Some(kind) => Ok(kind),
            None => bail!("Unknown document kind '{}' (expected radar, drafts or newsletter)", kind),
        };
    }

    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    match ArchiveName::from_file_name(name) {
        Some(archive) => Ok(archive.kind),
        None => bail!(
            "Cannot infer document kind from '{}'; pass --kind radar|drafts|newsletter",
            path.display()
        ),
    }
}

// ============================================================================
// Formatters
// ============================================================================

fn table(headers: &[&str], no_color: bool) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    if no_color {
        table.set_header(headers.to_vec());
    } else {
        table.set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }
    table
}

pub fn format_radar_day(day: &RadarDay, no_color: bool) -> String {
    if day.item_count == 0 {
        return "No radar items found.".to_string();
    }

    let mut table = table(&["Section", "Title", "Lane", "Link"], no_color);
    for section in &day.sections {
        for item in &section.items {
            let link = if item.link.is_empty() { "-" } else { item.link.as_str() };
            table.add_row(Row::from(vec![
                truncate(&section.heading, 20),
                truncate(&item.title, 50),
                item.lane.clone(),
                truncate(link, 40),
            ]));
        }
    }

    let mut out = table.to_string();
    out.push_str(&format!(
        "\n{} items in {} sections",
        day.item_count,
        day.sections.len()
    ));
    if !day.clusters.is_empty() {
        out.push_str(&format!("\nClusters: {}", day.clusters.join(", ")));
    }
    out
}

pub fn format_drafts(drafts: &[Draft], no_color: bool) -> String {
    if drafts.is_empty() {
        return "No drafts found.".to_string();
    }

    let mut table = table(&["Date", "Type", "Status", "Preview"], no_color);
    for draft in drafts {
        let date = match &draft.time {
            Some(time) => format!("{} {}", draft.date, time),
            None => draft.date.to_string(),
        };
        let kind = match &draft.reply_to {
            Some(handle) => format!("reply @{}", handle),
            None => draft.kind.to_string(),
        };
        let preview = draft.content.lines().next().unwrap_or_default();
        table.add_row(Row::from(vec![
            date,
            kind,
            draft.status.to_string(),
            truncate(preview, 50),
        ]));
    }
    table.to_string()
}

pub fn format_articles(articles: &[NewsletterArticle], no_color: bool) -> String {
    if articles.is_empty() {
        return "No articles found.".to_string();
    }

    let mut table = table(&["Title", "Source", "Category"], no_color);
    for article in articles {
        table.add_row(Row::from(vec![
            truncate(&article.title, 50),
            article.source.clone(),
            article.category.clone().unwrap_or_else(|| "-".to_string()),
        ]));
    }
    table.to_string()
}

pub fn format_diagnostics(report: &ParseReport, no_color: bool) -> String {
    if report.is_clean() {
        return "No dropped candidates.".to_string();
    }

    let mut table = table(&["Line", "Reason"], no_color);
    for diagnostic in &report.dropped {
        table.add_row(Row::from(vec![
            diagnostic.line.to_string(),
            diagnostic.reason.to_string(),
        ]));
    }
    table.to_string()
}

pub fn format_migration_report(kind: DocumentKind, report: &MigrationReport) -> String {
    let verb = if report.dry_run { "would migrate" } else { "migrated" };
    let mut lines = vec![format!(
        "{}: {} {}, {} unchanged, {} skipped, {} conflicts, {} failed ({} records)",
        kind,
        report.migrated,
        verb,
        report.unchanged,
        report.skipped,
        report.conflicts,
        report.failed,
        report.records
    )];
    lines.extend(report.errors.iter().map(format_load_error));
    lines.join("\n")
}

pub fn format_import_report(report: &ImportReport, no_color: bool) -> String {
    let mut out = format_table_counts(&report.inserted, no_color);
    out.push_str(&format!(
        "\n{} documents read, {} candidates dropped",
        report.documents, report.dropped
    ));
    for error in &report.errors {
        out.push('\n');
        out.push_str(&format_load_error(error));
    }
    out
}

pub fn format_table_counts(counts: &TableCounts, no_color: bool) -> String {
    let mut table = table(&["Table", "Rows"], no_color);
    for (name, rows) in counts.rows() {
        table.add_row(Row::from(vec![name.to_string(), rows.to_string()]));
    }
    table.to_string()
}

fn format_load_error(error: &LoadError) -> String {
    let label = match error.severity {
        ErrorSeverity::Warning => "warning",
        ErrorSeverity::Error => "error",
    };
    match &error.suggestion {
        Some(hint) => format!("  {} {}: {} ({})", label, error.source, error.message, hint),
        None => format!("  {} {}: {}", label, error.source, error.message),
    }
}

// ============================================================================
// Utilities
// ============================================================================

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        // Char-based so multi-byte titles never split mid-character
        s.chars().take(max - 1).collect::<String>() + "…"
    }
}
