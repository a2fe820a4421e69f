//! radarboard - content archive tooling
//!
//! Detects, parses and migrates the markdown archive (radar scans, newsletter
//! digests, social drafts) and loads it into the SQLite record store.

mod cli;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use radarboard_core::blob::{BlobStore, FsBlobStore, GithubBlobStore};
use radarboard_core::migrate::{
    migrate_drafts_file, migrate_newsletter_archive, migrate_radar_archive, MigrationReport,
};
use radarboard_core::parsers::{ParseReport, RadarParser};
use radarboard_core::{import_archive, BoardConfig, Document, DocumentKind, Migrator, RecordStore};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "radarboard",
    version,
    about = "Content radar, newsletter and drafts archive tooling",
    long_about = "Parses and normalizes the markdown content archive.\n\
                  \n\
                  Examples:\n\
                    radarboard detect radar/content-radar-2026-02-14.md\n\
                    radarboard parse x-drafts.md --json\n\
                    radarboard migrate --dry-run              # Preview local archive migration\n\
                    radarboard migrate --source github        # Migrate the GitHub archive\n\
                    radarboard import --db archive.db\n\
                    radarboard stats\n\
                  \n\
                  Environment Variables:\n\
                    RADARBOARD_CONFIG                # Config file path\n\
                    RADARBOARD_NO_COLOR              # Disable ANSI colors\n\
                    GITHUB_TOKEN                     # Required for --source github\n\
                    RUST_LOG                         # Log filter (default: radarboard=info)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to config file (default: <config dir>/radarboard/config.toml)
    #[arg(long, global = true, env = "RADARBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Local archive directory (overrides config)
    #[arg(long, global = true)]
    archive_dir: Option<PathBuf>,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, global = true, env = "RADARBOARD_NO_COLOR")]
    no_color: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print the radar dialect of a file (v1, v2 or v3)
    Detect {
        file: PathBuf,
    },
    /// Parse a document and print its records
    Parse {
        file: PathBuf,
        /// Document kind (default: inferred from the file name)
        #[arg(long, value_parser = ["radar", "drafts", "newsletter"])]
        kind: Option<String>,
        /// Output records as JSON
        #[arg(long)]
        json: bool,
        /// Also list dropped candidates
        #[arg(long)]
        diagnostics: bool,
    },
    /// Rewrite legacy documents in the current formats
    Migrate {
        /// Archive to migrate
        #[arg(long, value_enum, default_value_t = Source::Fs)]
        source: Source,
        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
        /// Restrict to one document kind
        #[arg(long, value_parser = ["radar", "drafts", "newsletter"])]
        only: Option<String>,
    },
    /// Load the archive into the record store
    Import {
        #[arg(long, value_enum, default_value_t = Source::Fs)]
        source: Source,
        /// SQLite database path (overrides config)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Print record store row counts
    Stats {
        /// SQLite database path (overrides config)
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Source {
    /// Local archive directory
    Fs,
    /// GitHub repository via the contents API
    Github,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("radarboard=info,radarboard_core=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .init();

    let mut config = BoardConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(dir) = cli.archive_dir {
        config.archive_dir = dir;
    }
    let no_color = cli.no_color;

    match cli.command {
        Command::Detect { file } => run_detect(&file),
        Command::Parse {
            file,
            kind,
            json,
            diagnostics,
        } => run_parse(&config, &file, kind.as_deref(), json, diagnostics, no_color),
        Command::Migrate {
            source,
            dry_run,
            only,
        } => run_migrate(&config, source, dry_run, only.as_deref()).await,
        Command::Import { source, db } => {
            let db = db.unwrap_or_else(|| config.database.clone());
            run_import(&config, source, &db, no_color).await
        }
        Command::Stats { db } => {
            let db = db.unwrap_or_else(|| config.database.clone());
            run_stats(&db, no_color)
        }
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn open_store(config: &BoardConfig, source: Source) -> Result<Box<dyn BlobStore>> {
    Ok(match source {
        Source::Fs => {
            if !config.archive_dir.is_dir() {
                anyhow::bail!("Archive directory not found: {}", config.archive_dir.display());
            }
            Box::new(FsBlobStore::new(&config.archive_dir))
        }
        Source::Github => Box::new(
            GithubBlobStore::from_env(config.github.clone())
                .context("Cannot open the GitHub archive")?,
        ),
    })
}

// ============================================================================
// Command Handlers
// ============================================================================

fn run_detect(file: &Path) -> Result<()> {
    let text = read_file(file)?;
    let doc = Document::parse(&text);
    println!("{}", doc.radar_format());
    Ok(())
}

fn run_parse(
    config: &BoardConfig,
    file: &Path,
    kind: Option<&str>,
    json: bool,
    diagnostics: bool,
    no_color: bool,
) -> Result<()> {
    let kind = cli::resolve_kind(file, kind)?;
    let text = read_file(file)?;
    let doc = Document::parse(&text);

    let (output, report): (String, ParseReport) = match kind {
        DocumentKind::Radar => {
            let (day, report) = doc.radar_day(&RadarParser::new(config.lane_table()));
            let output = if json {
                serde_json::to_string_pretty(&day).context("Failed to serialize radar day")?
            } else {
                cli::format_radar_day(&day, no_color)
            };
            (output, report)
        }
        DocumentKind::Drafts => {
            let (drafts, report) = doc.drafts();
            let output = if json {
                serde_json::to_string_pretty(&drafts).context("Failed to serialize drafts")?
            } else {
                cli::format_drafts(&drafts, no_color)
            };
            (output, report)
        }
        DocumentKind::Newsletter => {
            let (articles, report) = doc.articles();
            let output = if json {
                serde_json::to_string_pretty(&articles).context("Failed to serialize articles")?
            } else {
                cli::format_articles(&articles, no_color)
            };
            (output, report)
        }
    };

    println!("{}", output);
    if diagnostics {
        if json {
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&report.dropped)
                    .context("Failed to serialize diagnostics")?
            );
        } else {
            eprintln!("{}", cli::format_diagnostics(&report, no_color));
        }
    }
    Ok(())
}

async fn run_migrate(
    config: &BoardConfig,
    source: Source,
    dry_run: bool,
    only: Option<&str>,
) -> Result<()> {
    let store = open_store(config, source)?;
    let migrator = Migrator::new(RadarParser::new(config.lane_table()));
    let only = only.and_then(DocumentKind::parse);
    let wants = |kind: DocumentKind| only.map_or(true, |o| o == kind);
    let layout = &config.layout;

    let mut reports: Vec<(DocumentKind, MigrationReport)> = Vec::new();

    if wants(DocumentKind::Radar) {
        let report = migrate_radar_archive(&*store, &migrator, &layout.radar_dir, dry_run)
            .await
            .context("Radar migration failed")?;
        reports.push((DocumentKind::Radar, report));
    }
    if wants(DocumentKind::Newsletter) {
        let report = migrate_newsletter_archive(&*store, &migrator, &layout.newsletter_dir, dry_run)
            .await
            .context("Newsletter migration failed")?;
        reports.push((DocumentKind::Newsletter, report));
    }
    if wants(DocumentKind::Drafts) {
        let report = migrate_drafts_file(&*store, &migrator, &layout.drafts_path, dry_run)
            .await
            .context("Drafts migration failed")?;
        reports.push((DocumentKind::Drafts, report));
    }

    if dry_run {
        println!("Dry run: nothing was written");
    }
    for (kind, report) in &reports {
        if report.has_failures() {
            tracing::warn!(
                %kind,
                conflicts = report.conflicts,
                failed = report.failed,
                "Some documents were not migrated"
            );
        }
        println!("{}", cli::format_migration_report(*kind, report));
    }
    Ok(())
}

async fn run_import(config: &BoardConfig, source: Source, db: &Path, no_color: bool) -> Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::{Duration, Instant};

    let start = Instant::now();
    let store = open_store(config, source)?;
    let records = RecordStore::open(db)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .context("Invalid spinner template")?
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(format!("Importing archive from {}...", store.name()));

    let result = import_archive(
        &*store,
        &records,
        &config.layout,
        &RadarParser::new(config.lane_table()),
    )
    .await;

    let report = match result {
        Ok(report) if report.has_errors() => {
            tracing::warn!(errors = report.errors.len(), "Import finished with errors");
            report
        }
        Ok(report) => report,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.context("Import failed"));
        }
    };

    spinner.finish_with_message(format!(
        "✓ Imported {} documents in {:.2}s",
        report.documents,
        start.elapsed().as_secs_f64()
    ));
    println!("{}", cli::format_import_report(&report, no_color));
    println!("Database: {}", db.display());
    Ok(())
}

fn run_stats(db: &Path, no_color: bool) -> Result<()> {
    if !db.exists() {
        println!("No record store at {}", db.display());
        println!("Run `radarboard import` first.");
        return Ok(());
    }

    let records = RecordStore::open(db)?;
    let counts = records.table_counts()?;

    println!("radarboard - Record Store");
    println!("=========================");
    println!("{}", cli::format_table_counts(&counts, no_color));
    println!("Total rows: {}", counts.total());
    Ok(())
}
