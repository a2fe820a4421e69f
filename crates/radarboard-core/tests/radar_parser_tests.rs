//! Integration tests for the radar parser over archive fixtures

use radarboard_core::parsers::{DropReason, LaneRule, LaneTable, RadarFormat, RadarParser};
use radarboard_core::Document;

const V1: &str = include_str!("fixtures/radar-v1.md");
const V2: &str = include_str!("fixtures/radar-v2.md");
const V3: &str = include_str!("fixtures/radar-v3.md");

#[test]
fn test_detects_each_dialect() {
    assert_eq!(RadarFormat::detect(V1), RadarFormat::V1);
    assert_eq!(RadarFormat::detect(V2), RadarFormat::V2);
    assert_eq!(RadarFormat::detect(V3), RadarFormat::V3);
}

#[test]
fn test_parse_v1_fixture() {
    let day = RadarParser::default().parse_day(V1);

    assert_eq!(day.item_count, 3);
    assert_eq!(day.scan_sources, vec!["Hacker News", "Reddit"]);
    assert_eq!(day.clusters, vec!["Local inference", "Rust"]);

    let items: Vec<_> = day.items().collect();
    assert_eq!(items[0].title, "Show HN: Tiny vector DB");
    assert_eq!(items[0].link, "https://news.ycombinator.com/item?id=1");
    assert_eq!(items[0].lane, "HN");
    assert_eq!(items[0].note, "Embeddable and fast");

    // Quote line attaches to the preceding item with its prefix removed
    assert_eq!(items[1].title, "Rust 2026 roadmap");
    assert_eq!(items[1].note, "Async closures land\ngood newsletter lead");

    assert_eq!(items[2].source, "Reddit");
    assert_eq!(items[2].lane, "Community");
}

#[test]
fn test_scan_quality_never_leaks() {
    let day = RadarParser::default().parse_day(V1);
    assert!(day.items().all(|item| item.title != "Coverage"));
    assert!(!day.scan_sources.iter().any(|s| s == "Scan Quality"));
    assert!(day.cluster_lines.iter().all(|line| !line.contains("Coverage")));
}

#[test]
fn test_parse_v2_fixture() {
    let day = RadarParser::default().parse_day(V2);

    assert_eq!(day.item_count, 2);
    let items: Vec<_> = day.items().collect();

    assert_eq!(items[0].title, "Claude model card update");
    assert_eq!(items[0].link, "https://anthropic.com/news/card");
    assert_eq!(items[0].lane, "AI");
    assert_eq!(
        items[0].note,
        "Clarifies eval setup\nRelevant for the safety newsletter"
    );

    // En dash separator
    assert_eq!(items[1].title, "ratatui 1.0");
    assert_eq!(items[1].lane, "Dev Tools");
    assert_eq!(items[1].note, "Stable TUI API");

    assert_eq!(day.clusters, vec!["Tooling"]);
}

#[test]
fn test_parse_v3_fixture() {
    let day = RadarParser::default().parse_day(V3);

    assert_eq!(day.item_count, 2);
    assert_eq!(day.scan_sources, vec!["Hacker News"]);

    let items: Vec<_> = day.items().collect();
    assert_eq!(items[0].note, "Embeddable and fast\nGood newsletter lead");
    assert_eq!(items[0].bullets().count(), 2);

    assert_eq!(items[1].title, "No-link note");
    assert_eq!(items[1].link, "");
    assert_eq!(items[1].lane, "Research");
}

#[test]
fn test_custom_lane_table() {
    let lanes = LaneTable::new(vec![LaneRule::new("REDDIT", "Forums")]);
    let day = RadarParser::new(lanes).parse_day(V1);

    let lanes: Vec<_> = day.items().map(|i| i.lane.as_str()).collect();
    // No rule for Hacker News: the heading is the lane
    assert_eq!(lanes, vec!["Hacker News", "Hacker News", "Forums"]);
}

#[test]
fn test_untitled_candidate_is_reported() {
    let body = "## Hacker News\n- Lane: HN\n- Why:\n  - orphan bullet\n### Real item\n";
    let (day, report) = RadarParser::default().parse_day_with_report(body);

    assert_eq!(day.item_count, 1);
    assert_eq!(report.count(DropReason::MissingTitle), 1);
}

#[test]
fn test_document_with_frontmatter() {
    let text = format!("---\nformat: radar-v3\ndate: 2026-01-20\n---\n{}", V3);
    let doc = Document::parse(&text);

    assert!(doc.has_frontmatter);
    assert_eq!(doc.format(), Some("radar-v3"));
    assert_eq!(doc.radar_format(), RadarFormat::V3);

    let (day, report) = doc.radar_day(&RadarParser::default());
    assert_eq!(day.item_count, 2);
    assert!(report.is_clean());
}

#[test]
fn test_empty_and_garbage_bodies() {
    let parser = RadarParser::default();
    assert_eq!(parser.parse_day("").item_count, 0);
    assert_eq!(parser.parse_day("just prose\nwith no structure\n").item_count, 0);
    assert_eq!(RadarFormat::detect(""), RadarFormat::V3);
}
