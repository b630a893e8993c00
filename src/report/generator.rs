//! Report generation.
//!
//! Renders a [`BatchReport`] as Markdown, JSON or plain text, and lists
//! the items of a single label for browsing.

use crate::analysis::LabelIndex;
use crate::models::{BatchReport, DailyAverageSeries, FrequencyReport, ReportMetadata, SentimentLabel};
use anyhow::Result;

/// Rendering options shared by all formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Characters of each item shown before truncation.
    pub preview_chars: usize,
    /// Include the items-by-label section.
    pub include_items: bool,
    /// Width of the breakdown bars, in characters.
    pub bar_width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            preview_chars: 300,
            include_items: true,
            bar_width: 30,
        }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &BatchReport, options: &RenderOptions) -> String {
    let mut output = String::new();

    output.push_str("# Sentiment Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_breakdown_section(&report.frequencies, options.bar_width));
    output.push_str(&generate_daily_section(
        report.daily_averages.as_ref(),
        report.daily_unavailable.as_deref(),
    ));

    if options.include_items {
        output.push_str(&generate_items_section(&report.items_by_label, options.preview_chars));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Subreddit:** r/{}\n", metadata.subreddit));
    section.push_str(&format!("- **Query:** `{}`\n", metadata.query));
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Items Analyzed:** {} ({} posts, {} comments)\n",
        metadata.items_analyzed, metadata.posts, metadata.comments
    ));
    section.push_str(&format!(
        "- **Thresholds:** {} | **Day Boundary:** {}\n",
        metadata.thresholds, metadata.day_boundary
    ));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the label breakdown table.
fn generate_breakdown_section(frequencies: &FrequencyReport, bar_width: usize) -> String {
    let mut section = String::new();

    section.push_str("## Sentiment Breakdown\n\n");

    if frequencies.is_empty() {
        section.push_str("No items matched this search.\n\n");
        return section;
    }

    let total = frequencies.total();
    let max = frequencies.iter().map(|e| e.count).max().unwrap_or(0);

    section.push_str("| Label | Count | Share | |\n");
    section.push_str("|:---|:---:|:---:|:---|\n");
    for entry in frequencies.iter() {
        section.push_str(&format!(
            "| {} {} | {} | {:.1}% | `{}` |\n",
            entry.label.emoji(),
            entry.label,
            entry.count,
            share(entry.count, total),
            bar(entry.count, max, bar_width)
        ));
    }
    section.push_str(&format!("| **Total** | **{}** | | |\n\n", total));

    section
}

/// Generate the per-day average section.
fn generate_daily_section(series: Option<&DailyAverageSeries>, unavailable: Option<&str>) -> String {
    let mut section = String::new();

    section.push_str("## Daily Average Sentiment\n\n");

    let Some(series) = series else {
        section.push_str(&format!(
            "*Unavailable: {}*\n\n",
            unavailable.unwrap_or("no timestamps")
        ));
        return section;
    };

    if series.is_empty() {
        section.push_str("No dated items.\n\n");
        return section;
    }

    section.push_str("| Date | Average | Items |\n");
    section.push_str("|:---|:---:|:---:|\n");
    for (date, day) in series.days() {
        section.push_str(&format!(
            "| {} | {:+.3} | {} |\n",
            date.format("%Y-%m-%d"),
            day.mean,
            day.samples
        ));
    }
    section.push('\n');

    section
}

/// Generate the items-by-label section.
fn generate_items_section(index: &LabelIndex, preview_chars: usize) -> String {
    let mut section = String::new();

    section.push_str("## Items by Label\n\n");

    if index.is_empty() {
        section.push_str("Nothing to show.\n\n");
        return section;
    }

    for (label, items) in index.iter() {
        section.push_str(&format!(
            "### {} {} ({})\n\n",
            label.emoji(),
            label,
            items.len()
        ));
        for item in items {
            let quoted = preview(item, preview_chars).replace('\n', "\n> ");
            section.push_str(&format!("> {}\n\n", quoted));
        }
    }

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by sentiscope*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &BatchReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate a plain-text report: each item under its label, then the counts.
pub fn generate_text_report(report: &BatchReport, options: &RenderOptions) -> String {
    let mut output = String::new();

    if options.include_items {
        for (label, items) in report.items_by_label.iter() {
            for item in items {
                output.push_str(&format!("\n[{}]\n{}\n", label, preview(item, options.preview_chars)));
            }
        }
        output.push('\n');
    }

    output.push_str(&generate_summary(&report.frequencies, options.bar_width));

    if let Some(ref series) = report.daily_averages {
        if !series.is_empty() {
            output.push_str("\nDaily averages:\n");
            for (date, day) in series.days() {
                output.push_str(&format!(
                    "  {}  {:+.3}  ({} items)\n",
                    date.format("%Y-%m-%d"),
                    day.mean,
                    day.samples
                ));
            }
        }
    } else if let Some(ref reason) = report.daily_unavailable {
        output.push_str(&format!("\nDaily averages unavailable: {}\n", reason));
    }

    output
}

/// Console summary of the label counts, with the menu number of each label.
pub fn generate_summary(frequencies: &FrequencyReport, bar_width: usize) -> String {
    if frequencies.is_empty() {
        return "No items matched this search.\n".to_string();
    }

    let total = frequencies.total();
    let max = frequencies.iter().map(|e| e.count).max().unwrap_or(0);
    let mut lines = Vec::new();

    lines.push(format!("Sentiment breakdown ({} items):", total));
    for entry in frequencies.iter() {
        lines.push(format!(
            "  [{}] {:<18} {:>5}  {:>5.1}%  {}",
            entry.label.rank() + 1,
            entry.label.to_string(),
            entry.count,
            share(entry.count, total),
            bar(entry.count, max, bar_width)
        ));
    }

    let mut summary = lines.join("\n");
    summary.push('\n');
    summary
}

/// List the items of one label.
pub fn generate_label_listing(index: &LabelIndex, label: SentimentLabel, preview_chars: usize) -> String {
    let items = index.lookup(label);
    if items.is_empty() {
        return format!("No {} items.\n", label);
    }

    let mut output = format!("{} {} ({} items)\n", label.emoji(), label, items.len());
    for (i, item) in items.iter().enumerate() {
        output.push_str(&format!("\n#{}\n{}\n", i + 1, preview(item, preview_chars)));
    }
    output
}

/// First `max_chars` characters of `text`, with "..." when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn share(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

fn bar(count: usize, max: usize, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let filled = ((count as f64 / max as f64) * width as f64).round() as usize;
    "█".repeat(filled.max(usize::from(count > 0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Classifier, DayBoundary, Pipeline};
    use crate::models::{SourceKind, TextItem};
    use chrono::{TimeZone, Utc};

    fn create_test_report(items: Vec<TextItem>) -> BatchReport {
        let scorer = |text: &str| {
            if text.contains("love") {
                0.8
            } else if text.contains("hate") {
                -0.7
            } else {
                0.0
            }
        };
        let pipeline = Pipeline::new(&scorer, Classifier::default(), DayBoundary::Utc);
        let outcome = pipeline.ingest(items).unwrap();

        let metadata = ReportMetadata {
            subreddit: "rust".to_string(),
            query: "borrow checker".to_string(),
            source: "test".to_string(),
            generated_at: Utc::now(),
            thresholds: "compound".to_string(),
            day_boundary: "utc".to_string(),
            items_analyzed: 0,
            posts: 0,
            comments: 0,
            duration_seconds: 1.5,
        };
        BatchReport::from_outcome(metadata, outcome)
    }

    fn sample_items() -> Vec<TextItem> {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        vec![
            TextItem::new("I love the borrow checker", SourceKind::Post, ts),
            TextItem::new("I hate lifetimes\nsecond line", SourceKind::Comment, ts),
            TextItem::new("It exists", SourceKind::Comment, ts),
        ]
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report(sample_items());
        let markdown = generate_markdown_report(&report, &RenderOptions::default());

        assert!(markdown.contains("# Sentiment Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("r/rust"));
        assert!(markdown.contains("3 (1 posts, 2 comments)"));
        assert!(markdown.contains("## Sentiment Breakdown"));
        assert!(markdown.contains("Very Positive"));
        assert!(markdown.contains("## Daily Average Sentiment"));
        assert!(markdown.contains("2024-05-01"));
        assert!(markdown.contains("> I hate lifetimes\n> second line"));
        // Labels with no items are left out.
        assert!(!markdown.contains("Slightly Positive"));
    }

    #[test]
    fn test_markdown_without_items() {
        let report = create_test_report(sample_items());
        let options = RenderOptions {
            include_items: false,
            ..RenderOptions::default()
        };
        let markdown = generate_markdown_report(&report, &options);
        assert!(!markdown.contains("## Items by Label"));
    }

    #[test]
    fn test_empty_report() {
        let report = create_test_report(Vec::new());
        let markdown = generate_markdown_report(&report, &RenderOptions::default());
        assert!(markdown.contains("No items matched this search."));
        assert!(markdown.contains("No dated items."));
        assert!(markdown.contains("Nothing to show."));
    }

    #[test]
    fn test_missing_timestamp_message() {
        let mut items = sample_items();
        items[2].created_at = None;
        let report = create_test_report(items);
        assert!(report.daily_averages.is_none());

        let markdown = generate_markdown_report(&report, &RenderOptions::default());
        assert!(markdown.contains("*Unavailable: item #2 has no creation timestamp*"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report(sample_items());
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"metadata\""));
        assert!(json.contains("\"frequencies\""));
        assert!(json.contains("\"very_positive\""));
        assert!(json.contains("\"2024-05-01\""));
        assert!(!json.contains("daily_unavailable"));
    }

    #[test]
    fn test_generate_text_report() {
        let report = create_test_report(sample_items());
        let text = generate_text_report(&report, &RenderOptions::default());

        assert!(text.contains("[Very Positive]\nI love the borrow checker"));
        assert!(text.contains("Sentiment breakdown (3 items):"));
        assert!(text.contains("Daily averages:"));
    }

    #[test]
    fn test_label_listing() {
        let report = create_test_report(sample_items());
        let listing =
            generate_label_listing(&report.items_by_label, SentimentLabel::VeryNegative, 5);
        assert!(listing.contains("(1 items)"));
        assert!(listing.contains("I hat..."));

        let empty = generate_label_listing(&report.items_by_label, SentimentLabel::Positive, 5);
        assert_eq!(empty, "No Positive items.\n");
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        assert_eq!(preview("short", 300), "short");
        assert_eq!(preview("héllo wörld", 4), "héll...");
        assert_eq!(preview("exact", 5), "exact");
    }

    #[test]
    fn test_bar_lengths() {
        assert_eq!(bar(10, 10, 4).chars().count(), 4);
        assert_eq!(bar(1, 1000, 4).chars().count(), 1);
        assert_eq!(bar(0, 10, 4), "");
    }
}
