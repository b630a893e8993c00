//! Data models for the sentiment engine.
//!
//! This module contains the core data structures shared by the providers,
//! the classification engine and the report generators.

use crate::analysis::{BatchOutcome, LabelIndex};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Where a text item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Post,
    Comment,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Post => write!(f, "post"),
            SourceKind::Comment => write!(f, "comment"),
        }
    }
}

/// A single post or comment handed over by a content provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    /// Text to score. Providers substitute a post's title when its body is empty.
    pub content: String,
    /// Post or comment.
    pub source_kind: SourceKind,
    /// Creation time. `None` only when the provider could not supply one.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl TextItem {
    pub fn new(
        content: impl Into<String>,
        source_kind: SourceKind,
        created_at: impl Into<Option<DateTime<Utc>>>,
    ) -> Self {
        Self {
            content: content.into(),
            source_kind,
            created_at: created_at.into(),
        }
    }
}

/// Search parameters for one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Subreddit name without the `r/` prefix, or `all`.
    pub subreddit: String,
    /// Search keyword.
    pub keyword: String,
    /// Maximum number of posts (and of comments) to fetch.
    pub limit: usize,
    /// Whether recent comments mentioning the keyword are included.
    pub include_comments: bool,
}

/// The fixed sentiment taxonomy.
///
/// Variants are declared in canonical display order, Very Positive first,
/// so the derived `Ord` is the canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    VeryPositive,
    Positive,
    SlightlyPositive,
    Neutral,
    SlightlyNegative,
    Negative,
    VeryNegative,
}

impl SentimentLabel {
    /// All labels in canonical order.
    pub const ALL: [SentimentLabel; 7] = [
        SentimentLabel::VeryPositive,
        SentimentLabel::Positive,
        SentimentLabel::SlightlyPositive,
        SentimentLabel::Neutral,
        SentimentLabel::SlightlyNegative,
        SentimentLabel::Negative,
        SentimentLabel::VeryNegative,
    ];

    /// Position in canonical order (0 = Very Positive). Only for ordering.
    pub fn rank(&self) -> usize {
        *self as usize
    }

    /// Label at a canonical position.
    pub fn from_rank(rank: usize) -> Option<Self> {
        Self::ALL.get(rank).copied()
    }

    /// Returns an emoji representation of the label.
    pub fn emoji(&self) -> &'static str {
        match self {
            SentimentLabel::VeryPositive => "🟢",
            SentimentLabel::Positive => "🟩",
            SentimentLabel::SlightlyPositive => "🔹",
            SentimentLabel::Neutral => "⚪",
            SentimentLabel::SlightlyNegative => "🔸",
            SentimentLabel::Negative => "🟧",
            SentimentLabel::VeryNegative => "🔴",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SentimentLabel::VeryPositive => "Very Positive",
            SentimentLabel::Positive => "Positive",
            SentimentLabel::SlightlyPositive => "Slightly Positive",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::SlightlyNegative => "Slightly Negative",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::VeryNegative => "Very Negative",
        };
        f.write_str(name)
    }
}

impl FromStr for SentimentLabel {
    type Err = String;

    /// Accepts display names, snake_case, kebab-case or the 1-based menu number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(n) = trimmed.parse::<usize>() {
            return n
                .checked_sub(1)
                .and_then(Self::from_rank)
                .ok_or_else(|| format!("no label numbered {}", n));
        }

        let normalized: String = trimmed
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_lowercase();

        Self::ALL
            .iter()
            .copied()
            .find(|label| label.to_string().replace(' ', "").to_lowercase() == normalized)
            .ok_or_else(|| format!("unknown sentiment label: {}", s))
    }
}

/// A label together with the score it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: SentimentLabel,
    pub score: f64,
}

/// One row of a frequency report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
    pub label: SentimentLabel,
    pub count: usize,
}

/// Label counts in canonical order, zero counts omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyReport {
    entries: Vec<LabelCount>,
}

impl FrequencyReport {
    pub(crate) fn from_entries(entries: Vec<LabelCount>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[LabelCount] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabelCount> {
        self.entries.iter()
    }

    /// Sum of all counts; equals the number of classified items.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Count for one label (0 when absent from the batch).
    pub fn count(&self, label: SentimentLabel) -> usize {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map_or(0, |e| e.count)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Mean sentiment for one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayAverage {
    pub mean: f64,
    pub samples: usize,
}

/// Per-day mean sentiment, iterated in ascending date order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyAverageSeries {
    days: BTreeMap<NaiveDate, DayAverage>,
}

impl DailyAverageSeries {
    pub(crate) fn from_days(days: BTreeMap<NaiveDate, DayAverage>) -> Self {
        Self { days }
    }

    /// `(date, mean)` pairs in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.days.iter().map(|(date, day)| (*date, day.mean))
    }

    /// Full per-day statistics in ascending date order.
    pub fn days(&self) -> impl Iterator<Item = (&NaiveDate, &DayAverage)> {
        self.days.iter()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Metadata about a batch report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Subreddit searched.
    pub subreddit: String,
    /// Search keyword.
    pub query: String,
    /// Human-readable description of the content source.
    pub source: String,
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
    /// Name of the threshold preset in use.
    pub thresholds: String,
    /// How timestamps were bucketed into days (`local` or `utc`).
    pub day_boundary: String,
    /// Number of items classified.
    pub items_analyzed: usize,
    /// Items that were posts.
    pub posts: usize,
    /// Items that were comments.
    pub comments: usize,
    /// Wall-clock duration of fetch and analysis in seconds.
    pub duration_seconds: f64,
}

/// Everything the presentation layer needs for one batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub metadata: ReportMetadata,
    /// Label counts in canonical order.
    pub frequencies: FrequencyReport,
    /// Per-day averages; absent when an item had no timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_averages: Option<DailyAverageSeries>,
    /// Why `daily_averages` is missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_unavailable: Option<String>,
    /// Item contents grouped by label.
    pub items_by_label: LabelIndex,
}

impl BatchReport {
    /// Builds a report from a finished batch, filling in the item counts.
    pub fn from_outcome(mut metadata: ReportMetadata, outcome: BatchOutcome) -> Self {
        metadata.items_analyzed = outcome.classified;
        metadata.posts = outcome.posts;
        metadata.comments = outcome.comments;

        let (daily_averages, daily_unavailable) = match outcome.daily {
            Ok(series) => (Some(series), None),
            Err(e) => (None, Some(e.to_string())),
        };

        Self {
            metadata,
            frequencies: outcome.frequencies,
            daily_averages,
            daily_unavailable,
            items_by_label: outcome.index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_canonical_order() {
        assert!(SentimentLabel::VeryPositive < SentimentLabel::Positive);
        assert!(SentimentLabel::Neutral < SentimentLabel::SlightlyNegative);
        assert!(SentimentLabel::Negative < SentimentLabel::VeryNegative);

        for (i, label) in SentimentLabel::ALL.iter().enumerate() {
            assert_eq!(label.rank(), i);
            assert_eq!(SentimentLabel::from_rank(i), Some(*label));
        }
        assert_eq!(SentimentLabel::from_rank(7), None);
    }

    #[test]
    fn test_label_display() {
        assert_eq!(SentimentLabel::VeryPositive.to_string(), "Very Positive");
        assert_eq!(SentimentLabel::Neutral.to_string(), "Neutral");
        assert_eq!(SentimentLabel::SlightlyNegative.to_string(), "Slightly Negative");
    }

    #[test]
    fn test_label_from_str() {
        assert_eq!("Very Positive".parse::<SentimentLabel>(), Ok(SentimentLabel::VeryPositive));
        assert_eq!("slightly_negative".parse::<SentimentLabel>(), Ok(SentimentLabel::SlightlyNegative));
        assert_eq!("very-negative".parse::<SentimentLabel>(), Ok(SentimentLabel::VeryNegative));
        assert_eq!("NEUTRAL".parse::<SentimentLabel>(), Ok(SentimentLabel::Neutral));
        assert_eq!("1".parse::<SentimentLabel>(), Ok(SentimentLabel::VeryPositive));
        assert_eq!("7".parse::<SentimentLabel>(), Ok(SentimentLabel::VeryNegative));
        assert!("0".parse::<SentimentLabel>().is_err());
        assert!("8".parse::<SentimentLabel>().is_err());
        assert!("ecstatic".parse::<SentimentLabel>().is_err());
    }

    #[test]
    fn test_label_serde_names() {
        let json = serde_json::to_string(&SentimentLabel::SlightlyPositive).unwrap();
        assert_eq!(json, "\"slightly_positive\"");
    }

    #[test]
    fn test_frequency_report_helpers() {
        let report = FrequencyReport::from_entries(vec![
            LabelCount {
                label: SentimentLabel::Positive,
                count: 2,
            },
            LabelCount {
                label: SentimentLabel::Negative,
                count: 3,
            },
        ]);

        assert_eq!(report.total(), 5);
        assert_eq!(report.count(SentimentLabel::Negative), 3);
        assert_eq!(report.count(SentimentLabel::Neutral), 0);
        assert!(!report.is_empty());
    }

    #[test]
    fn test_text_item_deserializes_without_timestamp() {
        let item: TextItem =
            serde_json::from_str(r#"{"content": "hello", "source_kind": "comment"}"#).unwrap();
        assert_eq!(item.source_kind, SourceKind::Comment);
        assert_eq!(item.created_at, None);
    }
}
