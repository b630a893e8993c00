//! Batch ingestion: score, classify and fan out in one pass.

use crate::analysis::aggregator::{DailySentimentAggregator, FrequencyAggregator, LabelIndex};
use crate::analysis::classifier::Classifier;
use crate::error::EngineError;
use crate::models::{
    ClassificationResult, DailyAverageSeries, FrequencyReport, SearchQuery, SourceKind, TextItem,
};
use crate::scorer::SentimentScorer;
use crate::source::ContentProvider;
use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Time zone used to truncate timestamps to calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayBoundary {
    /// The host's local time zone.
    #[default]
    Local,
    Utc,
}

impl DayBoundary {
    pub fn date_of(&self, timestamp: DateTime<Utc>) -> NaiveDate {
        match self {
            DayBoundary::Local => timestamp.with_timezone(&Local).date_naive(),
            DayBoundary::Utc => timestamp.date_naive(),
        }
    }
}

impl fmt::Display for DayBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayBoundary::Local => write!(f, "local"),
            DayBoundary::Utc => write!(f, "utc"),
        }
    }
}

/// Finalized aggregates of one batch.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Number of items classified.
    pub classified: usize,
    pub posts: usize,
    pub comments: usize,
    pub frequencies: FrequencyReport,
    pub index: LabelIndex,
    /// Fails with `InvalidTimestamp` when any item lacked a timestamp.
    pub daily: Result<DailyAverageSeries, EngineError>,
}

/// Runs items through the injected scorer and the classifier.
pub struct Pipeline<'a, S: SentimentScorer + ?Sized> {
    scorer: &'a S,
    classifier: Classifier,
    day_boundary: DayBoundary,
}

impl<'a, S: SentimentScorer + ?Sized> Pipeline<'a, S> {
    pub fn new(scorer: &'a S, classifier: Classifier, day_boundary: DayBoundary) -> Self {
        Self {
            scorer,
            classifier,
            day_boundary,
        }
    }

    /// Fetch a batch from `provider` and ingest it.
    pub async fn run<P: ContentProvider>(&self, provider: &P, query: &SearchQuery) -> Result<BatchOutcome> {
        let items = provider
            .fetch(query)
            .await
            .with_context(|| format!("Failed to fetch items from {}", provider.describe()))?;
        info!("Fetched {} items from {}", items.len(), provider.describe());

        self.ingest(items)
            .context("Failed to classify batch")
    }

    /// Score, classify and aggregate every item in a single pass.
    ///
    /// An out-of-range score aborts the whole batch. A missing timestamp
    /// only costs the daily series.
    pub fn ingest<I>(&self, items: I) -> Result<BatchOutcome, EngineError>
    where
        I: IntoIterator<Item = TextItem>,
    {
        let mut frequencies = FrequencyAggregator::new();
        let mut index = LabelIndex::new();
        let mut daily = DailySentimentAggregator::new();
        let (mut posts, mut comments, mut classified) = (0usize, 0usize, 0usize);

        for (i, item) in items.into_iter().enumerate() {
            let score = self.scorer.score(&item.content);
            if !(-1.0..=1.0).contains(&score) {
                return Err(EngineError::InvalidScore { index: i, score });
            }

            let ClassificationResult { label, score } = self.classifier.classify_result(score);
            debug!("item #{} ({}) scored {:.3} -> {}", i, item.source_kind, score, label);

            frequencies.record(label)?;
            let date = item.created_at.map(|ts| self.day_boundary.date_of(ts));
            if let Err(e) = daily.record(date, score) {
                warn!("Daily averages unavailable: {}", e);
            }
            index.record(label, item.content)?;

            match item.source_kind {
                SourceKind::Post => posts += 1,
                SourceKind::Comment => comments += 1,
            }
            classified += 1;
        }

        let report = frequencies.finalize();
        index.finalize();
        let series = daily.finalize();

        info!(
            "Classified {} items ({} posts, {} comments) into {} labels",
            classified,
            posts,
            comments,
            report.entries().len()
        );
        debug!("Label index holds {} items", index.len());
        if let Ok(ref days) = series {
            debug!("Daily series spans {} days", days.len());
        }

        Ok(BatchOutcome {
            classified,
            posts,
            comments,
            frequencies: report,
            index,
            daily: series,
        })
    }
}
