//! Per-batch aggregation of classified items.
//!
//! Each aggregator is an accumulate-then-finalize object: it accepts
//! `record` calls while accumulating, and becomes read-only once
//! `finalize` has been called. Recording into a finalized aggregator is an
//! [`EngineError::IllegalState`].

use crate::error::EngineError;
use crate::models::{
    DailyAverageSeries, DayAverage, FrequencyReport, LabelCount, SentimentLabel,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Lifecycle phase shared by all aggregators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Accumulating,
    Finalized,
}

fn ensure_accumulating(phase: Phase, component: &'static str) -> Result<(), EngineError> {
    match phase {
        Phase::Accumulating => Ok(()),
        Phase::Finalized => Err(EngineError::IllegalState { component }),
    }
}

/// Counts labels and emits them in canonical order.
#[derive(Debug, Clone, Default)]
pub struct FrequencyAggregator {
    counts: [usize; 7],
    phase: Phase,
}

impl FrequencyAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, label: SentimentLabel) -> Result<(), EngineError> {
        ensure_accumulating(self.phase, "FrequencyAggregator")?;
        self.counts[label.rank()] += 1;
        Ok(())
    }

    /// Build the report. Calling it again without new records gives the same report.
    pub fn finalize(&mut self) -> FrequencyReport {
        self.phase = Phase::Finalized;

        let entries = SentimentLabel::ALL
            .iter()
            .map(|&label| LabelCount {
                label,
                count: self.counts[label.rank()],
            })
            .filter(|entry| entry.count > 0)
            .collect();

        FrequencyReport::from_entries(entries)
    }
}

/// Item contents grouped by label, first-seen order kept within a bucket.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct LabelIndex {
    buckets: BTreeMap<SentimentLabel, Vec<String>>,
    #[serde(skip)]
    phase: Phase,
}

impl LabelIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, label: SentimentLabel, content: impl Into<String>) -> Result<(), EngineError> {
        ensure_accumulating(self.phase, "LabelIndex")?;
        self.buckets.entry(label).or_default().push(content.into());
        Ok(())
    }

    /// Seal the index. Lookups keep working.
    pub fn finalize(&mut self) {
        self.phase = Phase::Finalized;
    }

    /// Contents recorded under `label`; empty when none were.
    pub fn lookup(&self, label: SentimentLabel) -> &[String] {
        self.buckets.get(&label).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Non-empty buckets in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (SentimentLabel, &[String])> {
        self.buckets
            .iter()
            .map(|(label, items)| (*label, items.as_slice()))
    }

    /// Total number of indexed items across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Collects scores per calendar date and averages them at finalize.
#[derive(Debug, Clone, Default)]
pub struct DailySentimentAggregator {
    scores: BTreeMap<NaiveDate, Vec<f64>>,
    failure: Option<EngineError>,
    recorded: usize,
    phase: Phase,
}

impl DailySentimentAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a score for a date.
    ///
    /// A missing date fails with [`EngineError::InvalidTimestamp`] and makes
    /// the eventual `finalize` fail with the same error.
    pub fn record(&mut self, date: Option<NaiveDate>, score: f64) -> Result<(), EngineError> {
        ensure_accumulating(self.phase, "DailySentimentAggregator")?;
        let index = self.recorded;
        self.recorded += 1;

        match date {
            Some(date) => {
                self.scores.entry(date).or_default().push(score);
                Ok(())
            }
            None => {
                let err = EngineError::InvalidTimestamp { index };
                if self.failure.is_none() {
                    self.failure = Some(err.clone());
                }
                Err(err)
            }
        }
    }

    /// Means recomputed from every recorded score, ascending by date.
    pub fn finalize(&mut self) -> Result<DailyAverageSeries, EngineError> {
        self.phase = Phase::Finalized;

        if let Some(ref err) = self.failure {
            return Err(err.clone());
        }

        let days = self
            .scores
            .iter()
            .map(|(date, scores)| {
                let sum: f64 = scores.iter().sum();
                let day = DayAverage {
                    mean: sum / scores.len() as f64,
                    samples: scores.len(),
                };
                (*date, day)
            })
            .collect();

        Ok(DailyAverageSeries::from_days(days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn mean_on(series: &DailyAverageSeries, day: NaiveDate) -> Option<f64> {
        series.iter().find(|(d, _)| *d == day).map(|(_, mean)| mean)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_frequency_report_is_canonical_and_filtered() {
        let mut agg = FrequencyAggregator::new();
        for label in [
            SentimentLabel::VeryNegative,
            SentimentLabel::Neutral,
            SentimentLabel::VeryPositive,
            SentimentLabel::VeryNegative,
            SentimentLabel::Neutral,
            SentimentLabel::Neutral,
        ] {
            agg.record(label).unwrap();
        }

        let report = agg.finalize();
        let labels: Vec<_> = report.iter().map(|e| e.label).collect();
        assert_eq!(
            labels,
            vec![
                SentimentLabel::VeryPositive,
                SentimentLabel::Neutral,
                SentimentLabel::VeryNegative
            ]
        );
        assert_eq!(report.count(SentimentLabel::Neutral), 3);
        assert_eq!(report.total(), 6);
    }

    #[test]
    fn test_frequency_finalize_is_idempotent() {
        let mut agg = FrequencyAggregator::new();
        agg.record(SentimentLabel::Positive).unwrap();
        agg.record(SentimentLabel::Negative).unwrap();

        let first = agg.finalize();
        let second = agg.finalize();
        assert_eq!(first, second);
        assert!(agg.record(SentimentLabel::Positive).is_err());
    }

    #[test]
    fn test_frequency_record_after_finalize_fails() {
        let mut agg = FrequencyAggregator::new();
        agg.finalize();
        assert_eq!(
            agg.record(SentimentLabel::Neutral),
            Err(EngineError::IllegalState {
                component: "FrequencyAggregator"
            })
        );
    }

    #[test]
    fn test_empty_frequency_report() {
        let mut agg = FrequencyAggregator::new();
        let report = agg.finalize();
        assert!(report.is_empty());
        assert_eq!(report.total(), 0);
    }

    #[test]
    fn test_label_index_groups_in_insertion_order() {
        let mut index = LabelIndex::new();
        index.record(SentimentLabel::Positive, "first").unwrap();
        index.record(SentimentLabel::Negative, "second").unwrap();
        index.record(SentimentLabel::Positive, "third").unwrap();
        index.finalize();

        assert_eq!(index.lookup(SentimentLabel::Positive), ["first", "third"]);
        assert_eq!(index.lookup(SentimentLabel::Negative), ["second"]);
        assert!(index.lookup(SentimentLabel::Neutral).is_empty());
        assert_eq!(index.len(), 3);

        let labels: Vec<_> = index.iter().map(|(label, _)| label).collect();
        assert_eq!(labels, vec![SentimentLabel::Positive, SentimentLabel::Negative]);
    }

    #[test]
    fn test_label_index_record_after_finalize_fails() {
        let mut index = LabelIndex::new();
        index.finalize();
        assert!(matches!(
            index.record(SentimentLabel::Neutral, "late"),
            Err(EngineError::IllegalState { .. })
        ));
        assert!(index.is_empty());
    }

    #[test]
    fn test_daily_average_single_date() {
        let mut agg = DailySentimentAggregator::new();
        let d = date(2024, 3, 1);
        agg.record(Some(d), 0.4).unwrap();
        agg.record(Some(d), -0.2).unwrap();

        let series = agg.finalize().unwrap();
        assert_eq!(series.len(), 1);
        assert_close(mean_on(&series, d).unwrap(), 0.1);
    }

    #[test]
    fn test_daily_average_two_dates_sorted() {
        let mut agg = DailySentimentAggregator::new();
        let d1 = date(2024, 3, 1);
        let d2 = date(2024, 3, 2);
        // Recorded out of order on purpose.
        agg.record(Some(d2), 0.5).unwrap();
        agg.record(Some(d1), 1.0).unwrap();
        agg.record(Some(d1), -1.0).unwrap();

        let series = agg.finalize().unwrap();
        let points: Vec<_> = series.iter().collect();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].0, d1);
        assert_close(points[0].1, 0.0);
        assert_eq!(points[1].0, d2);
        assert_close(points[1].1, 0.5);

        let samples: Vec<_> = series.days().map(|(_, day)| day.samples).collect();
        assert_eq!(samples, vec![2, 1]);
    }

    #[test]
    fn test_daily_single_score_is_its_own_average() {
        let mut agg = DailySentimentAggregator::new();
        agg.record(Some(date(2023, 12, 31)), -0.37).unwrap();
        let series = agg.finalize().unwrap();
        assert_eq!(mean_on(&series, date(2023, 12, 31)), Some(-0.37));
    }

    #[test]
    fn test_daily_missing_timestamp_poisons_finalize() {
        let mut agg = DailySentimentAggregator::new();
        agg.record(Some(date(2024, 1, 1)), 0.2).unwrap();
        assert_eq!(
            agg.record(None, 0.1),
            Err(EngineError::InvalidTimestamp { index: 1 })
        );
        assert_eq!(
            agg.finalize(),
            Err(EngineError::InvalidTimestamp { index: 1 })
        );
    }

    #[test]
    fn test_daily_record_after_finalize_fails() {
        let mut agg = DailySentimentAggregator::new();
        let series = agg.finalize().unwrap();
        assert!(series.is_empty());
        assert!(matches!(
            agg.record(Some(date(2024, 1, 1)), 0.0),
            Err(EngineError::IllegalState { .. })
        ));
    }
}
