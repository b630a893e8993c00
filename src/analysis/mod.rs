//! Classification and aggregation engine.
//!
//! Items flow through [`Pipeline`] once per batch: each is scored,
//! classified, and recorded into the frequency, label-index and daily
//! aggregators.

pub mod aggregator;
pub mod classifier;
pub mod pipeline;

pub use aggregator::LabelIndex;
pub use classifier::{Classifier, ThresholdPreset, ThresholdTable};
pub use pipeline::{BatchOutcome, DayBoundary, Pipeline};
