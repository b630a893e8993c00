//! Score-to-label classification.
//!
//! A [`Classifier`] maps a compound score onto [`SentimentLabel`] with a
//! threshold ladder evaluated top to bottom, first match wins:
//!
//! 1. `score >= very_positive`     → Very Positive
//! 2. `score >= positive`          → Positive
//! 3. `score >= slightly_positive` → Slightly Positive
//! 4. `score <= very_negative`     → Very Negative
//! 5. `score <= negative`          → Negative
//! 6. `score <= slightly_negative` → Slightly Negative
//! 7. otherwise                    → Neutral
//!
//! The cut points live in a [`ThresholdTable`], which only accepts
//! strictly decreasing tables so that no rung of the ladder is unreachable.

use crate::error::EngineError;
use crate::models::{ClassificationResult, SentimentLabel};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named threshold presets for different scorer scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdPreset {
    /// Compound scores (lexicon/VADER style), wide cut points.
    #[default]
    Compound,
    /// Polarity scores, which cluster closer to zero.
    Polarity,
}

impl fmt::Display for ThresholdPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdPreset::Compound => write!(f, "compound"),
            ThresholdPreset::Polarity => write!(f, "polarity"),
        }
    }
}

impl FromStr for ThresholdPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compound" => Ok(ThresholdPreset::Compound),
            "polarity" => Ok(ThresholdPreset::Polarity),
            other => Err(format!("unknown threshold preset: {}", other)),
        }
    }
}

/// The six cut points of the classification ladder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    pub very_positive: f64,
    pub positive: f64,
    pub slightly_positive: f64,
    pub slightly_negative: f64,
    pub negative: f64,
    pub very_negative: f64,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::compound()
    }
}

impl ThresholdTable {
    pub fn compound() -> Self {
        Self {
            very_positive: 0.5,
            positive: 0.2,
            slightly_positive: 0.05,
            slightly_negative: -0.05,
            negative: -0.2,
            very_negative: -0.5,
        }
    }

    pub fn polarity() -> Self {
        Self {
            very_positive: 0.2,
            positive: 0.1,
            slightly_positive: 0.05,
            slightly_negative: -0.05,
            negative: -0.1,
            very_negative: -0.2,
        }
    }

    pub fn from_preset(preset: ThresholdPreset) -> Self {
        match preset {
            ThresholdPreset::Compound => Self::compound(),
            ThresholdPreset::Polarity => Self::polarity(),
        }
    }

    /// Check that every rung of the ladder can be reached by some score
    /// in [-1, 1]: cut points strictly decreasing and inside the score range.
    pub fn validate(&self) -> Result<(), EngineError> {
        let points = [
            ("very_positive", self.very_positive),
            ("positive", self.positive),
            ("slightly_positive", self.slightly_positive),
            ("slightly_negative", self.slightly_negative),
            ("negative", self.negative),
            ("very_negative", self.very_negative),
        ];

        if let Some((name, value)) = points.iter().find(|(_, v)| !v.is_finite()) {
            return Err(EngineError::InvalidThresholds(format!(
                "{} is not a finite number ({})",
                name, value
            )));
        }

        for pair in points.windows(2) {
            let (upper_name, upper) = pair[0];
            let (lower_name, lower) = pair[1];
            if upper <= lower {
                return Err(EngineError::InvalidThresholds(format!(
                    "{} ({}) must be greater than {} ({})",
                    upper_name, upper, lower_name, lower
                )));
            }
        }

        if self.very_positive > 1.0 || self.very_negative < -1.0 {
            return Err(EngineError::InvalidThresholds(format!(
                "very_positive ({}) and very_negative ({}) must lie within [-1, 1]",
                self.very_positive, self.very_negative
            )));
        }

        Ok(())
    }
}

/// Deterministic score → label mapping.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Classifier {
    thresholds: ThresholdTable,
}

impl Classifier {
    /// Create a classifier, rejecting tables that would skip a label.
    pub fn new(thresholds: ThresholdTable) -> Result<Self, EngineError> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    /// Map a score onto the taxonomy. Total over all real numbers.
    pub fn classify(&self, score: f64) -> SentimentLabel {
        let t = &self.thresholds;
        if score >= t.very_positive {
            SentimentLabel::VeryPositive
        } else if score >= t.positive {
            SentimentLabel::Positive
        } else if score >= t.slightly_positive {
            SentimentLabel::SlightlyPositive
        } else if score <= t.very_negative {
            SentimentLabel::VeryNegative
        } else if score <= t.negative {
            SentimentLabel::Negative
        } else if score <= t.slightly_negative {
            SentimentLabel::SlightlyNegative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn classify_result(&self, score: f64) -> ClassificationResult {
        ClassificationResult {
            label: self.classify(score),
            score,
        }
    }
}
