//! Sentiment scoring.
//!
//! The engine only consumes a scalar in [-1, 1]; anything that can produce
//! one implements [`SentimentScorer`]. [`LexiconScorer`] is the bundled
//! implementation: a word-valence lexicon with negation and intensifier
//! handling, normalised into a compound score.

use std::collections::HashMap;
use tracing::debug;

/// Maps text to a compound/polarity score in [-1, 1].
pub trait SentimentScorer {
    fn score(&self, text: &str) -> f64;
}

impl<F> SentimentScorer for F
where
    F: Fn(&str) -> f64,
{
    fn score(&self, text: &str) -> f64 {
        self(text)
    }
}

/// Normalisation constant for the compound score.
const ALPHA: f64 = 15.0;

/// Multiplier applied to a valence that follows a negation.
const NEGATION_SCALAR: f64 = -0.74;

/// How many preceding tokens a negation reaches.
const NEGATION_WINDOW: usize = 3;

/// Word-valence lexicon scorer.
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    valences: HashMap<String, f64>,
    intensifiers: HashMap<&'static str, f64>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconScorer {
    /// Create a scorer with the built-in lexicon.
    pub fn new() -> Self {
        Self {
            valences: Self::build_valence_lexicon(),
            intensifiers: Self::build_intensifiers(),
        }
    }

    /// Create a scorer with extra (or replacement) word valences.
    pub fn with_overrides(overrides: &HashMap<String, f64>) -> Self {
        let mut scorer = Self::new();
        for (word, valence) in overrides {
            scorer
                .valences
                .insert(word.to_lowercase(), valence.clamp(-4.0, 4.0));
        }
        if !overrides.is_empty() {
            debug!("Lexicon extended with {} custom words", overrides.len());
        }
        scorer
    }

    /// Number of words in the lexicon.
    pub fn lexicon_size(&self) -> usize {
        self.valences.len()
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.split_whitespace()
            .map(|raw| {
                raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                    .to_lowercase()
            })
            .filter(|t| !t.is_empty())
            .collect()
    }

    fn is_negation(token: &str) -> bool {
        matches!(
            token,
            "not" | "no" | "never" | "none" | "nobody" | "nothing" | "neither" | "nor"
                | "without" | "hardly" | "barely"
        ) || token.ends_with("n't")
    }

    /// Sum of adjusted valences before normalisation.
    fn raw_sum(&self, tokens: &[String]) -> f64 {
        let mut sum = 0.0;

        for (i, token) in tokens.iter().enumerate() {
            let Some(&base) = self.valences.get(token.as_str()) else {
                continue;
            };
            let mut valence = base;

            if i > 0 {
                if let Some(&boost) = self.intensifiers.get(tokens[i - 1].as_str()) {
                    valence += boost * valence.signum();
                }
            }

            let window_start = i.saturating_sub(NEGATION_WINDOW);
            if tokens[window_start..i].iter().any(|t| Self::is_negation(t)) {
                valence *= NEGATION_SCALAR;
            }

            sum += valence;
        }

        sum
    }

    fn normalize(sum: f64) -> f64 {
        if sum == 0.0 {
            return 0.0;
        }
        (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0)
    }

    fn build_valence_lexicon() -> HashMap<String, f64> {
        [
            // Strong positive
            ("love", 3.2), ("loved", 2.9), ("amazing", 2.8), ("awesome", 3.1),
            ("excellent", 2.7), ("fantastic", 2.6), ("wonderful", 2.7), ("perfect", 2.7),
            ("brilliant", 2.8), ("outstanding", 2.8), ("incredible", 2.6), ("best", 3.2),
            // Positive
            ("good", 1.9), ("great", 3.1), ("nice", 1.8), ("happy", 2.7), ("glad", 2.0),
            ("like", 1.5), ("liked", 1.8), ("enjoy", 2.2), ("enjoyed", 2.3), ("fun", 2.3),
            ("helpful", 1.8), ("useful", 1.9), ("recommend", 1.5), ("thanks", 1.9),
            ("thank", 1.5), ("cool", 1.3), ("win", 2.8), ("improved", 2.1), ("better", 1.9),
            ("solid", 1.2), ("fast", 1.0), ("works", 0.9), ("easy", 1.9), ("beautiful", 2.9),
            // Mild positive
            ("ok", 0.9), ("okay", 0.9), ("fine", 0.8), ("interesting", 1.7), ("fair", 1.3),
            ("hope", 1.9), ("decent", 0.8),
            // Mild negative
            ("meh", -0.3), ("slow", -1.0), ("confusing", -1.3), ("boring", -1.3),
            ("weird", -0.7), ("problem", -1.7), ("issue", -0.8), ("bug", -1.0),
            ("concern", -1.0), ("doubt", -1.5), ("risky", -1.4),
            // Negative
            ("bad", -2.5), ("poor", -2.1), ("sad", -2.1), ("wrong", -2.1), ("broken", -1.8),
            ("annoying", -1.7), ("disappointed", -1.9), ("disappointing", -2.2),
            ("fail", -2.5), ("failed", -2.3), ("worse", -2.1), ("hard", -0.4),
            ("expensive", -0.9), ("crash", -1.7), ("scam", -2.6), ("angry", -2.3),
            ("hate", -2.7), ("ugly", -2.3), ("stupid", -2.4), ("useless", -1.8),
            // Strong negative
            ("terrible", -2.1), ("horrible", -2.5), ("awful", -2.0), ("worst", -3.1),
            ("disaster", -3.1), ("garbage", -2.4), ("trash", -2.1), ("disgusting", -2.4),
            ("pathetic", -2.2), ("hated", -3.2),
        ]
        .into_iter()
        .map(|(word, valence)| (word.to_string(), valence))
        .collect()
    }

    fn build_intensifiers() -> HashMap<&'static str, f64> {
        [
            ("very", 0.293), ("really", 0.293), ("extremely", 0.293), ("so", 0.293),
            ("incredibly", 0.293), ("absolutely", 0.293), ("totally", 0.293),
            ("super", 0.293), ("most", 0.293),
            ("slightly", -0.293), ("somewhat", -0.293), ("kinda", -0.293),
            ("barely", -0.293), ("little", -0.293),
        ]
        .into_iter()
        .collect()
    }
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> f64 {
        let tokens = Self::tokenize(text);
        Self::normalize(self.raw_sum(&tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_unknown_text_is_neutral() {
        let scorer = LexiconScorer::new();
        assert_eq!(scorer.score(""), 0.0);
        assert_eq!(scorer.score("the quick brown fox"), 0.0);
    }

    #[test]
    fn test_polarity_direction() {
        let scorer = LexiconScorer::new();
        assert!(scorer.score("This is a great and wonderful library") > 0.5);
        assert!(scorer.score("What a terrible, awful experience.") < -0.5);
    }

    #[test]
    fn test_negation_flips_sign() {
        let scorer = LexiconScorer::new();
        let plain = scorer.score("this is good");
        let negated = scorer.score("this is not good");
        assert!(plain > 0.0);
        assert!(negated < 0.0);

        assert!(scorer.score("it doesn't work and isn't helpful") < 0.0);
    }

    #[test]
    fn test_intensifier_increases_magnitude() {
        let scorer = LexiconScorer::new();
        assert!(scorer.score("very good") > scorer.score("good"));
        assert!(scorer.score("really bad") < scorer.score("bad"));
    }

    #[test]
    fn test_scores_stay_in_range() {
        let scorer = LexiconScorer::new();
        let gushing = "love love love amazing awesome best perfect ".repeat(50);
        let furious = "hate worst disaster garbage terrible ".repeat(50);
        for text in [gushing.as_str(), furious.as_str(), "ok", "meh"] {
            let s = scorer.score(text);
            assert!((-1.0..=1.0).contains(&s), "{} out of range", s);
        }
    }

    #[test]
    fn test_overrides_extend_lexicon() {
        let base = LexiconScorer::new();
        assert_eq!(base.score("bullish"), 0.0);

        let overrides: HashMap<String, f64> =
            [("Bullish".to_string(), 2.0), ("rugpull".to_string(), -9.0)]
                .into_iter()
                .collect();
        let scorer = LexiconScorer::with_overrides(&overrides);
        assert!(scorer.score("very bullish") > 0.0);
        assert!(scorer.score("rugpull") < 0.0);
        assert_eq!(scorer.lexicon_size(), base.lexicon_size() + 2);
    }

    #[test]
    fn test_closure_scorer() {
        let fixed = |_: &str| 0.25;
        assert_eq!(fixed.score("anything"), 0.25);
    }
}
