// 💬 Sentiment Classifier
// Maps polarity/subjectivity into a label + confidence

use crate::signals::SignalProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Polarity above this is positive, below its negation negative
const LABEL_THRESHOLD: f64 = 0.1;

/// Weight of |polarity| in the confidence score
const POLARITY_WEIGHT: f64 = 0.7;

/// Weight of objectivity (1 - subjectivity) in the confidence score
const OBJECTIVITY_WEIGHT: f64 = 0.3;

/// Substituted when the linguistic engine fails
pub const FALLBACK_POLARITY: f64 = 0.0;
pub const FALLBACK_SUBJECTIVITY: f64 = 0.5;

// ============================================================================
// SENTIMENT LABEL
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Label for a polarity score.
    ///
    /// The band `[-0.1, 0.1]` is neutral, so weak signals never tip a label.
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > LABEL_THRESHOLD {
            SentimentLabel::Positive
        } else if polarity < -LABEL_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SENTIMENT RESULT
// ============================================================================

/// Immutable classification of one piece of text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentResult {
    polarity: f64,
    subjectivity: f64,
    label: SentimentLabel,
    confidence: f64,
}

impl SentimentResult {
    pub fn polarity(&self) -> f64 {
        self.polarity
    }

    pub fn subjectivity(&self) -> f64 {
        self.subjectivity
    }

    pub fn label(&self) -> SentimentLabel {
        self.label
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

/// Classify raw scores.
///
/// Confidence grows with polarity strength and with objectivity:
/// `clamp(0.7·|polarity| + 0.3·(1 − subjectivity), 0, 1)`.
pub fn classify(polarity: f64, subjectivity: f64) -> SentimentResult {
    let confidence = (POLARITY_WEIGHT * polarity.abs()
        + OBJECTIVITY_WEIGHT * (1.0 - subjectivity))
        .clamp(0.0, 1.0);

    SentimentResult {
        polarity,
        subjectivity,
        label: SentimentLabel::from_polarity(polarity),
        confidence,
    }
}

/// Ask the provider for polarity/subjectivity and classify them.
///
/// A provider failure never escapes: the neutral defaults
/// (`polarity = 0.0`, `subjectivity = 0.5`) are classified instead.
pub fn analyze_sentiment(provider: &dyn SignalProvider, text: &str) -> SentimentResult {
    match provider.signals(text) {
        Ok(signals) => {
            debug!(
                provider = provider.name(),
                polarity = signals.polarity,
                subjectivity = signals.subjectivity,
                "sentiment signals"
            );
            classify(signals.polarity, signals.subjectivity)
        }
        Err(e) => {
            warn!(provider = provider.name(), "Sentiment analysis failed: {:#}", e);
            classify(FALLBACK_POLARITY, FALLBACK_SUBJECTIVITY)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::{LexiconProvider, LinguisticSignals};
    use anyhow::{anyhow, Result};

    struct FailingProvider;

    impl SignalProvider for FailingProvider {
        fn signals(&self, _text: &str) -> Result<LinguisticSignals> {
            Err(anyhow!("engine crashed"))
        }
    }

    #[test]
    fn test_label_boundaries() {
        assert_eq!(classify(0.1, 0.5).label(), SentimentLabel::Neutral);
        assert_eq!(classify(0.10001, 0.5).label(), SentimentLabel::Positive);
        assert_eq!(classify(-0.1, 0.5).label(), SentimentLabel::Neutral);
        assert_eq!(classify(-0.10001, 0.5).label(), SentimentLabel::Negative);
        assert_eq!(classify(0.0, 0.5).label(), SentimentLabel::Neutral);
    }

    #[test]
    fn test_confidence_formula() {
        let result = classify(0.8, 0.2);
        assert!((result.confidence() - 0.80).abs() < 1e-9);
        assert_eq!(result.polarity(), 0.8);
        assert_eq!(result.subjectivity(), 0.2);
    }

    #[test]
    fn test_confidence_uses_absolute_polarity() {
        let pos = classify(0.6, 0.4);
        let neg = classify(-0.6, 0.4);
        assert!((pos.confidence() - neg.confidence()).abs() < 1e-12);
        assert_eq!(neg.label(), SentimentLabel::Negative);
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert!((classify(1.0, 0.0).confidence() - 1.0).abs() < 1e-9);
        assert_eq!(classify(0.0, 1.0).confidence(), 0.0);
        // out-of-range inputs from a sloppy provider still clamp
        assert_eq!(classify(2.0, -1.0).confidence(), 1.0);
    }

    #[test]
    fn test_provider_failure_falls_back_to_neutral() {
        let result = analyze_sentiment(&FailingProvider, "anything");

        assert_eq!(result.label(), SentimentLabel::Neutral);
        assert_eq!(result.polarity(), 0.0);
        assert_eq!(result.subjectivity(), 0.5);
        assert!((result.confidence() - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_analyze_with_lexicon() {
        let provider = LexiconProvider::new();
        let result = analyze_sentiment(
            &provider,
            "I absolutely love this product! The quality is excellent.",
        );

        assert_eq!(result.label(), SentimentLabel::Positive);
        assert!(result.polarity() > 0.1);
    }

    #[test]
    fn test_label_serializes_lowercase() {
        let json = serde_json::to_string(&SentimentLabel::Positive).unwrap();
        assert_eq!(json, "\"positive\"");
        assert_eq!(SentimentLabel::Negative.to_string(), "negative");
    }
}
