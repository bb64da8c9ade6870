// 📊 Feedback Analytics Store
// Append-only log of feedback records + aggregates derived from it
//
// The store never caches an aggregate. Every read takes a snapshot of the
// record sequence under the lock and computes from that snapshot, so counts,
// percentages and averages can't drift from the records.

use crate::keywords::rank_by_frequency;
use crate::sentiment::{SentimentLabel, SentimentResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

/// Keywords reported by `insights()` when the caller has no preference
pub const DEFAULT_KEYWORD_LIMIT: usize = 20;

// ============================================================================
// FEEDBACK RECORD
// ============================================================================

/// One analyzed piece of feedback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// Stable identity (UUID v4)
    pub id: String,

    /// Feedback exactly as submitted
    pub feedback_text: String,

    pub sentiment_label: SentimentLabel,
    pub polarity: f64,
    pub subjectivity: f64,

    /// Frequency-ranked keywords
    pub keywords: Vec<String>,

    pub confidence: f64,

    /// When the record was created
    pub timestamp: DateTime<Utc>,
}

impl FeedbackRecord {
    /// Build a record from a finished analysis
    pub fn new(feedback_text: impl Into<String>, sentiment: &SentimentResult, keywords: Vec<String>) -> Self {
        FeedbackRecord {
            id: uuid::Uuid::new_v4().to_string(),
            feedback_text: feedback_text.into(),
            sentiment_label: sentiment.label(),
            polarity: sentiment.polarity(),
            subjectivity: sentiment.subjectivity(),
            keywords,
            confidence: sentiment.confidence(),
            timestamp: Utc::now(),
        }
    }
}

// ============================================================================
// AGGREGATE TYPES
// ============================================================================

/// Share of each label, in percent of all records
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordStat {
    pub keyword: String,

    /// Occurrences across all records
    pub count: usize,

    /// count / total records × 100
    pub percentage: f64,
}

/// Every aggregate, computed from one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub total_feedback: usize,
    pub sentiment_distribution: SentimentDistribution,
    pub top_keywords: Vec<KeywordStat>,
    pub average_confidence: f64,
    pub average_polarity: f64,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn percent(count: usize, total: usize) -> f64 {
    round_to(count as f64 / total as f64 * 100.0, 2)
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Point-in-time view of the record sequence
#[derive(Debug, Clone, Default)]
pub struct FeedbackSnapshot {
    records: Vec<Arc<FeedbackRecord>>,
}

impl FeedbackSnapshot {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &FeedbackRecord> {
        self.records.iter().map(|r| r.as_ref())
    }

    pub fn sentiment_distribution(&self) -> SentimentDistribution {
        let total = self.len();
        if total == 0 {
            return SentimentDistribution::default();
        }

        let count = |label: SentimentLabel| {
            self.records
                .iter()
                .filter(|r| r.sentiment_label == label)
                .count()
        };

        SentimentDistribution {
            positive: percent(count(SentimentLabel::Positive), total),
            negative: percent(count(SentimentLabel::Negative), total),
            neutral: percent(count(SentimentLabel::Neutral), total),
        }
    }

    /// Most frequent keywords across all records.
    ///
    /// Every occurrence counts, and the percentage is relative to the number
    /// of records, not the number of keyword occurrences.
    pub fn top_keywords(&self, limit: usize) -> Vec<KeywordStat> {
        let total = self.len();
        if total == 0 {
            return Vec::new();
        }

        let all_keywords = self.records.iter().flat_map(|r| r.keywords.iter().cloned());

        rank_by_frequency(all_keywords)
            .into_iter()
            .take(limit)
            .map(|(keyword, count)| KeywordStat {
                keyword,
                count,
                percentage: percent(count, total),
            })
            .collect()
    }

    pub fn average_confidence(&self) -> f64 {
        self.average(|r| r.confidence)
    }

    pub fn average_polarity(&self) -> f64 {
        self.average(|r| r.polarity)
    }

    fn average(&self, field: impl Fn(&FeedbackRecord) -> f64) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.records.iter().map(|r| field(r)).sum();
        round_to(sum / self.len() as f64, 3)
    }

    pub fn insights(&self, keyword_limit: usize) -> Insights {
        Insights {
            total_feedback: self.len(),
            sentiment_distribution: self.sentiment_distribution(),
            top_keywords: self.top_keywords(keyword_limit),
            average_confidence: self.average_confidence(),
            average_polarity: self.average_polarity(),
        }
    }
}

// ============================================================================
// FEEDBACK STORE
// ============================================================================

/// Process-local, append-only feedback store.
///
/// Share it behind an `Arc`; every method takes `&self`.
#[derive(Debug, Default)]
pub struct FeedbackStore {
    records: Mutex<Vec<Arc<FeedbackRecord>>>,
}

impl FeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The record vector is append-only, so a poisoned lock still guards
    /// consistent data.
    fn lock(&self) -> MutexGuard<'_, Vec<Arc<FeedbackRecord>>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn append(&self, record: FeedbackRecord) {
        let total = {
            let mut records = self.lock();
            records.push(Arc::new(record));
            records.len()
        };
        info!(total, "Added feedback record");
    }

    /// Consistent copy of the record sequence as of now
    pub fn snapshot(&self) -> FeedbackSnapshot {
        FeedbackSnapshot {
            records: self.lock().clone(),
        }
    }

    pub fn total_count(&self) -> usize {
        self.lock().len()
    }

    pub fn records(&self) -> Vec<FeedbackRecord> {
        self.lock().iter().map(|r| r.as_ref().clone()).collect()
    }

    pub fn sentiment_distribution(&self) -> SentimentDistribution {
        self.snapshot().sentiment_distribution()
    }

    pub fn top_keywords(&self, limit: usize) -> Vec<KeywordStat> {
        self.snapshot().top_keywords(limit)
    }

    pub fn average_confidence(&self) -> f64 {
        self.snapshot().average_confidence()
    }

    pub fn average_polarity(&self) -> f64 {
        self.snapshot().average_polarity()
    }

    pub fn insights(&self, keyword_limit: usize) -> Insights {
        self.snapshot().insights(keyword_limit)
    }

    /// Drop every record. Meant for resetting state between test runs.
    pub fn clear(&self) {
        self.lock().clear();
        info!("Feedback store cleared");
    }
}

// ============================================================================
// TESTS
// ============================================================================
