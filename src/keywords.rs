// 🔑 Keyword Extractor
// Ranks noun phrases + significant tagged words by frequency

use crate::signals::{LinguisticSignals, SignalProvider};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Keywords returned per feedback when the caller has no preference
pub const DEFAULT_MAX_KEYWORDS: usize = 10;

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
        "from", "as", "is", "was", "are", "were", "been", "be", "have", "has", "had", "do", "does",
        "did", "will", "would", "could", "should", "may", "might", "must", "can", "this", "that",
        "these", "those", "i", "you", "he", "she", "it", "we", "they", "what", "which", "who",
        "when", "where", "why", "how", "all", "each", "every", "both", "few", "more", "most",
        "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than", "too",
        "very", "just", "now",
    ]
    .into_iter()
    .collect()
});

/// Tag prefixes that make a word worth keeping: nouns, adjectives, verbs
const SIGNIFICANT_TAGS: [&str; 3] = ["NN", "JJ", "VB"];

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word)
}

/// Extract up to `max_keywords` keywords, most frequent first.
///
/// Ties keep first-seen order (noun phrases come before single words).
/// A provider failure yields an empty list.
pub fn extract_keywords(provider: &dyn SignalProvider, text: &str, max_keywords: usize) -> Vec<String> {
    if max_keywords == 0 {
        return Vec::new();
    }

    match provider.signals(&text.to_lowercase()) {
        Ok(signals) => rank_candidates(candidates(&signals), max_keywords),
        Err(e) => {
            warn!(provider = provider.name(), "Keyword extraction failed: {:#}", e);
            Vec::new()
        }
    }
}

/// Noun phrases followed by filtered tagged words
fn candidates(signals: &LinguisticSignals) -> Vec<String> {
    let words = signals.tagged_tokens.iter().filter(|token| {
        token.word.chars().count() > 2
            && !is_stop_word(&token.word)
            && SIGNIFICANT_TAGS.iter().any(|p| token.tag.starts_with(p))
    });

    signals
        .noun_phrases
        .iter()
        .cloned()
        .chain(words.map(|token| token.word.clone()))
        .collect()
}

/// Count occurrences and sort by count descending, first-seen order on ties.
pub(crate) fn rank_by_frequency<I>(items: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = String>,
{
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        match index.get(&item) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(item.clone(), counts.len());
                counts.push((item, 1));
            }
        }
    }

    // stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn rank_candidates(candidates: Vec<String>, max_keywords: usize) -> Vec<String> {
    rank_by_frequency(candidates)
        .into_iter()
        .take(max_keywords)
        .map(|(keyword, _)| keyword)
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
