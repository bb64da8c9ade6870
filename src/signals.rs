// 🧠 Linguistic Signal Provider
// Polarity, subjectivity, noun phrases and part-of-speech tags for a text
//
// The feedback pipeline only talks to the `SignalProvider` trait. The
// built-in `LexiconProvider` is a small pattern-style analyzer: an embedded
// word lexicon for polarity/subjectivity, a closed-class lookup plus suffix
// rules for Penn-style tags, and an adjective/noun chunker for noun phrases.

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// CORE TYPES
// ============================================================================

/// A word paired with its grammatical category (Penn Treebank style tag)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedToken {
    pub word: String,
    pub tag: String,
}

impl TaggedToken {
    pub fn new(word: impl Into<String>, tag: impl Into<String>) -> Self {
        TaggedToken {
            word: word.into(),
            tag: tag.into(),
        }
    }
}

/// Raw signals computed for a piece of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinguisticSignals {
    /// Sentiment direction in [-1, 1]
    pub polarity: f64,

    /// Opinion-laden (1) vs factual (0), in [0, 1]
    pub subjectivity: f64,

    /// Multi-word spans headed by a noun
    pub noun_phrases: Vec<String>,

    /// Every token with its tag, in text order
    pub tagged_tokens: Vec<TaggedToken>,
}

/// SignalProvider - the text → signals collaborator
///
/// Implementations may fail; callers decide the fallback.
pub trait SignalProvider: Send + Sync {
    fn signals(&self, text: &str) -> Result<LinguisticSignals>;

    /// Provider name for logs
    fn name(&self) -> &str {
        "unknown"
    }
}

// ============================================================================
// LEXICON
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct LexiconEntry {
    polarity: f64,
    subjectivity: f64,
    tag: &'static str,
}

const fn entry(polarity: f64, subjectivity: f64, tag: &'static str) -> LexiconEntry {
    LexiconEntry {
        polarity,
        subjectivity,
        tag,
    }
}

static LEXICON: Lazy<HashMap<&'static str, LexiconEntry>> = Lazy::new(|| {
    [
        // positive adjectives
        ("good", entry(0.7, 0.6, "JJ")),
        ("great", entry(0.8, 0.75, "JJ")),
        ("excellent", entry(1.0, 1.0, "JJ")),
        ("amazing", entry(0.6, 0.9, "JJ")),
        ("awesome", entry(1.0, 1.0, "JJ")),
        ("wonderful", entry(1.0, 1.0, "JJ")),
        ("fantastic", entry(0.4, 0.9, "JJ")),
        ("perfect", entry(1.0, 1.0, "JJ")),
        ("outstanding", entry(0.5, 0.65, "JJ")),
        ("superb", entry(1.0, 1.0, "JJ")),
        ("best", entry(1.0, 0.3, "JJS")),
        ("better", entry(0.5, 0.5, "JJR")),
        ("nice", entry(0.6, 1.0, "JJ")),
        ("happy", entry(0.8, 1.0, "JJ")),
        ("pleased", entry(0.5, 0.75, "JJ")),
        ("satisfied", entry(0.5, 0.5, "JJ")),
        ("friendly", entry(0.4, 0.5, "JJ")),
        ("helpful", entry(0.5, 0.5, "JJ")),
        ("fast", entry(0.2, 0.6, "JJ")),
        ("quick", entry(0.33, 0.5, "JJ")),
        ("clean", entry(0.37, 0.69, "JJ")),
        ("fresh", entry(0.3, 0.5, "JJ")),
        ("delicious", entry(1.0, 1.0, "JJ")),
        ("beautiful", entry(0.85, 1.0, "JJ")),
        ("lovely", entry(0.5, 0.75, "JJ")),
        ("reliable", entry(0.5, 0.5, "JJ")),
        ("affordable", entry(0.3, 0.6, "JJ")),
        ("impressive", entry(1.0, 1.0, "JJ")),
        ("professional", entry(0.1, 0.1, "JJ")),
        ("comfortable", entry(0.4, 0.75, "JJ")),
        ("easy", entry(0.43, 0.83, "JJ")),
        ("smooth", entry(0.4, 0.69, "JJ")),
        ("polite", entry(0.3, 0.6, "JJ")),
        ("recommended", entry(0.4, 0.5, "JJ")),
        // negative adjectives
        ("bad", entry(-0.7, 0.67, "JJ")),
        ("terrible", entry(-1.0, 1.0, "JJ")),
        ("awful", entry(-1.0, 1.0, "JJ")),
        ("horrible", entry(-1.0, 1.0, "JJ")),
        ("poor", entry(-0.4, 0.6, "JJ")),
        ("worst", entry(-1.0, 1.0, "JJS")),
        ("worse", entry(-0.4, 0.6, "JJR")),
        ("slow", entry(-0.3, 0.39, "JJ")),
        ("rude", entry(-0.3, 0.6, "JJ")),
        ("dirty", entry(-0.6, 0.8, "JJ")),
        ("broken", entry(-0.4, 0.4, "JJ")),
        ("expensive", entry(-0.5, 0.7, "JJ")),
        ("overpriced", entry(-0.5, 0.6, "JJ")),
        ("disappointing", entry(-0.6, 0.7, "JJ")),
        ("disappointed", entry(-0.75, 0.75, "JJ")),
        ("useless", entry(-0.5, 0.0, "JJ")),
        ("unhelpful", entry(-0.5, 0.5, "JJ")),
        ("cold", entry(-0.6, 1.0, "JJ")),
        ("late", entry(-0.3, 0.6, "JJ")),
        ("wrong", entry(-0.5, 0.9, "JJ")),
        ("unacceptable", entry(-0.8, 0.9, "JJ")),
        ("mediocre", entry(-0.3, 0.6, "JJ")),
        ("annoying", entry(-0.8, 0.9, "JJ")),
        ("frustrating", entry(-0.4, 0.7, "JJ")),
        ("confusing", entry(-0.3, 0.7, "JJ")),
        ("difficult", entry(-0.5, 1.0, "JJ")),
        ("unfriendly", entry(-0.4, 0.6, "JJ")),
        ("sad", entry(-0.5, 1.0, "JJ")),
        ("angry", entry(-0.5, 1.0, "JJ")),
        // neutral-ish but opinionated
        ("okay", entry(0.5, 0.5, "JJ")),
        ("fine", entry(0.42, 0.5, "JJ")),
        ("average", entry(-0.15, 0.4, "JJ")),
        ("ordinary", entry(-0.25, 0.5, "JJ")),
        // verbs
        ("love", entry(0.5, 0.6, "VBP")),
        ("loved", entry(0.7, 0.8, "VBD")),
        ("like", entry(0.2, 0.4, "VBP")),
        ("liked", entry(0.3, 0.4, "VBD")),
        ("enjoy", entry(0.4, 0.5, "VBP")),
        ("enjoyed", entry(0.4, 0.5, "VBD")),
        ("recommend", entry(0.4, 0.5, "VBP")),
        ("appreciate", entry(0.5, 0.5, "VBP")),
        ("hate", entry(-0.8, 0.9, "VBP")),
        ("hated", entry(-0.8, 0.9, "VBD")),
        ("dislike", entry(-0.4, 0.6, "VBP")),
        ("regret", entry(-0.5, 0.6, "VBP")),
        // nouns
        ("problem", entry(-0.3, 0.4, "NN")),
        ("problems", entry(-0.3, 0.4, "NNS")),
        ("waste", entry(-0.6, 0.6, "NN")),
        ("mess", entry(-0.5, 0.6, "NN")),
        ("pleasure", entry(0.6, 0.8, "NN")),
        ("delight", entry(0.7, 0.8, "NN")),
    ]
    .into_iter()
    .collect()
});

/// Words that scale the next scored word
static INTENSIFIERS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    [
        ("very", 1.3),
        ("really", 1.2),
        ("absolutely", 1.3),
        ("extremely", 1.5),
        ("incredibly", 1.4),
        ("highly", 1.3),
        ("totally", 1.3),
        ("super", 1.3),
        ("so", 1.2),
        ("quite", 1.1),
        ("pretty", 1.1),
        ("somewhat", 0.8),
        ("slightly", 0.7),
    ]
    .into_iter()
    .collect()
});

const NEGATORS: &[&str] = &[
    "not", "never", "no", "don't", "doesn't", "didn't", "isn't", "wasn't", "aren't", "weren't",
    "won't", "can't", "cannot", "couldn't", "wouldn't", "hardly",
];

/// Polarity multiplier for a negated word
const NEGATION_FACTOR: f64 = -0.5;

/// Closed-class words with a fixed tag
static CLOSED_CLASS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let groups: [(&'static str, &[&'static str]); 16] = [
        ("DT", &["the", "a", "an", "this", "that", "these", "those", "each", "every", "all", "some", "any", "another", "no"]),
        ("PRP", &["i", "you", "he", "she", "it", "we", "they", "me", "him", "us", "them", "i'm", "it's", "you're", "we're", "they're", "i've"]),
        ("PRP$", &["my", "your", "his", "her", "its", "our", "their"]),
        ("IN", &["in", "on", "at", "for", "of", "with", "by", "from", "as", "about", "into", "over", "after", "before", "than", "under", "between", "through", "during", "without", "within", "because", "if", "while", "since", "until"]),
        ("TO", &["to"]),
        ("CC", &["and", "or", "but", "nor", "yet"]),
        ("MD", &["will", "would", "could", "should", "may", "might", "must", "can", "shall"]),
        ("VBZ", &["is", "has", "does"]),
        ("VBP", &["are", "am", "have", "do"]),
        ("VBD", &["was", "were", "had", "did"]),
        ("VBN", &["been"]),
        ("VB", &["be", "get", "make"]),
        ("WDT", &["which", "what"]),
        ("WP", &["who", "whom"]),
        ("WRB", &["when", "where", "why", "how"]),
        ("RB", &["not", "never", "very", "too", "just", "now", "also", "really", "so", "quite", "only", "even", "still", "already", "then", "there", "here", "again", "always", "absolutely", "extremely", "don't", "doesn't", "didn't", "isn't", "wasn't", "aren't", "weren't", "won't", "can't", "cannot", "couldn't", "wouldn't", "hardly"]),
    ];

    let mut map = HashMap::new();
    for (tag, words) in groups {
        for word in words {
            map.entry(*word).or_insert(tag);
        }
    }
    map
});

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9]+(?:'[A-Za-z]+)?").unwrap());

static SENTENCE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?;]+").unwrap());

// ============================================================================
// LEXICON PROVIDER
// ============================================================================

/// Built-in provider backed by the embedded lexicon
#[derive(Debug, Clone, Default)]
pub struct LexiconProvider;

impl LexiconProvider {
    pub fn new() -> Self {
        LexiconProvider
    }

    /// Tag a single lower-cased word
    fn tag_word(word: &str) -> &'static str {
        if word.chars().all(|c| c.is_ascii_digit()) {
            return "CD";
        }
        if let Some(tag) = CLOSED_CLASS.get(word) {
            return *tag;
        }
        if let Some(e) = LEXICON.get(word) {
            return e.tag;
        }

        let len = word.len();
        if len > 4 && word.ends_with("ly") {
            return "RB";
        }
        if len > 4 && word.ends_with("ing") {
            return "VBG";
        }
        if len > 3 && word.ends_with("ed") {
            return "VBD";
        }
        const ADJECTIVE_SUFFIXES: [&str; 8] = ["ous", "ful", "able", "ible", "ive", "less", "ish", "ic"];
        if len > 4 && ADJECTIVE_SUFFIXES.iter().any(|s| word.ends_with(s)) {
            return "JJ";
        }
        if len > 3 && word.ends_with('s') && !word.ends_with("ss") {
            return "NNS";
        }
        "NN"
    }

    /// Average polarity/subjectivity over the scored words of one sentence.
    /// Intensifiers scale and negators flip the next scored word.
    fn score_sentence(words: &[String], scores: &mut Vec<(f64, f64)>) {
        let mut multiplier: Option<f64> = None;
        let mut negated = false;

        for word in words {
            if NEGATORS.contains(&word.as_str()) {
                negated = true;
                continue;
            }
            if let Some(m) = INTENSIFIERS.get(word.as_str()) {
                multiplier = Some(multiplier.unwrap_or(1.0) * m);
                continue;
            }
            if let Some(e) = LEXICON.get(word.as_str()) {
                let mut polarity = e.polarity;
                let mut subjectivity = e.subjectivity;

                if let Some(m) = multiplier.take() {
                    polarity *= m;
                    subjectivity *= m;
                }
                if negated {
                    polarity *= NEGATION_FACTOR;
                    negated = false;
                }

                scores.push((polarity.clamp(-1.0, 1.0), subjectivity.clamp(0.0, 1.0)));
            }
        }
    }

    /// Runs of adjective/noun tokens of length ≥ 2 that end in a noun
    fn chunk_noun_phrases(tokens: &[TaggedToken], phrases: &mut Vec<String>) {
        let mut run: Vec<&TaggedToken> = Vec::new();

        for token in tokens {
            if token.tag.starts_with("NN") || token.tag.starts_with("JJ") {
                run.push(token);
            } else {
                Self::flush_run(&mut run, phrases);
            }
        }
        Self::flush_run(&mut run, phrases);
    }

    fn flush_run(run: &mut Vec<&TaggedToken>, phrases: &mut Vec<String>) {
        while run.last().map_or(false, |t| !t.tag.starts_with("NN")) {
            run.pop();
        }
        if run.len() >= 2 {
            let words: Vec<&str> = run.iter().map(|t| t.word.as_str()).collect();
            phrases.push(words.join(" "));
        }
        run.clear();
    }
}

impl SignalProvider for LexiconProvider {
    fn signals(&self, text: &str) -> Result<LinguisticSignals> {
        let mut tagged_tokens = Vec::new();
        let mut noun_phrases = Vec::new();
        let mut scores = Vec::new();

        for sentence in SENTENCE_BREAK.split(text) {
            let words: Vec<&str> = TOKEN.find_iter(sentence).map(|m| m.as_str()).collect();
            if words.is_empty() {
                continue;
            }

            let lowered: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
            let tagged: Vec<TaggedToken> = words
                .iter()
                .zip(&lowered)
                .map(|(word, lower)| TaggedToken::new(*word, Self::tag_word(lower)))
                .collect();

            Self::score_sentence(&lowered, &mut scores);
            Self::chunk_noun_phrases(&tagged, &mut noun_phrases);
            tagged_tokens.extend(tagged);
        }

        if tagged_tokens.is_empty() {
            return Err(anyhow!("no tokens to analyze"));
        }

        let (polarity, subjectivity) = if scores.is_empty() {
            (0.0, 0.0)
        } else {
            let n = scores.len() as f64;
            (
                scores.iter().map(|(p, _)| p).sum::<f64>() / n,
                scores.iter().map(|(_, s)| s).sum::<f64>() / n,
            )
        };

        Ok(LinguisticSignals {
            polarity: polarity.clamp(-1.0, 1.0),
            subjectivity: subjectivity.clamp(0.0, 1.0),
            noun_phrases,
            tagged_tokens,
        })
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}

// ============================================================================
// TESTS
// ============================================================================
