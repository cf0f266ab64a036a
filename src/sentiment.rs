use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

/// Scores above this are bullish (利好).
pub const BULLISH_THRESHOLD: f64 = 0.6;
/// Scores below this are bearish (利空).
pub const BEARISH_THRESHOLD: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Bullish,
    Bearish,
    Neutral,
}

impl SentimentLabel {
    pub fn from_score(score: f64) -> Self {
        if score > BULLISH_THRESHOLD {
            SentimentLabel::Bullish
        } else if score < BEARISH_THRESHOLD {
            SentimentLabel::Bearish
        } else {
            SentimentLabel::Neutral
        }
    }
}

/// Pluggable polarity model. Any implementation producing a bounded score
/// works; only the [0,1] range and the threshold semantics are contractual.
pub trait SentimentModel: Send + Sync {
    /// Polarity confidence in [0,1]; 0.5 is the neutral midpoint.
    fn score(&self, text: &str) -> f64;
}

/// Default model: signed phrase weights from an embedded lexicon, squashed
/// through a logistic curve. Chinese copy has no token boundaries, so
/// phrases are matched as substrings rather than split into words.
#[derive(Debug, Clone, Default)]
pub struct LexiconModel;

impl LexiconModel {
    pub fn new() -> Self {
        Self
    }
}

impl SentimentModel for LexiconModel {
    fn score(&self, text: &str) -> f64 {
        if text.is_empty() {
            return 0.5;
        }
        logistic(raw_score(text) as f64)
    }
}

/// Sum of signed weights over all lexicon hits. A negator character within
/// the two characters before a hit inverts its sign ("未上涨" reads bearish).
fn raw_score(text: &str) -> i32 {
    let mut score = 0;
    for (phrase, weight) in LEXICON.iter() {
        for (idx, _) in text.match_indices(phrase.as_str()) {
            let negated = text[..idx].chars().rev().take(2).any(is_negator);
            score += if negated { -*weight } else { *weight };
        }
    }
    score
}

fn is_negator(c: char) -> bool {
    matches!(c, '不' | '未' | '没' | '非' | '无')
}

/// Map the unbounded lexicon sum into (0,1) around the 0.5 midpoint.
fn logistic(raw: f64) -> f64 {
    1.0 / (1.0 + (-0.5 * raw).exp())
}
