use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;

use crate::analysis::normalizer::Corpus;
use crate::error::Result;
use crate::models::{LabelCounts, PostSentiment, SentimentLabel, SentimentSummary};

pub const POSITIVE_THRESHOLD: f64 = 0.1;
pub const NEGATIVE_THRESHOLD: f64 = -0.1;

/// A negator within this many preceding tokens flips the word.
const NEGATION_WINDOW: usize = 3;
const NEGATION_FACTOR: f64 = -0.5;

static LEXICON: Lazy<HashMap<String, f64>> = Lazy::new(|| {
    load_lexicon(include_str!("../../sentiment_lexicon.json")).unwrap_or_else(|e| {
        tracing::warn!("Sentiment lexicon unreadable, scoring everything neutral: {}", e);
        HashMap::new()
    })
});

fn load_lexicon(raw: &str) -> Result<HashMap<String, f64>> {
    Ok(serde_json::from_str(raw)?)
}

fn intensity(token: &str) -> Option<f64> {
    match token {
        "very" | "really" | "super" => Some(1.3),
        "so" | "too" | "quite" => Some(1.2),
        "extremely" | "incredibly" | "absolutely" | "totally" => Some(1.5),
        "pretty" | "fairly" => Some(1.1),
        "slightly" | "somewhat" | "kinda" => Some(0.7),
        _ => None,
    }
}

fn is_negator(token: &str) -> bool {
    matches!(
        token,
        "not"
            | "no"
            | "never"
            | "dont"
            | "doesnt"
            | "didnt"
            | "isnt"
            | "wasnt"
            | "arent"
            | "werent"
            | "cant"
            | "cannot"
            | "wont"
            | "havent"
            | "hasnt"
            | "without"
    )
}

/// Mean polarity of the lexicon words in `text`, within `[-1.0, 1.0]`.
pub fn polarity(text: &str) -> f64 {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut scores = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        let Some(&base) = LEXICON.get(*token) else {
            continue;
        };

        let mut value = base;
        if let Some(factor) = i.checked_sub(1).and_then(|p| intensity(tokens[p])) {
            value *= factor;
        }
        let negated = (1..=NEGATION_WINDOW).any(|k| i >= k && is_negator(tokens[i - k]));
        if negated {
            value *= NEGATION_FACTOR;
        }
        scores.push(value.clamp(-1.0, 1.0));
    }

    if scores.is_empty() {
        return 0.0;
    }
    (scores.iter().sum::<f64>() / scores.len() as f64).clamp(-1.0, 1.0)
}

pub fn label_for(polarity: f64) -> SentimentLabel {
    if polarity > POSITIVE_THRESHOLD {
        SentimentLabel::Positive
    } else if polarity < NEGATIVE_THRESHOLD {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

pub fn classify(text: &str) -> (SentimentLabel, f64) {
    let score = polarity(text);
    (label_for(score), score)
}

pub fn analyze_sentiment(corpus: &Corpus) -> SentimentSummary {
    let mut counts = LabelCounts::default();
    let mut monthly: BTreeMap<String, LabelCounts> = BTreeMap::new();
    let mut posts = Vec::with_capacity(corpus.len());

    for doc in corpus.iter() {
        let (label, score) = classify(&doc.clean_text);
        counts.record(label);
        monthly
            .entry(doc.post.created_at.format("%Y-%m").to_string())
            .or_default()
            .record(label);
        posts.push(PostSentiment {
            post_id: doc.post.id.clone(),
            label,
            polarity: score,
        });
    }

    let average_polarity = if posts.is_empty() {
        0.0
    } else {
        posts.iter().map(|p| p.polarity).sum::<f64>() / posts.len() as f64
    };

    SentimentSummary {
        counts,
        average_polarity,
        monthly,
        posts,
    }
}
