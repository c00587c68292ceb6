use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::post::Post;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueryAnalysis {
    /// Most frequent terms, highest count first, ties in first-seen order.
    pub top_words: Vec<(String, usize)>,
    pub question_posts: usize,
    pub total_posts: usize,
}

impl QueryAnalysis {
    pub fn question_share(&self) -> f64 {
        if self.total_posts == 0 {
            0.0
        } else {
            self.question_posts as f64 / self.total_posts as f64
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopicResult {
    pub id: usize,
    pub keywords: Vec<String>,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Neutral,
        SentimentLabel::Negative,
    ];
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "positive"),
            SentimentLabel::Neutral => write!(f, "neutral"),
            SentimentLabel::Negative => write!(f, "negative"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabelCounts {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl LabelCounts {
    pub fn record(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Negative => self.negative += 1,
        }
    }

    pub fn get(&self, label: SentimentLabel) -> usize {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Neutral => self.neutral,
            SentimentLabel::Negative => self.negative,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }

    /// Label with the highest count; `None` when nothing was counted.
    pub fn dominant(&self) -> Option<SentimentLabel> {
        if self.total() == 0 {
            return None;
        }
        SentimentLabel::ALL
            .iter()
            .copied()
            .fold(None, |best: Option<SentimentLabel>, label| match best {
                Some(b) if self.get(b) >= self.get(label) => Some(b),
                _ => Some(label),
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostSentiment {
    pub post_id: String,
    pub label: SentimentLabel,
    pub polarity: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SentimentSummary {
    pub counts: LabelCounts,
    pub average_polarity: f64,
    /// Label counts keyed by `YYYY-MM` of the post creation time.
    pub monthly: BTreeMap<String, LabelCounts>,
    pub posts: Vec<PostSentiment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryMatch {
    pub name: String,
    pub count: usize,
    #[serde(skip)]
    pub posts: Vec<Post>,
}

impl CategoryMatch {
    pub fn display_name(&self) -> String {
        self.name
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn contains(&self, post_id: &str) -> bool {
        self.posts.iter().any(|p| p.id == post_id)
    }
}

/// Per-category results in the fixed table order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub categories: Vec<CategoryMatch>,
}

impl CategoryBreakdown {
    pub fn get(&self, name: &str) -> Option<&CategoryMatch> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CategoryMatch> {
        self.categories.iter()
    }

    /// Categories by descending count; equal counts keep table order.
    pub fn by_count(&self) -> Vec<&CategoryMatch> {
        let mut sorted: Vec<_> = self.categories.iter().collect();
        sorted.sort_by(|a, b| b.count.cmp(&a.count));
        sorted
    }

    pub fn top(&self) -> Option<&CategoryMatch> {
        self.by_count().into_iter().next().filter(|c| c.count > 0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub total_posts: usize,
    pub analyzed_posts: usize,
    pub fallback_posts: usize,
    pub date_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub average_comments: f64,
    pub queries: QueryAnalysis,
    pub topics: Vec<TopicResult>,
    pub sentiment: SentimentSummary,
    pub categories: CategoryBreakdown,
}
