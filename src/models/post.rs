use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Error, Result};

pub const DELETED_AUTHOR: &str = "deleted";

/// A post as the external source returns it, before a strategy claims it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPost {
    pub id: String,
    pub title: String,
    pub body: String,
    pub score: i64,
    pub num_comments: u32,
    pub created_at: DateTime<Utc>,
    pub author: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalStrategy {
    Recent,
    Engaged,
    HistoricalTop,
    Fallback,
}

impl RetrievalStrategy {
    /// Strategies run on every collection, in this order.
    pub const PRIMARY: [RetrievalStrategy; 3] = [
        RetrievalStrategy::Recent,
        RetrievalStrategy::Engaged,
        RetrievalStrategy::HistoricalTop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RetrievalStrategy::Recent => "new",
            RetrievalStrategy::Engaged => "hot",
            RetrievalStrategy::HistoricalTop => "top",
            RetrievalStrategy::Fallback => "new_fallback",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, RetrievalStrategy::Fallback)
    }
}

impl std::fmt::Display for RetrievalStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RetrievalStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "new" => Ok(RetrievalStrategy::Recent),
            "hot" => Ok(RetrievalStrategy::Engaged),
            "top" => Ok(RetrievalStrategy::HistoricalTop),
            "new_fallback" | "fallback" => Ok(RetrievalStrategy::Fallback),
            other => Err(Error::ParseError(format!(
                "Unknown retrieval strategy: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub text: String,
    pub score: i64,
    pub num_comments: u32,
    pub created_at: DateTime<Utc>,
    pub author: String,
    pub url: String,
    pub strategy: RetrievalStrategy,
}

impl Post {
    pub fn from_raw(raw: RawPost, strategy: RetrievalStrategy) -> Self {
        Self {
            id: raw.id,
            title: raw.title,
            text: raw.body,
            score: raw.score,
            num_comments: raw.num_comments,
            created_at: raw.created_at,
            author: raw.author.unwrap_or_else(|| DELETED_AUTHOR.to_string()),
            url: raw.url,
            strategy,
        }
    }

    /// Title and body joined the way the normalizer consumes them.
    pub fn full_text(&self) -> String {
        format!("{} {}", self.title, self.text)
    }

    pub fn is_fallback(&self) -> bool {
        self.strategy.is_fallback()
    }
}

/// The posts of one run. Identifiers are unique; the first occurrence wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    posts: Vec<Post>,
}

impl Dataset {
    pub fn from_posts(posts: Vec<Post>) -> Self {
        let mut seen = HashSet::with_capacity(posts.len());
        let posts = posts
            .into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .collect();
        Self { posts }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Post> {
        self.posts.iter()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn fallback_count(&self) -> usize {
        self.posts.iter().filter(|p| p.is_fallback()).count()
    }

    pub fn date_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let min = self.posts.iter().map(|p| p.created_at).min()?;
        let max = self.posts.iter().map(|p| p.created_at).max()?;
        Some((min, max))
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Post;
    type IntoIter = std::slice::Iter<'a, Post>;

    fn into_iter(self) -> Self::IntoIter {
        self.posts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn raw(id: &str, author: Option<&str>) -> RawPost {
        RawPost {
            id: id.to_string(),
            title: "Title".to_string(),
            body: String::new(),
            score: 3,
            num_comments: 1,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            author: author.map(str::to_string),
            url: format!("https://reddit.com/{}", id),
        }
    }

    #[test]
    fn test_missing_author_becomes_sentinel() {
        let post = Post::from_raw(raw("a", None), RetrievalStrategy::Recent);
        assert_eq!(post.author, DELETED_AUTHOR);

        let post = Post::from_raw(raw("b", Some("someone")), RetrievalStrategy::Engaged);
        assert_eq!(post.author, "someone");
        assert_eq!(post.strategy, RetrievalStrategy::Engaged);
    }

    #[test]
    fn test_dataset_keeps_first_occurrence() {
        let posts = vec![
            Post::from_raw(raw("a", None), RetrievalStrategy::Recent),
            Post::from_raw(raw("b", None), RetrievalStrategy::Recent),
            Post::from_raw(raw("a", None), RetrievalStrategy::HistoricalTop),
        ];
        let dataset = Dataset::from_posts(posts);

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.posts()[0].strategy, RetrievalStrategy::Recent);
    }

    #[test]
    fn test_strategy_names_round_trip() {
        for strategy in RetrievalStrategy::PRIMARY
            .iter()
            .chain(std::iter::once(&RetrievalStrategy::Fallback))
        {
            let parsed: RetrievalStrategy = strategy.as_str().parse().unwrap();
            assert_eq!(&parsed, strategy);
        }
        assert!("sideways".parse::<RetrievalStrategy>().is_err());
    }
}
