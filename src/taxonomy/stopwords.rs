use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Short list used for the keyword frequency table.
static QUERY_STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is", "are",
        "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will", "would",
        "could", "should", "may", "might", "must", "can", "a", "an", "this", "that", "these",
        "those", "i", "me", "my", "we", "us", "our", "you", "your", "he", "him", "his", "she",
        "her", "it", "its", "they", "them", "their",
    ]
    .into_iter()
    .collect()
});

pub fn is_query_stopword(word: &str) -> bool {
    QUERY_STOPWORDS.contains(word)
}
