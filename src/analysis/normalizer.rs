use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{Dataset, Post};

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)https?\S+|www\S+").expect("valid URL pattern")
});

/// Canonical form of post text: URLs stripped, lowercase, ASCII letters and
/// digits only, single spaces. Idempotent.
pub fn normalize(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };

    let without_urls = URL_RE.replace_all(text, "");
    let kept: String = without_urls
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A post paired with its normalized text.
#[derive(Debug, Clone)]
pub struct Document {
    pub post: Post,
    pub clean_text: String,
}

/// Normalized, length-filtered view of a dataset. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    /// Keeps documents whose clean text is longer than `min_len` characters.
    pub fn build(dataset: &Dataset, min_len: usize) -> Self {
        let documents = dataset
            .iter()
            .filter_map(|post| {
                let clean_text = normalize(Some(&post.full_text()));
                (clean_text.len() > min_len).then(|| Document {
                    post: post.clone(),
                    clean_text,
                })
            })
            .collect();

        Self { documents }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
