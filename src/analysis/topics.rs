use aprender::text::topic::LatentDirichletAllocation;
use aprender::text::vectorize::TfidfVectorizer;
use aprender::text::Tokenizer;
use aprender::AprenderError;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::analysis::normalizer::Corpus;
use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::models::TopicResult;

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid token pattern"));

const KEYWORDS_PER_TOPIC: usize = 8;
const DESCRIPTION_KEYWORDS: usize = 5;

/// Word tokens of two or more characters.
struct TermTokenizer;

impl Tokenizer for TermTokenizer {
    fn tokenize(&self, text: &str) -> std::result::Result<Vec<String>, AprenderError> {
        Ok(TOKEN_RE
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect())
    }
}

fn vectorizer(config: &AnalysisConfig) -> TfidfVectorizer {
    TfidfVectorizer::new()
        .with_tokenizer(Box::new(TermTokenizer))
        .with_stop_words_english()
        .with_ngram_range(1, 2)
        .with_min_df(config.min_df)
        .with_max_features(config.max_features)
}

/// Vocabulary ordered by column index. Bigrams come back joined with `_`.
fn vocabulary(vectorizer: &TfidfVectorizer) -> Vec<String> {
    let mut terms: Vec<(&String, &usize)> = vectorizer.vocabulary().iter().collect();
    terms.sort_by_key(|(_, idx)| **idx);
    terms
        .into_iter()
        .map(|(term, _)| term.replace('_', " "))
        .collect()
}

fn describe(id: usize, keywords: &[String]) -> String {
    format!(
        "Topic {}: {}",
        id,
        keywords
            .iter()
            .take(DESCRIPTION_KEYWORDS)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    )
}

pub fn analyze_topics(corpus: &Corpus, config: &AnalysisConfig) -> Result<Vec<TopicResult>> {
    if config.num_topics == 0 {
        return Err(Error::InvalidInput("num_topics must be at least 1".to_string()));
    }

    let texts: Vec<&str> = corpus.iter().map(|d| d.clean_text.as_str()).collect();
    if texts.is_empty() || config.max_features == 0 || config.min_df > texts.len() {
        tracing::info!(
            "Skipping topic analysis: {} documents with min_df {} and max_features {}",
            texts.len(),
            config.min_df,
            config.max_features
        );
        return Ok(Vec::new());
    }

    let mut vectorizer = vectorizer(config);
    let matrix = match vectorizer.fit_transform(&texts) {
        Ok(matrix) => matrix,
        // The vocabulary is learned before any matrix is built, so an empty
        // one here means document-frequency pruning removed every term.
        Err(_) if vectorizer.vocabulary_size() == 0 => {
            tracing::info!(
                "Skipping topic analysis: no terms appear in at least {} of {} documents",
                config.min_df,
                texts.len()
            );
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };
    let vocabulary = vocabulary(&vectorizer);

    tracing::debug!(
        "Fitting {} topics over {} documents x {} terms",
        config.num_topics,
        matrix.n_rows(),
        matrix.n_cols()
    );

    let mut lda = LatentDirichletAllocation::new(config.num_topics).with_random_seed(config.seed);
    lda.fit(&matrix, config.lda_iterations)?;

    Ok(lda
        .top_words(&vocabulary, KEYWORDS_PER_TOPIC)?
        .into_iter()
        .enumerate()
        .map(|(idx, words)| {
            let keywords: Vec<String> = words.into_iter().map(|(word, _)| word).collect();
            TopicResult {
                id: idx + 1,
                description: describe(idx + 1, &keywords),
                keywords,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dataset, Post, RetrievalStrategy};
    use chrono::Utc;

    fn corpus(texts: &[&str]) -> Corpus {
        let posts = texts
            .iter()
            .enumerate()
            .map(|(i, text)| Post {
                id: format!("p{}", i),
                title: text.to_string(),
                text: String::new(),
                score: 0,
                num_comments: 0,
                created_at: Utc::now(),
                author: "deleted".to_string(),
                url: String::new(),
                strategy: RetrievalStrategy::Recent,
            })
            .collect();
        Corpus::build(&Dataset::from_posts(posts), 10)
    }

    fn immigration_corpus() -> Corpus {
        let mut texts = Vec::new();
        for _ in 0..6 {
            texts.push("green card interview approved biometrics notice received");
            texts.push("citizenship oath ceremony scheduled naturalization interview");
            texts.push("work permit renewal delay biometrics pending");
        }
        corpus(&texts)
    }

    #[test]
    fn test_tokenizer_drops_single_characters() {
        let tokens = TermTokenizer.tokenize("i 485 a interview").unwrap();
        assert_eq!(tokens, vec!["485", "interview"]);
    }

    #[test]
    fn test_vectorizer_prunes_by_document_frequency() {
        let config = AnalysisConfig {
            min_df: 2,
            ..AnalysisConfig::default()
        };
        let docs = ["visa interview today", "visa interview tomorrow", "green card"];
        let mut vectorizer = vectorizer(&config);
        let matrix = vectorizer.fit_transform(&docs).unwrap();

        let mut terms = vocabulary(&vectorizer);
        terms.sort();
        assert_eq!(terms, vec!["interview", "visa", "visa interview"]);
        assert_eq!(matrix.n_rows(), 3);
        let unmatched: f64 = (0..matrix.n_cols()).map(|c| matrix.get(2, c)).sum();
        assert_eq!(unmatched, 0.0);
    }

    #[test]
    fn test_vectorizer_respects_max_features() {
        let config = AnalysisConfig {
            min_df: 1,
            max_features: 2,
            ..AnalysisConfig::default()
        };
        let docs = ["alpha beta beta", "alpha gamma beta", "alpha delta"];
        let mut vectorizer = vectorizer(&config);
        vectorizer.fit_transform(&docs).unwrap();

        assert_eq!(vocabulary(&vectorizer), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_too_small_corpus_returns_no_topics() {
        let corpus = corpus(&[
            "green card interview scheduled",
            "citizenship oath ceremony today",
        ]);
        let config = AnalysisConfig {
            min_df: 5,
            ..AnalysisConfig::default()
        };

        assert_eq!(analyze_topics(&corpus, &config).unwrap(), Vec::new());
        assert!(analyze_topics(&Corpus::default(), &config).unwrap().is_empty());
    }

    #[test]
    fn test_no_shared_terms_returns_no_topics() {
        let texts: Vec<String> = (0..6)
            .map(|i| format!("uniqueword{} anotherword{}", i, i))
            .collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let config = AnalysisConfig {
            min_df: 2,
            ..AnalysisConfig::default()
        };

        assert!(analyze_topics(&corpus(&refs), &config).unwrap().is_empty());
    }

    #[test]
    fn test_zero_max_features_returns_no_topics() {
        let texts = vec!["green card interview approved biometrics"; 10];
        let config = AnalysisConfig {
            max_features: 0,
            ..AnalysisConfig::default()
        };

        assert!(analyze_topics(&corpus(&texts), &config).unwrap().is_empty());
    }

    #[test]
    fn test_zero_topics_is_rejected() {
        let config = AnalysisConfig {
            num_topics: 0,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            analyze_topics(&immigration_corpus(), &config),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_topics_are_ranked_and_described() {
        let config = AnalysisConfig {
            num_topics: 3,
            ..AnalysisConfig::default()
        };
        let topics = analyze_topics(&immigration_corpus(), &config).unwrap();

        assert_eq!(topics.len(), 3);
        for (i, topic) in topics.iter().enumerate() {
            assert_eq!(topic.id, i + 1);
            assert_eq!(topic.keywords.len(), KEYWORDS_PER_TOPIC);
            assert!(topic.keywords.iter().all(|k| !k.contains('_')));
            let expected = format!("Topic {}: {}", i + 1, topic.keywords[..5].join(", "));
            assert_eq!(topic.description, expected);
        }
    }

    #[test]
    fn test_topics_are_deterministic() {
        let config = AnalysisConfig {
            num_topics: 2,
            ..AnalysisConfig::default()
        };
        let first = analyze_topics(&immigration_corpus(), &config).unwrap();
        let second = analyze_topics(&immigration_corpus(), &config).unwrap();
        assert_eq!(first, second);
    }
}
