use std::collections::HashMap;

use crate::analysis::normalizer::Corpus;
use crate::models::QueryAnalysis;
use crate::taxonomy::is_query_stopword;

/// Substring markers; "how" also fires inside "shower".
const QUESTION_MARKERS: [&str; 9] = [
    "how", "what", "when", "where", "why", "can i", "should i", "is it", "do i",
];

const MIN_WORD_LEN: usize = 3;

pub fn is_question(clean_text: &str) -> bool {
    QUESTION_MARKERS.iter().any(|m| clean_text.contains(m))
}

pub fn analyze_queries(corpus: &Corpus, top_n: usize) -> QueryAnalysis {
    // word -> (count, first position seen)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    let mut position = 0;

    for doc in corpus.iter() {
        for word in doc.clean_text.split_whitespace() {
            if word.len() < MIN_WORD_LEN
                || is_query_stopword(word)
                || !word.chars().any(|c| c.is_ascii_alphabetic())
            {
                continue;
            }
            counts.entry(word).or_insert((0, position)).0 += 1;
            position += 1;
        }
    }

    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|(_, (ca, fa)), (_, (cb, fb))| cb.cmp(ca).then(fa.cmp(fb)));

    let top_words = ranked
        .into_iter()
        .take(top_n)
        .map(|(word, (count, _))| (word.to_string(), count))
        .collect();

    let question_posts = corpus.iter().filter(|d| is_question(&d.clean_text)).count();

    QueryAnalysis {
        top_words,
        question_posts,
        total_posts: corpus.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dataset, Post, RetrievalStrategy};
    use chrono::Utc;

    fn corpus(titles: &[&str]) -> Corpus {
        let posts = titles
            .iter()
            .enumerate()
            .map(|(i, title)| Post {
                id: format!("p{}", i),
                title: title.to_string(),
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

    #[test]
    fn test_ranking_by_count_then_first_appearance() {
        let corpus = corpus(&[
            "interview scheduled biometrics interview",
            "biometrics notice interview today",
            "notice received biometrics done",
        ]);

        let result = analyze_queries(&corpus, 10);
        let counts: Vec<usize> = result.top_words.iter().map(|(_, c)| *c).collect();
        assert!(counts.windows(2).all(|w| w[0] >= w[1]));

        assert_eq!(result.top_words[0], ("interview".to_string(), 3));
        assert_eq!(result.top_words[1], ("biometrics".to_string(), 3));
        assert_eq!(result.top_words[2], ("notice".to_string(), 2));
        // Singletons in order of first appearance.
        assert_eq!(result.top_words[3].0, "scheduled");
        assert_eq!(result.top_words[4].0, "today");
    }

    #[test]
    fn test_stopwords_short_and_numeric_tokens_dropped() {
        let corpus = corpus(&["the officer at my interview said ok 2024 i485"]);
        let words: Vec<_> = analyze_queries(&corpus, 20)
            .top_words
            .into_iter()
            .map(|(w, _)| w)
            .collect();

        assert_eq!(words, vec!["officer", "interview", "said", "i485"]);
    }

    #[test]
    fn test_top_n_limits_output() {
        let corpus = corpus(&["alpha bravo charlie delta echo foxtrot"]);
        assert_eq!(analyze_queries(&corpus, 2).top_words.len(), 2);
    }

    #[test]
    fn test_question_posts() {
        let corpus = corpus(&[
            "How do I check my green card status?",
            "H1B renewal delay",
            "Citizenship oath ceremony today",
        ]);

        let result = analyze_queries(&corpus, 5);
        assert_eq!(result.question_posts, 1);
        assert_eq!(result.total_posts, 3);
        assert!(is_question("took a shower before the interview"));
    }

    #[test]
    fn test_empty_corpus() {
        let result = analyze_queries(&Corpus::default(), 10);
        assert!(result.top_words.is_empty());
        assert_eq!(result.question_posts, 0);
        assert_eq!(result.question_share(), 0.0);
    }
}
